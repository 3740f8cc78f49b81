//! Session state - the aggregate root a moderator works on.
//!
//! `SessionState` doubles as the persistence snapshot: its serialized form is
//! the record handed to storage, so every field here round-trips exactly.

mod actions;

pub use actions::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::entities::{role_ids, CharacterInstance, InstanceId, Team};

/// Phase of the moderated game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Setup,
    FirstDay,
    FirstNight,
    Day,
    Night,
    GameEnd,
}

impl Phase {
    /// The phase a moderator normally moves to next.
    pub fn next(self) -> Phase {
        match self {
            Phase::Setup => Phase::FirstDay,
            Phase::FirstDay => Phase::FirstNight,
            Phase::FirstNight => Phase::Day,
            Phase::Day => Phase::Night,
            Phase::Night => Phase::Day,
            Phase::GameEnd => Phase::Setup,
        }
    }

    /// Whether `self -> to` is an edge of the regular phase cycle.
    ///
    /// Staying in place and ending the game are always regular.
    pub fn is_regular_transition(self, to: Phase) -> bool {
        self == to || to == Phase::GameEnd || self.next() == to
    }

    pub fn is_night(self) -> bool {
        matches!(self, Phase::FirstNight | Phase::Night)
    }

    pub fn is_day(self) -> bool {
        matches!(self, Phase::FirstDay | Phase::Day)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::FirstDay => "firstDay",
            Phase::FirstNight => "firstNight",
            Phase::Day => "day",
            Phase::Night => "night",
            Phase::GameEnd => "gameEnd",
        };
        f.write_str(name)
    }
}

/// The wild child's choice of model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelLink {
    pub wild_child: InstanceId,
    pub target: InstanceId,
}

/// Special bonds between characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Links {
    /// At most two entries.
    #[serde(default)]
    pub lovers: Vec<InstanceId>,
    #[serde(default)]
    pub model: Option<ModelLink>,
}

impl Links {
    /// The other lover when `id` is part of a complete pair.
    pub fn lover_partner(&self, id: &InstanceId) -> Option<&InstanceId> {
        match self.lovers.as_slice() {
            [a, b] if a == id => Some(b),
            [a, b] if b == id => Some(a),
            _ => None,
        }
    }

    pub fn is_lover(&self, id: &InstanceId) -> bool {
        self.lovers.contains(id)
    }

    pub fn is_model(&self, id: &InstanceId) -> bool {
        self.model.as_ref().is_some_and(|m| &m.target == id)
    }
}

/// Alive characters per effective team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TeamCounts {
    pub village: usize,
    pub werewolf: usize,
    pub solo: usize,
}

impl TeamCounts {
    pub fn total(&self) -> usize {
        self.village + self.werewolf + self.solo
    }

    pub fn get(&self, team: Team) -> usize {
        match team {
            Team::Village => self.village,
            Team::Werewolf => self.werewolf,
            Team::Solo => self.solo,
        }
    }

    /// Suggested winner for the moderator, if the table has been decided.
    ///
    /// Only a hint: ending the game stays a moderator decision.
    pub fn outcome(&self) -> Option<Team> {
        if self.total() == 0 {
            return None;
        }
        if self.werewolf == 0 && self.village == 0 {
            return Some(Team::Solo);
        }
        if self.werewolf == 0 && self.solo == 0 {
            return Some(Team::Village);
        }
        if self.werewolf >= self.village + self.solo && self.solo == 0 {
            return Some(Team::Werewolf);
        }
        None
    }
}

/// Everything needed to rebuild a running session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Declared number of players at the table.
    pub players: u32,
    pub characters: Vec<CharacterInstance>,
    pub selected_definition_ids: Vec<String>,
    pub phase: Phase,
    pub day_count: u32,
    pub alive_ids: BTreeSet<InstanceId>,
    #[serde(default)]
    pub links: Links,
    #[serde(default)]
    pub show_player_names: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            players: 0,
            characters: Vec::new(),
            selected_definition_ids: Vec::new(),
            phase: Phase::Setup,
            day_count: 1,
            alive_ids: BTreeSet::new(),
            links: Links::default(),
            show_player_names: false,
        }
    }
}

impl SessionState {
    /// Create a fresh session where every character is alive.
    pub fn new(characters: Vec<CharacterInstance>, selected_definition_ids: Vec<String>) -> Self {
        let alive_ids = characters.iter().map(|c| c.instance_id.clone()).collect();
        Self {
            players: characters.len() as u32,
            characters,
            selected_definition_ids,
            alive_ids,
            ..Self::default()
        }
    }

    /// Whether a session has been dealt.
    pub fn is_started(&self) -> bool {
        !self.characters.is_empty()
    }

    pub fn get_character(&self, id: &InstanceId) -> Option<&CharacterInstance> {
        self.characters.iter().find(|c| &c.instance_id == id)
    }

    pub fn get_character_mut(&mut self, id: &InstanceId) -> Option<&mut CharacterInstance> {
        self.characters.iter_mut().find(|c| &c.instance_id == id)
    }

    /// First instance of a definition, in session order.
    pub fn find_by_role(&self, definition_id: &str) -> Option<&CharacterInstance> {
        self.characters.iter().find(|c| c.is_role(definition_id))
    }

    pub fn find_by_role_mut(&mut self, definition_id: &str) -> Option<&mut CharacterInstance> {
        self.characters.iter_mut().find(|c| c.is_role(definition_id))
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.characters.iter().any(|c| &c.instance_id == id)
    }

    pub fn is_alive(&self, id: &InstanceId) -> bool {
        self.alive_ids.contains(id)
    }

    pub fn alive_characters(&self) -> impl Iterator<Item = &CharacterInstance> {
        self.characters
            .iter()
            .filter(|c| self.alive_ids.contains(&c.instance_id))
    }

    /// Alive characters per effective team.
    pub fn team_counts(&self) -> TeamCounts {
        let mut counts = TeamCounts::default();
        for character in self.alive_characters() {
            match character.effective_team() {
                Team::Village => counts.village += 1,
                Team::Werewolf => counts.werewolf += 1,
                Team::Solo => counts.solo += 1,
            }
        }
        counts
    }

    /// Move to `to`, counting a new day on the `night -> day` edge.
    pub fn enter_phase(&mut self, to: Phase) -> Phase {
        let from = self.phase;
        if from == Phase::Night && to == Phase::Day {
            self.day_count += 1;
        }
        self.phase = to;
        from
    }

    /// Describe the first broken invariant, if any.
    ///
    /// Used to reject corrupted snapshots before they replace live state.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.day_count == 0 {
            return Err("day count must start at 1".to_string());
        }

        let mut seen = BTreeSet::new();
        for character in &self.characters {
            if !seen.insert(&character.instance_id) {
                return Err(format!("duplicate instance id {}", character.instance_id));
            }
        }

        if let Some(stray) = self.alive_ids.iter().find(|id| !seen.contains(id)) {
            return Err(format!("alive id {} is not a session character", stray));
        }

        if self.links.lovers.len() > 2 {
            return Err(format!("{} lovers linked", self.links.lovers.len()));
        }
        if let Some(stray) = self.links.lovers.iter().find(|id| !seen.contains(id)) {
            return Err(format!("lover {} is not a session character", stray));
        }
        if let Some(model) = &self.links.model {
            for id in [&model.wild_child, &model.target] {
                if !seen.contains(id) {
                    return Err(format!("model link {} is not a session character", id));
                }
            }
        }

        for role in role_ids::UNIQUE_PER_SESSION {
            if self.characters.iter().filter(|c| c.is_role(role)).count() > 1 {
                return Err(format!("more than one {} in session", role));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CharacterDefinition;

    fn instance(role: &str, ordinal: usize, team: Team) -> CharacterInstance {
        CharacterInstance::new(
            InstanceId::for_copy(role, ordinal),
            CharacterDefinition::new(role, role, team),
        )
    }

    fn small_session() -> SessionState {
        SessionState::new(
            vec![
                instance("werewolf", 1, Team::Werewolf),
                instance("villager", 1, Team::Village),
                instance("villager", 2, Team::Village),
                instance("angel", 1, Team::Solo),
            ],
            vec![
                "werewolf".into(),
                "villager".into(),
                "villager".into(),
                "angel".into(),
            ],
        )
    }

    #[test]
    fn test_new_session_everyone_alive() {
        let state = small_session();
        assert_eq!(state.phase, Phase::Setup);
        assert_eq!(state.day_count, 1);
        assert_eq!(state.players, 4);
        assert_eq!(state.alive_ids.len(), 4);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_enter_phase_counts_days_on_night_to_day_only() {
        let mut state = small_session();
        for phase in [Phase::FirstDay, Phase::FirstNight, Phase::Day] {
            state.enter_phase(phase);
        }
        assert_eq!(state.day_count, 1);

        state.enter_phase(Phase::Night);
        let from = state.enter_phase(Phase::Day);
        assert_eq!(from, Phase::Night);
        assert_eq!(state.day_count, 2);

        state.enter_phase(Phase::GameEnd);
        state.enter_phase(Phase::Setup);
        assert_eq!(state.day_count, 2);
    }

    #[test]
    fn test_phase_regular_transitions() {
        assert!(Phase::Setup.is_regular_transition(Phase::FirstDay));
        assert!(Phase::Night.is_regular_transition(Phase::Day));
        assert!(Phase::Day.is_regular_transition(Phase::GameEnd));
        assert!(Phase::GameEnd.is_regular_transition(Phase::Setup));
        assert!(!Phase::Setup.is_regular_transition(Phase::Night));
        assert!(!Phase::Day.is_regular_transition(Phase::FirstNight));
    }

    #[test]
    fn test_team_counts_use_effective_team_and_alive_only() {
        let mut state = small_session();
        state.alive_ids.remove(&InstanceId::from("villager-2"));
        if let Some(angel) = state.get_character_mut(&InstanceId::from("angel-1")) {
            angel.team_override = Some(Team::Werewolf);
        }

        let counts = state.team_counts();
        assert_eq!(
            counts,
            TeamCounts {
                village: 1,
                werewolf: 2,
                solo: 0
            }
        );
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_outcome_hints() {
        let open = TeamCounts { village: 3, werewolf: 1, solo: 0 };
        assert_eq!(open.outcome(), None);

        let village = TeamCounts { village: 2, werewolf: 0, solo: 0 };
        assert_eq!(village.outcome(), Some(Team::Village));

        let wolves = TeamCounts { village: 1, werewolf: 1, solo: 0 };
        assert_eq!(wolves.outcome(), Some(Team::Werewolf));

        let solo = TeamCounts { village: 0, werewolf: 0, solo: 1 };
        assert_eq!(solo.outcome(), Some(Team::Solo));

        assert_eq!(TeamCounts::default().outcome(), None);
    }

    #[test]
    fn test_lover_partner() {
        let a = InstanceId::from("a-1");
        let b = InstanceId::from("b-1");
        let mut links = Links::default();

        links.lovers.push(a.clone());
        assert_eq!(links.lover_partner(&a), None);

        links.lovers.push(b.clone());
        assert_eq!(links.lover_partner(&a), Some(&b));
        assert_eq!(links.lover_partner(&b), Some(&a));
        assert_eq!(links.lover_partner(&InstanceId::from("c-1")), None);
    }

    #[test]
    fn test_invariants_reject_stray_alive_id() {
        let mut state = small_session();
        state.alive_ids.insert(InstanceId::from("ghost-1"));
        assert!(state.check_invariants().is_err());
    }

    #[test]
    fn test_invariants_reject_three_lovers() {
        let mut state = small_session();
        state.links.lovers = vec![
            InstanceId::from("werewolf-1"),
            InstanceId::from("villager-1"),
            InstanceId::from("villager-2"),
        ];
        assert!(state.check_invariants().is_err());
    }

    #[test]
    fn test_snapshot_field_names() {
        let state = small_session();
        let value = serde_json::to_value(&state).unwrap();
        for key in [
            "players",
            "characters",
            "selectedDefinitionIds",
            "phase",
            "dayCount",
            "aliveIds",
            "links",
            "showPlayerNames",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["phase"], "setup");
    }
}
