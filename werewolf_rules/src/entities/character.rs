//! Character definitions and their per-session instances.

use serde::{Deserialize, Serialize};

use super::{ActionPhase, InstanceId, Team};

/// A character as described by the catalog. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDefinition {
    pub id: String,
    pub name: String,
    pub team: Team,
    /// Smallest table this character is meant for.
    #[serde(default)]
    pub min_players: u32,
    #[serde(default = "default_expansion")]
    pub expansion: String,
    #[serde(default)]
    pub action_phase: Option<ActionPhase>,
    /// Wake-up rank within the phase; lower acts first.
    #[serde(default)]
    pub action_order: Option<u32>,
    #[serde(default)]
    pub description: String,
}

fn default_expansion() -> String {
    "base".to_string()
}

impl CharacterDefinition {
    /// Create a definition with no action, for the base game.
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: Team) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team,
            min_players: 0,
            expansion: default_expansion(),
            action_phase: None,
            action_order: None,
            description: String::new(),
        }
    }

    /// Set when and in which rank the character acts.
    pub fn with_action(mut self, phase: ActionPhase, order: Option<u32>) -> Self {
        self.action_phase = Some(phase);
        self.action_order = order;
        self
    }

    pub fn with_min_players(mut self, min_players: u32) -> Self {
        self.min_players = min_players;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// One character dealt into a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterInstance {
    pub instance_id: InstanceId,

    #[serde(flatten)]
    pub definition: CharacterDefinition,

    /// Replaces the definition team after a conversion.
    #[serde(default)]
    pub team_override: Option<Team>,

    #[serde(default)]
    pub player_name: Option<String>,

    /// Drives the conversion visual in the presentation layer.
    #[serde(default)]
    pub converted: bool,
}

impl CharacterInstance {
    pub fn new(instance_id: InstanceId, definition: CharacterDefinition) -> Self {
        Self {
            instance_id,
            definition,
            team_override: None,
            player_name: None,
            converted: false,
        }
    }

    pub fn definition_id(&self) -> &str {
        &self.definition.id
    }

    /// Team after any mid-game conversion.
    pub fn effective_team(&self) -> Team {
        self.team_override.unwrap_or(self.definition.team)
    }

    /// Player name when assigned, character name otherwise.
    pub fn display_label(&self) -> &str {
        self.player_name
            .as_deref()
            .unwrap_or(self.definition.name.as_str())
    }

    pub fn is_role(&self, definition_id: &str) -> bool {
        self.definition.id == definition_id
    }
}
