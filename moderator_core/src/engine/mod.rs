//! Session Engine - owns the running session and applies moderator commands.
//!
//! Every command runs to completion before the next one:
//! 1. **Validate**: reject user mistakes with a [`ValidationError`]
//! 2. **Mutate**: update the [`SessionState`]
//! 3. **Resolve**: derive consequences of deaths (see `resolution`)
//! 4. **Notify**: queue operator alerts and emit [`SessionEvent`]s
//! 5. **Persist**: snapshot the new state; a failed save is only logged

mod links;
mod resolution;

pub use links::*;

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

use werewolf_rules::{
    role_ids, CharacterInstance, InstanceId, Phase, RoleCatalog, SessionState, Team, TeamCounts,
};

use crate::config::EngineConfig;
use crate::error::ValidationError;
use crate::events::{SessionEvent, SessionListener};
use crate::notifications::{Notification, NotificationDispatcher, NotificationId};
use crate::persistence::{encode_snapshot, load_snapshot, SessionStore};

/// The authoritative owner of a moderated session.
pub struct SessionEngine<S: SessionStore> {
    config: EngineConfig,
    catalog: RoleCatalog,
    store: S,
    state: SessionState,
    notifications: NotificationDispatcher,
    listeners: Vec<Box<dyn SessionListener>>,
}

impl<S: SessionStore> SessionEngine<S> {
    /// Create an engine with a fresh `setup` state, ignoring anything stored.
    pub fn new(config: EngineConfig, catalog: RoleCatalog, store: S) -> Self {
        Self {
            config,
            catalog,
            store,
            state: SessionState::default(),
            notifications: NotificationDispatcher::with_system_clock(),
            listeners: Vec::new(),
        }
    }

    /// Create an engine from the stored snapshot.
    ///
    /// A missing, unreadable, or corrupted snapshot yields a fresh session.
    pub fn restore(config: EngineConfig, catalog: RoleCatalog, store: S) -> Self {
        let mut engine = Self::new(config, catalog, store);
        match load_snapshot(&engine.store, &engine.config.storage_key) {
            Ok(Some(state)) => {
                log::info!(
                    "restored session: {} characters, phase {}, day {}",
                    state.characters.len(),
                    state.phase,
                    state.day_count
                );
                engine.state = state;
            }
            Ok(None) => log::debug!("no stored session, starting fresh"),
            Err(err) => log::warn!("discarding stored session: {}", err),
        }
        engine
    }

    /// Replace the notification dispatcher (e.g. to inject a clock).
    pub fn with_dispatcher(mut self, dispatcher: NotificationDispatcher) -> Self {
        self.notifications = dispatcher;
        self
    }

    /// Register a listener for session events.
    pub fn subscribe(&mut self, listener: impl SessionListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Deal a new session from a selection of definition ids.
    ///
    /// No player count is declared, so role player minimums are not checked
    /// and `players` defaults to the number of characters.
    pub fn start_session<I, T>(&mut self, selected: I) -> Result<&SessionState, ValidationError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let selected: Vec<String> = selected.into_iter().map(Into::into).collect();
        self.validate_selection(&selected, None)?;
        self.begin(selected, None)
    }

    /// Deal a new session for a declared number of players.
    ///
    /// Every selected role's `min_players` is checked against `players`.
    pub fn start_session_for_players<I, T>(
        &mut self,
        players: u32,
        selected: I,
    ) -> Result<&SessionState, ValidationError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let selected: Vec<String> = selected.into_iter().map(Into::into).collect();
        self.validate_selection(&selected, Some(players))?;
        self.begin(selected, Some(players))
    }

    /// Like [`start_session`](Self::start_session), dealing the selection in
    /// shuffled order.
    pub fn start_session_shuffled<I, T, R>(
        &mut self,
        selected: I,
        rng: &mut R,
    ) -> Result<&SessionState, ValidationError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
        R: Rng + ?Sized,
    {
        let mut selected: Vec<String> = selected.into_iter().map(Into::into).collect();
        self.validate_selection(&selected, None)?;
        selected.shuffle(rng);
        self.begin(selected, None)
    }

    /// Declare how many players sit at the table.
    ///
    /// Rejected if a dealt role needs more players than that.
    pub fn set_players(&mut self, players: u32) -> Result<(), ValidationError> {
        if let Some(role) = self
            .state
            .characters
            .iter()
            .find(|c| c.definition.min_players > players)
        {
            return Err(ValidationError::NotEnoughPlayersForRole {
                role: role.definition_id().to_string(),
                required: role.definition.min_players,
                players,
            });
        }

        log::debug!("players declared: {} -> {}", self.state.players, players);
        self.state.players = players;
        self.persist();
        Ok(())
    }

    /// Move to `next`.
    ///
    /// Any phase is accepted unless strict transitions are configured.
    pub fn advance_phase(&mut self, next: Phase) -> Result<(), ValidationError> {
        let current = self.state.phase;
        if self.config.strict_transitions && !current.is_regular_transition(next) {
            return Err(ValidationError::IllegalTransition {
                from: current,
                to: next,
            });
        }

        let from = self.state.enter_phase(next);
        log::debug!(
            "phase {} -> {} (day {}, {} characters to wake)",
            from,
            next,
            self.state.day_count,
            self.current_actions().len()
        );

        self.emit(SessionEvent::PhaseChanged { from, to: next });
        self.persist();
        Ok(())
    }

    /// Flip a character between alive and dead.
    ///
    /// A death runs the consequence checks; a revival never does.
    pub fn toggle_alive(&mut self, instance_id: &InstanceId) {
        if !self.state.contains(instance_id) {
            log::warn!("toggle_alive: unknown character {}", instance_id);
            return;
        }

        if self.state.alive_ids.remove(instance_id) {
            log::debug!("{} died", instance_id);
            self.resolve_death(instance_id);
        } else {
            log::debug!("{} revived", instance_id);
            self.state.alive_ids.insert(instance_id.clone());
        }

        self.persist();
    }

    /// Assign a player name. A blank name clears it.
    pub fn rename_player(&mut self, instance_id: &InstanceId, name: &str) {
        let Some(character) = self.state.get_character_mut(instance_id) else {
            log::warn!("rename_player: unknown character {}", instance_id);
            return;
        };

        let name = name.trim();
        character.player_name = if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        };
        self.persist();
    }

    pub fn set_show_player_names(&mut self, show: bool) {
        self.state.show_player_names = show;
        self.persist();
    }

    /// Discard the session, in memory and in storage.
    pub fn end_session(&mut self) {
        self.state = SessionState::default();
        self.notifications.clear();
        if let Err(err) = self.store.remove(&self.config.storage_key) {
            log::error!("failed to remove stored session: {}", err);
        }
        log::info!("session ended");
        self.emit(SessionEvent::SessionEnded);
    }

    pub fn dismiss_notification(&mut self, id: NotificationId) -> bool {
        self.notifications.dismiss(id)
    }

    /// Fire due auto-dismissals. Call periodically from the UI loop.
    pub fn expire_notifications(&mut self) -> Vec<NotificationId> {
        self.notifications.expire_due()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn day_count(&self) -> u32 {
        self.state.day_count
    }

    pub fn instance(&self, instance_id: &InstanceId) -> Option<&CharacterInstance> {
        self.state.get_character(instance_id)
    }

    pub fn is_alive(&self, instance_id: &InstanceId) -> bool {
        self.state.is_alive(instance_id)
    }

    /// Characters to wake during `phase`, in order.
    pub fn ordered_actions(&self, phase: Phase, is_first_night: bool) -> Vec<&CharacterInstance> {
        self.state.ordered_actions(phase, is_first_night)
    }

    /// Characters to wake during the current phase.
    pub fn current_actions(&self) -> Vec<&CharacterInstance> {
        let phase = self.state.phase;
        self.state
            .ordered_actions(phase, phase == Phase::FirstNight)
    }

    /// Alive characters per team.
    pub fn team_counts(&self) -> TeamCounts {
        self.state.team_counts()
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.pending()
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.notifications
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn validate_selection(
        &self,
        selected: &[String],
        players: Option<u32>,
    ) -> Result<(), ValidationError> {
        if selected.len() < self.config.min_characters {
            return Err(ValidationError::TooFewCharacters {
                required: self.config.min_characters,
                selected: selected.len(),
            });
        }

        let mut definitions = Vec::with_capacity(selected.len());
        for id in selected {
            let definition = self
                .catalog
                .get(id)
                .ok_or_else(|| ValidationError::UnknownRole(id.clone()))?;
            definitions.push(definition);
        }

        for role in role_ids::UNIQUE_PER_SESSION {
            if selected.iter().filter(|id| id.as_str() == role).count() > 1 {
                return Err(ValidationError::DuplicateUniqueRole(role.to_string()));
            }
        }

        for team in [Team::Werewolf, Team::Village] {
            if !definitions.iter().any(|d| d.team == team) {
                return Err(ValidationError::MissingTeam(team));
            }
        }

        if let Some(players) = players {
            if let Some(definition) = definitions.iter().find(|d| d.min_players > players) {
                return Err(ValidationError::NotEnoughPlayersForRole {
                    role: definition.id.clone(),
                    required: definition.min_players,
                    players,
                });
            }
        }

        Ok(())
    }

    /// Deal validated definition ids into instances and replace the session.
    fn begin(
        &mut self,
        selected: Vec<String>,
        players: Option<u32>,
    ) -> Result<&SessionState, ValidationError> {
        let mut copies: HashMap<&str, usize> = HashMap::new();
        let mut characters = Vec::with_capacity(selected.len());
        for id in &selected {
            let definition = self
                .catalog
                .get(id)
                .ok_or_else(|| ValidationError::UnknownRole(id.clone()))?;
            let ordinal = copies.entry(id.as_str()).or_default();
            *ordinal += 1;
            characters.push(CharacterInstance::new(
                InstanceId::for_copy(id, *ordinal),
                definition.clone(),
            ));
        }

        let mut state = SessionState::new(characters, selected);
        if let Some(players) = players {
            state.players = players;
        }
        self.state = state;
        self.notifications.clear();

        log::info!(
            "session started with {} characters ({} werewolves)",
            self.state.characters.len(),
            self.state.team_counts().werewolf
        );
        self.emit(SessionEvent::SessionStarted {
            characters: self.state.characters.len(),
        });
        self.persist();
        Ok(&self.state)
    }

    fn emit(&mut self, event: SessionEvent) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }

    /// Snapshot the session. Failures are logged; memory stays authoritative.
    fn persist(&mut self) {
        let raw = match encode_snapshot(&self.state) {
            Ok(raw) => raw,
            Err(err) => {
                log::error!("failed to encode session: {}", err);
                return;
            }
        };
        if let Err(err) = self.store.save(&self.config.storage_key, &raw) {
            log::error!("failed to save session: {}", err);
        }
    }

    /// Display label for a character, or its raw id if unknown.
    fn label(&self, instance_id: &InstanceId) -> String {
        self.state
            .get_character(instance_id)
            .map(|c| c.display_label().to_string())
            .unwrap_or_else(|| instance_id.to_string())
    }
}

impl<S: SessionStore> std::fmt::Debug for SessionEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("notifications", &self.notifications)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
