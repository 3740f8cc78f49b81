//! Ordered action list - who the moderator wakes up, and in which order.
//!
//! A pure view over [`SessionState`]. Alive characters change independently
//! of the phase, so the list is recomputed on every query.

use std::collections::HashSet;

use super::{Phase, SessionState};
use crate::entities::{role_ids, ActionPhase, CharacterInstance};

/// Rank given to characters without an explicit action order.
pub const UNORDERED_RANK: u32 = u32::MAX;

/// The action phase characters must have to act during `phase`.
pub fn action_phase_for(phase: Phase) -> Option<ActionPhase> {
    if phase.is_night() {
        Some(ActionPhase::Night)
    } else if phase.is_day() {
        Some(ActionPhase::Day)
    } else {
        None
    }
}

pub fn is_first_night_only(definition_id: &str) -> bool {
    role_ids::FIRST_NIGHT_ONLY.contains(&definition_id)
}

impl SessionState {
    /// Alive characters acting during `phase`, one per role, by rank.
    ///
    /// Repeated roles are shown once, through their first instance in session
    /// order. First-night-only roles are dropped unless `is_first_night`.
    pub fn ordered_actions(&self, phase: Phase, is_first_night: bool) -> Vec<&CharacterInstance> {
        let Some(wanted) = action_phase_for(phase) else {
            return Vec::new();
        };

        let mut seen_roles = HashSet::new();
        let mut actions: Vec<&CharacterInstance> = self
            .alive_characters()
            .filter(|c| c.definition.action_phase == Some(wanted))
            .filter(|c| is_first_night || !is_first_night_only(c.definition_id()))
            .filter(|c| seen_roles.insert(c.definition_id()))
            .collect();

        // Stable: equal ranks keep session order.
        actions.sort_by_key(|c| c.definition.action_order.unwrap_or(UNORDERED_RANK));
        actions
    }
}
