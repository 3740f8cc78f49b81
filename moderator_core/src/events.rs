//! Events emitted by the session engine.
//!
//! Audio ambiance and light cues live outside this crate; they subscribe with
//! a [`SessionListener`] and react on their own.

use serde::{Deserialize, Serialize};
use werewolf_rules::{InstanceId, Phase};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    SessionStarted { characters: usize },
    PhaseChanged { from: Phase, to: Phase },
    /// The hunter died and must shoot; ports play the warning cue.
    HunterDied { instance_id: InstanceId },
    SessionEnded,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::SessionStarted { .. } => "sessionStarted",
            SessionEvent::PhaseChanged { .. } => "phaseChanged",
            SessionEvent::HunterDied { .. } => "hunterDied",
            SessionEvent::SessionEnded => "sessionEnded",
        }
    }
}

/// Subscriber to session events.
pub trait SessionListener {
    fn on_event(&mut self, event: &SessionEvent);
}

impl<F> SessionListener for F
where
    F: FnMut(&SessionEvent),
{
    fn on_event(&mut self, event: &SessionEvent) {
        (self)(event)
    }
}
