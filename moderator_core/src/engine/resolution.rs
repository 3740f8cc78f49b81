//! Link resolution - what a death sets in motion.
//!
//! Checks run in a fixed order so notifications queue deterministically:
//! 1. **Lover grief**: the surviving lover must follow
//! 2. **Model death**: the wild child converts to the werewolves
//! 3. **Hunter death**: the hunter must shoot
//!
//! The checks are independent; one death may trigger several. Nothing here
//! kills anyone: follow-up deaths are narrated and applied by the moderator.

use werewolf_rules::{role_ids, InstanceId};

use super::SessionEngine;
use crate::events::SessionEvent;
use crate::notifications::{NotificationCategory, NotificationDraft, Severity};
use crate::persistence::SessionStore;

impl<S: SessionStore> SessionEngine<S> {
    /// Run every consequence check for a character that just died.
    pub(super) fn resolve_death(&mut self, dying: &InstanceId) {
        self.check_lover_grief(dying);
        self.check_model_death(dying);
        self.check_hunter_death(dying);
    }

    fn check_lover_grief(&mut self, dying: &InstanceId) {
        let Some(partner) = self.state.links.lover_partner(dying).cloned() else {
            return;
        };
        if !self.state.is_alive(&partner) {
            return;
        }

        let message = format!(
            "{} was in love with {}: {} dies of grief and must be eliminated too.",
            self.label(dying),
            self.label(&partner),
            self.label(&partner)
        );
        log::info!("{} leaves {} grieving", dying, partner);
        self.notifications.enqueue(
            NotificationDraft::new(message)
                .with_severity(Severity::Critical)
                .with_category(NotificationCategory::LoverGrief),
        );
    }

    fn check_model_death(&mut self, dying: &InstanceId) {
        if !self.state.links.is_model(dying) {
            return;
        }

        let child_label = self
            .state
            .find_by_role(role_ids::WILD_CHILD)
            .map(|c| c.display_label().to_string())
            .unwrap_or_else(|| "The wild child".to_string());
        let message = format!(
            "{} was the wild child's model: {} now plays with the werewolves.",
            self.label(dying),
            child_label
        );
        self.notifications.enqueue(
            NotificationDraft::new(message)
                .with_severity(Severity::Warning)
                .with_category(NotificationCategory::WildChildConversion),
        );
        self.convert_wild_child();
    }

    fn check_hunter_death(&mut self, dying: &InstanceId) {
        let is_hunter = self
            .state
            .get_character(dying)
            .is_some_and(|c| c.is_role(role_ids::HUNTER));
        if !is_hunter {
            return;
        }

        let message = format!(
            "{} was the hunter and must immediately name another victim.",
            self.label(dying)
        );
        log::info!("hunter {} died", dying);
        self.notifications.enqueue(
            NotificationDraft::new(message)
                .with_severity(Severity::Critical)
                .with_category(NotificationCategory::HunterShot),
        );
        self.emit(SessionEvent::HunterDied {
            instance_id: dying.clone(),
        });
    }
}
