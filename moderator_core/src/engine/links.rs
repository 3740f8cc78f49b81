//! Link commands: lovers and the wild child's model.

use serde::{Deserialize, Serialize};
use werewolf_rules::{role_ids, InstanceId, ModelLink, Team};

use super::SessionEngine;
use crate::error::ValidationError;
use crate::notifications::{NotificationCategory, NotificationDraft, Severity};
use crate::persistence::SessionStore;

/// Changes to the links between characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "args", rename_all = "camelCase")]
pub enum LinkCommand {
    /// Add a lover. Completes an open pair, or starts a new one once two are
    /// already linked.
    AddLover(InstanceId),
    ClearLovers,
    SetModel {
        wild_child: InstanceId,
        target: InstanceId,
    },
    ClearModel,
    /// The model died: the wild child joins the werewolves.
    ConvertWildChild,
}

impl<S: SessionStore> SessionEngine<S> {
    /// Apply a link command.
    ///
    /// Unknown characters are ignored; pairing or modelling a character on
    /// itself is rejected.
    pub fn set_link(&mut self, command: LinkCommand) -> Result<(), ValidationError> {
        match command {
            LinkCommand::AddLover(target) => self.add_lover(target)?,
            LinkCommand::ClearLovers => {
                log::debug!("lovers unlinked");
                self.state.links.lovers.clear();
            }
            LinkCommand::SetModel { wild_child, target } => self.set_model(wild_child, target)?,
            LinkCommand::ClearModel => {
                log::debug!("model unlinked");
                self.state.links.model = None;
            }
            LinkCommand::ConvertWildChild => self.convert_wild_child(),
        }

        self.persist();
        Ok(())
    }

    fn add_lover(&mut self, target: InstanceId) -> Result<(), ValidationError> {
        if !self.state.contains(&target) {
            log::warn!("add_lover: unknown character {}", target);
            return Ok(());
        }

        let lovers = &mut self.state.links.lovers;
        match lovers.len() {
            0 => lovers.push(target),
            1 if lovers[0] == target => return Err(ValidationError::SelfPairing(target)),
            1 => {
                lovers.push(target);
                let message = format!(
                    "{} and {} are now lovers.",
                    self.label(&self.state.links.lovers[0]),
                    self.label(&self.state.links.lovers[1])
                );
                log::debug!("{}", message);
                self.notifications.enqueue(
                    NotificationDraft::new(message)
                        .with_severity(Severity::Success)
                        .with_category(NotificationCategory::Lovers)
                        .auto_dismiss_after(self.config.notification_timeout()),
                );
            }
            _ => {
                log::debug!("lover pair replaced, starting with {}", target);
                *lovers = vec![target];
            }
        }
        Ok(())
    }

    fn set_model(&mut self, wild_child: InstanceId, target: InstanceId) -> Result<(), ValidationError> {
        let Some(child) = self.state.get_character(&wild_child) else {
            log::warn!("set_model: unknown character {}", wild_child);
            return Ok(());
        };
        if !child.is_role(role_ids::WILD_CHILD) {
            log::warn!("set_model: {} is not the wild child", wild_child);
            return Ok(());
        }
        if !self.state.contains(&target) {
            log::warn!("set_model: unknown character {}", target);
            return Ok(());
        }
        if wild_child == target {
            return Err(ValidationError::SelfModel(target));
        }

        log::debug!("{} now imitates {}", wild_child, target);
        self.state.links.model = Some(ModelLink { wild_child, target });
        Ok(())
    }

    /// Move the wild child to the werewolf team. The model link is kept.
    pub(super) fn convert_wild_child(&mut self) {
        match self.state.find_by_role_mut(role_ids::WILD_CHILD) {
            Some(child) => {
                child.team_override = Some(Team::Werewolf);
                child.converted = true;
                log::info!("{} converted to the werewolves", child.instance_id);
            }
            None => log::debug!("no wild child to convert"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::persistence::MemoryStore;
    use werewolf_rules::RoleCatalog;

    fn engine() -> SessionEngine<MemoryStore> {
        let mut engine = SessionEngine::new(
            EngineConfig::default(),
            RoleCatalog::builtin().unwrap(),
            MemoryStore::new(),
        );
        engine
            .start_session(["werewolf", "villager", "villager", "wild-child", "cupid"])
            .unwrap();
        engine
    }

    fn id(raw: &str) -> InstanceId {
        InstanceId::from(raw)
    }

    #[test]
    fn test_lover_pair_completes_with_notification() {
        let mut engine = engine();
        engine.set_link(LinkCommand::AddLover(id("villager-1"))).unwrap();
        assert!(engine.dispatcher().is_empty());

        engine.set_link(LinkCommand::AddLover(id("werewolf-1"))).unwrap();
        assert_eq!(engine.state().links.lovers, vec![id("villager-1"), id("werewolf-1")]);

        let notifications: Vec<_> = engine.notifications().collect();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].category, NotificationCategory::Lovers);
        assert!(notifications[0].message.contains("Villager"));
        assert!(notifications[0].message.contains("Werewolf"));
        assert!(!notifications[0].requires_acknowledgement());
    }

    #[test]
    fn test_self_pairing_rejected() {
        let mut engine = engine();
        engine.set_link(LinkCommand::AddLover(id("villager-1"))).unwrap();

        assert_eq!(
            engine.set_link(LinkCommand::AddLover(id("villager-1"))),
            Err(ValidationError::SelfPairing(id("villager-1")))
        );
        assert_eq!(engine.state().links.lovers, vec![id("villager-1")]);
    }

    #[test]
    fn test_third_lover_starts_new_pair() {
        let mut engine = engine();
        for lover in ["villager-1", "villager-2", "werewolf-1"] {
            engine.set_link(LinkCommand::AddLover(id(lover))).unwrap();
        }
        assert_eq!(engine.state().links.lovers, vec![id("werewolf-1")]);
    }

    #[test]
    fn test_clear_lovers_and_model() {
        let mut engine = engine();
        engine.set_link(LinkCommand::AddLover(id("villager-1"))).unwrap();
        engine
            .set_link(LinkCommand::SetModel {
                wild_child: id("wild-child-1"),
                target: id("villager-2"),
            })
            .unwrap();

        engine.set_link(LinkCommand::ClearLovers).unwrap();
        engine.set_link(LinkCommand::ClearModel).unwrap();
        assert!(engine.state().links.lovers.is_empty());
        assert!(engine.state().links.model.is_none());
    }

    #[test]
    fn test_model_is_overwritable() {
        let mut engine = engine();
        for target in ["villager-1", "werewolf-1"] {
            engine
                .set_link(LinkCommand::SetModel {
                    wild_child: id("wild-child-1"),
                    target: id(target),
                })
                .unwrap();
        }
        assert!(engine.state().links.is_model(&id("werewolf-1")));
        assert!(!engine.state().links.is_model(&id("villager-1")));
    }

    #[test]
    fn test_model_validation() {
        let mut engine = engine();
        assert_eq!(
            engine.set_link(LinkCommand::SetModel {
                wild_child: id("wild-child-1"),
                target: id("wild-child-1"),
            }),
            Err(ValidationError::SelfModel(id("wild-child-1")))
        );

        engine
            .set_link(LinkCommand::SetModel {
                wild_child: id("villager-1"),
                target: id("villager-2"),
            })
            .unwrap();
        assert!(engine.state().links.model.is_none());
    }

    #[test]
    fn test_convert_wild_child_keeps_model_link() {
        let mut engine = engine();
        engine
            .set_link(LinkCommand::SetModel {
                wild_child: id("wild-child-1"),
                target: id("villager-1"),
            })
            .unwrap();

        engine.set_link(LinkCommand::ConvertWildChild).unwrap();

        let child = engine.instance(&id("wild-child-1")).unwrap();
        assert_eq!(child.effective_team(), Team::Werewolf);
        assert!(child.converted);
        assert!(engine.state().links.model.is_some());
        assert_eq!(engine.team_counts().werewolf, 2);
    }

    #[test]
    fn test_unknown_lover_ignored() {
        let mut engine = engine();
        engine.set_link(LinkCommand::AddLover(id("ghost-1"))).unwrap();
        assert!(engine.state().links.lovers.is_empty());
    }
}
