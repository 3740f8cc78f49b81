//! Entity definitions for a moderated session.

mod character;

pub use character::*;

use serde::{Deserialize, Serialize};

/// Reserved definition ids the session logic reacts to.
pub mod role_ids {
    pub const WEREWOLF: &str = "werewolf";
    pub const VILLAGER: &str = "villager";
    pub const HUNTER: &str = "hunter";
    pub const CUPID: &str = "cupid";
    pub const WILD_CHILD: &str = "wild-child";
    pub const THIEF: &str = "thief";

    /// Roles that only wake during the first night.
    pub const FIRST_NIGHT_ONLY: [&str; 3] = [CUPID, WILD_CHILD, THIEF];

    /// Roles a session may contain at most once.
    pub const UNIQUE_PER_SESSION: [&str; 2] = [WILD_CHILD, HUNTER];
}

/// Identifier of one concrete character in a session.
///
/// Formed as `<definition id>-<n>`, where `n` counts copies of the
/// definition in selection order starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl InstanceId {
    /// Build the id for the `ordinal`-th copy of a definition.
    pub fn for_copy(definition_id: &str, ordinal: usize) -> Self {
        Self(format!("{}-{}", definition_id, ordinal))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Village,
    Werewolf,
    /// Plays for itself (white werewolf, pied piper, angel...).
    Solo,
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Team::Village => "village",
            Team::Werewolf => "werewolf",
            Team::Solo => "solo",
        };
        f.write_str(name)
    }
}

/// When a character wakes up to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionPhase {
    Day,
    Night,
}
