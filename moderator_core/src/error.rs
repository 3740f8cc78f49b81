//! Error types for the session engine.
//!
//! User mistakes come back as [`ValidationError`] for the presentation layer
//! to display. Storage failures are [`StoreError`]s; the engine logs them and
//! keeps the in-memory session authoritative.

use thiserror::Error;
use werewolf_rules::{InstanceId, Phase};

/// A command rejected because of what the moderator asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a session needs at least {required} characters, {selected} selected")]
    TooFewCharacters { required: usize, selected: usize },

    #[error("a session needs at least one {0} team character")]
    MissingTeam(werewolf_rules::Team),

    #[error("unknown character `{0}`")]
    UnknownRole(String),

    #[error("`{0}` can only be selected once per session")]
    DuplicateUniqueRole(String),

    #[error("`{role}` needs at least {required} players, the table has {players}")]
    NotEnoughPlayersForRole {
        role: String,
        required: u32,
        players: u32,
    },

    #[error("{0} cannot be paired with themselves")]
    SelfPairing(InstanceId),

    #[error("{0} cannot be their own model")]
    SelfModel(InstanceId),

    #[error("cannot move from {from} to {to}")]
    IllegalTransition { from: Phase, to: Phase },
}

/// Failure of the persistence port.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("stored session is corrupted: {0}")]
    Corrupted(String),

    #[error("session serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Malformed engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid engine configuration: {0}")]
    Invalid(String),
}
