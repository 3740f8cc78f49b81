//! # Moderator Core
//!
//! The session engine of the werewolf moderator companion. It owns the running
//! session defined in `werewolf_rules`, applies the moderator's commands,
//! works out what a death sets in motion, and tells the moderator about it.
//!
//! ## Core Components
//!
//! - **engine**: Session commands, phase cycle, and link resolution
//! - **notifications**: Operator alerts with cancellable auto-dismissal
//! - **persistence**: Key-value storage port for session snapshots
//! - **events**: Session events for audio and light ports
//!
//! ## Design Philosophy
//!
//! - **Moderator-Driven**: Nothing advances or dies on its own; every change is a command
//! - **Single Owner**: One engine owns the session; storage and side effects are injected ports
//! - **Forgiving**: Storage failures fall back to a fresh session instead of crashing

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod notifications;
pub mod persistence;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use notifications::*;
pub use persistence::*;
