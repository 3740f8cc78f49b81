//! # Werewolf Rules
//!
//! The data side of the moderator companion: character definitions, the
//! built-in character catalog, and the session aggregate with its derived
//! views. This crate holds no side effects; the session engine that mutates
//! state and reacts to deaths lives in `moderator_core`.

pub mod catalog;
pub mod entities;
pub mod session_state;

pub use catalog::*;
pub use entities::*;
pub use session_state::*;
