//! Game-state model as the server describes it.
//!
//! The client never evaluates the rules of the game. Everything in here is
//! data the server sends, plus a few read-only helpers for interpreting it.

pub mod constants;
pub mod entities;
