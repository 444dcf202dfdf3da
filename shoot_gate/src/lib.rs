//! # Shoot the Gate
//!
//! Shared model and wire protocol for the Shoot the Gate card game.
//!
//! The server is the only authority on game rules. This crate describes what
//! the server sends (table snapshots, identity, errors) and what a client
//! may ask of it (join, deal, shoot, pass).
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, players, phases, and the snapshot model
//! - [`net`]: Message types and frame encoding
//!
//! ## Example
//!
//! ```
//! use shoot_gate::{messages::ServerMessage, utils};
//!
//! let msg: ServerMessage = utils::decode(r#"{"type": "WELCOME", "your_id": "p1"}"#).unwrap();
//! assert_eq!(msg, ServerMessage::Welcome { your_id: "p1".into() });
//! ```

/// Networking components for client-server communication.
pub mod net;
pub use net::{errors, messages, utils};

/// Game-state model.
pub mod game;
pub use game::{
    constants::{self, DEFAULT_ANTE, DEFAULT_PORT},
    entities::{self, Card, CardColor, Player, PlayerId, PlayerPhase, RoundPhase, Snapshot, Usd},
};
