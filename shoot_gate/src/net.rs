//! Wire protocol between gate clients and the game server.
//!
//! Every frame carries exactly one JSON object with a `type` discriminator.

/// Error types for encoding and decoding frames.
pub mod errors;

/// Message types for both directions of the protocol.
pub mod messages;

/// Helpers for turning messages into frames and back.
pub mod utils;
