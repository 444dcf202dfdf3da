//! Constants shared by the client and anything else that speaks the gate
//! protocol.

use super::entities::Usd;

/// Fixed port the game server listens on.
pub const DEFAULT_PORT: u16 = 8765;

/// Ante committed on join when the user doesn't provide a usable one.
pub const DEFAULT_ANTE: Usd = 10;

/// Length of the decision window the server grants after a deal.
pub const DECISION_WINDOW_SECS: f64 = 5.0;

/// Text fragment the server uses when it evicts an idle participant.
pub const INACTIVITY_MARKER: &str = "inactivity";

/// Smallest bet the bet input accepts.
pub const MIN_BET: Usd = 1;
