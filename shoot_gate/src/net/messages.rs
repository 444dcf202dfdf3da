use serde::{Deserialize, Serialize};
use std::fmt;

use super::super::game::{
    constants::INACTIVITY_MARKER,
    entities::{PlayerId, Snapshot, Usd},
};

/// Game actions a participant can ask the server to take.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// Deal a new round. Anyone can do this while the table is waiting.
    Deal,
    /// Bet that the shot lands strictly between the gate posts.
    Shoot,
    /// Sit this round out.
    Pass,
    /// Bet high or low against a pair.
    ShootSpecial,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Deal => "deal",
            Self::Shoot => "shoot",
            Self::Pass => "pass",
            Self::ShootSpecial => "shoot special",
        };
        write!(f, "{repr}")
    }
}

/// Direction called when the gate is a pair.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialChoice {
    High,
    Low,
}

impl fmt::Display for SpecialChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::High => "high",
            Self::Low => "low",
        };
        write!(f, "{repr}")
    }
}

/// Action arguments. Serializes to `{}` when empty.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet: Option<Usd>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<SpecialChoice>,
}

/// A message from a gate client to the game server.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Take a seat under a display name, committing an ante.
    Join { name: String, ante: Usd },
    /// Take a game action.
    Action {
        action: ActionKind,
        payload: ActionPayload,
    },
}

impl ClientMessage {
    pub fn join(name: &str, ante: Usd) -> Self {
        Self::Join {
            name: name.to_string(),
            ante,
        }
    }

    pub fn deal() -> Self {
        Self::Action {
            action: ActionKind::Deal,
            payload: ActionPayload::default(),
        }
    }

    pub fn shoot(bet: Usd) -> Self {
        Self::Action {
            action: ActionKind::Shoot,
            payload: ActionPayload {
                bet: Some(bet),
                choice: None,
            },
        }
    }

    pub fn pass() -> Self {
        Self::Action {
            action: ActionKind::Pass,
            payload: ActionPayload::default(),
        }
    }

    pub fn shoot_special(bet: Usd, choice: SpecialChoice) -> Self {
        Self::Action {
            action: ActionKind::ShootSpecial,
            payload: ActionPayload {
                bet: Some(bet),
                choice: Some(choice),
            },
        }
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Join { name, ante } => write!(f, "joined as {name} with a ${ante} ante"),
            Self::Action { action, payload } => match (payload.bet, payload.choice) {
                (Some(bet), Some(choice)) => write!(f, "called {choice} for ${bet}"),
                (Some(bet), None) => write!(f, "{action} for ${bet}"),
                _ => write!(f, "{action}"),
            },
        }
    }
}

/// A message from the game server to a gate client.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// The server accepted a join and assigned an identity.
    Welcome { your_id: PlayerId },
    /// The full table state as viewed by this client.
    State { state: Box<Snapshot> },
    /// Something went wrong, as explained by the server.
    Error { msg: String },
    /// Any message type this client doesn't know about.
    #[serde(other)]
    Unknown,
}

/// Whether an error text means the session was terminated for inactivity.
pub fn signals_inactivity(msg: &str) -> bool {
    msg.to_lowercase().contains(INACTIVITY_MARKER)
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match &self {
            Self::Welcome { your_id } => format!("welcome {your_id}"),
            Self::State { .. } => "game state".to_string(),
            Self::Error { msg } => msg.to_string(),
            Self::Unknown => "unknown message".to_string(),
        };
        write!(f, "{repr}")
    }
}
