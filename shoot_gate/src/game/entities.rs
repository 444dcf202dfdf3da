use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Type alias for whole dollars. Pots, balances, antes, and bets are all
/// whole dollars.
pub type Usd = u32;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    Red,
    Black,
}

impl fmt::Display for CardColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Red => "red",
            Self::Black => "black",
        };
        write!(f, "{repr}")
    }
}

/// A card as dealt by the server. Rank and suit are symbolic text
/// (e.g. "Q" and "♥") and are only ever displayed.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Card {
    pub display: String,
    pub suit: String,
    pub color: CardColor,
    /// Numeric rank. Sent by the server, unused by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<u8>,
}

impl Card {
    pub fn new(display: &str, suit: &str, color: CardColor) -> Self {
        Self {
            display: display.to_string(),
            suit: suit.to_string(),
            color,
            val: None,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = format!("{}{}", self.display, self.suit);
        write!(f, "{repr:>3}")
    }
}

/// Opaque participant identifier assigned by the server.
///
/// Servers have been seen sending both strings and integers here, so both
/// are accepted and normalized to text.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Int(i64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Self(s),
            Repr::Int(i) => Self(i.to_string()),
        })
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Per-participant state within a round.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerPhase {
    // Not dealt in yet.
    #[default]
    Idle,
    // Bet is in, waiting on the rest of the table.
    BetPlaced,
    // Dealt a normal gate and must shoot or pass.
    Shooting,
    // Dealt a pair and must call high/low or pass.
    ShootingSpecial,
    // Finished for this round (won, lost, or passed).
    Done,
}

impl PlayerPhase {
    /// Whether the participant owes the server a decision.
    pub fn is_deciding(self) -> bool {
        matches!(self, Self::Shooting | Self::ShootingSpecial)
    }

    pub const ALL: [PlayerPhase; 5] = [
        Self::Idle,
        Self::BetPlaced,
        Self::Shooting,
        Self::ShootingSpecial,
        Self::Done,
    ];
}

impl fmt::Display for PlayerPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Idle => "idle",
            Self::BetPlaced => "bet placed",
            Self::Shooting => "shooting",
            Self::ShootingSpecial => "pair",
            Self::Done => "done",
        };
        write!(f, "{repr}")
    }
}

/// Global state of the current round.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    #[default]
    Waiting,
    Countdown,
    InRound,
}

impl RoundPhase {
    pub const ALL: [RoundPhase; 3] = [Self::Waiting, Self::Countdown, Self::InRound];
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Countdown => "countdown",
            Self::InRound => "in round",
        };
        write!(f, "{repr}")
    }
}

/// A participant as seen by everyone at the table.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub balance: Usd,
    #[serde(default)]
    pub phase: PlayerPhase,
    /// Outcome text. Only meaningful once `phase` is `Done`.
    #[serde(default)]
    pub result_msg: String,
}

/// The local participant's cards: the two gate posts and the shot.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MyCards {
    #[serde(default)]
    pub left: Option<Card>,
    #[serde(default)]
    pub right: Option<Card>,
    #[serde(default)]
    pub result: Option<Card>,
}

/// A complete, authoritative view of the table at one instant, personalized
/// for the receiving participant. Snapshots are never merged; the latest one
/// replaces everything before it.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Snapshot {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub pot: Usd,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub my_cards: MyCards,
    #[serde(default)]
    pub my_phase: PlayerPhase,
    #[serde(default)]
    pub my_result_msg: Option<String>,
    #[serde(default)]
    pub round_phase: RoundPhase,
    /// Absolute UNIX time (seconds) by which a decision is due.
    #[serde(default)]
    pub decision_deadline: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ante: Option<Usd>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_id: Option<u64>,
}

impl Snapshot {
    /// The decision deadline, if one is actually set. The server uses `0`
    /// for "no deadline".
    pub fn deadline(&self) -> Option<f64> {
        self.decision_deadline
            .filter(|deadline| deadline.is_finite() && *deadline > 0.0)
    }

    /// Whether this snapshot puts the local participant on the clock.
    pub fn requires_decision(&self) -> bool {
        self.round_phase == RoundPhase::InRound && self.my_phase.is_deciding()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| &player.id == id)
    }

    /// The local participant's status text, if there's anything to show.
    pub fn my_status(&self) -> Option<&str> {
        self.my_result_msg
            .as_deref()
            .filter(|status| !status.is_empty())
    }
}
