//! Projection of a snapshot into what the player sees.
//!
//! Rendering is a pure function of the snapshot and the local identity. The
//! [`Renderer`] only caches its last output to skip redundant work.

use shoot_gate::{Card, CardColor, PlayerId, PlayerPhase, Snapshot, Usd};

/// Placeholder drawn for a card that hasn't been dealt.
pub const CARD_BACK: &str = "🂠";

/// Per-player status icon.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusGlyph {
    Won,
    Skipped,
    Lost,
    BetPlaced,
    Deciding,
    Waiting,
}

impl StatusGlyph {
    /// Pick the icon for a player. Finished players are classified by the
    /// leading text of their result message.
    pub fn classify(phase: PlayerPhase, result_msg: &str) -> Self {
        match phase {
            PlayerPhase::Done if result_msg.starts_with("WIN") => Self::Won,
            PlayerPhase::Done
                if result_msg.starts_with("Passed") || result_msg.starts_with("Consecutive") =>
            {
                Self::Skipped
            }
            PlayerPhase::Done => Self::Lost,
            PlayerPhase::BetPlaced => Self::BetPlaced,
            PlayerPhase::Shooting | PlayerPhase::ShootingSpecial => Self::Deciding,
            PlayerPhase::Idle => Self::Waiting,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Won => "✅",
            Self::Skipped => "⏭️",
            Self::Lost => "❌",
            Self::BetPlaced => "💰",
            Self::Deciding => "🎯",
            Self::Waiting => "⏳",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CardFace {
    FaceDown,
    FaceUp {
        rank: String,
        suit: String,
        color: CardColor,
    },
}

impl CardFace {
    pub fn of(card: Option<&Card>) -> Self {
        match card {
            Some(card) => Self::FaceUp {
                rank: card.display.clone(),
                suit: card.suit.clone(),
                color: card.color,
            },
            None => Self::FaceDown,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::FaceUp { rank, suit, .. } => format!("{rank}{suit}"),
            Self::FaceDown => CARD_BACK.to_string(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlayerRow {
    pub id: PlayerId,
    pub name: String,
    pub is_me: bool,
    pub balance: Usd,
    pub glyph: StatusGlyph,
}

impl PlayerRow {
    pub fn label(&self) -> String {
        if self.is_me {
            format!("{} (You)", self.name)
        } else {
            self.name.clone()
        }
    }

    pub fn avatar(&self) -> &'static str {
        if self.is_me { "🙋" } else { "👤" }
    }
}

/// Everything drawn for one snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableView {
    pub players: Vec<PlayerRow>,
    pub pot: Usd,
    pub message: String,
    /// Left post, right post, shot.
    pub cards: [CardFace; 3],
    pub my_status: Option<String>,
    pub ante: Option<Usd>,
    pub update_id: Option<u64>,
}

impl TableView {
    pub fn project(snapshot: &Snapshot, local_id: Option<&PlayerId>) -> Self {
        let players = snapshot
            .players
            .iter()
            .map(|player| PlayerRow {
                id: player.id.clone(),
                name: player.name.clone(),
                is_me: local_id == Some(&player.id),
                balance: player.balance,
                glyph: StatusGlyph::classify(player.phase, &player.result_msg),
            })
            .collect();

        let cards = &snapshot.my_cards;
        Self {
            players,
            pot: snapshot.pot,
            message: snapshot.message.clone(),
            cards: [
                CardFace::of(cards.left.as_ref()),
                CardFace::of(cards.right.as_ref()),
                CardFace::of(cards.result.as_ref()),
            ],
            my_status: snapshot.my_status().map(str::to_string),
            ante: snapshot.ante,
            update_id: snapshot.update_id,
        }
    }

    pub fn pot_text(&self) -> String {
        format!("${}", self.pot)
    }
}

#[derive(Debug)]
struct Drawn {
    snapshot: Snapshot,
    local_id: Option<PlayerId>,
    view: TableView,
}

impl Drawn {
    fn matches(&self, snapshot: &Snapshot, local_id: Option<&PlayerId>) -> bool {
        self.local_id.as_ref() == local_id && &self.snapshot == snapshot
    }
}

#[derive(Debug, Default)]
pub struct Renderer {
    last: Option<Drawn>,
}

impl Renderer {
    pub fn render(&mut self, snapshot: &Snapshot, local_id: Option<&PlayerId>) -> &TableView {
        if self
            .last
            .as_ref()
            .is_some_and(|drawn| !drawn.matches(snapshot, local_id))
        {
            self.last = None;
        }
        &self
            .last
            .get_or_insert_with(|| Drawn {
                snapshot: snapshot.clone(),
                local_id: local_id.cloned(),
                view: TableView::project(snapshot, local_id),
            })
            .view
    }

    /// The most recently drawn view.
    pub fn last(&self) -> Option<&TableView> {
        self.last.as_ref().map(|drawn| &drawn.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoot_gate::{Player, RoundPhase, entities::MyCards};

    fn player(id: &str, phase: PlayerPhase, result_msg: &str) -> Player {
        Player {
            id: PlayerId::new(id),
            name: format!("name-{id}"),
            balance: 120,
            phase,
            result_msg: result_msg.to_string(),
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            players: vec![
                player("p1", PlayerPhase::Shooting, ""),
                player("p2", PlayerPhase::Done, "WIN! +$20"),
            ],
            pot: 70,
            message: "Cards dealt! You have 5 seconds!".to_string(),
            my_cards: MyCards {
                left: Some(Card::new("3", "♠", CardColor::Black)),
                right: Some(Card::new("Q", "♥", CardColor::Red)),
                result: None,
            },
            my_phase: PlayerPhase::Shooting,
            my_result_msg: Some(String::new()),
            round_phase: RoundPhase::InRound,
            ..Default::default()
        }
    }

    // === Glyphs ===

    #[test]
    fn test_done_glyphs_follow_result_prefix() {
        let cases = [
            ("WIN! +$40", StatusGlyph::Won),
            ("WIN! +$12 (pot split)", StatusGlyph::Won),
            ("Passed.", StatusGlyph::Skipped),
            ("Consecutive! Auto Pass.", StatusGlyph::Skipped),
            ("HIT POST! -$20", StatusGlyph::Lost),
            ("MISS! -$10", StatusGlyph::Lost),
            ("⏰ Time up! Auto Pass.", StatusGlyph::Lost),
            ("", StatusGlyph::Lost),
        ];
        for (msg, expected) in cases {
            assert_eq!(StatusGlyph::classify(PlayerPhase::Done, msg), expected, "{msg}");
        }
    }

    #[test]
    fn test_non_done_glyphs_ignore_result_text() {
        assert_eq!(
            StatusGlyph::classify(PlayerPhase::BetPlaced, "WIN"),
            StatusGlyph::BetPlaced
        );
        assert_eq!(
            StatusGlyph::classify(PlayerPhase::ShootingSpecial, ""),
            StatusGlyph::Deciding
        );
        assert_eq!(StatusGlyph::classify(PlayerPhase::Idle, ""), StatusGlyph::Waiting);
        assert_eq!(StatusGlyph::Waiting.symbol(), "⏳");
    }

    // === Projection ===

    #[test]
    fn test_project_marks_local_player() {
        let view = TableView::project(&snapshot(), Some(&PlayerId::new("p2")));
        assert!(!view.players[0].is_me);
        assert!(view.players[1].is_me);
        assert_eq!(view.players[1].label(), "name-p2 (You)");
        assert_eq!(view.players[1].glyph, StatusGlyph::Won);
        assert_eq!(view.players[0].label(), "name-p1");
    }

    #[test]
    fn test_project_without_identity_marks_nobody() {
        let view = TableView::project(&snapshot(), None);
        assert!(view.players.iter().all(|row| !row.is_me));
    }

    #[test]
    fn test_project_cards() {
        let view = TableView::project(&snapshot(), None);
        assert_eq!(view.cards[0].text(), "3♠");
        assert_eq!(
            view.cards[1],
            CardFace::FaceUp {
                rank: "Q".to_string(),
                suit: "♥".to_string(),
                color: CardColor::Red,
            }
        );
        assert_eq!(view.cards[2], CardFace::FaceDown);
        assert_eq!(view.cards[2].text(), CARD_BACK);
    }

    #[test]
    fn test_project_hides_empty_status() {
        let mut snap = snapshot();
        assert_eq!(TableView::project(&snap, None).my_status, None);
        snap.my_result_msg = Some("Bet placed. Waiting...".to_string());
        assert_eq!(
            TableView::project(&snap, None).my_status.as_deref(),
            Some("Bet placed. Waiting...")
        );
    }

    #[test]
    fn test_pot_text() {
        assert_eq!(TableView::project(&snapshot(), None).pot_text(), "$70");
    }

    // === Renderer ===

    #[test]
    fn test_render_twice_is_identical() {
        let mut renderer = Renderer::default();
        let snap = snapshot();
        let id = PlayerId::new("p1");
        let first = renderer.render(&snap, Some(&id)).clone();
        let second = renderer.render(&snap, Some(&id)).clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_picks_up_new_snapshot() {
        let mut renderer = Renderer::default();
        let mut snap = snapshot();
        renderer.render(&snap, None);
        snap.pot = 5;
        assert_eq!(renderer.render(&snap, None).pot, 5);
        assert_eq!(renderer.last().map(|view| view.pot), Some(5));
    }

    #[test]
    fn test_render_picks_up_identity_change() {
        let mut renderer = Renderer::default();
        let snap = snapshot();
        renderer.render(&snap, None);
        let view = renderer.render(&snap, Some(&PlayerId::new("p1")));
        assert!(view.players[0].is_me);
    }
}
