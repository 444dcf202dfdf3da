//! Control gating driven by snapshots.
//!
//! Which controls are live depends only on the pair (round phase, local
//! player phase). Each snapshot also re-derives the bet range and decides
//! whether the decision countdown should be running.

use shoot_gate::{
    PlayerId, PlayerPhase, RoundPhase, Snapshot, Usd, constants::MIN_BET,
};
use std::fmt;
use tracing::debug;

use super::countdown::Countdown;

/// Text on the deal button.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DealLabel {
    #[default]
    Start,
    Dealing,
    InRound,
}

impl fmt::Display for DealLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Start => "Start",
            Self::Dealing => "Dealing",
            Self::InRound => "In Round",
        };
        write!(f, "{repr}")
    }
}

/// A user-facing control that can be gated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Control {
    Deal,
    Shoot,
    Pass,
    BetInput,
    Special,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Deal => "deal",
            Self::Shoot => "shoot",
            Self::Pass => "pass",
            Self::BetInput => "bet",
            Self::Special => "high/low",
        };
        write!(f, "{repr}")
    }
}

/// Enablement of every gated control.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Controls {
    pub deal_enabled: bool,
    pub deal_label: DealLabel,
    pub shoot_enabled: bool,
    pub pass_enabled: bool,
    pub bet_input_enabled: bool,
    pub special_visible: bool,
}

impl Controls {
    /// Everything disabled, with the given deal label.
    fn locked(deal_label: DealLabel) -> Self {
        Self {
            deal_label,
            ..Self::default()
        }
    }

    pub fn for_phases(round_phase: RoundPhase, my_phase: PlayerPhase) -> Self {
        use PlayerPhase as Mine;
        use RoundPhase as Round;

        match (round_phase, my_phase) {
            (Round::Waiting, _) => Self {
                deal_enabled: true,
                ..Self::locked(DealLabel::Start)
            },
            (Round::Countdown, _) => Self::locked(DealLabel::Dealing),
            (Round::InRound, Mine::Shooting) => Self {
                shoot_enabled: true,
                pass_enabled: true,
                bet_input_enabled: true,
                ..Self::locked(DealLabel::InRound)
            },
            (Round::InRound, Mine::ShootingSpecial) => Self {
                pass_enabled: true,
                bet_input_enabled: true,
                special_visible: true,
                ..Self::locked(DealLabel::InRound)
            },
            (Round::InRound, Mine::BetPlaced | Mine::Done | Mine::Idle) => {
                Self::locked(DealLabel::InRound)
            }
        }
    }

    pub fn allows(&self, control: Control) -> bool {
        match control {
            Control::Deal => self.deal_enabled,
            Control::Shoot => self.shoot_enabled,
            Control::Pass => self.pass_enabled,
            Control::BetInput => self.bet_input_enabled,
            Control::Special => self.special_visible,
        }
    }
}

/// Largest bet the local participant may place: capped by the pot and by
/// their balance, never below the minimum bet.
pub fn bet_upper_bound(pot: Usd, balance: Option<Usd>) -> Usd {
    let pot_cap = if pot > 0 { pot } else { 1 };
    let balance_cap = balance.unwrap_or(1);
    pot_cap.min(balance_cap).max(MIN_BET)
}

/// The bet slider: a value kept within `[MIN_BET, max]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BetInput {
    value: Usd,
    max: Usd,
}

impl Default for BetInput {
    fn default() -> Self {
        Self {
            value: MIN_BET,
            max: MIN_BET,
        }
    }
}

impl BetInput {
    pub fn value(&self) -> Usd {
        self.value
    }

    pub fn max(&self) -> Usd {
        self.max
    }

    /// Move the upper bound, pulling the value down with it if needed.
    pub fn set_max(&mut self, max: Usd) {
        self.max = max.max(MIN_BET);
        if self.value > self.max {
            self.value = self.max;
        }
    }

    pub fn set(&mut self, value: Usd) -> Usd {
        self.value = value.clamp(MIN_BET, self.max);
        self.value
    }

    pub fn step(&mut self, delta: i64) -> Usd {
        let target = (i64::from(self.value) + delta).clamp(0, i64::from(Usd::MAX));
        self.set(target as Usd)
    }

    pub fn label(&self) -> String {
        format!("${}", self.value)
    }
}

/// What one snapshot did to the countdown.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimerChange {
    Started,
    Stopped,
    Unchanged,
}

/// Controls, bet input, and countdown, kept consistent with the latest
/// snapshot.
#[derive(Debug, Default)]
pub struct Presentation {
    controls: Controls,
    bet: BetInput,
    countdown: Countdown,
}

impl Presentation {
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn bet(&self) -> &BetInput {
        &self.bet
    }

    pub fn bet_mut(&mut self) -> &mut BetInput {
        &mut self.bet
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn countdown_mut(&mut self) -> &mut Countdown {
        &mut self.countdown
    }

    /// Apply a snapshot: gate the controls, clamp the bet, and start or stop
    /// the countdown, all in one step.
    pub fn sync(&mut self, snapshot: &Snapshot, local_id: Option<&PlayerId>, now: f64) -> TimerChange {
        let timer = match (snapshot.requires_decision(), snapshot.deadline()) {
            (true, Some(deadline)) => {
                if self.countdown.arm(deadline, now) {
                    TimerChange::Started
                } else {
                    TimerChange::Unchanged
                }
            }
            _ => {
                if self.countdown.stop() {
                    TimerChange::Stopped
                } else {
                    TimerChange::Unchanged
                }
            }
        };

        self.controls = Controls::for_phases(snapshot.round_phase, snapshot.my_phase);
        if self.controls.bet_input_enabled {
            let balance = local_id
                .and_then(|id| snapshot.player(id))
                .map(|player| player.balance);
            self.bet.set_max(bet_upper_bound(snapshot.pot, balance));
        }

        debug!(
            round_phase = %snapshot.round_phase,
            my_phase = %snapshot.my_phase,
            bet = self.bet.value(),
            bet_max = self.bet.max(),
            ?timer,
            "presentation synced"
        );
        timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoot_gate::Player;

    const NOW: f64 = 1_700_000_000.0;

    fn snapshot(round_phase: RoundPhase, my_phase: PlayerPhase) -> Snapshot {
        Snapshot {
            round_phase,
            my_phase,
            pot: 50,
            players: vec![Player {
                id: PlayerId::new("p1"),
                name: "Alice".to_string(),
                balance: 30,
                phase: my_phase,
                result_msg: String::new(),
            }],
            decision_deadline: Some(NOW + 5.0),
            ..Default::default()
        }
    }

    // === Policy table ===

    #[test]
    fn test_waiting_enables_only_deal() {
        for my_phase in PlayerPhase::ALL {
            let controls = Controls::for_phases(RoundPhase::Waiting, my_phase);
            assert_eq!(
                controls,
                Controls {
                    deal_enabled: true,
                    deal_label: DealLabel::Start,
                    ..Controls::default()
                }
            );
        }
    }

    #[test]
    fn test_countdown_disables_everything() {
        for my_phase in PlayerPhase::ALL {
            let controls = Controls::for_phases(RoundPhase::Countdown, my_phase);
            assert_eq!(controls, Controls::locked(DealLabel::Dealing));
        }
    }

    #[test]
    fn test_shooting_row() {
        let controls = Controls::for_phases(RoundPhase::InRound, PlayerPhase::Shooting);
        assert!(!controls.deal_enabled);
        assert_eq!(controls.deal_label.to_string(), "In Round");
        assert!(controls.shoot_enabled);
        assert!(controls.pass_enabled);
        assert!(controls.bet_input_enabled);
        assert!(!controls.special_visible);
    }

    #[test]
    fn test_shooting_special_row() {
        let controls = Controls::for_phases(RoundPhase::InRound, PlayerPhase::ShootingSpecial);
        assert!(!controls.deal_enabled);
        assert!(!controls.shoot_enabled);
        assert!(controls.pass_enabled);
        assert!(controls.bet_input_enabled);
        assert!(controls.special_visible);
    }

    #[test]
    fn test_remaining_in_round_rows_are_locked() {
        for my_phase in [PlayerPhase::BetPlaced, PlayerPhase::Done, PlayerPhase::Idle] {
            let controls = Controls::for_phases(RoundPhase::InRound, my_phase);
            assert_eq!(controls, Controls::locked(DealLabel::InRound), "{my_phase}");
        }
    }

    #[test]
    fn test_allows_matches_fields() {
        let controls = Controls::for_phases(RoundPhase::InRound, PlayerPhase::ShootingSpecial);
        assert!(!controls.allows(Control::Deal));
        assert!(!controls.allows(Control::Shoot));
        assert!(controls.allows(Control::Pass));
        assert!(controls.allows(Control::BetInput));
        assert!(controls.allows(Control::Special));
    }

    // === Bet range ===

    #[test]
    fn test_bet_bound_takes_smaller_of_pot_and_balance() {
        assert_eq!(bet_upper_bound(50, Some(30)), 30);
        assert_eq!(bet_upper_bound(20, Some(300)), 20);
    }

    #[test]
    fn test_bet_bound_empty_pot_allows_one() {
        assert_eq!(bet_upper_bound(0, Some(300)), 1);
    }

    #[test]
    fn test_bet_bound_unknown_balance_allows_one() {
        assert_eq!(bet_upper_bound(500, None), 1);
    }

    #[test]
    fn test_bet_bound_broke_player_still_one() {
        assert_eq!(bet_upper_bound(500, Some(0)), 1);
    }

    #[test]
    fn test_bet_input_clamps_on_new_max() {
        let mut bet = BetInput::default();
        bet.set_max(100);
        assert_eq!(bet.set(80), 80);
        bet.set_max(25);
        assert_eq!(bet.value(), 25);
        assert_eq!(bet.label(), "$25");
    }

    #[test]
    fn test_bet_input_set_clamps_both_ends() {
        let mut bet = BetInput::default();
        bet.set_max(10);
        assert_eq!(bet.set(0), 1);
        assert_eq!(bet.set(11), 10);
    }

    #[test]
    fn test_bet_input_step() {
        let mut bet = BetInput::default();
        bet.set_max(3);
        assert_eq!(bet.step(1), 2);
        assert_eq!(bet.step(5), 3);
        assert_eq!(bet.step(-10), 1);
    }

    // === Sync ===

    #[test]
    fn test_sync_arms_countdown_for_decision() {
        let mut presentation = Presentation::default();
        let change = presentation.sync(
            &snapshot(RoundPhase::InRound, PlayerPhase::Shooting),
            Some(&PlayerId::new("p1")),
            NOW,
        );
        assert_eq!(change, TimerChange::Started);
        assert!(presentation.countdown().is_running());
        assert_eq!(presentation.bet().max(), 30);
    }

    #[test]
    fn test_sync_expired_deadline_does_not_start() {
        let mut presentation = Presentation::default();
        let mut snap = snapshot(RoundPhase::InRound, PlayerPhase::Shooting);
        snap.decision_deadline = Some(NOW - 1.0);
        let change = presentation.sync(&snap, Some(&PlayerId::new("p1")), NOW);
        assert_eq!(change, TimerChange::Unchanged);
        assert!(!presentation.countdown().view().visible);
    }

    #[test]
    fn test_sync_repeated_decision_snapshot_does_not_restart() {
        let mut presentation = Presentation::default();
        let id = PlayerId::new("p1");
        let mut snap = snapshot(RoundPhase::InRound, PlayerPhase::Shooting);
        presentation.sync(&snap, Some(&id), NOW);
        snap.decision_deadline = Some(NOW + 8.0);
        let change = presentation.sync(&snap, Some(&id), NOW + 1.0);
        assert_eq!(change, TimerChange::Unchanged);
        assert_eq!(presentation.countdown().armed_epoch(), Some(1));
    }

    #[test]
    fn test_sync_leaving_decision_stops_countdown() {
        let mut presentation = Presentation::default();
        let id = PlayerId::new("p1");
        presentation.sync(
            &snapshot(RoundPhase::InRound, PlayerPhase::Shooting),
            Some(&id),
            NOW,
        );
        let change = presentation.sync(
            &snapshot(RoundPhase::InRound, PlayerPhase::BetPlaced),
            Some(&id),
            NOW + 1.0,
        );
        assert_eq!(change, TimerChange::Stopped);
        assert!(!presentation.countdown().is_running());
    }

    #[test]
    fn test_sync_missing_deadline_stops_countdown() {
        let mut presentation = Presentation::default();
        let id = PlayerId::new("p1");
        let mut snap = snapshot(RoundPhase::InRound, PlayerPhase::Shooting);
        presentation.sync(&snap, Some(&id), NOW);
        snap.decision_deadline = Some(0.0);
        assert_eq!(presentation.sync(&snap, Some(&id), NOW), TimerChange::Stopped);
    }

    #[test]
    fn test_sync_disabled_bet_input_keeps_range() {
        let mut presentation = Presentation::default();
        let id = PlayerId::new("p1");
        presentation.sync(
            &snapshot(RoundPhase::InRound, PlayerPhase::Shooting),
            Some(&id),
            NOW,
        );
        let mut done = snapshot(RoundPhase::InRound, PlayerPhase::Done);
        done.pot = 2;
        presentation.sync(&done, Some(&id), NOW);
        assert_eq!(presentation.bet().max(), 30);
    }
}
