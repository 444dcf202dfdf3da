//! Decision countdown.
//!
//! The countdown runs against an absolute deadline from the server, so it
//! keeps moving whether or not any further messages arrive. The model here
//! is clock-agnostic (every call takes `now` in UNIX seconds); [`Ticker`]
//! owns the one interval that drives it in the event loop.

use chrono::Utc;
use shoot_gate::constants::DECISION_WINDOW_SECS;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

/// Redraw cadence while a countdown is armed.
pub const TICK: Duration = Duration::from_millis(50);

/// Current wall-clock time in UNIX seconds.
pub fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// What the countdown widget should show.
#[derive(Clone, Debug, PartialEq)]
pub struct CountdownView {
    pub visible: bool,
    /// Bar fill in `[0, 1]`.
    pub fraction: f64,
    /// Whole seconds left, or blank when hidden.
    pub text: String,
}

impl CountdownView {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            fraction: 1.0,
            text: String::new(),
        }
    }
}

impl Default for CountdownView {
    fn default() -> Self {
        Self::hidden()
    }
}

/// One evaluation of the countdown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    pub remaining: f64,
    pub fraction: f64,
    pub seconds: u64,
}

#[derive(Clone, Debug)]
pub struct Countdown {
    deadline: Option<f64>,
    total_window: f64,
    /// Lowest remaining time shown since arming. Keeps the display from
    /// creeping back up if the wall clock steps backwards.
    floor: f64,
    /// Bumped every time the countdown is armed.
    epoch: u64,
    view: CountdownView,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    pub fn new() -> Self {
        Self::with_window(DECISION_WINDOW_SECS)
    }

    pub fn with_window(total_window: f64) -> Self {
        Self {
            deadline: None,
            total_window,
            floor: f64::INFINITY,
            epoch: 0,
            view: CountdownView::hidden(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Identifies the current armed period, if any.
    pub fn armed_epoch(&self) -> Option<u64> {
        self.is_running().then_some(self.epoch)
    }

    pub fn view(&self) -> &CountdownView {
        &self.view
    }

    /// Start counting down to `deadline` unless already running. Returns
    /// whether a new countdown is now running; a deadline already in the
    /// past stops it on the spot.
    pub fn arm(&mut self, deadline: f64, now: f64) -> bool {
        if self.is_running() {
            return false;
        }
        self.deadline = Some(deadline);
        self.floor = f64::INFINITY;
        self.epoch += 1;
        self.tick(now);
        self.is_running()
    }

    /// Recompute the display for `now`. Stops the countdown once it hits
    /// zero. Returns `None` when not running.
    pub fn tick(&mut self, now: f64) -> Option<Reading> {
        let deadline = self.deadline?;
        let remaining = (deadline - now).max(0.0).min(self.floor);
        self.floor = remaining;

        let reading = Reading {
            remaining,
            fraction: (remaining / self.total_window).clamp(0.0, 1.0),
            seconds: remaining.ceil() as u64,
        };
        self.view = CountdownView {
            visible: true,
            fraction: reading.fraction,
            text: reading.seconds.to_string(),
        };

        if remaining <= 0.0 {
            self.stop();
        }
        Some(reading)
    }

    /// Stop and reset the display. Returns whether it was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.deadline.take().is_some();
        self.view = CountdownView::hidden();
        was_running
    }
}

/// The single tick interval behind an armed countdown.
#[derive(Debug, Default)]
pub struct Ticker {
    interval: Option<(u64, Interval)>,
}

impl Ticker {
    /// Follow the countdown's armed period: a new epoch gets a fresh
    /// interval, no epoch drops it.
    pub fn sync(&mut self, armed_epoch: Option<u64>) {
        match (armed_epoch, &self.interval) {
            (Some(epoch), Some((current, _))) if *current == epoch => {}
            (Some(epoch), _) => {
                let mut interval = tokio::time::interval(TICK);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                self.interval = Some((epoch, interval));
            }
            (None, _) => self.interval = None,
        }
    }

    /// Wait for the next tick. Pends forever while disarmed.
    pub async fn tick(&mut self) {
        match &mut self.interval {
            Some((_, interval)) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
