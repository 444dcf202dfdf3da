//! The client core: session, presentation, and rendering, driven by
//! connection events, countdown ticks, and user commands.
//!
//! Nothing in here touches the network or the terminal. Front ends feed it
//! events and send whatever outbound messages it produces.

use chrono::{DateTime, Utc};
use shoot_gate::{
    PlayerId, Snapshot, Usd,
    errors::SerializationError,
    messages::{ClientMessage, signals_inactivity},
};
use std::{collections::VecDeque, fmt};
use thiserror::Error;
use tracing::{info, warn};

use super::{
    commands::{UserCommand, parse_command},
    connection::ConnectionEvent,
    countdown::{CountdownView, Reading},
    presentation::{BetInput, Control, Controls, Presentation, TimerChange},
    render::{Renderer, TableView},
    router::{self, MessageHandler, Routed},
    session::Session,
};

/// Upper bound on buffered notices before the oldest are dropped.
const MAX_PENDING_NOTICES: usize = 256;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected! Enter your name.",
            Self::Disconnected => "Disconnected. Reconnecting...",
            Self::Failed => "Connection error.",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeKind {
    Ack,
    Alert,
    Error,
    Game,
    You,
}

/// A timestamped message for the history log.
#[derive(Clone, Debug)]
pub struct Notice {
    pub datetime: DateTime<Utc>,
    pub kind: NoticeKind,
    pub content: String,
}

impl Notice {
    fn new(kind: NoticeKind, content: String) -> Self {
        Self {
            datetime: Utc::now(),
            kind,
            content,
        }
    }
}

/// Why a command was refused locally.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum CommandError {
    #[error("not connected to the server")]
    NotConnected,
    #[error("join the table first")]
    NotJoined,
    #[error("already joined")]
    AlreadyJoined,
    #[error("{0} isn't available right now")]
    Disabled(Control),
    #[error("a display name is required")]
    EmptyName,
}

pub struct App {
    session: Session,
    status: ConnectionStatus,
    /// Whether the join prompt is showing.
    login_open: bool,
    /// Set once the server has welcomed us on the current connection.
    welcomed: bool,
    default_name: String,
    default_ante: Usd,
    snapshot: Option<Snapshot>,
    presentation: Presentation,
    renderer: Renderer,
    notices: VecDeque<Notice>,
    /// Time of the event being handled, in UNIX seconds.
    now: f64,
}

impl App {
    pub fn new(default_name: &str, default_ante: Usd) -> Self {
        Self {
            session: Session::default(),
            status: ConnectionStatus::default(),
            login_open: true,
            welcomed: false,
            default_name: default_name.trim().to_string(),
            default_ante,
            snapshot: None,
            presentation: Presentation::default(),
            renderer: Renderer::default(),
            notices: VecDeque::new(),
            now: 0.0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn login_open(&self) -> bool {
        self.login_open
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn controls(&self) -> &Controls {
        self.presentation.controls()
    }

    pub fn bet(&self) -> &BetInput {
        self.presentation.bet()
    }

    pub fn countdown(&self) -> &CountdownView {
        self.presentation.countdown().view()
    }

    /// Identifies the running countdown period, if any. Drives the tick
    /// interval.
    pub fn countdown_epoch(&self) -> Option<u64> {
        self.presentation.countdown().armed_epoch()
    }

    /// The latest rendered table, if any snapshot has arrived.
    pub fn view(&self) -> Option<&TableView> {
        self.renderer.last()
    }

    pub fn drain_notices(&mut self) -> impl Iterator<Item = Notice> + '_ {
        self.notices.drain(..)
    }

    pub fn notify(&mut self, kind: NoticeKind, content: String) {
        if self.notices.len() == MAX_PENDING_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice::new(kind, content));
    }

    /// Handle one event from the connection manager.
    pub fn handle_connection_event(&mut self, event: ConnectionEvent, now: f64) {
        self.now = now;
        match event {
            ConnectionEvent::Connected => {
                self.status = ConnectionStatus::Connected;
                self.welcomed = false;
                if self.session.is_identified() {
                    self.login_open = true;
                    self.notify(
                        NoticeKind::Alert,
                        "Reconnected. Join again to take your seat.".to_string(),
                    );
                } else {
                    self.notify(NoticeKind::Alert, self.status.to_string());
                }
            }
            ConnectionEvent::Message(frame) => {
                let routed = router::dispatch(&frame, self);
                self.report_malformed(routed);
            }
            ConnectionEvent::Binary(frame) => {
                let routed = router::dispatch_bytes(&frame, self);
                self.report_malformed(routed);
            }
            ConnectionEvent::Disconnected { error } => {
                let was_connected = self.status == ConnectionStatus::Connected;
                self.welcomed = false;
                self.status = match error {
                    Some(_) => ConnectionStatus::Failed,
                    None => ConnectionStatus::Disconnected,
                };
                if was_connected || error.is_none() {
                    self.notify(
                        NoticeKind::Error,
                        ConnectionStatus::Disconnected.to_string(),
                    );
                }
            }
        }
    }

    fn report_malformed(&mut self, routed: Result<Routed, SerializationError>) {
        if let Err(error) = routed {
            warn!(%error, "dropping malformed message");
            self.notify(NoticeKind::Error, format!("Malformed message: {error}"));
        }
    }

    /// Advance the countdown to `now`.
    pub fn tick(&mut self, now: f64) -> Option<Reading> {
        self.now = now;
        self.presentation.countdown_mut().tick(now)
    }

    /// Check a user command against the current state and turn it into the
    /// message to send, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the command isn't allowed right now. Nothing
    /// should be sent in that case.
    pub fn execute(&mut self, command: UserCommand) -> Result<Option<ClientMessage>, CommandError> {
        let msg = match command {
            UserCommand::Join { name, ante } => {
                if self.status != ConnectionStatus::Connected {
                    return Err(CommandError::NotConnected);
                }
                if self.welcomed {
                    return Err(CommandError::AlreadyJoined);
                }
                let name = name
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or(&self.default_name);
                if name.is_empty() {
                    return Err(CommandError::EmptyName);
                }
                let ante = ante.filter(|ante| *ante > 0).unwrap_or(self.default_ante);
                ClientMessage::join(name, ante)
            }
            UserCommand::Deal => {
                self.require(Control::Deal)?;
                ClientMessage::deal()
            }
            UserCommand::Shoot(bet) => {
                self.require(Control::Shoot)?;
                let bet = self.place_bet(bet);
                ClientMessage::shoot(bet)
            }
            UserCommand::Pass => {
                self.require(Control::Pass)?;
                ClientMessage::pass()
            }
            UserCommand::Call(choice, bet) => {
                self.require(Control::Special)?;
                let bet = self.place_bet(bet);
                ClientMessage::shoot_special(bet, choice)
            }
            UserCommand::Bet(amount) => {
                self.require(Control::BetInput)?;
                self.presentation.bet_mut().set(amount);
                return Ok(None);
            }
        };
        Ok(Some(msg))
    }

    /// Parse a line of user input and execute it, recording the outcome in
    /// the history. Returns the message to send, if any.
    pub fn submit(&mut self, line: &str) -> Option<ClientMessage> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let result = parse_command(line)
            .map_err(|error| error.to_string())
            .and_then(|command| self.execute(command).map_err(|error| error.to_string()));
        match result {
            Ok(msg) => {
                self.notify(NoticeKind::You, line.to_string());
                msg
            }
            Err(error) => {
                self.notify(NoticeKind::Error, error);
                None
            }
        }
    }

    /// Nudge the bet input, if it's enabled.
    pub fn step_bet(&mut self, delta: i64) -> Result<Usd, CommandError> {
        self.require(Control::BetInput)?;
        Ok(self.presentation.bet_mut().step(delta))
    }

    fn require(&self, control: Control) -> Result<(), CommandError> {
        if !self.session.is_identified() {
            return Err(CommandError::NotJoined);
        }
        if !self.controls().allows(control) {
            return Err(CommandError::Disabled(control));
        }
        Ok(())
    }

    fn place_bet(&mut self, bet: Option<Usd>) -> Usd {
        let input = self.presentation.bet_mut();
        match bet {
            Some(amount) => input.set(amount),
            None => input.value(),
        }
    }
}

impl MessageHandler for App {
    fn on_welcome(&mut self, your_id: PlayerId) {
        info!(%your_id, "joined");
        self.notify(NoticeKind::Ack, format!("Joined as {your_id}"));
        self.session.identify(your_id);
        self.welcomed = true;
        self.login_open = false;
    }

    fn on_state(&mut self, snapshot: Snapshot) {
        let local_id = self.session.local_id().cloned();
        let timer = self
            .presentation
            .sync(&snapshot, local_id.as_ref(), self.now);
        if timer == TimerChange::Started {
            self.notify(NoticeKind::Alert, "Your move!".to_string());
        }

        let message_changed = self
            .snapshot
            .as_ref()
            .is_none_or(|previous| previous.message != snapshot.message);
        if message_changed && !snapshot.message.is_empty() {
            self.notify(NoticeKind::Game, snapshot.message.clone());
        }

        self.renderer.render(&snapshot, local_id.as_ref());
        self.snapshot = Some(snapshot);
    }

    fn on_error(&mut self, msg: String) {
        warn!(%msg, "server error");
        if signals_inactivity(&msg) {
            if let Some(id) = self.session.evict() {
                info!(%id, "evicted for inactivity");
            }
            self.welcomed = false;
            self.login_open = true;
        }
        self.notify(NoticeKind::Error, msg);
    }
}
