//! Terminal UI front end.
//!
//! Draws the table, the posts and shot, the countdown, and a scrolling
//! history, and turns typed commands into actions. All game logic lives in
//! [`App`]; this module only wires it to the terminal and the connection.

use anyhow::Result;
use ratatui::{
    DefaultTerminal, Frame,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    layout::{Alignment, Constraint, Flex, Layout, Margin, Position, Rect},
    style::{Style, Stylize},
    symbols::scrollbar,
    text::{Line, Span, Text},
    widgets::{
        Block, Cell, Clear, Gauge, List, ListDirection, ListItem, Padding, Paragraph, Row,
        Scrollbar, ScrollbarOrientation, Table,
    },
};
use shoot_gate::CardColor;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{
    app::{App, ConnectionStatus, Notice, NoticeKind},
    connection::{ConnectionEvent, ConnectionHandle, SendOutcome},
    countdown::{Ticker, unix_now},
    render::{CardFace, TableView},
};

mod widgets;

use widgets::{ScrollableList, UserInput};

const HELP: &str = "\
join [NAME] [ANTE]
        Take a seat. Without a name, the configured name is used.
deal
        Start a round. Only possible while the table is waiting.
shoot [AMOUNT]
        Bet that the shot lands between your posts. Without an amount, the
        current bet is used.
pass
        Skip this round.
high [AMOUNT] | low [AMOUNT]
        With paired posts, call whether the shot lands above or below.
bet AMOUNT
        Set the bet. Up and Down also nudge it while it's your move.
";
const MAX_LOG_RECORDS: usize = 1024;
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

impl From<Notice> for ListItem<'_> {
    fn from(val: Notice) -> Self {
        let repr = match val.kind {
            NoticeKind::Ack => "ACK".light_blue(),
            NoticeKind::Alert => "ALERT".light_magenta(),
            NoticeKind::Error => "ERROR".light_red(),
            NoticeKind::Game => "GAME".light_yellow(),
            NoticeKind::You => "YOU".light_green(),
        };

        let msg = vec![
            format!("[{} ", val.datetime.format("%H:%M:%S")).into(),
            Span::styled(format!("{repr:5}"), repr.style),
            format!("]: {}", val.content).into(),
        ];

        ListItem::new(Line::from(msg))
    }
}

fn make_card_span(face: &CardFace) -> Span<'static> {
    let repr = format!(" {} ", face.text());
    match face {
        CardFace::FaceUp {
            color: CardColor::Red,
            ..
        } => Span::styled(repr, Style::default().light_red().bold()),
        CardFace::FaceUp { .. } => Span::styled(repr, Style::default().white().bold()),
        CardFace::FaceDown => Span::styled(repr, Style::default().dark_gray()),
    }
}

fn make_player_row(view: &TableView, idx: usize) -> Row<'static> {
    let player = &view.players[idx];
    let row = Row::new(vec![
        Cell::new(Text::from(player.avatar()).alignment(Alignment::Center)),
        Cell::new(Text::from(player.label()).alignment(Alignment::Left)),
        Cell::new(Text::from(format!("${}", player.balance)).alignment(Alignment::Right)),
        Cell::new(Text::from(player.glyph.symbol()).alignment(Alignment::Center)),
    ]);
    if player.is_me { row.bold().white() } else { row }
}

/// Whether the event loop should keep going.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Flow {
    Continue,
    Exit,
}

/// Read terminal events on a blocking thread until `stop` is set.
fn spawn_event_reader(stop: Arc<AtomicBool>) -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        while !stop.load(Ordering::Relaxed) {
            match event::poll(POLL_TIMEOUT) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => {}
                Err(error) => {
                    warn!(%error, "failed to poll terminal");
                    break;
                }
            }
        }
    });
    rx
}

/// TUI App state
pub struct TuiApp {
    app: App,
    /// Whether to display the help menu window
    show_help_menu: bool,
    /// Helps scroll through the help menu window if the terminal is small
    help_handle: ScrollableList,
    /// History of recorded messages
    log_handle: ScrollableList,
    /// Current value of the input box
    user_input: UserInput,
}

impl TuiApp {
    pub fn new(app: App) -> Self {
        let mut help_handle = ScrollableList::new(MAX_LOG_RECORDS);
        help_handle.push("".into());
        for line in HELP.lines() {
            help_handle.push(line.to_string().into());
        }
        help_handle.push("".into());
        help_handle.jump_to_first();

        Self {
            app,
            show_help_menu: false,
            help_handle,
            log_handle: ScrollableList::new(MAX_LOG_RECORDS),
            user_input: UserInput::new(),
        }
    }

    /// Move pending notices into the history window.
    fn flush_notices(&mut self) {
        for notice in self.app.drain_notices() {
            self.log_handle.push(notice.into());
        }
    }

    /// Handle a submitted line. An empty line while the join prompt is
    /// open joins with the defaults, and `help` opens the help menu.
    fn handle_submit(&mut self, handle: &ConnectionHandle) {
        let mut line = self.user_input.submit();
        if line.trim() == "help" {
            self.show_help_menu = true;
            return;
        }
        if line.trim().is_empty() && self.app.login_open() {
            line = "join".to_string();
        }
        if let Some(msg) = self.app.submit(&line)
            && handle.send(msg) == SendOutcome::Dropped
        {
            self.app
                .notify(NoticeKind::Error, "Not connected; action dropped.".to_string());
        }
    }

    fn handle_key(&mut self, key: KeyEvent, handle: &ConnectionHandle) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        match key.modifiers {
            KeyModifiers::CONTROL => match key.code {
                KeyCode::Char('c') => return Flow::Exit,
                KeyCode::Home => self.log_handle.jump_to_first(),
                KeyCode::End => self.log_handle.jump_to_last(),
                _ => {}
            },
            KeyModifiers::NONE | KeyModifiers::SHIFT => match key.code {
                KeyCode::Enter => self.handle_submit(handle),
                KeyCode::Char(to_insert) => self.user_input.input(to_insert),
                KeyCode::Backspace => self.user_input.backspace(),
                KeyCode::Delete => self.user_input.delete(),
                KeyCode::Left => self.user_input.move_left(),
                KeyCode::Right => self.user_input.move_right(),
                KeyCode::Up => {
                    if self.show_help_menu {
                        self.help_handle.move_up();
                    } else if self.app.step_bet(1).is_err() {
                        self.log_handle.move_up();
                    }
                }
                KeyCode::Down => {
                    if self.show_help_menu {
                        self.help_handle.move_down();
                    } else if self.app.step_bet(-1).is_err() {
                        self.log_handle.move_down();
                    }
                }
                KeyCode::Home => self.user_input.jump_to_first(),
                KeyCode::End => self.user_input.jump_to_last(),
                KeyCode::Tab => self.show_help_menu = !self.show_help_menu,
                KeyCode::Esc => return Flow::Exit,
                _ => {}
            },
            _ => {}
        }
        Flow::Continue
    }

    /// Render the players table with pot and message
    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered().padding(Padding::horizontal(1));
        let Some(view) = self.app.view() else {
            let waiting = Paragraph::new("Waiting for the table...")
                .alignment(Alignment::Center)
                .block(block.title(" table  "));
            frame.render_widget(waiting, area);
            return;
        };

        let mut footer = format!(" pot: {}  ", view.pot_text());
        if let Some(ante) = view.ante {
            footer.push_str(&format!("ante: ${ante}  "));
        }
        if let Some(update_id) = view.update_id {
            footer.push_str(&format!("#{update_id}  "));
        }

        let table = Table::new(
            (0..view.players.len()).map(|idx| make_player_row(view, idx)),
            [
                Constraint::Max(3),
                Constraint::Fill(3),
                Constraint::Fill(1),
                Constraint::Max(4),
            ],
        )
        .block(
            block
                .title_top(format!(" {}  ", view.message))
                .title_bottom(footer),
        );
        frame.render_widget(table, area);
    }

    /// Render the posts, the shot, the countdown, and the controls
    fn draw_hand(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .padding(Padding::horizontal(1))
            .title(" your hand  ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [cards_area, status_area, gauge_area, controls_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .spacing(1)
        .areas(inner);

        if let Some(view) = self.app.view() {
            let [left, right, shot] = &view.cards;
            let cards = Line::from(vec![
                make_card_span(left),
                " ".into(),
                make_card_span(right),
                "   shot:".into(),
                make_card_span(shot),
            ]);
            frame.render_widget(Paragraph::new(cards), cards_area);

            let status = view.my_status.clone().unwrap_or_default();
            frame.render_widget(Paragraph::new(status.bold()), status_area);
        }

        let countdown = self.app.countdown();
        if countdown.visible {
            let gauge = Gauge::default()
                .gauge_style(Style::default().light_yellow())
                .ratio(countdown.fraction.clamp(0.0, 1.0))
                .label(format!("{}s", countdown.text));
            frame.render_widget(gauge, gauge_area);
        }

        let controls = self.app.controls();
        let toggle = |label: String, enabled: bool| -> Span<'static> {
            if enabled {
                label.bold().light_green()
            } else {
                label.dark_gray()
            }
        };
        let mut spans = vec![
            toggle(format!("[{}]", controls.deal_label), controls.deal_enabled),
            " ".into(),
            toggle("[shoot]".to_string(), controls.shoot_enabled),
            " ".into(),
            toggle("[pass]".to_string(), controls.pass_enabled),
            " ".into(),
            toggle(
                format!("bet {} / ${}", self.app.bet().label(), self.app.bet().max()),
                controls.bet_input_enabled,
            ),
        ];
        if controls.special_visible {
            spans.extend([
                " ".into(),
                "[high]".bold().light_magenta(),
                " ".into(),
                "[low]".bold().light_magenta(),
            ]);
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).wrap(ratatui::widgets::Wrap { trim: true }),
            controls_area,
        );
    }

    /// Render the log/history window with scrollbar
    fn draw_log(&mut self, frame: &mut Frame, area: Rect) {
        let log_records = List::new(self.log_handle.list_items.clone())
            .direction(ListDirection::BottomToTop)
            .block(Block::bordered().title(" history  "));
        frame.render_stateful_widget(log_records, area, &mut self.log_handle.list_state);

        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .begin_symbol(None)
                .end_symbol(None),
            area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.log_handle.scroll_state,
        );
    }

    /// Render the user input area
    fn draw_user_input(&self, frame: &mut Frame, area: Rect) {
        let title = if self.app.login_open() {
            format!(
                " join as {} (Enter) or type join NAME [ANTE]  ",
                self.app.default_name()
            )
            .light_yellow()
        } else {
            match self.app.session().local_id() {
                Some(id) => format!(" {id}  ").light_green(),
                None => " command  ".light_green(),
            }
        };
        let user_input = Paragraph::new(self.user_input.value.as_str())
            .style(Style::default())
            .block(Block::bordered().title(title));
        frame.render_widget(user_input, area);
        frame.set_cursor_position(Position::new(
            area.x + self.user_input.char_idx as u16 + 1,
            area.y + 1,
        ));
    }

    /// Render the status bar at the bottom
    fn draw_help_bar(&self, frame: &mut Frame, area: Rect) {
        let status = self.app.status();
        let status_indicator = match status {
            ConnectionStatus::Connected => format!("● {status}").green(),
            ConnectionStatus::Connecting => format!("● {status}").yellow(),
            ConnectionStatus::Disconnected | ConnectionStatus::Failed => {
                format!("● {status}").red()
            }
        };

        let help_message = vec![
            status_indicator,
            " | press ".into(),
            "Tab".bold().white(),
            " to view help, press ".into(),
            "Enter".bold().white(),
            " to send a command, or press ".into(),
            "Esc".bold().white(),
            " to exit".into(),
        ];
        frame.render_widget(Paragraph::new(Line::from(help_message)), area);
    }

    /// Render the help menu overlay
    fn draw_help_menu(&mut self, frame: &mut Frame) {
        let vertical = Layout::vertical([Constraint::Max(22)]).flex(Flex::Center);
        let horizontal = Layout::horizontal([Constraint::Max(84)]).flex(Flex::Center);
        let [help_menu_area] = vertical.areas(frame.area());
        let [help_menu_area] = horizontal.areas(help_menu_area);
        frame.render_widget(Clear, help_menu_area);

        let help_items = List::new(self.help_handle.list_items.clone())
            .direction(ListDirection::BottomToTop)
            .block(Block::bordered().title(" commands  "));
        frame.render_stateful_widget(
            help_items,
            help_menu_area,
            &mut self.help_handle.list_state,
        );

        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .begin_symbol(None)
                .end_symbol(None),
            help_menu_area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.help_handle.scroll_state,
        );
    }

    fn draw(&mut self, frame: &mut Frame) {
        let window = Layout::vertical([
            Constraint::Min(6),    // Table and log
            Constraint::Length(3), // User input
            Constraint::Length(1), // Status bar
        ]);
        let [top_area, user_input_area, help_area] = window.areas(frame.area());

        let [view_area, log_area] =
            Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(top_area);

        let [table_area, hand_area] =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .areas(view_area);

        self.draw_table(frame, table_area);
        self.draw_hand(frame, hand_area);
        self.draw_log(frame, log_area);
        self.draw_user_input(frame, user_input_area);
        self.draw_help_bar(frame, help_area);

        if self.show_help_menu {
            self.draw_help_menu(frame);
        }
    }

    /// Run until the user exits or the connection task goes away.
    pub async fn run(
        mut self,
        mut handle: ConnectionHandle,
        mut events: mpsc::UnboundedReceiver<ConnectionEvent>,
        mut terminal: DefaultTerminal,
    ) -> Result<()> {
        let stop = Arc::new(AtomicBool::new(false));
        let mut terminal_events = spawn_event_reader(stop.clone());
        let mut ticker = Ticker::default();

        let result = loop {
            self.flush_notices();
            ticker.sync(self.app.countdown_epoch());
            if let Err(error) = terminal.draw(|frame| self.draw(frame)) {
                break Err(error.into());
            }

            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.app.handle_connection_event(event, unix_now()),
                    None => break Ok(()),
                },
                () = ticker.tick() => {
                    self.app.tick(unix_now());
                }
                event = terminal_events.recv() => match event {
                    Some(Event::Key(key)) => {
                        if self.handle_key(key, &handle) == Flow::Exit {
                            break Ok(());
                        }
                    }
                    Some(_) => {}
                    None => break Ok(()),
                },
            }
        };

        info!("exiting");
        stop.store(true, Ordering::Relaxed);
        handle.shutdown();
        result
    }
}
