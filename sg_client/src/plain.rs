//! Line-oriented front end for terminals without full-screen support.
//!
//! Reprints the table whenever it changes and reads commands from stdin.

use anyhow::Result;
use std::fmt::Write;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::info;

use super::{
    app::App,
    connection::{ConnectionEvent, ConnectionHandle, SendOutcome},
    countdown::{Ticker, unix_now},
    presentation::{BetInput, Controls},
    render::TableView,
};

const RULE_WIDTH: usize = 60;
const COMMANDS: &str = "Commands: join [NAME] [ANTE], deal, shoot [N], pass, high [N], low [N], bet N, quit";

/// Format the table for printing.
pub fn format_view(view: &TableView, controls: &Controls, bet: &BetInput) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH));
    let _ = writeln!(out, "SHOOT THE GATE   pot: {}", view.pot_text());
    if let Some(ante) = view.ante {
        let _ = writeln!(out, "Ante: ${ante}");
    }
    if !view.message.is_empty() {
        let _ = writeln!(out, "{}", view.message);
    }
    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));

    if view.players.is_empty() {
        let _ = writeln!(out, "No players at table");
    }
    for (i, player) in view.players.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} {} - ${} {}",
            i + 1,
            player.avatar(),
            player.label(),
            player.balance,
            player.glyph.symbol()
        );
    }

    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
    let [left, right, shot] = &view.cards;
    let _ = writeln!(
        out,
        "Posts: {} {}   Shot: {}",
        left.text(),
        right.text(),
        shot.text()
    );
    if let Some(status) = &view.my_status {
        let _ = writeln!(out, "{status}");
    }

    let mut available = Vec::new();
    if controls.deal_enabled {
        available.push(controls.deal_label.to_string().to_lowercase());
    }
    if controls.shoot_enabled {
        available.push(format!("shoot (bet {} max ${})", bet.label(), bet.max()));
    }
    if controls.special_visible {
        available.push(format!("high/low (bet {} max ${})", bet.label(), bet.max()));
    }
    if controls.pass_enabled {
        available.push("pass".to_string());
    }
    if !available.is_empty() {
        let _ = writeln!(out, "You can: {}", available.join(", "));
    }
    let _ = write!(out, "{}", "═".repeat(RULE_WIDTH));
    out
}

fn print_notices(app: &mut App) {
    for notice in app.drain_notices() {
        println!(
            "[{}] {}",
            notice.datetime.format("%H:%M:%S"),
            notice.content
        );
    }
}

/// Run until stdin closes, the user quits, or the connection task goes away.
pub async fn run(
    mut app: App,
    mut handle: ConnectionHandle,
    mut events: mpsc::UnboundedReceiver<ConnectionEvent>,
) -> Result<()> {
    println!("{COMMANDS}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = Ticker::default();
    let mut printed_update = None;
    let mut printed_seconds = None;

    loop {
        if let Some(view) = app.view()
            && printed_update != Some(view.clone())
        {
            println!("{}", format_view(view, app.controls(), app.bet()));
            printed_update = Some(view.clone());
        }
        print_notices(&mut app);
        ticker.sync(app.countdown_epoch());

        tokio::select! {
            event = events.recv() => match event {
                Some(event) => app.handle_connection_event(event, unix_now()),
                None => break,
            },
            () = ticker.tick() => {
                if let Some(reading) = app.tick(unix_now())
                    && printed_seconds != Some(reading.seconds)
                {
                    println!("⏱ {}s", reading.seconds);
                    printed_seconds = Some(reading.seconds);
                }
            }
            line = lines.next_line() => match line? {
                Some(line) if matches!(line.trim(), "quit" | "exit") => break,
                Some(line) if line.trim() == "help" => println!("{COMMANDS}"),
                Some(line) => {
                    if let Some(msg) = app.submit(&line)
                        && handle.send(msg) == SendOutcome::Dropped
                    {
                        println!("Not connected; action dropped.");
                    }
                }
                None => break,
            },
        }
    }

    info!("exiting");
    handle.shutdown();
    Ok(())
}
