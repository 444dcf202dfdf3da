//! Client for the Shoot the Gate card table.
//!
//! The pieces are layered so the game logic never touches I/O:
//! [`connection`] owns the socket and reconnects, [`router`] classifies
//! inbound frames, and [`app::App`] ties the session, [`presentation`]
//! state, [`countdown`], and [`render`] output together. The [`tui_app`]
//! and [`plain`] front ends drive it.

pub mod app;
pub mod commands;
pub mod config;
pub mod connection;
pub mod countdown;
pub mod logging;
pub mod plain;
pub mod presentation;
pub mod render;
pub mod router;
pub mod session;
pub mod tui_app;
