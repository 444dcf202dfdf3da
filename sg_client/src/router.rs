//! Inbound message classification and dispatch.

use shoot_gate::{PlayerId, Snapshot, errors::SerializationError, messages::ServerMessage, utils};
use tracing::debug;

/// Receiver of classified server messages.
pub trait MessageHandler {
    fn on_welcome(&mut self, your_id: PlayerId);
    fn on_state(&mut self, snapshot: Snapshot);
    fn on_error(&mut self, msg: String);
}

/// How a frame was handled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Routed {
    Welcome,
    State,
    Error,
    Ignored,
}

/// Decode one frame and hand it to `handler`.
///
/// # Errors
///
/// Returns an error if the frame isn't valid JSON or a known message type
/// has the wrong shape. Unknown message types are not errors.
pub fn dispatch<H>(frame: &str, handler: &mut H) -> Result<Routed, SerializationError>
where
    H: MessageHandler + ?Sized,
{
    let msg: ServerMessage = utils::decode(frame)?;
    Ok(route(msg, handler))
}

/// Decode one binary frame and hand it to `handler`.
///
/// # Errors
///
/// As [`dispatch`], and also if the bytes aren't UTF-8.
pub fn dispatch_bytes<H>(frame: &[u8], handler: &mut H) -> Result<Routed, SerializationError>
where
    H: MessageHandler + ?Sized,
{
    let msg: ServerMessage = utils::decode_bytes(frame)?;
    Ok(route(msg, handler))
}

pub fn route<H>(msg: ServerMessage, handler: &mut H) -> Routed
where
    H: MessageHandler + ?Sized,
{
    match msg {
        ServerMessage::Welcome { your_id } => {
            handler.on_welcome(your_id);
            Routed::Welcome
        }
        ServerMessage::State { state } => {
            handler.on_state(*state);
            Routed::State
        }
        ServerMessage::Error { msg } => {
            handler.on_error(msg);
            Routed::Error
        }
        ServerMessage::Unknown => {
            debug!("ignoring message of unknown type");
            Routed::Ignored
        }
    }
}
