//! The single persistent connection to the game server.
//!
//! A background task owns the WebSocket. It reports lifecycle events and raw
//! frames over one channel, in arrival order, and reconnects forever after a
//! flat delay whenever the connection drops or can't be opened.

use futures_util::{SinkExt, StreamExt};
use shoot_gate::{messages::ClientMessage, utils};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{
    net::TcpStream,
    sync::mpsc,
    task::JoinHandle,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::Message,
};
use tracing::{debug, error, info, warn};

/// Pause between reconnection attempts unless configured otherwise.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConnectionEvent {
    /// The connection is open and usable.
    Connected,
    /// A raw text frame from the server.
    Message(String),
    /// A raw binary frame from the server, still undecoded.
    Binary(Vec<u8>),
    /// The connection closed or couldn't be opened. `error` is set when it
    /// wasn't a clean close.
    Disconnected { error: Option<String> },
}

/// Result of asking the connection to send something.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SendOutcome {
    /// Handed to the live connection.
    Sent,
    /// There's no live connection; the message was dropped.
    Dropped,
}

/// Handle to the connection task.
#[derive(Debug)]
pub struct ConnectionHandle {
    outbound: mpsc::UnboundedSender<ClientMessage>,
    connected: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl ConnectionHandle {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Queue a message for the server. While disconnected the message is
    /// dropped; this never fails from the caller's point of view.
    pub fn send(&self, msg: ClientMessage) -> SendOutcome {
        if !self.is_connected() {
            debug!(%msg, "dropping message while disconnected");
            return SendOutcome::Dropped;
        }
        match self.outbound.send(msg) {
            Ok(()) => SendOutcome::Sent,
            Err(mpsc::error::SendError(msg)) => {
                debug!(%msg, "dropping message after shutdown");
                SendOutcome::Dropped
            }
        }
    }

    /// Tear the connection down. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(task) = self.task.take() {
            info!("shutting down connection");
            task.abort();
        }
        self.connected.store(false, Ordering::SeqCst);
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start the connection task for `url`.
///
/// Must be called from within a tokio runtime.
pub fn spawn(
    url: String,
    reconnect_delay: Duration,
) -> (ConnectionHandle, mpsc::UnboundedReceiver<ConnectionEvent>) {
    let (tx_outbound, rx_outbound) = mpsc::unbounded_channel();
    let (tx_events, rx_events) = mpsc::unbounded_channel();
    let connected = Arc::new(AtomicBool::new(false));

    let task = tokio::spawn(run(
        url,
        reconnect_delay,
        connected.clone(),
        rx_outbound,
        tx_events,
    ));

    let handle = ConnectionHandle {
        outbound: tx_outbound,
        connected,
        task: Some(task),
    };
    (handle, rx_events)
}

enum Ended {
    /// The connection is gone; reconnect.
    Dropped(Option<String>),
    /// Nobody is listening any more; stop for good.
    Shutdown,
}

async fn run(
    url: String,
    reconnect_delay: Duration,
    connected: Arc<AtomicBool>,
    mut outbound: mpsc::UnboundedReceiver<ClientMessage>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
) {
    loop {
        info!(%url, "connecting");
        let error = match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                connected.store(true, Ordering::SeqCst);
                info!(%url, "connected");
                if events.send(ConnectionEvent::Connected).is_err() {
                    return;
                }
                let ended = pump(stream, &mut outbound, &events).await;
                connected.store(false, Ordering::SeqCst);
                match ended {
                    Ended::Dropped(error) => error,
                    Ended::Shutdown => return,
                }
            }
            Err(error) => {
                warn!(%url, %error, "failed to connect");
                Some(error.to_string())
            }
        };

        discard_queued(&mut outbound);

        if events.send(ConnectionEvent::Disconnected { error }).is_err() {
            return;
        }
        debug!(delay_ms = reconnect_delay.as_millis() as u64, "waiting to reconnect");
        tokio::time::sleep(reconnect_delay).await;
    }
}

/// Drop anything still queued. It was meant for the dead connection.
fn discard_queued(outbound: &mut mpsc::UnboundedReceiver<ClientMessage>) -> usize {
    let mut discarded = 0;
    while let Ok(msg) = outbound.try_recv() {
        debug!(%msg, "discarding message queued before disconnect");
        discarded += 1;
    }
    discarded
}

async fn pump(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    outbound: &mut mpsc::UnboundedReceiver<ClientMessage>,
    events: &mpsc::UnboundedSender<ConnectionEvent>,
) -> Ended {
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if events.send(ConnectionEvent::Message(text.as_str().to_owned())).is_err() {
                        return Ended::Shutdown;
                    }
                }
                Some(Ok(Message::Binary(bytes))) => {
                    if events.send(ConnectionEvent::Binary(bytes.to_vec())).is_err() {
                        return Ended::Shutdown;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(?frame, "server closed connection");
                    return Ended::Dropped(None);
                }
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    warn!(%error, "connection error");
                    return Ended::Dropped(Some(error.to_string()));
                }
                None => {
                    info!("connection ended");
                    return Ended::Dropped(None);
                }
            },
            msg = outbound.recv() => match msg {
                Some(msg) => match utils::encode(&msg) {
                    Ok(frame) => {
                        debug!(%msg, "sending");
                        if let Err(error) = write.send(Message::Text(frame.into())).await {
                            warn!(%error, "failed to send");
                            return Ended::Dropped(Some(error.to_string()));
                        }
                    }
                    Err(error) => error!(%error, "failed to encode outbound message"),
                },
                None => {
                    let _ = write.close().await;
                    return Ended::Shutdown;
                }
            },
        }
    }
}
