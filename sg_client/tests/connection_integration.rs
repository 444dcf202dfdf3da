//! Integration tests for the connection manager against a local server.
//!
//! Covers connecting, receiving frames, sending actions, and reconnecting
//! after the server drops the connection.

use futures_util::{SinkExt, StreamExt};
use sg_client::{
    app::{App, ConnectionStatus, NoticeKind},
    connection::{self, ConnectionEvent, ConnectionHandle, SendOutcome},
};
use shoot_gate::{messages::ClientMessage, utils};
use std::time::{Duration, Instant};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc::UnboundedReceiver,
    time::timeout,
};
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};

const WAIT: Duration = Duration::from_secs(5);
const RECONNECT_DELAY: Duration = Duration::from_millis(50);
const NOW: f64 = 1_700_000_000.0;

async fn start() -> (TcpListener, ConnectionHandle, UnboundedReceiver<ConnectionEvent>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let (handle, events) = connection::spawn(url, RECONNECT_DELAY);
    (listener, handle, events)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    accept_async(stream).await.unwrap()
}

async fn next_event(events: &mut UnboundedReceiver<ConnectionEvent>) -> ConnectionEvent {
    timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for a connection event")
        .expect("connection task ended")
}

async fn next_client_message(server: &mut WebSocketStream<TcpStream>) -> ClientMessage {
    loop {
        let frame = timeout(WAIT, server.next())
            .await
            .expect("timed out waiting for a client frame")
            .expect("client went away")
            .unwrap();
        if let Message::Text(text) = frame {
            return utils::decode(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn test_connect_receive_and_send() {
    let (listener, mut handle, mut events) = start().await;
    let mut server = accept(&listener).await;

    assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);
    assert!(handle.is_connected());

    let welcome = r#"{"type":"WELCOME","your_id":"p1"}"#;
    server.send(Message::Text(welcome.into())).await.unwrap();
    assert_eq!(
        next_event(&mut events).await,
        ConnectionEvent::Message(welcome.to_string())
    );

    let join = ClientMessage::join("Alice", 10);
    assert_eq!(handle.send(join.clone()), SendOutcome::Sent);
    assert_eq!(next_client_message(&mut server).await, join);

    handle.shutdown();
}

#[tokio::test]
async fn test_binary_frames_are_forwarded() {
    let (listener, mut handle, mut events) = start().await;
    let mut server = accept(&listener).await;
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);

    let frame = r#"{"type":"ERROR","msg":"Not your turn"}"#;
    server
        .send(Message::Binary(frame.as_bytes().to_vec().into()))
        .await
        .unwrap();
    assert_eq!(
        next_event(&mut events).await,
        ConnectionEvent::Binary(frame.as_bytes().to_vec())
    );

    handle.shutdown();
}

#[tokio::test]
async fn test_non_utf8_binary_frame_is_reported() {
    let (listener, mut handle, mut events) = start().await;
    let mut server = accept(&listener).await;
    let mut app = App::new("Alice", 10);
    app.handle_connection_event(next_event(&mut events).await, NOW);
    app.drain_notices().for_each(drop);

    server
        .send(Message::Binary(vec![0xff, 0xfe, 0x00].into()))
        .await
        .unwrap();
    server
        .send(Message::Text(r#"{"type":"PING"}"#.into()))
        .await
        .unwrap();

    let event = next_event(&mut events).await;
    assert_eq!(event, ConnectionEvent::Binary(vec![0xff, 0xfe, 0x00]));
    app.handle_connection_event(event, NOW);
    let notices: Vec<_> = app.drain_notices().collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Error);
    assert!(notices[0].content.starts_with("Malformed message"));

    // The connection survives and the next frame still arrives.
    assert_eq!(
        next_event(&mut events).await,
        ConnectionEvent::Message(r#"{"type":"PING"}"#.to_string())
    );
    assert_eq!(app.status(), ConnectionStatus::Connected);

    handle.shutdown();
}

#[tokio::test]
async fn test_reconnects_after_server_close() {
    let (listener, mut handle, mut events) = start().await;
    let mut server = accept(&listener).await;
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);

    server.close(None).await.unwrap();
    drop(server);
    assert!(matches!(
        next_event(&mut events).await,
        ConnectionEvent::Disconnected { .. }
    ));
    assert!(!handle.is_connected());
    assert_eq!(handle.send(ClientMessage::deal()), SendOutcome::Dropped);

    let mut server = accept(&listener).await;
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);

    // Only messages sent after the reconnect arrive.
    let pass = ClientMessage::pass();
    assert_eq!(handle.send(pass.clone()), SendOutcome::Sent);
    assert_eq!(next_client_message(&mut server).await, pass);

    handle.shutdown();
}

#[tokio::test]
async fn test_app_joins_through_live_connection() {
    let (listener, mut handle, mut events) = start().await;
    let mut server = accept(&listener).await;
    let mut app = App::new("Alice", 10);

    app.handle_connection_event(next_event(&mut events).await, NOW);
    assert_eq!(app.status(), ConnectionStatus::Connected);

    let join = app.submit("join").unwrap();
    assert_eq!(handle.send(join), SendOutcome::Sent);
    assert_eq!(
        next_client_message(&mut server).await,
        ClientMessage::join("Alice", 10)
    );

    server
        .send(Message::Text(r#"{"type":"WELCOME","your_id":7}"#.into()))
        .await
        .unwrap();
    app.handle_connection_event(next_event(&mut events).await, NOW);
    assert_eq!(
        app.session().local_id().map(|id| id.as_str()),
        Some("7")
    );
    assert!(!app.login_open());

    handle.shutdown();
}

#[tokio::test]
async fn test_message_queued_on_dying_connection_is_discarded() {
    let (listener, mut handle, mut events) = start().await;
    let server = accept(&listener).await;
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);

    // Queue while the client still believes it's connected, then kill the
    // socket before the connection task gets a chance to run.
    assert_eq!(handle.send(ClientMessage::deal()), SendOutcome::Sent);
    drop(server);

    assert!(matches!(
        next_event(&mut events).await,
        ConnectionEvent::Disconnected { .. }
    ));

    let mut server = accept(&listener).await;
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);

    let pass = ClientMessage::pass();
    assert_eq!(handle.send(pass.clone()), SendOutcome::Sent);
    assert_eq!(next_client_message(&mut server).await, pass);

    handle.shutdown();
}

#[tokio::test]
async fn test_retry_delay_is_flat() {
    let delay = Duration::from_millis(100);
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);
    let (mut handle, mut events) = connection::spawn(url, delay);

    let mut seen = Vec::new();
    for _ in 0..4 {
        assert!(matches!(
            next_event(&mut events).await,
            ConnectionEvent::Disconnected { error: Some(_) }
        ));
        seen.push(Instant::now());
    }

    let gaps: Vec<Duration> = seen.windows(2).map(|pair| pair[1] - pair[0]).collect();
    for gap in &gaps {
        assert!(*gap >= delay, "retried after {gap:?}");
        // A doubling backoff would reach 4x the delay by the third gap.
        assert!(*gap < delay * 3, "retry gap grew to {gap:?}");
    }

    handle.shutdown();
}
