//! Integration tests driving a real relay over WebSocket connections.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{client::IntoClientRequest, http::HeaderValue, protocol::Message},
};

use lounge_server::{
    config::ServerConfig,
    infrastructure::ChatHub,
    ui::{AppState, Server},
    usecase::{
        AuthGate, JoinRoomUseCase, LeaveRoomUseCase, RelayMessageUseCase, ReplayHistoryUseCase,
    },
};
use lounge_shared::time::SystemClock;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serve a relay with the given config (no collaborators) on an ephemeral
/// port and return its address.
async fn start_relay(config: ServerConfig) -> SocketAddr {
    let hub = Arc::new(ChatHub::new());
    let join_room = Arc::new(JoinRoomUseCase::new(
        hub.clone(),
        AuthGate::disabled(),
        config.require_auth,
    ));
    let relay_message = Arc::new(RelayMessageUseCase::new(
        hub.clone(),
        None,
        Arc::new(SystemClock),
        config.require_auth,
    ));
    let replay_history = Arc::new(ReplayHistoryUseCase::new(hub.clone(), None, config.history_limit));
    let leave_room = Arc::new(LeaveRoomUseCase::new(hub.clone()));

    let state = Arc::new(AppState {
        config,
        hub,
        join_room,
        relay_message,
        replay_history,
        leave_room,
    });
    let app = Server::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("listener has no local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });
    addr
}

async fn connect(addr: SocketAddr, origin: Option<&str>) -> WsClient {
    let mut request = format!("ws://{addr}/ws")
        .into_client_request()
        .expect("invalid request");
    if let Some(origin) = origin {
        request.headers_mut().insert(
            "Origin",
            HeaderValue::from_str(origin).expect("invalid origin header"),
        );
    }
    let (ws, _) = connect_async(request).await.expect("failed to connect");
    ws
}

async fn send_json(ws: &mut WsClient, value: serde_json::Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("failed to send frame");
}

/// Next text frame as JSON, skipping protocol frames.
async fn next_json(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended unexpectedly")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("frame is not valid JSON");
        }
    }
}

/// Wait for a close frame and return its code.
async fn next_close_code(ws: &mut WsClient) -> u16 {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for close")
            .expect("stream ended without a close frame")
            .expect("websocket error");
        if let Message::Close(frame) = msg {
            return u16::from(frame.expect("close frame carries no code").code);
        }
    }
}

fn usernames(users_frame: &serde_json::Value) -> Vec<String> {
    users_frame["users"]
        .as_array()
        .expect("users frame has no list")
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn disallowed_origin_is_closed_before_joining() {
    let addr = start_relay(ServerConfig {
        allowed_origins: vec!["http://allowed.example".to_string()],
        ..ServerConfig::default()
    })
    .await;

    let mut rejected = connect(addr, Some("http://evil.example")).await;
    assert_eq!(next_close_code(&mut rejected).await, 1008);

    // A connection from the allowed origin joins and sees a roster that
    // never contained the rejected connection.
    let mut allowed = connect(addr, Some("http://allowed.example")).await;
    send_json(&mut allowed, serde_json::json!({"type": "join", "username": "Alice"})).await;
    let users = next_json(&mut allowed).await;
    assert_eq!(users["type"], "users");
    assert_eq!(usernames(&users), vec!["Alice"]);
}

#[tokio::test]
async fn missing_origin_is_rejected_when_allow_list_is_set() {
    let addr = start_relay(ServerConfig {
        allowed_origins: vec!["http://allowed.example".to_string()],
        ..ServerConfig::default()
    })
    .await;

    let mut ws = connect(addr, None).await;

    assert_eq!(next_close_code(&mut ws).await, 1008);
}

#[tokio::test]
async fn join_broadcasts_roster_to_every_open_connection() {
    let addr = start_relay(ServerConfig::default()).await;

    let mut alice = connect(addr, None).await;
    send_json(&mut alice, serde_json::json!({"type": "join", "username": "Alice"})).await;
    let users = next_json(&mut alice).await;
    assert_eq!(usernames(&users), vec!["Alice"]);

    let mut bob = connect(addr, None).await;
    send_json(&mut bob, serde_json::json!({"type": "join", "username": "Bob"})).await;

    for ws in [&mut alice, &mut bob] {
        let users = next_json(ws).await;
        assert_eq!(users["type"], "users");
        let mut names = usernames(&users);
        names.sort();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }
}

#[tokio::test]
async fn message_is_relayed_to_all_including_sender() {
    let addr = start_relay(ServerConfig::default()).await;

    let mut alice = connect(addr, None).await;
    send_json(&mut alice, serde_json::json!({"type": "join", "username": "Alice"})).await;
    next_json(&mut alice).await;
    let mut bob = connect(addr, None).await;
    send_json(&mut bob, serde_json::json!({"type": "join", "username": "Bob"})).await;
    next_json(&mut alice).await;
    next_json(&mut bob).await;

    send_json(&mut bob, serde_json::json!({"type": "message", "text": "hey all"})).await;

    for ws in [&mut alice, &mut bob] {
        let message = next_json(ws).await;
        assert_eq!(message["type"], "message");
        assert_eq!(message["username"], "Bob");
        assert_eq!(message["text"], "hey all");
        assert!(message["timestamp"].is_string());
    }
}

#[tokio::test]
async fn disconnect_shrinks_the_roster() {
    let addr = start_relay(ServerConfig::default()).await;

    let mut alice = connect(addr, None).await;
    send_json(&mut alice, serde_json::json!({"type": "join", "username": "Alice"})).await;
    next_json(&mut alice).await;
    let mut bob = connect(addr, None).await;
    send_json(&mut bob, serde_json::json!({"type": "join", "username": "Bob"})).await;
    next_json(&mut alice).await;
    next_json(&mut bob).await;

    bob.close(None).await.expect("failed to close");

    let users = next_json(&mut alice).await;
    assert_eq!(users["type"], "users");
    assert_eq!(usernames(&users), vec!["Alice"]);
}

#[tokio::test]
async fn join_without_token_is_closed_when_auth_is_required() {
    let addr = start_relay(ServerConfig {
        require_auth: true,
        ..ServerConfig::default()
    })
    .await;

    let mut ws = connect(addr, None).await;
    send_json(&mut ws, serde_json::json!({"type": "join", "username": "Alice"})).await;

    assert_eq!(next_close_code(&mut ws).await, 4001);
}

#[tokio::test]
async fn pre_join_message_is_relayed_as_anonymous() {
    let addr = start_relay(ServerConfig::default()).await;

    let mut joined = connect(addr, None).await;
    send_json(&mut joined, serde_json::json!({"type": "join", "username": "Alice"})).await;
    next_json(&mut joined).await;

    // A second connection sends a message without ever joining.
    let mut guest = connect(addr, None).await;
    send_json(&mut guest, serde_json::json!({"type": "message", "text": "hi"})).await;

    let message = next_json(&mut joined).await;
    assert_eq!(message["type"], "message");
    assert_eq!(message["username"], "Anonymous");
    assert_eq!(message["text"], "hi");
}

#[tokio::test]
async fn malformed_and_unknown_frames_are_ignored() {
    let addr = start_relay(ServerConfig::default()).await;

    let mut ws = connect(addr, None).await;
    ws.send(Message::Text("not json".to_string().into()))
        .await
        .expect("failed to send");
    send_json(&mut ws, serde_json::json!({"type": "typing"})).await;

    // The connection is still usable: a join goes through normally.
    send_json(&mut ws, serde_json::json!({"type": "join", "username": "Alice"})).await;
    let users = next_json(&mut ws).await;
    assert_eq!(users["type"], "users");
    assert_eq!(usernames(&users), vec!["Alice"]);
}
