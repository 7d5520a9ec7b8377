//! WebSocket connection handler: the per-connection session loop.
//!
//! Lifecycle: the origin gate runs right after the upgrade, before the
//! connection is attached to the hub, so a rejected origin never appears
//! in any roster. An accepted connection is attached, gets its one-shot
//! history replay, and then awaits frames in `AwaitingJoin`. Close
//! directives travel through the same hub channel as frames, so the pusher
//! task is the only writer to the socket.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, header},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::domain::{ConnectionId, Session};
use crate::infrastructure::{Outbound, dto::websocket::ClientFrame};
use crate::ui::state::AppState;
use crate::usecase::CLOSE_ORIGIN_NOT_ALLOWED;

/// How long a closing connection may take to drain its queued frames
/// (roster updates, close directives) before the pusher task is aborted.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    ws.on_upgrade(move |socket| handle_socket(socket, state, origin))
}

/// Spawns a task that drains the connection's hub channel into the socket.
///
/// Stops when the channel closes (all senders dropped), the peer stops
/// accepting writes, or a close directive is delivered.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Frame(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Outbound::Close { code, reason } => {
                    let _ = sender
                        .send(Message::Close(Some(CloseFrame {
                            code,
                            reason: reason.into(),
                        })))
                        .await;
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, origin: Option<String>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Origin gate: rejected connections close before any registration.
    if !state.config.origin_allowed(origin.as_deref()) {
        tracing::warn!("connection rejected, origin not allowed: {origin:?}");
        let _ = ws_sender
            .send(Message::Close(Some(CloseFrame {
                code: CLOSE_ORIGIN_NOT_ALLOWED,
                reason: "Origin not allowed".into(),
            })))
            .await;
        return;
    }

    let connection = ConnectionId::new();
    let (tx, rx) = mpsc::unbounded_channel();
    state.hub.attach(connection, tx).await;
    tracing::info!("connection {connection} accepted");

    // One-shot history replay, sent to this connection only, before any
    // join is required.
    state.replay_history.execute(connection).await;

    let mut send_task = pusher_loop(rx, ws_sender);

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut session = Session::new(connection);
        while let Some(msg) = ws_receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on {connection}: {e}");
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    // A parse failure never closes the connection.
                    let frame = match serde_json::from_str::<ClientFrame>(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::warn!("ignoring malformed frame from {connection}: {e}");
                            continue;
                        }
                    };

                    match frame {
                        ClientFrame::Join { username, id_token } => {
                            let provided = username.unwrap_or_default();
                            match recv_state
                                .join_room
                                .execute(&mut session, &provided, id_token.as_deref())
                                .await
                            {
                                Ok(()) => {
                                    tracing::info!(
                                        "connection {connection} joined as '{}'",
                                        session.sender_name()
                                    );
                                }
                                Err(rejection) => {
                                    recv_state
                                        .hub
                                        .send_to(
                                            &connection,
                                            Outbound::Close {
                                                code: rejection.close_code(),
                                                reason: rejection.close_reason(),
                                            },
                                        )
                                        .await;
                                    break;
                                }
                            }
                        }
                        ClientFrame::Message { text } => {
                            recv_state.relay_message.execute(&session, &text).await;
                        }
                        ClientFrame::Unknown => {
                            tracing::warn!(
                                "ignoring frame with unknown type from {connection}"
                            );
                        }
                    }
                }
                Message::Close(_) => {
                    tracing::info!("connection {connection} closed by peer");
                    break;
                }
                Message::Ping(_) => {
                    // Pong is handled by the protocol layer.
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut recv_task => {
            // Detach first: this drops the hub's sender, so the pusher can
            // drain queued frames (roster update, close directive) and end
            // on its own.
            state.leave_room.execute(connection).await;
            if tokio::time::timeout(DRAIN_TIMEOUT, &mut send_task).await.is_err() {
                send_task.abort();
            }
        }
        _ = &mut send_task => {
            recv_task.abort();
            state.leave_room.execute(connection).await;
        }
    }
}
