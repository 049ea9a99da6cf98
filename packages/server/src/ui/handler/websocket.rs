//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ConnectionId, Frame},
    ui::state::AppState,
    usecase::{AcceptError, SendMessageError},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    // Bounded outbound queue for this connection
    let (tx, rx) = mpsc::channel(state.outbound_buffer);

    let connection_id = match state.accept_connection_usecase.execute(tx).await {
        Ok((connection_id, _connected_at)) => connection_id,
        Err(AcceptError::CapacityExceeded(limit)) => {
            tracing::warn!("Connection limit ({}) reached. Rejecting connection.", limit);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Err(e) => {
            tracing::error!("Failed to accept connection: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    tracing::info!("Connection '{}' accepted", connection_id);

    let failed_state = state.clone();
    let failed_id = connection_id.clone();
    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!("WebSocket upgrade for '{}' failed: {}", failed_id, e);
            tokio::spawn(async move {
                failed_state
                    .disconnect_connection_usecase
                    .execute(&failed_id)
                    .await;
            });
        })
        .on_upgrade(move |socket| handle_socket(socket, state, connection_id, rx)))
}

/// Spawns a task that drains the connection's outbound queue into its WebSocket sink.
///
/// The task ends when the queue is closed (the connection was unregistered) and
/// every queued frame has been written, or when writing to the socket fails.
fn pusher_loop(
    mut rx: mpsc::Receiver<Arc<Frame>>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let message = match frame.as_ref() {
                Frame::Text(text) => Message::Text(text.clone()),
                Frame::Binary(bytes) => Message::Binary(bytes.clone()),
            };
            if sender.send(message).await.is_err() {
                return;
            }
        }
        let _ = sender.close().await;
    })
}

/// Spawns a task that feeds every inbound frame of this connection to the relay.
///
/// Malformed envelopes are dropped here; the loop keeps reading.
fn receiver_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    connection_id: ConnectionId,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            let frame = match msg {
                Message::Text(text) => Frame::Text(text),
                Message::Binary(bytes) => Frame::Binary(bytes),
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                Message::Ping(_) | Message::Pong(_) => continue,
            };

            match state
                .send_message_usecase
                .execute(&connection_id, frame)
                .await
            {
                Ok(report) => {
                    tracing::debug!(
                        "Relayed message from '{}': {} delivered, {} failed",
                        connection_id,
                        report.delivered,
                        report.failed
                    );
                }
                Err(SendMessageError::MalformedEnvelope(e)) => {
                    tracing::warn!("Dropping message from '{}': {}", connection_id, e);
                }
                Err(e) => {
                    tracing::debug!("Dropping message from '{}': {}", connection_id, e);
                }
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    rx: mpsc::Receiver<Arc<Frame>>,
) {
    let (sender, receiver) = socket.split();

    let mut send_task = pusher_loop(rx, sender);
    let mut recv_task = receiver_loop(receiver, state.clone(), connection_id.clone());

    // The read side ending means the transport is closing; a failed write means it is gone
    let send_finished = tokio::select! {
        _ = &mut recv_task => false,
        _ = &mut send_task => {
            recv_task.abort();
            true
        }
    };

    if let Some(disconnected) = state
        .disconnect_connection_usecase
        .execute(&connection_id)
        .await
    {
        tracing::info!(
            "Connection '{}' closed and removed from {} room(s) ({} frames dropped)",
            connection_id,
            disconnected.rooms.len(),
            disconnected.dropped_frames
        );
    }

    // Closing: let frames already queued to this connection go out
    if !send_finished {
        let abort_handle = send_task.abort_handle();
        if tokio::time::timeout(state.drain_timeout, send_task)
            .await
            .is_err()
        {
            tracing::debug!(
                "Connection '{}' did not drain within {:?}",
                connection_id,
                state.drain_timeout
            );
            abort_handle.abort();
        }
    }
}
