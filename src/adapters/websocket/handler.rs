//! WebSocket upgrade handler for sensor and browser connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Register the connection with the hub (as a browser) and send `welcome`
//! 2. Drain queued frames into the socket from a writer task
//! 3. Route every inbound frame through the hub
//! 4. Remove the connection on close or transport error
//!
//! Requests that are not upgrades get the plain-text liveness response.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};

use crate::application::RelayHub;

use super::channel::WsPeerChannel;

/// Body of the liveness response.
pub const LIVENESS_BODY: &str = "WebSocket Server Running\n";

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct RelayState {
    pub hub: Arc<RelayHub>,
}

impl RelayState {
    pub fn new(hub: Arc<RelayHub>) -> Self {
        Self { hub }
    }
}

/// Handle requests on the relay path.
///
/// Upgrades become relay connections; anything else is a liveness probe.
///
/// # Security
///
/// There is no authentication. Any peer that sends `sensor_data` is
/// treated as a sensor from then on.
pub async fn ws_handler(
    ws: Option<WebSocketUpgrade>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    State(state): State<RelayState>,
) -> Response {
    let Some(ws) = ws else {
        return liveness().await.into_response();
    };
    let remote_addr = connect_info.map(|ConnectInfo(addr)| addr);
    ws.on_upgrade(move |socket| handle_socket(socket, remote_addr, state))
}

/// Static liveness response.
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, LIVENESS_BODY)
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection.
async fn handle_socket(socket: WebSocket, remote_addr: Option<SocketAddr>, state: RelayState) {
    let (mut sender, mut receiver) = socket.split();

    let (channel, mut outbound) = WsPeerChannel::new(remote_addr);
    let connection_id = state.hub.connect(Arc::new(channel)).await;

    // Writer: drain queued frames (welcome first) into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            if let Err(e) = sender.send(msg).await {
                tracing::debug!(
                    connection_id = %connection_id,
                    "Send error, closing connection: {}",
                    e
                );
                break;
            }
        }
    });

    // Reader: route inbound frames until close or error
    let hub = state.hub.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    hub.handle_text(&connection_id, &text).await;
                }
                Ok(Message::Binary(bytes)) => {
                    hub.handle_binary(&connection_id, &bytes).await;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // WebSocket protocol control frames - handled by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, "WebSocket error: {}", e);
                    break;
                }
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    state.hub.disconnect(&connection_id).await;
}
