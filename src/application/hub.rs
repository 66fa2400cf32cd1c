//! Relay hub - the single owner of the connection registry.
//!
//! Transport tasks and the lifecycle supervisor run concurrently on a
//! multi-threaded runtime. They all go through the hub, which holds the
//! registry behind one mutex, so `add`, `promote`, `remove`, `sweep` and
//! `report` never interleave with fan-out.
//!
//! ```text
//! socket reader ──┐
//! socket reader ──┼──► RelayHub ──► Mutex<ConnectionRegistry>
//! supervisor   ───┘        │
//!                          └──► MessageRouter (fan-out via PeerChannel)
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::foundation::{ConnectionId, Timestamp};
use crate::domain::relay::{ConnectionRole, RoleCounts, ServerMessage};
use crate::ports::PeerChannel;

use super::registry::ConnectionRegistry;
use super::router::{MessageRouter, RouteOutcome};

/// Default greeting sent to every new connection.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Connected to Hanabi Sensor Bridge";

/// Shared relay state, constructed once at startup.
pub struct RelayHub {
    registry: Mutex<ConnectionRegistry>,
    welcome_message: String,
}

impl RelayHub {
    /// Create a hub that greets connections with `welcome_message`.
    pub fn new(welcome_message: impl Into<String>) -> Self {
        Self {
            registry: Mutex::new(ConnectionRegistry::new()),
            welcome_message: welcome_message.into(),
        }
    }

    /// Register a new connection as a browser and greet it.
    ///
    /// Registration and the welcome happen under the same lock, so the
    /// welcome is always the first frame queued for the connection.
    pub async fn connect(&self, channel: Arc<dyn PeerChannel>) -> ConnectionId {
        let id = ConnectionId::new();
        let remote_addr = channel.remote_addr();

        let mut registry = self.registry.lock().await;
        registry.add(id, channel.clone());

        tracing::info!(connection_id = %id, remote_addr = ?remote_addr, "New connection");

        match ServerMessage::welcome(self.welcome_message.as_str(), Timestamp::now()).to_json() {
            Ok(json) => {
                if let Err(e) = channel.send_text(&json) {
                    tracing::debug!(connection_id = %id, "Failed to send welcome: {}", e);
                }
            }
            Err(e) => tracing::error!(connection_id = %id, "Failed to encode welcome: {}", e),
        }

        id
    }

    /// Route a text frame received on `id`.
    pub async fn handle_text(&self, id: &ConnectionId, raw: &str) -> RouteOutcome {
        let mut registry = self.registry.lock().await;
        MessageRouter::route(&mut registry, id, raw)
    }

    /// Route a binary frame received on `id`.
    pub async fn handle_binary(&self, id: &ConnectionId, raw: &[u8]) -> RouteOutcome {
        let mut registry = self.registry.lock().await;
        MessageRouter::route_bytes(&mut registry, id, raw)
    }

    /// Forget a connection after close or transport error.
    pub async fn disconnect(&self, id: &ConnectionId) -> Option<ConnectionRole> {
        let role = self.registry.lock().await.remove(id);
        if let Some(role) = role {
            tracing::info!(connection_id = %id, role = %role, "Client disconnected");
        }
        role
    }

    /// Reclaim connections whose channel is no longer open.
    ///
    /// Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let reclaimed = self.registry.lock().await.sweep();
        for id in &reclaimed {
            tracing::debug!(connection_id = %id, "Reclaimed stale connection");
        }
        reclaimed.len()
    }

    /// Current connection counts per role.
    pub async fn report(&self) -> RoleCounts {
        self.registry.lock().await.report()
    }

    /// Current role of `id`, or `None` if untracked.
    pub async fn role_of(&self, id: &ConnectionId) -> Option<ConnectionRole> {
        self.registry.lock().await.role_of(id)
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new(DEFAULT_WELCOME_MESSAGE)
    }
}
