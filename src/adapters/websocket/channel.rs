//! `PeerChannel` backed by a bounded mpsc queue.
//!
//! Each socket gets a writer task that drains the queue into the WebSocket
//! sink. When the writer stops, the receiver drops and the channel reports
//! itself closed.
//!
//! A peer that stops reading fills its queue. Further frames for that peer
//! are dropped (`PeerChannelError::Full`) until the writer catches up, so one
//! stalled browser cannot grow the relay's memory without bound.

use std::net::SocketAddr;

use axum::extract::ws::Message;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::ports::{PeerChannel, PeerChannelError};

/// Frames queued per peer before new frames are dropped.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Outbound half of one WebSocket connection.
pub struct WsPeerChannel {
    tx: mpsc::Sender<Message>,
    remote_addr: Option<SocketAddr>,
}

impl WsPeerChannel {
    /// Create a channel and the receiver its writer task should drain.
    pub fn new(remote_addr: Option<SocketAddr>) -> (Self, mpsc::Receiver<Message>) {
        Self::with_capacity(remote_addr, OUTBOUND_QUEUE_CAPACITY)
    }

    /// Like [`WsPeerChannel::new`] with an explicit queue depth.
    pub fn with_capacity(
        remote_addr: Option<SocketAddr>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx, remote_addr }, rx)
    }
}

impl PeerChannel for WsPeerChannel {
    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send_text(&self, text: &str) -> Result<(), PeerChannelError> {
        self.tx
            .try_send(Message::Text(text.to_string()))
            .map_err(|e| match e {
                TrySendError::Full(_) => PeerChannelError::Full,
                TrySendError::Closed(_) => PeerChannelError::Closed,
            })
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }
}
