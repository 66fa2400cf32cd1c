//! In-memory peer channel that records every frame it is given.
//!
//! # Security Note
//!
//! This adapter is for **testing only**. It uses `.expect()` on lock
//! operations which will panic if locks are poisoned.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::ports::{PeerChannel, PeerChannelError};

/// Peer channel that captures sent frames for assertions.
///
/// # Example
///
/// ```ignore
/// let peer = Arc::new(RecordingPeerChannel::new());
/// hub.connect(peer.clone()).await;
///
/// assert_eq!(peer.sent().len(), 1); // welcome
/// peer.close();
/// assert_eq!(hub.sweep().await, 1);
/// ```
pub struct RecordingPeerChannel {
    open: AtomicBool,
    sent: RwLock<Vec<String>>,
    remote_addr: Option<SocketAddr>,
}

impl RecordingPeerChannel {
    /// Creates an open channel with no frames.
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(true),
            sent: RwLock::new(Vec::new()),
            remote_addr: None,
        }
    }

    /// Creates an open channel reporting the given remote address.
    pub fn with_remote_addr(addr: SocketAddr) -> Self {
        Self {
            remote_addr: Some(addr),
            ..Self::new()
        }
    }

    /// Marks the channel closed. Later sends fail.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    // === Test Helpers ===

    /// Returns every frame sent so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .read()
            .expect("RecordingPeerChannel: sent lock poisoned")
            .clone()
    }

    /// Returns the most recent frame, if any.
    pub fn last_sent(&self) -> Option<String> {
        self.sent().pop()
    }

    /// Drops recorded frames (e.g. the welcome) for test isolation.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.sent
            .write()
            .expect("RecordingPeerChannel: sent write lock poisoned")
            .clear();
    }
}

impl Default for RecordingPeerChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerChannel for RecordingPeerChannel {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn send_text(&self, text: &str) -> Result<(), PeerChannelError> {
        if !self.is_open() {
            return Err(PeerChannelError::Closed);
        }
        self.sent
            .write()
            .expect("RecordingPeerChannel: sent write lock poisoned")
            .push(text.to_string());
        Ok(())
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }
}
