//! PeerChannel port - The outbound half of a relay connection.
//!
//! The Registry never touches sockets directly. It holds a `PeerChannel` per
//! connection and asks it two things: is the peer still open, and please
//! queue this frame. Both must return immediately; a slow peer must never
//! stall fan-out to the others.

use std::net::SocketAddr;

/// Errors that can occur when queueing a frame for a peer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeerChannelError {
    /// The peer's channel is no longer open.
    #[error("Peer channel is closed")]
    Closed,

    /// The peer is not draining its queue; the frame was dropped.
    #[error("Peer channel is full")]
    Full,
}

/// Port for delivering frames to one connected peer.
///
/// Implementations should:
/// - Never block: `send_text` enqueues and returns, or fails with `Full`
/// - Report `is_open() == false` once the peer can no longer receive
/// - Stay `false` once closed
pub trait PeerChannel: Send + Sync {
    /// Whether the channel is currently open.
    fn is_open(&self) -> bool;

    /// Queue a text frame for delivery.
    fn send_text(&self, text: &str) -> Result<(), PeerChannelError>;

    /// Remote address, for diagnostics only.
    fn remote_addr(&self) -> Option<SocketAddr> {
        None
    }
}
