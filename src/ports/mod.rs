//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the relay core and the transport. Adapters implement these ports.
//!
//! - `PeerChannel` - Outbound frame delivery to one connected peer

mod peer_channel;

pub use peer_channel::{PeerChannel, PeerChannelError};
