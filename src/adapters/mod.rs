//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the relay core to external systems:
//! - `websocket` - Axum WebSocket transport for sensors and browsers
//! - `memory` - In-memory peer channel for tests

pub mod memory;
pub mod websocket;

pub use memory::RecordingPeerChannel;
pub use websocket::{relay_router, RelayState, ServeError, WsPeerChannel};
