//! WebSocket adapters for the sensor relay.
//!
//! # Architecture
//!
//! ```text
//!   ESP32 sensor            browser tabs
//!        │                   │      │
//!        └────── ws://host:3000/sensor ──────┘
//!                          │
//!                    ws_handler (upgrade)
//!                          │
//!          ┌───────────────┴───────────────┐
//!          │ reader task       writer task │
//!          │   │                   ▲       │
//!          │   ▼                   │       │
//!          │ RelayHub ──► WsPeerChannel    │
//!          └───────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`channel`] - mpsc-backed `PeerChannel`
//! - [`handler`] - Axum upgrade handler and liveness response
//! - [`server`] - Router, bind, serve, shutdown signal

pub mod channel;
pub mod handler;
pub mod server;

pub use channel::{WsPeerChannel, OUTBOUND_QUEUE_CAPACITY};
pub use handler::{liveness, ws_handler, RelayState, LIVENESS_BODY};
pub use server::{bind, relay_router, serve, shutdown_signal, ServeError};
