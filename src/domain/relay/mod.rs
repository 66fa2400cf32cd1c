//! Relay domain - roles, message kinds, and the wire protocol.
//!
//! Everything here is pure: no sockets, no clocks other than the
//! [`Timestamp`](crate::domain::foundation::Timestamp) passed in.

mod message;
mod role;

pub use message::{
    InboundMessage, MessageError, MessageKind, SensorReading, ServerMessage, TofReading,
    WelcomeMessage,
};
pub use role::{ConnectionRole, RoleCounts};
