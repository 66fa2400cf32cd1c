//! Application layer - Registry, routing, and connection lifecycle.
//!
//! This layer orchestrates the relay domain and coordinates between ports.
//!
//! - [`ConnectionRegistry`] - role-partitioned connection sets
//! - [`MessageRouter`] - classify, promote, fan out
//! - [`RelayHub`] - serialized access to the registry
//! - [`LifecycleSupervisor`] - periodic sweep and status report

mod hub;
mod registry;
mod router;
mod supervisor;

pub use hub::{RelayHub, DEFAULT_WELCOME_MESSAGE};
pub use registry::ConnectionRegistry;
pub use router::{MessageRouter, RouteOutcome};
pub use supervisor::{
    LifecycleSupervisor, SupervisorHandles, DEFAULT_RECLAIM_INTERVAL, DEFAULT_REPORT_INTERVAL,
};
