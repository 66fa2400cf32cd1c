//! Domain layer containing relay logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, state machine, errors)
//! - `relay` - Connection roles and the relay wire protocol

pub mod foundation;
pub mod relay;
