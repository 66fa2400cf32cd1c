//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, time values, the state machine trait, and error
//! types that form the vocabulary of the relay domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::ConnectionId;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
