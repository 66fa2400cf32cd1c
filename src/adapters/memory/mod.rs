//! In-memory adapters for testing.

mod recording_channel;

pub use recording_channel::RecordingPeerChannel;
