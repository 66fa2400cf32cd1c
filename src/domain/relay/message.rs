//! Relay wire messages.
//!
//! Frames are JSON text. The relay only inspects the `type` discriminator;
//! every other field is passed through untouched.
//!
//! - Sensor → Browsers: `sensor_data`
//! - Browser → Sensors: `browser_command`
//! - Server → New connection: `welcome`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::foundation::Timestamp;

use super::role::ConnectionRole;

/// Discriminator of an inbound frame, taken from its `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Telemetry from a sensor, fanned out to browsers.
    SensorData,
    /// Command from a browser, fanned out to sensors.
    BrowserCommand,
    /// Server greeting. Never routed when received from a peer.
    Welcome,
    /// Anything else, including frames without a string `type`.
    Unrecognized(Option<String>),
}

impl MessageKind {
    /// Maps a `type` tag to a kind.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("sensor_data") => MessageKind::SensorData,
            Some("browser_command") => MessageKind::BrowserCommand,
            Some("welcome") => MessageKind::Welcome,
            other => MessageKind::Unrecognized(other.map(str::to_string)),
        }
    }

    /// Role whose connections receive a message of this kind, if any.
    pub fn audience(&self) -> Option<ConnectionRole> {
        match self {
            MessageKind::SensorData => Some(ConnectionRole::Browser),
            MessageKind::BrowserCommand => Some(ConnectionRole::Sensor),
            MessageKind::Welcome | MessageKind::Unrecognized(_) => None,
        }
    }

    /// The `type` tag, as it appeared on the wire.
    pub fn tag(&self) -> Option<&str> {
        match self {
            MessageKind::SensorData => Some("sensor_data"),
            MessageKind::BrowserCommand => Some("browser_command"),
            MessageKind::Welcome => Some("welcome"),
            MessageKind::Unrecognized(tag) => tag.as_deref(),
        }
    }
}

/// Errors decoding an inbound frame.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Binary frame is not valid UTF-8")]
    NotUtf8,
}

/// A decoded inbound frame.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    kind: MessageKind,
    payload: Value,
}

impl InboundMessage {
    /// Parses a text frame.
    ///
    /// Any valid JSON is accepted. A payload that is not an object, or whose
    /// `type` is missing or not a string, decodes as
    /// [`MessageKind::Unrecognized`].
    pub fn parse(raw: &str) -> Result<Self, MessageError> {
        let payload: Value = serde_json::from_str(raw)?;
        let kind = MessageKind::from_tag(payload.get("type").and_then(Value::as_str));
        Ok(Self { kind, payload })
    }

    /// Text carried by a binary frame. Only UTF-8 payloads are routable.
    pub fn binary_text(raw: &[u8]) -> Result<&str, MessageError> {
        std::str::from_utf8(raw).map_err(|_| MessageError::NotUtf8)
    }

    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// Diagnostic view of a `sensor_data` payload.
    ///
    /// Returns `None` for other kinds. Missing or mistyped fields show up as
    /// `None` inside the reading rather than as an error.
    pub fn sensor_reading(&self) -> Option<SensorReading> {
        if self.kind != MessageKind::SensorData {
            return None;
        }
        Some(SensorReading::deserialize(&self.payload).unwrap_or_default())
    }
}

/// The fields of `sensor_data` worth logging. Never used for routing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SensorReading {
    #[serde(default, deserialize_with = "lenient")]
    pub tof: Option<TofReading>,
    #[serde(default, deserialize_with = "lenient")]
    pub gesture: Option<String>,
}

impl SensorReading {
    /// Time-of-flight distance in millimetres, if reported.
    pub fn distance_mm(&self) -> Option<f64> {
        self.tof.as_ref().and_then(|tof| tof.distance)
    }
}

/// Time-of-flight block of a sensor payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TofReading {
    #[serde(default, deserialize_with = "lenient")]
    pub distance: Option<f64>,
}

// Treats a field of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ============================================
// Server → Client Messages
// ============================================

/// Messages originated by the relay itself.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once to every new connection.
    Welcome(WelcomeMessage),
}

/// Greeting carried by [`ServerMessage::Welcome`].
#[derive(Debug, Clone, Serialize)]
pub struct WelcomeMessage {
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ServerMessage {
    /// Builds the greeting for a new connection.
    pub fn welcome(message: impl Into<String>, at: Timestamp) -> Self {
        ServerMessage::Welcome(WelcomeMessage {
            message: message.into(),
            timestamp: at.as_unix_millis(),
        })
    }

    /// Serializes to a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
