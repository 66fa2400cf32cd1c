//! Connection roles and the traffic-driven role transition.
//!
//! A connection never declares what it is. Every peer starts out as a
//! [`ConnectionRole::Browser`] and is reclassified as a
//! [`ConnectionRole::Sensor`] the first time it sends `sensor_data`.
//! The transition is one-way.

use std::fmt;

use serde::Serialize;

use crate::domain::foundation::StateMachine;

use super::message::MessageKind;

/// Classification of a connection, which decides the direction of fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRole {
    /// Default role for every new connection.
    #[default]
    Browser,
    /// An embedded device that has sent at least one `sensor_data` frame.
    Sensor,
}

impl ConnectionRole {
    /// Returns the role this connection holds after sending a message of `kind`.
    ///
    /// Pure and total: only `sensor_data` from a browser changes anything,
    /// and a sensor stays a sensor whatever it sends next.
    pub fn classify(self, kind: &MessageKind) -> ConnectionRole {
        match (self, kind) {
            (ConnectionRole::Browser, MessageKind::SensorData) => ConnectionRole::Sensor,
            (role, _) => role,
        }
    }

    /// Wire/log name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionRole::Browser => "browser",
            ConnectionRole::Sensor => "sensor",
        }
    }
}

impl StateMachine for ConnectionRole {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (ConnectionRole::Browser, ConnectionRole::Sensor))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            ConnectionRole::Browser => vec![ConnectionRole::Sensor],
            ConnectionRole::Sensor => vec![],
        }
    }
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of tracked connections per role, as reported by the status task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoleCounts {
    pub sensors: usize,
    pub browsers: usize,
}

impl RoleCounts {
    /// Total tracked connections.
    pub fn total(&self) -> usize {
        self.sensors + self.browsers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_connections_default_to_browser() {
        assert_eq!(ConnectionRole::default(), ConnectionRole::Browser);
    }

    #[test]
    fn sensor_data_promotes_browser() {
        let role = ConnectionRole::Browser.classify(&MessageKind::SensorData);
        assert_eq!(role, ConnectionRole::Sensor);
    }

    #[test]
    fn other_kinds_leave_browser_alone() {
        for kind in [
            MessageKind::BrowserCommand,
            MessageKind::Welcome,
            MessageKind::Unrecognized(Some("ping".to_string())),
            MessageKind::Unrecognized(None),
        ] {
            assert_eq!(ConnectionRole::Browser.classify(&kind), ConnectionRole::Browser);
        }
    }

    #[test]
    fn sensor_never_reverts() {
        for kind in [
            MessageKind::SensorData,
            MessageKind::BrowserCommand,
            MessageKind::Welcome,
            MessageKind::Unrecognized(None),
        ] {
            assert_eq!(ConnectionRole::Sensor.classify(&kind), ConnectionRole::Sensor);
        }
    }

    #[test]
    fn state_machine_allows_only_promotion() {
        assert!(ConnectionRole::Browser.can_transition_to(&ConnectionRole::Sensor));
        assert!(!ConnectionRole::Sensor.can_transition_to(&ConnectionRole::Browser));
        assert!(ConnectionRole::Sensor.transition_to(ConnectionRole::Browser).is_err());
        assert!(ConnectionRole::Sensor.is_terminal());
    }

    #[test]
    fn role_displays_wire_name() {
        assert_eq!(ConnectionRole::Browser.to_string(), "browser");
        assert_eq!(ConnectionRole::Sensor.to_string(), "sensor");
    }

    #[test]
    fn role_counts_total() {
        let counts = RoleCounts { sensors: 2, browsers: 3 };
        assert_eq!(counts.total(), 5);
    }
}
