//! Connection registry partitioned by role.
//!
//! Two disjoint maps, one per [`ConnectionRole`]. Every operation is total:
//! adding a tracked connection, promoting a sensor, or removing an unknown
//! id is a no-op rather than an error.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::{ConnectionRole, RoleCounts};
use crate::ports::PeerChannel;

/// Tracks live connections by role.
///
/// # Thread Safety
///
/// Not synchronized. The registry is owned by
/// [`RelayHub`](super::RelayHub), which serializes every access.
#[derive(Default)]
pub struct ConnectionRegistry {
    sensors: HashMap<ConnectionId, Arc<dyn PeerChannel>>,
    browsers: HashMap<ConnectionId, Arc<dyn PeerChannel>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new connection under the default `browser` role.
    ///
    /// Returns `false` if the id was already tracked in either set.
    pub fn add(&mut self, id: ConnectionId, channel: Arc<dyn PeerChannel>) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.browsers.insert(id, channel);
        true
    }

    /// Move a connection from the browser set to the sensor set.
    ///
    /// Returns `true` only when a transition happened. Calling this for a
    /// sensor or an untracked id does nothing.
    pub fn promote(&mut self, id: &ConnectionId) -> bool {
        match self.browsers.remove(id) {
            Some(channel) => {
                self.sensors.insert(*id, channel);
                true
            }
            None => false,
        }
    }

    /// Forget a connection, whichever set it is in.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<ConnectionRole> {
        if self.sensors.remove(id).is_some() {
            return Some(ConnectionRole::Sensor);
        }
        self.browsers.remove(id).map(|_| ConnectionRole::Browser)
    }

    /// Drop every connection whose channel is no longer open.
    ///
    /// Returns the ids removed.
    pub fn sweep(&mut self) -> Vec<ConnectionId> {
        let mut reclaimed = Vec::new();
        for set in [&mut self.sensors, &mut self.browsers] {
            set.retain(|id, channel| {
                let open = channel.is_open();
                if !open {
                    reclaimed.push(*id);
                }
                open
            });
        }
        reclaimed
    }

    /// Current cardinality of both sets.
    pub fn report(&self) -> RoleCounts {
        RoleCounts {
            sensors: self.sensors.len(),
            browsers: self.browsers.len(),
        }
    }

    pub fn role_of(&self, id: &ConnectionId) -> Option<ConnectionRole> {
        if self.sensors.contains_key(id) {
            Some(ConnectionRole::Sensor)
        } else if self.browsers.contains_key(id) {
            Some(ConnectionRole::Browser)
        } else {
            None
        }
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.role_of(id).is_some()
    }

    /// Connections currently holding `role`.
    pub fn members(
        &self,
        role: ConnectionRole,
    ) -> impl Iterator<Item = (&ConnectionId, &Arc<dyn PeerChannel>)> {
        match role {
            ConnectionRole::Sensor => self.sensors.iter(),
            ConnectionRole::Browser => self.browsers.iter(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty() && self.browsers.is_empty()
    }
}
