//! Property-based tests for the connection registry and message router.
//!
//! These tests drive random sequences of frames, closes, removals and sweeps
//! through the router and check the invariants that must hold after every
//! step: the role sets stay disjoint, promotion is one-way, nobody hears
//! their own frame, and garbage input changes nothing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use hanabi_bridge::adapters::memory::RecordingPeerChannel;
use hanabi_bridge::application::{ConnectionRegistry, MessageRouter, RouteOutcome};
use hanabi_bridge::domain::foundation::ConnectionId;
use hanabi_bridge::domain::relay::ConnectionRole;
use proptest::prelude::*;
use serde_json::Value;

// =============================================================================
// Helper Functions
// =============================================================================

const PEERS: usize = 5;

#[derive(Debug, Clone)]
enum Op {
    Sensor(usize),
    Command(usize),
    Unrecognized(usize),
    Garbage(usize, Vec<u8>),
    Close(usize),
    Remove(usize),
    Sweep,
}

fn garbage() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
        .prop_filter("must not be valid JSON", |bytes| {
            serde_json::from_slice::<Value>(bytes).is_err()
        })
}

fn op() -> impl Strategy<Value = Op> {
    let peer = 0..PEERS;
    prop_oneof![
        4 => peer.clone().prop_map(Op::Sensor),
        4 => peer.clone().prop_map(Op::Command),
        1 => peer.clone().prop_map(Op::Unrecognized),
        2 => (peer.clone(), garbage()).prop_map(|(p, g)| Op::Garbage(p, g)),
        1 => peer.clone().prop_map(Op::Close),
        1 => peer.prop_map(Op::Remove),
        1 => Just(Op::Sweep),
    ]
}

struct World {
    registry: ConnectionRegistry,
    ids: Vec<ConnectionId>,
    peers: Vec<Arc<RecordingPeerChannel>>,
    ever_sensor: HashSet<usize>,
    senders: HashMap<u64, usize>,
    next_seq: u64,
}

impl World {
    fn new() -> Self {
        let mut registry = ConnectionRegistry::new();
        let mut ids = Vec::new();
        let mut peers = Vec::new();
        for _ in 0..PEERS {
            let id = ConnectionId::new();
            let peer = Arc::new(RecordingPeerChannel::new());
            registry.add(id, peer.clone());
            ids.push(id);
            peers.push(peer);
        }
        Self {
            registry,
            ids,
            peers,
            ever_sensor: HashSet::new(),
            senders: HashMap::new(),
            next_seq: 0,
        }
    }

    fn frame(&mut self, kind: &str, from: usize) -> String {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.senders.insert(seq, from);
        format!(r#"{{"type":"{kind}","seq":{seq}}}"#)
    }

    fn apply(&mut self, op: Op) -> Result<(), TestCaseError> {
        match op {
            Op::Sensor(p) => {
                let frame = self.frame("sensor_data", p);
                let tracked = self.registry.contains(&self.ids[p]);
                MessageRouter::route(&mut self.registry, &self.ids[p], &frame);
                if tracked {
                    self.ever_sensor.insert(p);
                }
            }
            Op::Command(p) => {
                let frame = self.frame("browser_command", p);
                MessageRouter::route(&mut self.registry, &self.ids[p], &frame);
            }
            Op::Unrecognized(p) => {
                let before = self.snapshot();
                let frame = self.frame("ping", p);
                let outcome = MessageRouter::route(&mut self.registry, &self.ids[p], &frame);
                let ignored = matches!(outcome, RouteOutcome::Ignored { .. });
                prop_assert!(ignored, "unrecognized frame was not ignored: {:?}", outcome);
                prop_assert_eq!(self.snapshot(), before);
            }
            Op::Garbage(p, bytes) => {
                let before = self.snapshot();
                let sent_before = self.total_sent();
                let outcome = MessageRouter::route_bytes(&mut self.registry, &self.ids[p], &bytes);
                prop_assert_eq!(outcome, RouteOutcome::Malformed);
                prop_assert_eq!(self.snapshot(), before);
                prop_assert_eq!(self.total_sent(), sent_before);
            }
            Op::Close(p) => self.peers[p].close(),
            Op::Remove(p) => {
                self.registry.remove(&self.ids[p]);
            }
            Op::Sweep => {
                self.registry.sweep();
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> Vec<Option<ConnectionRole>> {
        self.ids.iter().map(|id| self.registry.role_of(id)).collect()
    }

    fn total_sent(&self) -> usize {
        self.peers.iter().map(|p| p.sent().len()).sum()
    }

    fn check_invariants(&self) -> Result<(), TestCaseError> {
        let sensors: HashSet<ConnectionId> = self
            .registry
            .members(ConnectionRole::Sensor)
            .map(|(id, _)| *id)
            .collect();
        let browsers: HashSet<ConnectionId> = self
            .registry
            .members(ConnectionRole::Browser)
            .map(|(id, _)| *id)
            .collect();

        prop_assert!(sensors.is_disjoint(&browsers));

        let counts = self.registry.report();
        prop_assert_eq!(counts.sensors, sensors.len());
        prop_assert_eq!(counts.browsers, browsers.len());

        for p in &self.ever_sensor {
            let role = self.registry.role_of(&self.ids[*p]);
            prop_assert_ne!(role, Some(ConnectionRole::Browser));
        }
        Ok(())
    }

    fn check_no_echo(&self) -> Result<(), TestCaseError> {
        for (p, peer) in self.peers.iter().enumerate() {
            for frame in peer.sent() {
                let value: Value = serde_json::from_str(&frame).unwrap();
                let seq = value["seq"].as_u64().unwrap();
                prop_assert_ne!(self.senders[&seq], p, "peer {} received its own frame", p);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests without parameters (outside proptest! macro)
// =============================================================================

#[test]
fn prop_fresh_registry_is_all_browsers() {
    let world = World::new();
    assert_eq!(world.registry.report().browsers, PEERS);
    assert_eq!(world.registry.report().sensors, 0);
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    /// Property: role sets stay disjoint, promotion never reverts, and no
    /// connection ever receives a frame it sent.
    #[test]
    fn prop_invariants_hold_for_any_sequence(ops in prop::collection::vec(op(), 0..60)) {
        let mut world = World::new();
        for op in ops {
            world.apply(op)?;
            world.check_invariants()?;
        }
        world.check_no_echo()?;
    }

    /// Property: sweep removes exactly the connections reporting non-open.
    #[test]
    fn prop_sweep_removes_exactly_closed(
        closed in prop::collection::vec(any::<bool>(), 0..40),
        promote in prop::collection::vec(any::<bool>(), 40),
    ) {
        let mut registry = ConnectionRegistry::new();
        let mut expected_closed = HashSet::new();
        let mut expected_open = HashSet::new();

        for (i, is_closed) in closed.iter().enumerate() {
            let id = ConnectionId::new();
            let peer = Arc::new(RecordingPeerChannel::new());
            registry.add(id, peer.clone());
            if promote[i] {
                registry.promote(&id);
            }
            if *is_closed {
                peer.close();
                expected_closed.insert(id);
            } else {
                expected_open.insert(id);
            }
        }

        let reclaimed: HashSet<ConnectionId> = registry.sweep().into_iter().collect();

        prop_assert_eq!(&reclaimed, &expected_closed);
        prop_assert_eq!(registry.report().total(), expected_open.len());
        for id in &expected_open {
            prop_assert!(registry.contains(id));
        }
    }

    /// Property: non-JSON input never faults and never changes membership.
    #[test]
    fn prop_garbage_never_mutates_registry(bytes in garbage()) {
        let mut world = World::new();
        let origin = world.ids[0];
        world.registry.promote(&origin);
        let before = world.snapshot();

        let outcome = MessageRouter::route_bytes(&mut world.registry, &origin, &bytes);

        prop_assert_eq!(outcome, RouteOutcome::Malformed);
        prop_assert_eq!(world.snapshot(), before);
        prop_assert_eq!(world.total_sent(), 0);
    }

    /// Property: classify is monotonic for any message tag.
    #[test]
    fn prop_classify_never_demotes(tag in "[a-z_]{0,16}") {
        use hanabi_bridge::domain::relay::MessageKind;
        let kind = MessageKind::from_tag(Some(tag.as_str()));
        prop_assert_eq!(ConnectionRole::Sensor.classify(&kind), ConnectionRole::Sensor);
    }
}
