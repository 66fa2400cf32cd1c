//! Message router: classify, promote, fan out.
//!
//! Routing a frame is synchronous and bounded by the number of tracked
//! connections. It never blocks on a peer: closed recipients are skipped and
//! send failures are swallowed.

use crate::domain::foundation::{ConnectionId, StateMachine};
use crate::domain::relay::{ConnectionRole, InboundMessage, MessageError, MessageKind};

use super::registry::ConnectionRegistry;

/// What happened to one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Frame was fanned out to the opposite role.
    Forwarded {
        kind: MessageKind,
        /// Recipients the frame was queued for.
        delivered: usize,
        /// Whether the origin was reclassified as a sensor by this frame.
        promoted: bool,
    },
    /// Valid JSON whose `type` the relay does not forward.
    Ignored { kind: MessageKind },
    /// Not decodable; dropped.
    Malformed,
}

impl RouteOutcome {
    /// Number of peers that were sent the frame.
    pub fn delivered(&self) -> usize {
        match self {
            RouteOutcome::Forwarded { delivered, .. } => *delivered,
            _ => 0,
        }
    }
}

/// Stateless router over a [`ConnectionRegistry`].
pub struct MessageRouter;

impl MessageRouter {
    /// Route a text frame received from `origin`.
    ///
    /// The frame is forwarded byte-for-byte; it is parsed only to read its
    /// `type`.
    pub fn route(registry: &mut ConnectionRegistry, origin: &ConnectionId, raw: &str) -> RouteOutcome {
        match InboundMessage::parse(raw) {
            Ok(message) => Self::dispatch(registry, origin, &message, raw),
            Err(e) => Self::reject(origin, &e),
        }
    }

    /// Route a binary frame. UTF-8 payloads are treated as text frames.
    pub fn route_bytes(
        registry: &mut ConnectionRegistry,
        origin: &ConnectionId,
        raw: &[u8],
    ) -> RouteOutcome {
        match InboundMessage::binary_text(raw) {
            Ok(text) => Self::route(registry, origin, text),
            Err(e) => Self::reject(origin, &e),
        }
    }

    fn dispatch(
        registry: &mut ConnectionRegistry,
        origin: &ConnectionId,
        message: &InboundMessage,
        raw: &str,
    ) -> RouteOutcome {
        let kind = message.kind().clone();

        let Some(audience) = kind.audience() else {
            tracing::trace!(connection_id = %origin, kind = ?kind.tag(), "Ignoring message");
            return RouteOutcome::Ignored { kind };
        };

        let promoted = Self::learn_role(registry, origin, &kind);

        if let Some(reading) = message.sensor_reading() {
            tracing::debug!(
                connection_id = %origin,
                distance_mm = ?reading.distance_mm(),
                gesture = ?reading.gesture,
                "Sensor reading"
            );
        }

        let delivered = Self::fan_out(registry, origin, audience, raw);

        RouteOutcome::Forwarded {
            kind,
            delivered,
            promoted,
        }
    }

    /// Apply the role transition implied by `kind`. Returns true on promotion.
    fn learn_role(registry: &mut ConnectionRegistry, origin: &ConnectionId, kind: &MessageKind) -> bool {
        let Some(current) = registry.role_of(origin) else {
            return false;
        };
        let next = current.classify(kind);
        if !current.can_transition_to(&next) {
            return false;
        }
        let promoted = registry.promote(origin);
        if promoted {
            tracing::info!(connection_id = %origin, "Client identified as sensor");
        }
        promoted
    }

    fn fan_out(
        registry: &ConnectionRegistry,
        origin: &ConnectionId,
        audience: ConnectionRole,
        raw: &str,
    ) -> usize {
        let mut delivered = 0;
        for (id, channel) in registry.members(audience) {
            if id == origin || !channel.is_open() {
                continue;
            }
            if channel.send_text(raw).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    fn reject(origin: &ConnectionId, error: &MessageError) -> RouteOutcome {
        tracing::warn!(connection_id = %origin, error = %error, "Dropping malformed message");
        RouteOutcome::Malformed
    }
}
