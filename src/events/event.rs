//! # Events emitted by the coordinator while sequencing transfers.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Transfer events**: one request's path through the coordinator
//!   (rejected, queued, admitted, prepared, vacated, completed) plus ring resolution
//! - **Subscriber events**: delivery problems inside the subscriber fan-out
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! transfer id, its endpoints and free-form reasons.
//!
//! ## Ordering guarantees
//! `seq` is stamped by the [`Bus`](crate::Bus) at publish time and increases
//! monotonically per bus, so each coordinator numbers its own events. Transfer
//! events are published while the coordination lock is held, so among them
//! `seq` order matches the order in which the ledger changed. Subscriber events
//! are published from worker tasks and interleave freely.
//!
//! ## Example
//! ```rust
//! use slotvisor::{ComponentId, DeviceId, Event, EventKind};
//!
//! let ev = Event::new(EventKind::TransferRejected)
//!     .with_component(ComponentId::new(7))
//!     .with_source(DeviceId::new(1))
//!     .with_reason("transfer_does_not_exist");
//!
//! assert_eq!(ev.kind, EventKind::TransferRejected);
//! assert_eq!(ev.component, Some(ComponentId::new(7)));
//! assert_eq!(ev.reason.as_deref(), Some("transfer_does_not_exist"));
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use crate::ids::{ComponentId, DeviceId, TransferId};
use crate::transfers::TransferKind;

/// Classification of coordinator events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and reason ("full", "closed")
    SubscriberOverflow,

    // === Transfer events ===
    /// Legality check failed; nothing was mutated.
    ///
    /// Sets:
    /// - `component`, `source`, `destination`: as submitted
    /// - `reason`: error label (see [`TransferError::as_label`](crate::TransferError::as_label))
    TransferRejected,

    /// No free destination slot; the transfer joined the destination's wait queue.
    ///
    /// Sets:
    /// - `transfer`, `component`, `source`, `destination`
    TransferQueued,

    /// Transfer was admitted and may start preparing.
    ///
    /// Sets:
    /// - `transfer`, `component`, `source`, `destination`
    /// - `reason`: admission path (`"free_slot"`, `"remove"`, `"woken"`,
    ///   `"piggyback"`, `"ring"`)
    TransferAdmitted,

    /// A ring of mutually blocked moves was found and admitted together.
    ///
    /// Sets:
    /// - `transfer`: the move whose arrival closed the ring
    /// - `ring`: members in ring order
    CycleResolved,

    /// `prepare` returned.
    ///
    /// Sets:
    /// - `transfer`, `component`
    TransferPrepared,

    /// The source slot was released (and possibly handed to a waiting transfer).
    ///
    /// Sets:
    /// - `transfer`, `component`, `source`
    /// - `reason`: `"released"` or `"handed_over"`
    SlotVacated,

    /// `perform` returned and the ledger reflects the final placement.
    ///
    /// Sets:
    /// - `transfer`, `component`, `destination`
    TransferCompleted,
}

/// Coordinator event with optional metadata.
///
/// - `seq`: per-bus publish order (0 until published)
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Publish order on the bus that carried this event.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Transfer the event is about, if admitted past validation.
    pub transfer: Option<TransferId>,
    /// Component named by the transfer.
    pub component: Option<ComponentId>,
    /// Source device, if any.
    pub source: Option<DeviceId>,
    /// Destination device, if any.
    pub destination: Option<DeviceId>,
    /// Human-readable reason (labels, admission path, overflow details).
    pub reason: Option<Arc<str>>,
    /// Ring members for [`EventKind::CycleResolved`].
    pub ring: Option<Arc<[TransferId]>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp.
    ///
    /// `seq` stays 0 until [`Bus::publish`](crate::Bus::publish) stamps it.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: 0,
            at: SystemTime::now(),
            kind,
            transfer: None,
            component: None,
            source: None,
            destination: None,
            reason: None,
            ring: None,
        }
    }

    /// Attaches a transfer id.
    #[inline]
    pub fn with_transfer(mut self, id: TransferId) -> Self {
        self.transfer = Some(id);
        self
    }

    /// Attaches a component id.
    #[inline]
    pub fn with_component(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }

    /// Attaches a source device.
    #[inline]
    pub fn with_source(mut self, device: DeviceId) -> Self {
        self.source = Some(device);
        self
    }

    /// Attaches a destination device.
    #[inline]
    pub fn with_destination(mut self, device: DeviceId) -> Self {
        self.destination = Some(device);
        self
    }

    /// Attaches both endpoints of a classified transfer.
    #[inline]
    pub fn with_kind(mut self, kind: TransferKind) -> Self {
        self.source = kind.source();
        self.destination = kind.destination();
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the members of a resolved ring.
    #[inline]
    pub fn with_ring(mut self, ring: &[TransferId]) -> Self {
        self.ring = Some(Arc::from(ring));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} panic={info}"))
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_kind_sets_both_endpoints() {
        let kind = TransferKind::Move {
            from: DeviceId::new(1),
            to: DeviceId::new(2),
        };
        let ev = Event::new(EventKind::TransferAdmitted).with_kind(kind);
        assert_eq!(ev.source, Some(DeviceId::new(1)));
        assert_eq!(ev.destination, Some(DeviceId::new(2)));

        let add = Event::new(EventKind::TransferAdmitted).with_kind(TransferKind::Add {
            to: DeviceId::new(3),
        });
        assert_eq!(add.source, None);
    }

    #[test]
    fn test_subscriber_helpers() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
        assert!(Event::subscriber_panicked("audit", "boom".into()).is_subscriber_panic());
    }
}
