//! # Scheduling state: everything guarded by the coordination lock.
//!
//! [`State`] owns the ledger, the per-device wait queues, the dependency graph
//! and one booking per registered transfer. Every method runs to completion
//! without awaiting, so the async coordinator only has to hold the lock around
//! single calls.
//!
//! ## Booking lifecycle
//! ```text
//!   register ─► Waiting ──(free slot | REMOVE)────────────► Admitted
//!                  │                                          ▲
//!                  └─ park: queue on destination ─┬─ ring ────┤
//!                                                 ├─ piggyback┤
//!                                                 └─ woken ───┘
//!   Admitted ─► vacate ─► Vacated ─► complete ─► (dropped)
//! ```
//!
//! ## Hand-over
//! A transfer leaving device `d` serves at most one beneficiary: a transfer
//! waiting for a slot on `d`. When the leaver vacates, the slot is released
//! and immediately reserved for the beneficiary, whose perform gate opens.
//!
//! - direct admission: the leaver pops the head of its source queue
//! - woken waiter: pops the head of its own source queue, unless already linked
//! - piggyback: a newly parked transfer links to the oldest admitted,
//!   not yet vacated, unlinked leaver of its destination
//! - ring: each member is linked to the member that leaves its destination

use std::collections::{HashMap, VecDeque};

use crate::core::gate::Gates;
use crate::core::graph::{DependencyGraph, Ring};
use crate::core::guard::fatal;
use crate::core::ledger::{Ledger, LedgerSnapshot, SlotUsage};
use crate::error::TransferError;
use crate::events::{Bus, Event, EventKind};
use crate::ids::{ComponentId, DeviceId, TransferId};
use crate::layout::Layout;
use crate::transfers::TransferKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Waiting,
    Admitted,
    Vacated,
}

#[derive(Debug)]
struct Booking {
    component: ComponentId,
    kind: TransferKind,
    phase: Phase,
    gates: Option<Gates>,
    beneficiary: Option<TransferId>,
}

/// How a freshly registered transfer proceeds.
#[derive(Debug)]
pub(crate) enum Admission {
    /// Admitted on the spot; both phases may run back to back.
    Direct,
    /// Queued; prepare and perform wait on their gates.
    Parked(Gates),
}

pub(crate) struct State {
    ledger: Ledger,
    queues: HashMap<DeviceId, VecDeque<TransferId>>,
    graph: DependencyGraph,
    bookings: HashMap<TransferId, Booking>,
    next_id: u64,
    bus: Bus,
}

impl State {
    pub(crate) fn new(layout: Layout, bus: Bus) -> Self {
        Self {
            ledger: Ledger::new(layout),
            queues: HashMap::new(),
            graph: DependencyGraph::new(),
            bookings: HashMap::new(),
            next_id: 1,
            bus,
        }
    }

    /// Validates a request and books it. Rejections leave no trace but an event.
    pub(crate) fn register(
        &mut self,
        component: ComponentId,
        source: Option<DeviceId>,
        destination: Option<DeviceId>,
    ) -> Result<(TransferId, TransferKind), TransferError> {
        let kind = match self.ledger.check(component, source, destination) {
            Ok(kind) => kind,
            Err(err) => {
                tracing::warn!(%component, ?source, ?destination, err = err.as_label(), "transfer rejected");
                let mut ev = Event::new(EventKind::TransferRejected)
                    .with_component(component)
                    .with_reason(err.as_label());
                ev.source = source;
                ev.destination = destination;
                self.bus.publish(ev);
                return Err(err);
            }
        };

        let id = TransferId::new(self.next_id);
        self.next_id += 1;
        self.bookings.insert(
            id,
            Booking {
                component,
                kind,
                phase: Phase::Waiting,
                gates: None,
                beneficiary: None,
            },
        );
        Ok((id, kind))
    }

    /// Admits a registered transfer directly if it can, parks it otherwise.
    pub(crate) fn admit(&mut self, id: TransferId) -> Admission {
        let kind = self.booking(id).kind;
        let reason = match kind.destination() {
            None => "remove",
            Some(to) if self.ledger.has_free_slot(to) => {
                self.ledger.reserve(to);
                "free_slot"
            }
            Some(to) => return Admission::Parked(self.park(id, kind, to)),
        };

        self.booking_mut(id).phase = Phase::Admitted;
        self.publish(EventKind::TransferAdmitted, id, |ev| ev.with_reason(reason));
        self.claim_waiter(id);
        Admission::Direct
    }

    /// Called by a parked transfer once its prepare gate is open.
    pub(crate) fn on_woken(&mut self, id: TransferId) {
        self.claim_waiter(id);
    }

    /// Records that `prepare` returned: the component leaves its source.
    pub(crate) fn vacate(&mut self, id: TransferId) {
        let booking = self.booking_mut(id);
        if booking.phase != Phase::Admitted {
            fatal("vacate on a transfer that is not admitted");
        }
        booking.phase = Phase::Vacated;
        let (component, kind, beneficiary) = (booking.component, booking.kind, booking.beneficiary);
        self.publish(EventKind::TransferPrepared, id, |ev| ev);

        let Some(from) = kind.source() else {
            return;
        };
        self.ledger.take(component, from);
        self.ledger.release(from);

        let reason = match beneficiary {
            Some(next) => {
                self.ledger.reserve(from);
                match &self.booking(next).gates {
                    Some(gates) => gates.perform.open(),
                    None => fatal("beneficiary without gates"),
                }
                tracing::trace!(transfer = %id, beneficiary = %next, device = %from, "slot handed over");
                "handed_over"
            }
            None => "released",
        };
        self.publish(EventKind::SlotVacated, id, |ev| ev.with_reason(reason));
    }

    /// Records that `perform` returned: the component lands, the booking is dropped.
    pub(crate) fn complete(&mut self, id: TransferId) {
        let Some(booking) = self.bookings.remove(&id) else {
            fatal("completion of an unknown transfer");
        };
        if booking.phase != Phase::Vacated {
            fatal("completion before vacate");
        }
        if let Some(to) = booking.kind.destination() {
            self.ledger.place(booking.component, to);
        }
        self.ledger.settle(booking.component);
        self.bus.publish(
            Event::new(EventKind::TransferCompleted)
                .with_transfer(id)
                .with_component(booking.component)
                .with_kind(booking.kind),
        );
    }

    // ---- introspection ----

    pub(crate) fn usage(&self, device: DeviceId) -> Option<SlotUsage> {
        self.ledger.usage(device)
    }

    pub(crate) fn placement(&self, component: ComponentId) -> Option<DeviceId> {
        self.ledger.placement(component)
    }

    pub(crate) fn is_in_flight(&self, component: ComponentId) -> bool {
        self.ledger.is_in_flight(component)
    }

    pub(crate) fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    pub(crate) fn queued(&self, device: DeviceId) -> usize {
        self.queues.get(&device).map_or(0, VecDeque::len)
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.bookings.len()
    }

    pub(crate) fn blocked_moves(&self) -> usize {
        self.graph.len()
    }

    // ---- internals ----

    fn park(&mut self, id: TransferId, kind: TransferKind, to: DeviceId) -> Gates {
        let gates = Gates::new();
        self.booking_mut(id).gates = Some(gates.clone());
        self.queues.entry(to).or_default().push_back(id);
        self.publish(EventKind::TransferQueued, id, |ev| ev);
        tracing::debug!(transfer = %id, device = %to, depth = self.queued(to), "transfer queued");

        if let TransferKind::Move { from, to } = kind {
            self.graph.insert(id, from, to);
            if let Some(ring) = self.graph.find_ring(from) {
                self.resolve_ring(id, ring);
            }
        }
        if self.booking(id).phase == Phase::Waiting {
            self.piggyback(id, to);
        }
        gates
    }

    /// Admits every member of a ring at once; each one inherits the slot of its successor.
    fn resolve_ring(&mut self, closing: TransferId, ring: Ring) {
        tracing::info!(closed_by = %closing, size = ring.members.len(), devices = ?ring.devices, "ring resolved");
        self.publish(EventKind::CycleResolved, closing, |ev| ev.with_ring(&ring.members));

        let n = ring.members.len();
        for (i, &member) in ring.members.iter().enumerate() {
            let freer = ring.members[(i + 1) % n];
            self.unqueue(member, ring.devices[(i + 1) % n]);
            self.booking_mut(freer).beneficiary = Some(member);
        }
        for &member in &ring.members {
            self.wake(member, "ring");
        }
    }

    fn piggyback(&mut self, id: TransferId, to: DeviceId) {
        let freer = self
            .bookings
            .iter()
            .filter(|(_, b)| {
                b.phase == Phase::Admitted && b.beneficiary.is_none() && b.kind.source() == Some(to)
            })
            .map(|(&t, _)| t)
            .min();
        let Some(freer) = freer else {
            return;
        };
        self.unqueue(id, to);
        self.booking_mut(freer).beneficiary = Some(id);
        self.wake(id, "piggyback");
    }

    /// Lets an admitted leaver adopt the head of its source queue.
    fn claim_waiter(&mut self, id: TransferId) {
        let booking = self.booking(id);
        let Some(from) = booking.kind.source() else {
            return;
        };
        if booking.beneficiary.is_some() || booking.phase != Phase::Admitted {
            return;
        }
        let Some(next) = self.queues.get_mut(&from).and_then(VecDeque::pop_front) else {
            return;
        };
        self.booking_mut(id).beneficiary = Some(next);
        self.wake(next, "woken");
    }

    /// Admits a parked transfer that was already taken off its queue.
    fn wake(&mut self, id: TransferId, via: &'static str) {
        let booking = self.booking_mut(id);
        if booking.phase != Phase::Waiting {
            fatal("woke a transfer that is not waiting");
        }
        booking.phase = Phase::Admitted;
        let kind = booking.kind;
        match &booking.gates {
            Some(gates) => gates.prepare.open(),
            None => fatal("parked transfer without gates"),
        }
        if let TransferKind::Move { from, .. } = kind {
            self.graph.remove(id, from);
        }
        self.publish(EventKind::TransferAdmitted, id, |ev| ev.with_reason(via));
    }

    fn unqueue(&mut self, id: TransferId, device: DeviceId) {
        if let Some(queue) = self.queues.get_mut(&device) {
            queue.retain(|&t| t != id);
        }
    }

    fn publish(&self, kind: EventKind, id: TransferId, decorate: impl FnOnce(Event) -> Event) {
        let booking = self.booking(id);
        let ev = Event::new(kind)
            .with_transfer(id)
            .with_component(booking.component)
            .with_kind(booking.kind);
        self.bus.publish(decorate(ev));
    }

    fn booking(&self, id: TransferId) -> &Booking {
        match self.bookings.get(&id) {
            Some(b) => b,
            None => fatal("unknown transfer"),
        }
    }

    fn booking_mut(&mut self, id: TransferId) -> &mut Booking {
        match self.bookings.get_mut(&id) {
            Some(b) => b,
            None => fatal("unknown transfer"),
        }
    }
}
