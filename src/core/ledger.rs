//! # Placement ledger and legality checker.
//!
//! [`Ledger`] is the authoritative record of where every component lives,
//! how many slots each device has in use, and which components are in flight.
//! It is only touched with the coordination lock held.
//!
//! ## Slot accounting
//! `occupied` counts slots that are taken **or promised**:
//! - a direct admission reserves its destination slot immediately;
//! - a vacate releases the source slot, and when a waiting transfer was
//!   promised that slot the coordinator reserves it again in the same
//!   critical section (hand-over), so the counter never exceeds capacity.
//!
//! ## Legality order
//! ```text
//! classify ─► source known ─► destination known ─► ADD: not placed
//!          ─► MOVE: from != to ─► MOVE/REMOVE: placed on source ─► not in flight
//! ```
//! The first failing check wins; a failed check mutates nothing.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::core::guard::fatal;
use crate::error::TransferError;
use crate::ids::{ComponentId, DeviceId};
use crate::layout::Layout;
use crate::transfers::TransferKind;

/// Slot usage of one device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotUsage {
    /// Slots taken or promised.
    pub occupied: usize,
    /// Declared slot count.
    pub capacity: usize,
}

impl SlotUsage {
    /// True while at least one slot is neither taken nor promised.
    #[inline]
    pub fn has_free_slot(&self) -> bool {
        self.occupied < self.capacity
    }
}

/// Point-in-time copy of the ledger, for tests and operators.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// Per-device slot usage.
    pub devices: BTreeMap<DeviceId, SlotUsage>,
    /// Components currently resident on a device (in-transit ones are absent).
    pub placement: BTreeMap<ComponentId, DeviceId>,
}

impl LedgerSnapshot {
    /// Usage of `device`, if declared.
    pub fn usage(&self, device: DeviceId) -> Option<SlotUsage> {
        self.devices.get(&device).copied()
    }

    /// True if no device has more slots in use than it declares.
    pub fn is_within_capacity(&self) -> bool {
        self.devices.values().all(|u| u.occupied <= u.capacity)
    }

    /// Number of components resident on `device`.
    pub fn residents(&self, device: DeviceId) -> usize {
        self.placement.values().filter(|d| **d == device).count()
    }
}

pub(crate) struct Ledger {
    slots: HashMap<DeviceId, SlotUsage>,
    placement: HashMap<ComponentId, DeviceId>,
    in_flight: HashSet<ComponentId>,
}

impl Ledger {
    pub(crate) fn new(layout: Layout) -> Self {
        let (capacities, placement) = layout.into_parts();
        let mut slots: HashMap<DeviceId, SlotUsage> = capacities
            .into_iter()
            .map(|(device, capacity)| {
                (
                    device,
                    SlotUsage {
                        occupied: 0,
                        capacity,
                    },
                )
            })
            .collect();
        for device in placement.values() {
            if let Some(usage) = slots.get_mut(device) {
                usage.occupied += 1;
            }
        }
        Self {
            slots,
            placement,
            in_flight: HashSet::new(),
        }
    }

    /// Classifies and validates a transfer; on success marks its component in flight.
    pub(crate) fn check(
        &mut self,
        component: ComponentId,
        source: Option<DeviceId>,
        destination: Option<DeviceId>,
    ) -> Result<TransferKind, TransferError> {
        let kind = TransferKind::classify(source, destination)
            .ok_or(TransferError::IllegalShape { component })?;

        for device in [source, destination].into_iter().flatten() {
            if !self.slots.contains_key(&device) {
                return Err(TransferError::DeviceNotFound { device });
            }
        }

        match kind {
            TransferKind::Add { .. } => {
                if let Some(&device) = self.placement.get(&component) {
                    return Err(TransferError::AlreadyExists { component, device });
                }
            }
            TransferKind::Move { from, to } if from == to => {
                return Err(TransferError::NoOpTransfer {
                    component,
                    device: from,
                });
            }
            TransferKind::Move { from, .. } | TransferKind::Remove { from } => {
                if self.placement.get(&component) != Some(&from) {
                    return Err(TransferError::DoesNotExist {
                        component,
                        device: from,
                    });
                }
            }
        }

        if !self.in_flight.insert(component) {
            return Err(TransferError::BeingOperatedOn { component });
        }
        Ok(kind)
    }

    pub(crate) fn has_free_slot(&self, device: DeviceId) -> bool {
        self.slots.get(&device).is_some_and(SlotUsage::has_free_slot)
    }

    /// Takes one slot on `device`.
    pub(crate) fn reserve(&mut self, device: DeviceId) {
        match self.slots.get_mut(&device) {
            Some(usage) if usage.has_free_slot() => usage.occupied += 1,
            Some(_) => fatal("slot reserved on a full device"),
            None => fatal("slot reserved on an unknown device"),
        }
    }

    /// Gives back one slot on `device`.
    pub(crate) fn release(&mut self, device: DeviceId) {
        match self.slots.get_mut(&device) {
            Some(usage) if usage.occupied > 0 => usage.occupied -= 1,
            Some(_) => fatal("slot released on an empty device"),
            None => fatal("slot released on an unknown device"),
        }
    }

    /// Drops the placement of a component leaving `from`.
    pub(crate) fn take(&mut self, component: ComponentId, from: DeviceId) {
        if self.placement.remove(&component) != Some(from) {
            fatal("vacating component was not on its source device");
        }
    }

    /// Records the component on its destination.
    pub(crate) fn place(&mut self, component: ComponentId, to: DeviceId) {
        self.placement.insert(component, to);
    }

    /// Clears the in-flight mark once a transfer completes.
    pub(crate) fn settle(&mut self, component: ComponentId) {
        self.in_flight.remove(&component);
    }

    pub(crate) fn usage(&self, device: DeviceId) -> Option<SlotUsage> {
        self.slots.get(&device).copied()
    }

    pub(crate) fn placement(&self, component: ComponentId) -> Option<DeviceId> {
        self.placement.get(&component).copied()
    }

    pub(crate) fn is_in_flight(&self, component: ComponentId) -> bool {
        self.in_flight.contains(&component)
    }

    pub(crate) fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            devices: self.slots.iter().map(|(d, u)| (*d, *u)).collect(),
            placement: self.placement.iter().map(|(c, d)| (*c, *d)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D1: DeviceId = DeviceId::new(1);
    const D2: DeviceId = DeviceId::new(2);
    const D9: DeviceId = DeviceId::new(9);
    const A: ComponentId = ComponentId::new(101);
    const B: ComponentId = ComponentId::new(102);
    const Z: ComponentId = ComponentId::new(200);

    fn ledger() -> Ledger {
        Ledger::new(Layout::new([(D1, 1), (D2, 2)], [(A, D1), (B, D2)]).unwrap())
    }

    #[test]
    fn test_initial_occupancy_counts_residents() {
        let l = ledger();
        assert_eq!(l.usage(D1), Some(SlotUsage { occupied: 1, capacity: 1 }));
        assert_eq!(l.usage(D2), Some(SlotUsage { occupied: 1, capacity: 2 }));
        assert!(!l.has_free_slot(D1));
        assert!(l.has_free_slot(D2));
        assert!(!l.has_free_slot(D9));
    }

    #[test]
    fn test_rejects_in_documented_order() {
        let mut l = ledger();
        assert_eq!(
            l.check(A, None, None),
            Err(TransferError::IllegalShape { component: A })
        );
        assert_eq!(
            l.check(A, Some(D9), Some(D2)),
            Err(TransferError::DeviceNotFound { device: D9 })
        );
        assert_eq!(
            l.check(A, Some(D1), Some(D9)),
            Err(TransferError::DeviceNotFound { device: D9 })
        );
        assert_eq!(
            l.check(A, None, Some(D2)),
            Err(TransferError::AlreadyExists { component: A, device: D1 })
        );
        assert_eq!(
            l.check(A, Some(D1), Some(D1)),
            Err(TransferError::NoOpTransfer { component: A, device: D1 })
        );
        assert_eq!(
            l.check(A, Some(D2), Some(D1)),
            Err(TransferError::DoesNotExist { component: A, device: D2 })
        );
        assert_eq!(
            l.check(Z, Some(D1), None),
            Err(TransferError::DoesNotExist { component: Z, device: D1 })
        );
        assert!(!l.is_in_flight(A));
    }

    #[test]
    fn test_second_request_on_same_component_rejected() {
        let mut l = ledger();
        assert_eq!(l.check(A, Some(D1), Some(D2)), Ok(TransferKind::Move { from: D1, to: D2 }));
        assert!(l.is_in_flight(A));
        assert_eq!(
            l.check(A, Some(D1), None),
            Err(TransferError::BeingOperatedOn { component: A })
        );

        l.settle(A);
        assert_eq!(l.check(A, Some(D1), None), Ok(TransferKind::Remove { from: D1 }));
    }

    #[test]
    fn test_rejection_is_repeatable() {
        let mut l = ledger();
        let first = l.check(B, Some(D1), Some(D2));
        let second = l.check(B, Some(D1), Some(D2));
        assert_eq!(first, second);
        assert_eq!(l.snapshot(), ledger().snapshot());
    }

    #[test]
    fn test_reserve_release_take_place() {
        let mut l = ledger();
        l.reserve(D2);
        assert_eq!(l.usage(D2).unwrap().occupied, 2);

        l.take(A, D1);
        l.release(D1);
        assert_eq!(l.placement(A), None);
        assert_eq!(l.usage(D1).unwrap().occupied, 0);

        l.place(A, D2);
        let snap = l.snapshot();
        assert_eq!(snap.placement.get(&A), Some(&D2));
        assert_eq!(snap.residents(D2), 2);
        assert!(snap.is_within_capacity());
    }
}
