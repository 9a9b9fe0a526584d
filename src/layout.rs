//! # Initial layout: device capacities and component placement.
//!
//! [`Layout`] is the validated construction input for a
//! [`Coordinator`](crate::Coordinator). Validation runs once, up front:
//!
//! - every device declares a positive slot count, exactly once;
//! - every component is placed exactly once, on a declared device;
//! - no device holds more components than it has slots.
//!
//! ## Example
//! ```
//! use slotvisor::{ComponentId, DeviceId, Layout, LayoutError};
//!
//! let d1 = DeviceId::new(1);
//! let layout = Layout::new([(d1, 2)], [(ComponentId::new(101), d1)])?;
//! assert_eq!(layout.capacity(d1), Some(2));
//! # Ok::<(), LayoutError>(())
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::LayoutError;
use crate::ids::{ComponentId, DeviceId};

/// Validated device capacities and initial component placement.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    capacities: HashMap<DeviceId, usize>,
    placement: HashMap<ComponentId, DeviceId>,
}

impl Layout {
    /// Builds a layout, rejecting malformed input.
    ///
    /// Checks run in this order: capacities (positive, unique), placement
    /// (unique, known device), then per-device occupancy.
    pub fn new<C, P>(capacities: C, placement: P) -> Result<Self, LayoutError>
    where
        C: IntoIterator<Item = (DeviceId, usize)>,
        P: IntoIterator<Item = (ComponentId, DeviceId)>,
    {
        let mut caps = HashMap::new();
        for (device, slots) in capacities {
            if slots == 0 {
                return Err(LayoutError::NonPositiveCapacity { device });
            }
            if caps.insert(device, slots).is_some() {
                return Err(LayoutError::DuplicateDevice { device });
            }
        }

        let mut placed: HashMap<ComponentId, DeviceId> = HashMap::new();
        let mut occupied: HashMap<DeviceId, usize> = HashMap::new();
        for (component, device) in placement {
            if !caps.contains_key(&device) {
                return Err(LayoutError::UnknownDevice { component, device });
            }
            match placed.entry(component) {
                Entry::Occupied(_) => return Err(LayoutError::DuplicateComponent { component }),
                Entry::Vacant(slot) => {
                    slot.insert(device);
                }
            }
            *occupied.entry(device).or_default() += 1;
        }

        // Deterministic error for multiple overfilled devices.
        let mut overfilled: Vec<(DeviceId, usize)> = occupied
            .into_iter()
            .filter(|(device, n)| *n > caps[device])
            .collect();
        overfilled.sort_unstable();
        if let Some((device, placed_n)) = overfilled.first().copied() {
            return Err(LayoutError::OverCapacity {
                device,
                capacity: caps[&device],
                placed: placed_n,
            });
        }

        Ok(Self {
            capacities: caps,
            placement: placed,
        })
    }

    /// Declared slot count of `device`.
    pub fn capacity(&self, device: DeviceId) -> Option<usize> {
        self.capacities.get(&device).copied()
    }

    /// Initial device of `component`.
    pub fn placement(&self, component: ComponentId) -> Option<DeviceId> {
        self.placement.get(&component).copied()
    }

    /// Number of declared devices.
    pub fn device_count(&self) -> usize {
        self.capacities.len()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (HashMap<DeviceId, usize>, HashMap<ComponentId, DeviceId>) {
        (self.capacities, self.placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D1: DeviceId = DeviceId::new(1);
    const D2: DeviceId = DeviceId::new(2);
    const C1: ComponentId = ComponentId::new(101);
    const C2: ComponentId = ComponentId::new(102);
    const C3: ComponentId = ComponentId::new(103);

    #[test]
    fn test_valid_layout_keeps_everything() {
        let layout = Layout::new([(D1, 2), (D2, 1)], [(C1, D1), (C2, D1), (C3, D2)]).unwrap();
        assert_eq!(layout.device_count(), 2);
        assert_eq!(layout.capacity(D1), Some(2));
        assert_eq!(layout.placement(C3), Some(D2));
        assert_eq!(layout.placement(ComponentId::new(999)), None);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = Layout::new([(D1, 0)], []).unwrap_err();
        assert_eq!(err, LayoutError::NonPositiveCapacity { device: D1 });
    }

    #[test]
    fn test_duplicate_device_rejected() {
        let err = Layout::new([(D1, 1), (D1, 3)], []).unwrap_err();
        assert_eq!(err, LayoutError::DuplicateDevice { device: D1 });
    }

    #[test]
    fn test_unknown_device_rejected() {
        let err = Layout::new([(D1, 1)], [(C1, D2)]).unwrap_err();
        assert_eq!(err, LayoutError::UnknownDevice { component: C1, device: D2 });
    }

    #[test]
    fn test_duplicate_component_rejected() {
        let err = Layout::new([(D1, 2), (D2, 2)], [(C1, D1), (C1, D2)]).unwrap_err();
        assert_eq!(err, LayoutError::DuplicateComponent { component: C1 });
    }

    #[test]
    fn test_over_capacity_rejected() {
        let err = Layout::new([(D1, 1), (D2, 1)], [(C1, D2), (C2, D2)]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::OverCapacity {
                device: D2,
                capacity: 1,
                placed: 2
            }
        );
    }

    #[test]
    fn test_empty_device_allowed() {
        let layout = Layout::new([(D1, 3)], []).unwrap();
        assert_eq!(layout.capacity(D1), Some(3));
    }
}
