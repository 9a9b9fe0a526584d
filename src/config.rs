//! # Coordinator configuration.
//!
//! Provides [`CoordinatorConfig`], the runtime knobs of a
//! [`Coordinator`](crate::Coordinator) that are not part of its layout.
//!
//! Config is used by the builder:
//! `Coordinator::builder(layout).with_config(cfg).build()`.

/// Runtime settings for the coordinator.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// receive `Lagged` and skip older items. Minimum value is 1.
    pub bus_capacity: usize,
}

impl CoordinatorConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for CoordinatorConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self { bus_capacity: 1024 }
    }
}
