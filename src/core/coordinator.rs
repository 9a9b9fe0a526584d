//! # Coordinator: admits transfers and sequences their two phases.
//!
//! The [`Coordinator`] owns the coordination lock, the event bus and the
//! optional subscriber fan-out. Every call to [`Coordinator::submit`] drives
//! one transfer from validation to completion on the caller's task.
//!
//! ## Flow of one `submit`
//! ```text
//! lock ─► register (validate, mark in flight) ─► admit
//!           │ Err ─► TransferRejected, return Err         │
//!           ▼                                             ▼
//!                                   Direct ─────────────── Parked(gates)
//!                                     │                        │ unlock
//!                                     │                        ▼
//!                                     │               wait prepare gate
//!                                     │               lock ─► on_woken ─► unlock
//!                                     ▼                        ▼
//!                                  prepare()  (lock NOT held)
//!                                     ▼
//!                         lock ─► vacate (release / hand over) ─► unlock
//!                                     ▼
//!                          [parked only] wait perform gate
//!                                     ▼
//!                                  perform()  (lock NOT held)
//!                                     ▼
//!                         lock ─► complete (place, clear in-flight) ─► unlock
//! ```
//!
//! ## Rules
//! - The lock is a fair [`tokio::sync::Mutex`]; it is never held across `prepare`/`perform`.
//! - Gates are opened under the lock and waited on without it.
//! - Dropping a `submit` future after validation aborts the process.
//!
//! ## Example
//! ```rust
//! use slotvisor::{ComponentId, Coordinator, CoordinatorConfig, DeviceId, Layout, TransferFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (d1, d2) = (DeviceId::new(1), DeviceId::new(2));
//!     let a = ComponentId::new(101);
//!     let layout = Layout::new([(d1, 1), (d2, 1)], [(a, d1)])?;
//!     let coord = Coordinator::new(layout, CoordinatorConfig::default());
//!
//!     let t = TransferFn::arc(a, Some(d1), Some(d2), || async {}, || async {});
//!     coord.submit(t).await?;
//!
//!     assert_eq!(coord.placement(a).await, Some(d2));
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;

use crate::config::CoordinatorConfig;
use crate::core::builder::CoordinatorBuilder;
use crate::core::guard::FlightGuard;
use crate::core::ledger::{LedgerSnapshot, SlotUsage};
use crate::core::state::{Admission, State};
use crate::error::TransferError;
use crate::events::{Bus, Event};
use crate::ids::{ComponentId, DeviceId};
use crate::layout::Layout;
use crate::transfers::TransferRef;

/// Arbitrates concurrent add/remove/move transfers over slot-limited devices.
pub struct Coordinator {
    state: Mutex<State>,
    bus: Bus,
    shutdown: CancellationToken,
}

impl Coordinator {
    /// Creates a coordinator with the given configuration and no subscribers.
    pub fn new(layout: Layout, cfg: CoordinatorConfig) -> Arc<Self> {
        Self::builder(layout).with_config(cfg).build()
    }

    /// Starts a builder for configuration and subscribers.
    pub fn builder(layout: Layout) -> CoordinatorBuilder {
        CoordinatorBuilder::new(layout)
    }

    pub(crate) fn new_internal(layout: Layout, bus: Bus, shutdown: CancellationToken) -> Self {
        Self {
            state: Mutex::new(State::new(layout, bus.clone())),
            bus,
            shutdown,
        }
    }

    /// Submits a transfer and drives it to completion.
    ///
    /// Returns once `perform` has returned and the ledger shows the final
    /// placement. Fails without side effects (other than a
    /// [`TransferRejected`](crate::EventKind::TransferRejected) event) when the
    /// transfer is illegal against the current ledger.
    ///
    /// Once validated the future must be polled to completion: dropping it
    /// (while queued or between phases) aborts the process, and so does a
    /// panic escaping `prepare` or `perform`.
    pub async fn submit(&self, transfer: TransferRef) -> Result<(), TransferError> {
        let (id, admission) = {
            let mut state = self.state.lock().await;
            let (id, kind) =
                state.register(transfer.component(), transfer.source(), transfer.destination())?;
            tracing::debug!(transfer = %id, component = %transfer.component(), %kind, "transfer registered");
            (id, state.admit(id))
        };
        let guard = FlightGuard::new(id);

        let perform_gate = match admission {
            Admission::Direct => None,
            Admission::Parked(gates) => {
                gates.prepare.wait().await;
                self.state.lock().await.on_woken(id);
                Some(gates.perform)
            }
        };

        transfer.prepare().await;
        self.state.lock().await.vacate(id);

        if let Some(gate) = perform_gate {
            gate.wait().await;
        }

        transfer.perform().await;
        self.state.lock().await.complete(id);

        guard.land();
        tracing::debug!(transfer = %id, "transfer completed");
        Ok(())
    }

    /// Slots taken or promised on `device`.
    pub async fn occupied(&self, device: DeviceId) -> Option<usize> {
        self.usage(device).await.map(|u| u.occupied)
    }

    /// Declared capacity of `device`.
    pub async fn capacity(&self, device: DeviceId) -> Option<usize> {
        self.usage(device).await.map(|u| u.capacity)
    }

    /// Slot usage of `device`.
    pub async fn usage(&self, device: DeviceId) -> Option<SlotUsage> {
        self.state.lock().await.usage(device)
    }

    /// Device `component` currently resides on (`None` while in transit or absent).
    pub async fn placement(&self, component: ComponentId) -> Option<DeviceId> {
        self.state.lock().await.placement(component)
    }

    /// True while a transfer for `component` is registered and not completed.
    pub async fn is_in_flight(&self, component: ComponentId) -> bool {
        self.state.lock().await.is_in_flight(component)
    }

    /// Consistent copy of the whole ledger.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Number of transfers waiting for a slot on `device`.
    pub async fn queued(&self, device: DeviceId) -> usize {
        self.state.lock().await.queued(device)
    }

    /// Number of transfers registered and not yet completed.
    pub async fn in_flight(&self) -> usize {
        self.state.lock().await.in_flight()
    }

    /// Number of queued moves (edges of the dependency graph).
    pub async fn blocked_moves(&self) -> usize {
        self.state.lock().await.blocked_moves()
    }

    /// Raw receiver for coordinator events.
    ///
    /// Only events published after this call are observed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::transfers::TransferFn;
    use std::time::Duration;

    const D1: DeviceId = DeviceId::new(1);
    const D2: DeviceId = DeviceId::new(2);
    const A: ComponentId = ComponentId::new(101);
    const B: ComponentId = ComponentId::new(102);

    fn noop(c: ComponentId, from: Option<DeviceId>, to: Option<DeviceId>) -> TransferRef {
        TransferFn::arc(c, from, to, || async {}, || async {})
    }

    fn coord(caps: &[(DeviceId, usize)], placed: &[(ComponentId, DeviceId)]) -> Arc<Coordinator> {
        let layout = Layout::new(caps.iter().copied(), placed.iter().copied()).unwrap();
        Coordinator::new(layout, CoordinatorConfig::default())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_direct_move_updates_ledger() {
        let c = coord(&[(D1, 1), (D2, 1)], &[(A, D1)]);
        c.submit(noop(A, Some(D1), Some(D2))).await.unwrap();

        assert_eq!(c.placement(A).await, Some(D2));
        assert_eq!(c.occupied(D1).await, Some(0));
        assert_eq!(c.occupied(D2).await, Some(1));
        assert_eq!(c.capacity(D2).await, Some(1));
        assert_eq!(c.in_flight().await, 0);
        assert!(!c.is_in_flight(A).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rejection_leaves_state_untouched() {
        let c = coord(&[(D1, 1), (D2, 1)], &[(A, D1)]);
        let before = c.snapshot().await;
        let mut rx = c.subscribe();

        let err = c.submit(noop(B, Some(D1), Some(D2))).await.unwrap_err();
        assert_eq!(err, TransferError::DoesNotExist { component: B, device: D1 });
        assert_eq!(c.snapshot().await, before);

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::TransferRejected);
        assert_eq!(ev.component, Some(B));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_queued_add_is_released_by_remove() {
        let c = coord(&[(D1, 1)], &[(A, D1)]);
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let release_rx = Arc::new(Mutex::new(Some(release_rx)));

        // Hold the remove inside prepare until the add is queued.
        let rm: TransferRef = TransferFn::arc(
            A,
            Some(D1),
            None,
            move || {
                let rx = Arc::clone(&release_rx);
                async move {
                    if let Some(rx) = rx.lock().await.take() {
                        let _ = rx.await;
                    }
                }
            },
            || async {},
        );

        let c1 = Arc::clone(&c);
        let remove = tokio::spawn(async move { c1.submit(rm).await });
        while !c.is_in_flight(A).await {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let c2 = Arc::clone(&c);
        let add = tokio::spawn(async move { c2.submit(noop(B, None, Some(D1))).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(c.occupied(D1).await, Some(1));

        release_tx.send(()).unwrap();
        remove.await.unwrap().unwrap();
        add.await.unwrap().unwrap();

        assert_eq!(c.placement(A).await, None);
        assert_eq!(c.placement(B).await, Some(D1));
        assert_eq!(c.occupied(D1).await, Some(1));
    }
}
