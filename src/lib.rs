//! # slotvisor
//!
//! **Slotvisor** is an admission and scheduling core for concurrent transfers
//! of components between slot-limited devices.
//!
//! Callers submit transfers (add, remove, move one component); the
//! coordinator decides *when* each transfer's two phases may run so that:
//! - no device ever holds more components than its capacity;
//! - no component is touched by two transfers at once;
//! - rings of moves that each wait for the next one's slot complete instead
//!   of deadlocking;
//! - a blocked transfer starts preparing as soon as the transfer it depends
//!   on is *committed* to leave, not when it is finished.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   submit(T1)          submit(T2)          submit(T3)      (one task each)
//!       │                   │                   │
//!       ▼                   ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Coordinator                                                      │
//! │  Mutex<State> (fair, never held across prepare/perform)           │
//! │   ├─ Ledger          placement, slot counts, in-flight marks      │
//! │   ├─ wait queues     FIFO per device                              │
//! │   ├─ DependencyGraph device ─► device per queued move             │
//! │   └─ bookings        phase, gates, beneficiary per transfer       │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        │ opens gates                                      │ publish
//!        ▼                                                  ▼
//!   Gate(prepare) / Gate(perform)               ┌────────────────────────┐
//!   (one-shot latches awaited                   │ Bus (broadcast channel)│
//!    by the parked submit())                    └───────────┬────────────┘
//!                                                           ▼
//!                                               subscriber_listener
//!                                                           ▼
//!                                                     SubscriberSet
//!                                                 ┌─────────┼─────────┐
//!                                                 ▼         ▼         ▼
//!                                              worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle of one transfer
//! ```text
//! submit ─► validate ──Err──► TransferRejected, return Err
//!              │
//!              ├─ REMOVE or free slot ─► admitted (reserve destination)
//!              └─ otherwise ─► queued on destination
//!                                ├─ move closes a ring ─► whole ring admitted
//!                                ├─ leaver of destination admitted ─► piggyback
//!                                └─ later: woken by a leaver of destination
//! admitted ─► prepare() ─► vacate source (hand slot to beneficiary)
//!          ─► [wait perform gate] ─► perform() ─► placed, TransferCompleted
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types / traits                          |
//! |-------------------|------------------------------------------------------------|---------------------------------------------|
//! | **Coordination**  | Admit and sequence transfers against a layout.             | [`Coordinator`], [`Layout`]                 |
//! | **Transfers**     | Define transfers as types or closures.                     | [`Transfer`], [`TransferFn`], [`TransferRef`] |
//! | **Subscriber API**| Observe queueing, admission, rings, completion.            | [`Subscribe`], [`Event`], [`EventKind`]     |
//! | **Errors**        | Typed rejections and layout validation errors.             | [`TransferError`], [`LayoutError`]          |
//! | **Configuration** | Runtime settings.                                          | [`CoordinatorConfig`]                       |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use slotvisor::{ComponentId, Coordinator, CoordinatorConfig, DeviceId, Layout, TransferFn};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (d1, d2) = (DeviceId::new(1), DeviceId::new(2));
//!     let (a, b) = (ComponentId::new(101), ComponentId::new(102));
//!
//!     // Two full devices: A on D1, B on D2.
//!     let layout = Layout::new([(d1, 1), (d2, 1)], [(a, d1), (b, d2)])?;
//!
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn slotvisor::Subscribe>> = vec![Arc::new(slotvisor::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn slotvisor::Subscribe>> = Vec::new();
//!
//!     let coord = Coordinator::builder(layout)
//!         .with_config(CoordinatorConfig::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     // A swap: each move waits for the other's slot. Resolved as a ring.
//!     let ab = TransferFn::arc(a, Some(d1), Some(d2), || async {}, || async {});
//!     let ba = TransferFn::arc(b, Some(d2), Some(d1), || async {}, || async {});
//!     let (r1, r2) = tokio::join!(coord.submit(ab), coord.submit(ba));
//!     r1?;
//!     r2?;
//!
//!     assert_eq!(coord.placement(a).await, Some(d2));
//!     assert_eq!(coord.placement(b).await, Some(d1));
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod ids;
mod layout;
mod subscribers;
mod transfers;

// ---- Public re-exports ----

pub use config::CoordinatorConfig;
pub use core::{Coordinator, CoordinatorBuilder, LedgerSnapshot, SlotUsage};
pub use error::{LayoutError, TransferError};
pub use events::{Bus, Event, EventKind};
pub use ids::{ComponentId, DeviceId, TransferId};
pub use layout::Layout;
pub use subscribers::{Subscribe, SubscriberSet};
pub use transfers::{Transfer, TransferFn, TransferKind, TransferRef};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
