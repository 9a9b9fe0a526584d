//! Coordinator events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted while transfers are sequenced.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Coordinator::submit` (under the coordination lock),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the coordinator's subscriber listener (fans out to
//!   `SubscriberSet`) and any raw receiver from `Coordinator::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
