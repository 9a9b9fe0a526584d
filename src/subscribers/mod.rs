//! # Event subscribers for the coordinator.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used to deliver [`Event`](crate::Event)s from the
//! [`Bus`](crate::events::Bus) to user code.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   submit() ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                            │
//!                                                  ┌─────────┼─────────┐
//!                                                  ▼         ▼         ▼
//!                                              LogWriter  Metrics   Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
