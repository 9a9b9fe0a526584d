//! Coordinator core: admission, scheduling and bookkeeping.
//!
//! The only public API from this module is [`Coordinator`] (plus its builder
//! and ledger snapshot types). Internal modules:
//! - [`ledger`]: placement, slot counts, in-flight marks and the legality check;
//! - [`graph`]: device dependency graph and ring detection;
//! - [`gate`]: one-shot rendezvous latches;
//! - [`state`]: the lock-guarded scheduling state machine;
//! - [`guard`]: abort-on-abandon guard and fatal invariant path;
//! - [`coordinator`]: async driver of one transfer per `submit`.

mod builder;
mod coordinator;
mod gate;
mod graph;
mod guard;
mod ledger;
mod state;

pub use builder::CoordinatorBuilder;
pub use coordinator::Coordinator;
pub use ledger::{LedgerSnapshot, SlotUsage};
