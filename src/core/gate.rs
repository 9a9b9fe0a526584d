//! # Rendezvous gates.
//!
//! A [`Gate`] is a one-shot latch: closed at creation, opened exactly once by
//! whoever unblocks the owning transfer, open forever afterwards. Waiting on
//! an open gate returns immediately, so there is no lost-wakeup window between
//! releasing the coordination lock and starting to wait.
//!
//! Built on [`CancellationToken`]: `cancel()` fires once, wakes every waiter,
//! and cannot be undone.

use tokio_util::sync::CancellationToken;

/// Single-use latch.
#[derive(Clone, Debug, Default)]
pub(crate) struct Gate {
    token: CancellationToken,
}

impl Gate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Opens the gate. Must be called at most once.
    pub(crate) fn open(&self) {
        debug_assert!(!self.is_open(), "gate opened twice");
        self.token.cancel();
    }

    pub(crate) fn is_open(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the gate is open.
    pub(crate) async fn wait(&self) {
        self.token.cancelled().await;
    }
}

/// The two gates of a parked transfer.
#[derive(Clone, Debug, Default)]
pub(crate) struct Gates {
    /// Opened when the transfer is admitted.
    pub(crate) prepare: Gate,
    /// Opened when the transfer's vacator has left the slot it will take.
    pub(crate) perform: Gate,
}

impl Gates {
    pub(crate) fn new() -> Self {
        Self {
            prepare: Gate::new(),
            perform: Gate::new(),
        }
    }
}
