//! Fatal-path helpers.
//!
//! Once a transfer is admitted, other transfers may already hold a promise of
//! its source slot. Abandoning it would leave those promises dangling and the
//! ledger inconsistent, so the process aborts instead of unwinding.

use crate::ids::TransferId;

/// Logs and aborts on a broken coordinator invariant.
#[cold]
pub(crate) fn fatal(what: &str) -> ! {
    tracing::error!(what, "coordinator invariant violated; aborting");
    std::process::abort()
}

/// Aborts the process if dropped before [`FlightGuard::land`].
///
/// Armed for every admitted transfer; disarmed after its completion is recorded.
#[must_use]
pub(crate) struct FlightGuard {
    transfer: TransferId,
    landed: bool,
}

impl FlightGuard {
    pub(crate) fn new(transfer: TransferId) -> Self {
        Self {
            transfer,
            landed: false,
        }
    }

    pub(crate) fn land(mut self) {
        self.landed = true;
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if !self.landed {
            tracing::error!(
                transfer = %self.transfer,
                "admitted transfer abandoned before completion; aborting"
            );
            std::process::abort();
        }
    }
}
