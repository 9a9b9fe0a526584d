//! # Logging subscriber.
//!
//! [`LogWriter`] renders coordinator events through `tracing`, one line per event.
//! Install any `tracing` subscriber (e.g. `tracing-subscriber`'s fmt layer) to see them.
//!
//! ## Output format
//! ```text
//! [queued] transfer=T-4 component=COMP-101 from=DEV-1 to=DEV-2
//! [admitted] transfer=T-4 component=COMP-101 via=ring
//! [ring] closed_by=T-6 members=[T-6, T-4, T-5]
//! [vacated] transfer=T-4 from=DEV-1 slot=handed_over
//! [completed] transfer=T-4 component=COMP-101
//! [rejected] component=COMP-9 err=transfer_does_not_exist
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that forwards events to `tracing`.
///
/// Enabled via the `logging` feature.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let id = e.transfer.map(|t| t.to_string()).unwrap_or_default();
        let comp = e.component.map(|c| c.to_string()).unwrap_or_default();
        let reason = e.reason.as_deref().unwrap_or("-");
        let dev = |d: Option<crate::DeviceId>| d.map_or_else(|| "-".to_string(), |d| d.to_string());
        match e.kind {
            EventKind::TransferRejected => {
                tracing::warn!("[rejected] component={comp} err={reason}");
            }
            EventKind::TransferQueued => {
                tracing::info!(
                    "[queued] transfer={id} component={comp} from={} to={}",
                    dev(e.source),
                    dev(e.destination)
                );
            }
            EventKind::TransferAdmitted => {
                tracing::info!("[admitted] transfer={id} component={comp} via={reason}");
            }
            EventKind::CycleResolved => {
                tracing::info!("[ring] closed_by={id} members={:?}", e.ring);
            }
            EventKind::TransferPrepared => {
                tracing::debug!("[prepared] transfer={id} component={comp}");
            }
            EventKind::SlotVacated => {
                tracing::debug!("[vacated] transfer={id} from={} slot={reason}", dev(e.source));
            }
            EventKind::TransferCompleted => {
                tracing::info!("[completed] transfer={id} component={comp}");
            }
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
                tracing::warn!("[subscriber] {reason}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
