//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which distributes events to multiple subscribers
//! concurrently without blocking the publisher.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N while B processes N+5
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Per-subscriber FIFO**: each subscriber sees events in order
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out over multiple event subscribers.
///
/// Manages per-subscriber queues and worker tasks, providing:
/// - **Isolation**: each subscriber has dedicated queue and worker
/// - **Panic safety**: panics caught and reported, never reach the coordinator
/// - **Overflow handling**: dropped events reported via `SubscriberOverflow`
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called from within a Tokio runtime when `subs` is non-empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let s = Arc::clone(&sub);
            let bus_for_worker = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());

                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                            (*msg).to_string()
                        } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                            msg.clone()
                        } else {
                            "unknown panic".to_string()
                        };
                        tracing::warn!(subscriber = s.name(), %info, "subscriber panicked");
                        bus_for_worker.publish(Event::subscriber_panicked(s.name(), info));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Emits an event to all subscribers (clones the event once).
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Emits a pre-allocated `Arc<Event>` to all subscribers.
    ///
    /// - On queue full: drops event, publishes `SubscriberOverflow`
    /// - On queue closed: publishes `SubscriberOverflow` with reason "closed"
    ///
    /// `SubscriberOverflow` events are not re-published if they themselves overflow.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = matches!(event.kind, EventKind::SubscriberOverflow);

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "closed"));
                    }
                }
            }
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// 1. Drops all channel senders (workers see channel closed)
    /// 2. Awaits all worker tasks to finish
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{Notify, Semaphore};
    use tokio::sync::broadcast::error::TryRecvError;

    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _ev: &Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn name(&self) -> &'static str {
            "counter"
        }
    }

    struct Boom;

    #[async_trait]
    impl Subscribe for Boom {
        async fn on_event(&self, _ev: &Event) {
            panic!("boom");
        }
        fn name(&self) -> &'static str {
            "boom"
        }
    }

    /// Holds every event until released; signals when the first one arrives.
    struct Stuck {
        started: Notify,
        release: Semaphore,
    }

    impl Stuck {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                started: Notify::new(),
                release: Semaphore::new(0),
            })
        }
    }

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _ev: &Event) {
            self.started.notify_one();
            if let Ok(permit) = self.release.acquire().await {
                permit.forget();
            }
        }
        fn name(&self) -> &'static str {
            "stuck"
        }
        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_every_event() {
        let seen = Arc::new(AtomicUsize::new(0));
        let bus = Bus::new(16);
        let set = SubscriberSet::new(
            vec![
                Arc::new(Counter(Arc::clone(&seen))),
                Arc::new(Counter(Arc::clone(&seen))),
            ],
            bus,
        );
        assert_eq!(set.len(), 2);

        set.emit(&Event::new(EventKind::TransferQueued));
        set.emit(&Event::new(EventKind::TransferCompleted));
        set.shutdown().await;

        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_panic_is_reported_on_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Boom)], bus);

        set.emit(&Event::new(EventKind::TransferQueued));
        set.shutdown().await;

        let ev = rx.recv().await.unwrap();
        assert!(ev.is_subscriber_panic());
        assert_eq!(ev.reason.as_deref(), Some("subscriber=boom panic=boom"));
    }

    #[tokio::test]
    async fn test_full_queue_publishes_overflow_once() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let stuck = Stuck::new();
        let set = SubscriberSet::new(vec![stuck.clone() as Arc<dyn Subscribe>], bus);

        // first event occupies the worker, second fills the queue
        set.emit(&Event::new(EventKind::TransferQueued));
        stuck.started.notified().await;
        set.emit(&Event::new(EventKind::TransferAdmitted));
        set.emit(&Event::new(EventKind::TransferCompleted));

        let ev = rx.try_recv().unwrap();
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.reason.as_deref(), Some("subscriber=stuck reason=full"));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        // an overflow event that itself overflows is dropped silently
        set.emit(&Event::subscriber_overflow("other", "full"));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        stuck.release.add_permits(8);
        set.shutdown().await;
    }

    #[tokio::test]
    async fn test_closed_queue_publishes_overflow() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let mut set = SubscriberSet::new(vec![Arc::new(Counter(Arc::default()))], bus);

        let worker = set.workers.pop().unwrap();
        worker.abort();
        assert!(worker.await.unwrap_err().is_cancelled());

        set.emit(&Event::new(EventKind::TransferQueued));
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.reason.as_deref(), Some("subscriber=counter reason=closed"));
    }
}
