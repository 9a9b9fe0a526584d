use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::coordinator::Coordinator;
use crate::{
    config::CoordinatorConfig,
    events::Bus,
    layout::Layout,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Coordinator`] with optional features.
pub struct CoordinatorBuilder {
    layout: Layout,
    cfg: CoordinatorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl CoordinatorBuilder {
    /// Creates a new builder over the given initial layout.
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            cfg: CoordinatorConfig::default(),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the runtime configuration.
    pub fn with_config(mut self, cfg: CoordinatorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive coordinator events (queued, admitted, rings, ...)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the Coordinator instance.
    ///
    /// With a non-empty subscriber list this spawns the fan-out workers and a
    /// bus listener, so it must then be called inside a Tokio runtime. The
    /// listener stops when the coordinator is dropped.
    pub fn build(self) -> Arc<Coordinator> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let shutdown = CancellationToken::new();

        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            subscriber_listener(&bus, subs, shutdown.clone());
        }
        Arc::new(Coordinator::new_internal(self.layout, bus, shutdown))
    }
}

/// Forwards bus events to the subscriber set until `shutdown` fires.
fn subscriber_listener(bus: &Bus, subs: SubscriberSet, shutdown: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        subs.shutdown().await;
    });
}
