//! # Closure-backed transfer (`TransferFn`)
//!
//! [`TransferFn`] wraps two closures `Fn() -> Fut`, one per phase, producing a
//! fresh future per call. If the phases need shared state, capture an
//! `Arc<...>` explicitly inside the closures.
//!
//! ## Example
//! ```rust
//! use slotvisor::{ComponentId, DeviceId, TransferFn, TransferRef};
//!
//! let t: TransferRef = TransferFn::arc(
//!     ComponentId::new(101),
//!     Some(DeviceId::new(1)),
//!     Some(DeviceId::new(2)),
//!     || async { /* copy out */ },
//!     || async { /* copy in */ },
//! );
//!
//! assert_eq!(t.component(), ComponentId::new(101));
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::ids::{ComponentId, DeviceId};
use crate::transfers::transfer::Transfer;

/// Closure-backed transfer implementation.
pub struct TransferFn<P, Q> {
    component: ComponentId,
    source: Option<DeviceId>,
    destination: Option<DeviceId>,
    prepare: P,
    perform: Q,
}

impl<P, Q> TransferFn<P, Q> {
    /// Creates a new closure-backed transfer.
    ///
    /// Prefer [`TransferFn::arc`] when you immediately need a [`TransferRef`](crate::TransferRef).
    pub fn new(
        component: ComponentId,
        source: Option<DeviceId>,
        destination: Option<DeviceId>,
        prepare: P,
        perform: Q,
    ) -> Self {
        Self {
            component,
            source,
            destination,
            prepare,
            perform,
        }
    }

    /// Creates the transfer and returns it as a shared handle.
    pub fn arc(
        component: ComponentId,
        source: Option<DeviceId>,
        destination: Option<DeviceId>,
        prepare: P,
        perform: Q,
    ) -> Arc<Self> {
        Arc::new(Self::new(component, source, destination, prepare, perform))
    }
}

impl<P, Q> fmt::Debug for TransferFn<P, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferFn")
            .field("component", &self.component)
            .field("source", &self.source)
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<P, PF, Q, QF> Transfer for TransferFn<P, Q>
where
    P: Fn() -> PF + Send + Sync + 'static,
    PF: Future<Output = ()> + Send + 'static,
    Q: Fn() -> QF + Send + Sync + 'static,
    QF: Future<Output = ()> + Send + 'static,
{
    fn component(&self) -> ComponentId {
        self.component
    }

    fn source(&self) -> Option<DeviceId> {
        self.source
    }

    fn destination(&self) -> Option<DeviceId> {
        self.destination
    }

    async fn prepare(&self) {
        (self.prepare)().await
    }

    async fn perform(&self) {
        (self.perform)().await
    }
}
