//! # Transfer abstraction.
//!
//! This module defines the [`Transfer`] trait: the caller-supplied request the
//! coordinator sequences. The common handle type is [`TransferRef`], an
//! `Arc<dyn Transfer>` suitable for sharing with the submitting task.
//!
//! The coordinator only decides **when** `prepare` and `perform` may run.
//! What they do, how long they take and whether they are idempotent is
//! opaque to it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ids::{ComponentId, DeviceId};

/// Shared handle to a transfer.
pub type TransferRef = Arc<dyn Transfer>;

/// # A request to add, remove or move one component.
///
/// The three accessors must return the same values for the lifetime of the
/// request. `prepare` and `perform` are each awaited exactly once, in that
/// order, from the future that called
/// [`Coordinator::submit`](crate::Coordinator::submit).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use slotvisor::{ComponentId, DeviceId, Transfer};
///
/// struct Upload {
///     id: ComponentId,
///     to: DeviceId,
/// }
///
/// #[async_trait]
/// impl Transfer for Upload {
///     fn component(&self) -> ComponentId { self.id }
///     fn source(&self) -> Option<DeviceId> { None }
///     fn destination(&self) -> Option<DeviceId> { Some(self.to) }
///
///     async fn prepare(&self) {
///         // stage the payload...
///     }
///
///     async fn perform(&self) {
///         // write it into the reserved slot...
///     }
/// }
/// ```
#[async_trait]
pub trait Transfer: Send + Sync + 'static {
    /// Component being transferred.
    fn component(&self) -> ComponentId;

    /// Device the component currently lives on (`None` for an upload).
    fn source(&self) -> Option<DeviceId>;

    /// Device the component should end up on (`None` for a deletion).
    fn destination(&self) -> Option<DeviceId>;

    /// First phase. Once it returns, the source slot is considered vacated.
    async fn prepare(&self);

    /// Second phase. Once it returns, the component is placed on the destination.
    async fn perform(&self);
}
