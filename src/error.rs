//! Error types used by the coordinator.
//!
//! This module defines two main error enums:
//!
//! - [`TransferError`]: a submitted transfer was rejected by the legality check.
//! - [`LayoutError`]: the initial capacity/placement input is malformed.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! Invariant breaches inside the coordinator (an admitted transfer abandoned
//! mid-flight) are not represented here: they abort the process.

use thiserror::Error;

use crate::ids::{ComponentId, DeviceId};

/// # Reasons a transfer is rejected.
///
/// All variants are raised synchronously from
/// [`Coordinator::submit`](crate::Coordinator::submit) before any waiting,
/// and leave the coordinator state untouched. None are retried by the
/// coordinator; resubmitting against an unchanged ledger fails the same way.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Neither a source nor a destination was given.
    #[error("transfer of {component} names neither source nor destination")]
    IllegalShape {
        /// Component named by the transfer.
        component: ComponentId,
    },

    /// The source or destination device is unknown.
    #[error("device {device} does not exist")]
    DeviceNotFound {
        /// The unknown device.
        device: DeviceId,
    },

    /// An ADD names a component that is already placed.
    #[error("component {component} already exists on device {device}")]
    AlreadyExists {
        /// Component named by the transfer.
        component: ComponentId,
        /// Device currently holding the component.
        device: DeviceId,
    },

    /// A MOVE or REMOVE names a component that is not on the stated source.
    #[error("component {component} does not exist on device {device}")]
    DoesNotExist {
        /// Component named by the transfer.
        component: ComponentId,
        /// The stated source device.
        device: DeviceId,
    },

    /// A MOVE whose source equals its destination.
    #[error("component {component} is already on device {device}")]
    NoOpTransfer {
        /// Component named by the transfer.
        component: ComponentId,
        /// Both source and destination.
        device: DeviceId,
    },

    /// Another transfer for the same component is still in flight.
    #[error("component {component} is being operated on")]
    BeingOperatedOn {
        /// Component named by the transfer.
        component: ComponentId,
    },
}

impl TransferError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use slotvisor::{ComponentId, TransferError};
    ///
    /// let err = TransferError::BeingOperatedOn { component: ComponentId::new(1) };
    /// assert_eq!(err.as_label(), "transfer_being_operated_on");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TransferError::IllegalShape { .. } => "transfer_illegal_shape",
            TransferError::DeviceNotFound { .. } => "transfer_device_not_found",
            TransferError::AlreadyExists { .. } => "transfer_already_exists",
            TransferError::DoesNotExist { .. } => "transfer_does_not_exist",
            TransferError::NoOpTransfer { .. } => "transfer_no_op",
            TransferError::BeingOperatedOn { .. } => "transfer_being_operated_on",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TransferError::IllegalShape { component } => {
                format!("illegal shape: component={component}")
            }
            TransferError::DeviceNotFound { device } => format!("unknown device: {device}"),
            TransferError::AlreadyExists { component, device } => {
                format!("already exists: component={component} device={device}")
            }
            TransferError::DoesNotExist { component, device } => {
                format!("does not exist: component={component} device={device}")
            }
            TransferError::NoOpTransfer { component, device } => {
                format!("no-op: component={component} device={device}")
            }
            TransferError::BeingOperatedOn { component } => {
                format!("in flight: component={component}")
            }
        }
    }
}

/// # Errors produced while validating the initial layout.
///
/// Raised by [`Layout::new`](crate::Layout::new), once, before a coordinator exists.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A device was declared with zero slots.
    #[error("device {device} must have a positive number of slots")]
    NonPositiveCapacity {
        /// The offending device.
        device: DeviceId,
    },

    /// The same device was declared twice.
    #[error("device {device} declared more than once")]
    DuplicateDevice {
        /// The repeated device.
        device: DeviceId,
    },

    /// The same component was placed twice.
    #[error("component {component} placed more than once")]
    DuplicateComponent {
        /// The repeated component.
        component: ComponentId,
    },

    /// A component is placed on a device that was never declared.
    #[error("component {component} placed on unknown device {device}")]
    UnknownDevice {
        /// The placed component.
        component: ComponentId,
        /// The undeclared device.
        device: DeviceId,
    },

    /// More components are placed on a device than it has slots.
    #[error("device {device} holds {placed} components but has {capacity} slots")]
    OverCapacity {
        /// The overfilled device.
        device: DeviceId,
        /// Declared slot count.
        capacity: usize,
        /// Number of components placed on it.
        placed: usize,
    },
}

impl LayoutError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LayoutError::NonPositiveCapacity { .. } => "layout_non_positive_capacity",
            LayoutError::DuplicateDevice { .. } => "layout_duplicate_device",
            LayoutError::DuplicateComponent { .. } => "layout_duplicate_component",
            LayoutError::UnknownDevice { .. } => "layout_unknown_device",
            LayoutError::OverCapacity { .. } => "layout_over_capacity",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}
