//! # Transfer classification.
//!
//! A transfer names an optional source and an optional destination.
//! [`TransferKind`] turns that pair into one of three shapes, once, at submission:
//!
//! | source | destination | kind                       |
//! |--------|-------------|----------------------------|
//! | none   | `to`        | [`TransferKind::Add`]      |
//! | `from` | none        | [`TransferKind::Remove`]   |
//! | `from` | `to`        | [`TransferKind::Move`]     |
//! | none   | none        | rejected (`IllegalShape`)  |
//!
//! A `Move` with `from == to` is still classified as a move; the legality
//! check rejects it as a no-op.

use std::fmt;

use crate::ids::DeviceId;

/// Shape of a transfer, computed from its optional endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferKind {
    /// Component does not exist yet and is uploaded onto `to`.
    Add {
        /// Destination device.
        to: DeviceId,
    },
    /// Component is deleted from `from`.
    Remove {
        /// Source device.
        from: DeviceId,
    },
    /// Component moves from `from` to `to`.
    Move {
        /// Source device.
        from: DeviceId,
        /// Destination device.
        to: DeviceId,
    },
}

impl TransferKind {
    /// Classifies a pair of endpoints; `None` when both are absent.
    #[inline]
    pub fn classify(source: Option<DeviceId>, destination: Option<DeviceId>) -> Option<Self> {
        match (source, destination) {
            (None, None) => None,
            (None, Some(to)) => Some(TransferKind::Add { to }),
            (Some(from), None) => Some(TransferKind::Remove { from }),
            (Some(from), Some(to)) => Some(TransferKind::Move { from, to }),
        }
    }

    /// Device the component leaves, if any.
    #[inline]
    pub fn source(&self) -> Option<DeviceId> {
        match *self {
            TransferKind::Add { .. } => None,
            TransferKind::Remove { from } | TransferKind::Move { from, .. } => Some(from),
        }
    }

    /// Device the component lands on, if any.
    #[inline]
    pub fn destination(&self) -> Option<DeviceId> {
        match *self {
            TransferKind::Remove { .. } => None,
            TransferKind::Add { to } | TransferKind::Move { to, .. } => Some(to),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransferKind::Add { .. } => "add",
            TransferKind::Remove { .. } => "remove",
            TransferKind::Move { .. } => "move",
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferKind::Add { to } => write!(f, "add(->{to})"),
            TransferKind::Remove { from } => write!(f, "remove({from}->)"),
            TransferKind::Move { from, to } => write!(f, "move({from}->{to})"),
        }
    }
}
