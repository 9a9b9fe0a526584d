//! # Transfer abstractions.
//!
//! This module provides the request-side types:
//! - [`Transfer`] - trait for caller-supplied transfer requests
//! - [`TransferFn`] - closure-backed transfer implementation
//! - [`TransferRef`] - shared reference to a transfer (`Arc<dyn Transfer>`)
//! - [`TransferKind`] - ADD / REMOVE / MOVE classification

mod kind;
mod transfer;
mod transfer_fn;

pub use kind::TransferKind;
pub use transfer::{Transfer, TransferRef};
pub use transfer_fn::TransferFn;
