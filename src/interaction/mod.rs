//! Request handling for nebula-api.
//!
//! This module holds the operations behind each HTTP route:
//! - Ingesting and triaging new tickets
//! - Assigning technicians and notifying schedulers
//! - Listing tickets and technicians
//!
//! Handlers take the shared clients by reference and return an
//! [`InteractionError`] that the HTTP layer maps onto a status code.

pub mod assign;
pub mod ingest;
pub mod listing;

use crate::base::types::ValidationError;

/// Failure of a request-level operation.
#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    /// The caller sent bad input; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The addressed record does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The store failed; carries the store's message.
    #[error("{0}")]
    Store(anyhow::Error),
}
