//! Registry service layer.
//!
//! Sits between the HTTP handlers and the store: referential checks before
//! writes, the case cascade delete, and the dashboard aggregation. Plain
//! list/fetch reads go straight from the handlers to the store.

pub mod cases;
pub mod court_dates;
pub mod dashboard;
pub mod documents;

use thiserror::Error;

use crate::error::DatabaseError;

/// Failures surfaced by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The target or a referenced entity does not exist. The payload is the
    /// display name used in the message ("Client", "Attorney", "Case", ...).
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
