//! error type for the terrapin state store.
//!
//! the store has three ways to fail from a caller's point of view: it
//! never came up, the schema could not be brought current, or an
//! individual query went wrong. reconcilers abort their pass on any of
//! them and rely on the next trigger or reconnect to rerun; http
//! handlers answer 500.

use thiserror::Error;

/// failures surfaced by the state store.
#[derive(Debug, Error)]
pub enum Error {
    /// the database could not be reached, at startup or mid-query.
    #[error("database unreachable: {0}")]
    Unreachable(String),

    /// the schema could not be migrated to the current version.
    #[error("schema migration failed: {0}")]
    Migration(String),

    /// an individual query or mutation failed.
    #[error(transparent)]
    Query(#[from] sea_orm::DbErr),
}
