//! Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. The underlying `sqlx` error is kept
//! as a child frame of the error tree, so the root cause is still available
//! when the tree is printed.

use derive_more::{Display, Error};
use sqlx::error::ErrorKind as SqlxErrorKind;

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The database could not be reached, opened, or authenticated against.
    #[display("could not connect to database")]
    Connection,
    /// Creating the tables failed for a reason other than them already existing.
    #[display("could not provision database schema")]
    Schema,
    /// A foreign-key, not-null, check or unique constraint rejected a write.
    /// The offending transaction has been rolled back.
    #[display("constraint violation while writing to {_0}")]
    Constraint(#[error(not(source))] &'static str),
    /// The query was malformed or the store failed to execute it.
    #[display("query failed")]
    Query,
    /// The name does not match any table of the schema.
    #[display("unknown table: {_0}")]
    UnknownTable(#[error(not(source))] String),
    /// The column is not declared for the table.
    #[display("unknown column {_1} on table {_0}")]
    UnknownColumn(#[error(not(source))] &'static str, #[error(not(source))] String),
    /// The connection has already been closed.
    #[display("database connection is closed")]
    NotConnected,
    /// A stored value cannot be represented by the entity type.
    #[display("invalid stored value: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Nothing in this crate is retried automatically; constraint violations
    /// are left for the caller to decide on.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Returns `true` for constraint violations.
    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }

    /// Classify a failed write: constraint violations reported by the store
    /// become [`Constraint`](Self::Constraint), everything else is a
    /// [`Query`](Self::Query) failure.
    pub(crate) fn from_write(err: &sqlx::Error, table: &'static str) -> Self {
        match err {
            sqlx::Error::Database(db) => match db.kind() {
                SqlxErrorKind::ForeignKeyViolation
                | SqlxErrorKind::NotNullViolation
                | SqlxErrorKind::CheckViolation
                | SqlxErrorKind::UniqueViolation => Self::Constraint(table),
                _ => Self::Query,
            },
            _ => Self::Query,
        }
    }
}
