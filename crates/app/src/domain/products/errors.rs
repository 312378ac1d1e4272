//! Products service errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind as SqlErrorKind},
};
use thiserror::Error;

/// Coarse error category for callers that branch on outcome, e.g. to pick an
/// HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An active product already holds the sku.
    AlreadyExists,

    /// No active product matched the lookup.
    NotFound,

    /// The request can be corrected by the caller.
    Validation,

    /// The store failed in a way the caller cannot fix.
    Storage,
}

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("product with sku `{0}` already exists")]
    AlreadyExists(String),

    #[error("product already exists")]
    Conflict,

    #[error("product not found")]
    NotFound,

    #[error("version mismatch (expected {expected}, stored {actual}), refresh and retry")]
    VersionMismatch { expected: u64, actual: u64 },

    #[error("sku must not be empty")]
    EmptySku,

    #[error("invalid skus filter `{input}`")]
    InvalidSkusFilter {
        input: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid date `{input}`, expected YYYY-MM-DD")]
    InvalidDate {
        input: String,
        #[source]
        source: jiff::Error,
    },

    #[error("date range starts after it ends")]
    InvalidDateRange,

    #[error("page and limit must be at least 1")]
    InvalidPagination,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("invalid version value")]
    InvalidVersion(#[from] TryFromIntError),
}

impl ProductsServiceError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists(_) | Self::Conflict => ErrorKind::AlreadyExists,
            Self::NotFound => ErrorKind::NotFound,
            Self::VersionMismatch { .. }
            | Self::EmptySku
            | Self::InvalidSkusFilter { .. }
            | Self::InvalidDate { .. }
            | Self::InvalidDateRange
            | Self::InvalidPagination
            | Self::MissingRequiredData
            | Self::InvalidData => ErrorKind::Validation,
            Self::Sql(_) | Self::InvalidVersion(_) => ErrorKind::Storage,
        }
    }
}

impl From<Error> for ProductsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(SqlErrorKind::UniqueViolation) => Self::Conflict,
            Some(SqlErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(SqlErrorKind::CheckViolation) => Self::InvalidData,
            Some(SqlErrorKind::ForeignKeyViolation | SqlErrorKind::Other | _) | None => {
                Self::Sql(error)
            }
        }
    }
}
