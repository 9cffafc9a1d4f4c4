//! Error type definitions for the EPG collector

use sea_orm::SqlErr;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors (SeaORM)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Repository layer errors
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Upstream source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Collection errors for a single unit of work
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Operation already in progress errors
    #[error("Operation already in progress: {operation_type} on {resource}")]
    OperationInProgress {
        operation_type: String,
        resource: String,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Repository layer specific errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database errors from SeaORM
    #[error("Database error: {0}")]
    Database(#[source] sea_orm::DbErr),

    /// Record not found
    #[error("Record not found: {table} with {field} = {value}")]
    RecordNotFound {
        table: String,
        field: String,
        value: String,
    },

    /// Constraint violations (unique, foreign key, etc.)
    #[error("Constraint violation: {constraint} - {message}")]
    ConstraintViolation { constraint: String, message: String },
}

/// Upstream fetch errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Connection failures and request timeouts
    #[error("Transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    /// Non-success HTTP status
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Response body was not the expected JSON shape
    #[error("Decode error for {url}: {message}")]
    Decode { url: String, message: String },

    /// Request could not be built from configuration
    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfig { field: String, message: String },
}

/// Failures that abort one unit of collection work
#[derive(Error, Debug)]
pub enum CollectionError {
    /// The channel's external id does not resolve to a persisted channel
    #[error("Channel '{external_id}' not found in database")]
    ChannelNotFound { external_id: String },

    /// The upstream fetch for this unit failed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] SourceError),

    /// A read or write for this unit failed
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Fetched data that cannot be stored as-is
    #[error("Invalid data for '{external_id}': {message}")]
    InvalidData { external_id: String, message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an operation in progress error
    pub fn operation_in_progress<O: Into<String>, R: Into<String>>(
        operation_type: O,
        resource: R,
    ) -> Self {
        Self::OperationInProgress {
            operation_type: operation_type.into(),
            resource: resource.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Unique and foreign key failures become `ConstraintViolation`
impl From<sea_orm::DbErr> for RepositoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::ConstraintViolation {
                constraint: "unique".to_string(),
                message,
            },
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => Self::ConstraintViolation {
                constraint: "foreign_key".to_string(),
                message,
            },
            _ => Self::Database(err),
        }
    }
}

impl RepositoryError {
    pub fn not_found<T: Into<String>, F: Into<String>, V: Into<String>>(
        table: T,
        field: F,
        value: V,
    ) -> Self {
        Self::RecordNotFound {
            table: table.into(),
            field: field.into(),
            value: value.into(),
        }
    }
}

impl SourceError {
    /// Classify a reqwest failure. Decode failures surface from `.json()`.
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else if let Some(status) = error.status() {
            Self::Http {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

impl CollectionError {
    pub fn channel_not_found<S: Into<String>>(external_id: S) -> Self {
        Self::ChannelNotFound {
            external_id: external_id.into(),
        }
    }

    pub fn invalid_data<S: Into<String>, M: Into<String>>(external_id: S, message: M) -> Self {
        Self::InvalidData {
            external_id: external_id.into(),
            message: message.into(),
        }
    }
}
