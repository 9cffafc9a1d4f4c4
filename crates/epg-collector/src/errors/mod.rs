//! Centralized error handling for the EPG collector
//!
//! Errors are grouped by the layer that produces them so callers can decide
//! what a failure aborts:
//!
//! - **Source Errors**: upstream unreachable, timeouts, non-2xx responses and
//!   undecodable payloads. They abort the fetch that produced them.
//! - **Collection Errors**: reconciliation-level failures such as an EPG
//!   request for a channel that is not persisted. They abort one channel.
//! - **Repository Errors**: persistence failures. Per-item writes log and
//!   count them; whole-pass reads propagate them.
//! - **App Errors**: the top-level type surfaced to the HTTP layer and `main`.
//!
//! # Usage
//!
//! ```rust
//! use epg_collector::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for Collection Results
pub type CollectionResult<T> = Result<T, CollectionError>;
