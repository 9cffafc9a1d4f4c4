//! Upstream content API access
//!
//! `UpstreamSource` is the seam the ingestor depends on; `HttpUpstreamSource`
//! is the reqwest-backed implementation used in production.

pub mod http;
pub mod traits;

pub use http::HttpUpstreamSource;
pub use traits::UpstreamSource;
