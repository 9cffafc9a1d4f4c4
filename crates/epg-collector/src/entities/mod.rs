//! SeaORM entity definitions
//!
//! Column types follow the initial schema migration: UUIDs and timestamps are
//! native on PostgreSQL and text on SQLite.

pub mod prelude;

pub mod channels;
pub mod epg_programs;
pub mod stream_urls;
