//! HTTP handlers organized by concern

pub mod channels;
pub mod collect;
pub mod health;
