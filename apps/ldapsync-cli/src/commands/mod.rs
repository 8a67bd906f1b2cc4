//! CLI command implementations

pub mod auth;
pub mod classify;
pub mod sync;
