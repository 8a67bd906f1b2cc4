//! ldapsync CLI library
//!
//! Command implementations live here so integration tests can reach them.
//! The binary in main.rs only parses arguments and dispatches.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
