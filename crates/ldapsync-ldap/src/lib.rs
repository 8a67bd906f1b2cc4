//! # LDAP Directory Source
//!
//! LDAP access for ldapsync: the sync configuration, a
//! [`DirectorySource`](ldapsync_core::DirectorySource) that reads every entry
//! under a set of base DNs, and a one-shot credential check.
//!
//! ## Features
//!
//! - Plain LDAP, LDAPS and STARTTLS
//! - Optional bind as a sync account
//! - Paged subtree searches, one per base DN
//! - Simple-bind authentication of end users
//!
//! ## Example
//!
//! ```ignore
//! use ldapsync_core::prelude::*;
//! use ldapsync_ldap::{LdapSource, LdapSyncConfig};
//!
//! let config: LdapSyncConfig = serde_yaml::from_str(&std::fs::read_to_string("sync.yaml")?)?;
//! let rules = config.rules.clone();
//!
//! let source = LdapSource::new(config)?;
//! let snapshot = ldapsync_core::sync::run(&source, &rules).await?;
//! println!("{:?}", snapshot.report());
//! ```

pub mod auth;
pub mod config;
mod connection;
pub mod source;

// Re-exports
pub use auth::{authenticate, AuthRequest, AuthResult};
pub use config::{sanitize_dn, LdapSyncConfig, TlsMode};
pub use source::LdapSource;
