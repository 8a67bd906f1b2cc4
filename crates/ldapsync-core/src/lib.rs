//! # Directory Sync Core
//!
//! Decides which directory entries are users, which are groups, and which
//! users belong to which groups.
//!
//! The entry list comes from a [`DirectorySource`] (an LDAP server, an offline
//! dump). Everything after the fetch is pure: a user filter and a group filter
//! classify entries, then a membership associator is evaluated for every
//! (user, group) pair.
//!
//! ## Example
//!
//! ```
//! use ldapsync_core::prelude::*;
//!
//! let rules = SyncRules::new(
//!     FilterNode::new(Operator::And)
//!         .with_expression(FilterExpression::new("objectClass", "^inetOrgPerson$")),
//!     FilterNode::new(Operator::And)
//!         .with_expression(FilterExpression::new("objectClass", "^groupOfNames$")),
//!     MembershipNode::new(Operator::Or).with_constraint(Constraint::new("dn", "member")),
//! );
//!
//! let entries = vec![
//!     Entry::new("uid=johnd,ou=users,dc=example,dc=com")
//!         .with("objectClass", ["inetOrgPerson"]),
//!     Entry::new("cn=admins,ou=groups,dc=example,dc=com")
//!         .with("objectClass", ["groupOfNames"])
//!         .with("member", ["uid=johnd,ou=users,dc=example,dc=com"]),
//! ];
//!
//! let report = project(entries, &rules);
//! assert_eq!(report.groups[0].member_dns, vec!["uid=johnd,ou=users,dc=example,dc=com"]);
//! ```
//!
//! ## Crate Organization
//!
//! - [`entry`] - Entries, attributes and the entry store
//! - [`rule`] - Generic AND/OR rule trees
//! - [`filter`] - Filter engine (user/group classification)
//! - [`membership`] - Membership associator
//! - [`rules`] - The three rule trees of a sync
//! - [`snapshot`] - Classified snapshot and membership projection
//! - [`report`] - Report types
//! - [`source`] - Directory Source trait
//! - [`sync`] - Fetch-then-classify orchestration
//! - [`error`] - Directory Source errors

pub mod entry;
pub mod error;
pub mod filter;
pub mod membership;
pub mod report;
pub mod rule;
pub mod rules;
pub mod snapshot;
pub mod source;
pub mod sync;

pub use source::DirectorySource;

/// Prelude module for convenient imports.
pub mod prelude {
    // Entries
    pub use crate::entry::{simple_name, Attribute, Entry, EntryStore};

    // Rule trees
    pub use crate::filter::{CompiledFilter, FilterExpression, FilterNode};
    pub use crate::membership::{CompiledMembership, Constraint, MembershipNode};
    pub use crate::rule::{Operator, RuleNode};
    pub use crate::rules::{CompiledRules, SyncRules};

    // Projection
    pub use crate::report::{Group, MembershipReport, User};
    pub use crate::snapshot::{classify, project, Classification, DirectorySnapshot, Membership};

    // Sources
    pub use crate::source::{DirectorySource, StaticSource};

    // Error handling
    pub use crate::error::{DirectoryError, DirectoryResult};
}

// Re-export async_trait for source implementors
pub use async_trait::async_trait;
