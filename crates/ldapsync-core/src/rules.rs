//! Sync rules: the user filter, the group filter and the membership tree.

use serde::{Deserialize, Serialize};

use crate::filter::{CompiledFilter, FilterNode};
use crate::membership::{CompiledMembership, MembershipNode};

/// The three rule trees of a sync configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRules {
    /// Which entries are users.
    #[serde(default)]
    pub user_filter: FilterNode,

    /// Which entries are groups.
    #[serde(default)]
    pub group_filter: FilterNode,

    /// How users are associated with groups.
    #[serde(default)]
    pub group_membership: MembershipNode,
}

impl SyncRules {
    /// Create rules from the three trees.
    pub fn new(
        user_filter: FilterNode,
        group_filter: FilterNode,
        group_membership: MembershipNode,
    ) -> Self {
        Self {
            user_filter,
            group_filter,
            group_membership,
        }
    }

    /// Compile all three trees.
    pub fn compile(&self) -> CompiledRules {
        CompiledRules {
            user_filter: CompiledFilter::compile(&self.user_filter),
            group_filter: CompiledFilter::compile(&self.group_filter),
            group_membership: CompiledMembership::compile(&self.group_membership),
        }
    }
}

/// Compiled, immutable form of [`SyncRules`].
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub user_filter: CompiledFilter,
    pub group_filter: CompiledFilter,
    pub group_membership: CompiledMembership,
}
