//! Membership report types.

use serde::{Deserialize, Serialize};

/// A user in the membership report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Simple name, e.g. `johnd`.
    pub id: String,
    /// e.g. `uid=johnd,ou=users,dc=company,dc=com`.
    pub distinguished_name: String,
}

/// A group in the membership report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub distinguished_name: String,
    /// Member user DNs, in user fetch order.
    #[serde(rename = "memberDNs", alias = "memberDns", default)]
    pub member_dns: Vec<String>,
}

/// Users, groups and group members of one sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipReport {
    pub users: Vec<User>,
    pub groups: Vec<Group>,
}

impl MembershipReport {
    /// Find a group by DN.
    pub fn group(&self, dn: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.distinguished_name == dn)
    }

    /// DNs of the groups a user belongs to, in group order.
    pub fn groups_of<'a>(&'a self, user_dn: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.groups
            .iter()
            .filter(move |g| g.member_dns.iter().any(|m| m == user_dn))
            .map(|g| g.distinguished_name.as_str())
    }

    /// Total number of (user, group) memberships.
    pub fn membership_count(&self) -> usize {
        self.groups.iter().map(|g| g.member_dns.len()).sum()
    }
}
