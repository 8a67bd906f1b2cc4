//! Directory snapshot and membership projection
//!
//! A [`DirectorySnapshot`] owns the fetched entries of one sync together with
//! the compiled rules. Users and groups are classified exactly once, when the
//! snapshot is built; a new sync means a new snapshot. Entries and rules can
//! not change underneath it, so the partitions never go stale.

use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::entry::{simple_name, Entry, EntryStore};
use crate::filter::CompiledFilter;
use crate::membership::CompiledMembership;
use crate::report::{Group, MembershipReport, User};
use crate::rules::{CompiledRules, SyncRules};

/// Users and groups of an entry list, both in fetch order.
///
/// An entry may be in neither list, in one, or in both when the user and
/// group filters overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification<'a> {
    pub users: Vec<&'a Entry>,
    pub groups: Vec<&'a Entry>,
}

/// Split entries into users and groups.
#[instrument(skip_all, fields(entry_count = entries.len()))]
pub fn classify<'a>(
    entries: &'a [Entry],
    user_filter: &CompiledFilter,
    group_filter: &CompiledFilter,
) -> Classification<'a> {
    let (users, groups) = partition(entries, user_filter, group_filter);
    Classification {
        users: users.into_iter().map(|i| &entries[i]).collect(),
        groups: groups.into_iter().map(|i| &entries[i]).collect(),
    }
}

fn partition(
    entries: &[Entry],
    user_filter: &CompiledFilter,
    group_filter: &CompiledFilter,
) -> (Vec<usize>, Vec<usize>) {
    let mut users = Vec::new();
    let mut groups = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        if user_filter.matches_entry(entry) {
            users.push(i);
        }
        if group_filter.matches_entry(entry) {
            groups.push(i);
        }
    }

    debug!(
        users = users.len(),
        groups = groups.len(),
        "Classified directory entries"
    );

    (users, groups)
}

/// Outcome of a membership query that keeps unknown identities apart from
/// a negative verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Membership {
    /// Both entries were found and the associator accepted the pair.
    Member,
    /// Both entries were found and the associator rejected the pair.
    NotMember,
    /// No classified user has this DN.
    UnknownUser,
    /// No classified group has this DN.
    UnknownGroup,
}

impl Membership {
    /// Collapse to the plain boolean verdict.
    pub fn is_member(self) -> bool {
        matches!(self, Membership::Member)
    }
}

/// Immutable, classified view of one sync's entries.
#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    store: EntryStore,
    users: Vec<usize>,
    groups: Vec<usize>,
    membership: CompiledMembership,
}

impl DirectorySnapshot {
    /// Compile `rules` and classify `entries`.
    pub fn new(entries: impl Into<EntryStore>, rules: &SyncRules) -> Self {
        Self::with_compiled(entries, rules.compile())
    }

    /// Classify `entries` with already compiled rules.
    #[instrument(skip_all)]
    pub fn with_compiled(entries: impl Into<EntryStore>, rules: CompiledRules) -> Self {
        let store = entries.into();
        let (users, groups) = partition(store.as_slice(), &rules.user_filter, &rules.group_filter);

        Self {
            store,
            users,
            groups,
            membership: rules.group_membership,
        }
    }

    /// All fetched entries.
    pub fn entries(&self) -> &EntryStore {
        &self.store
    }

    /// Classified users, in fetch order.
    pub fn users(&self) -> impl ExactSizeIterator<Item = &Entry> + '_ {
        self.users.iter().map(move |&i| &self.store.as_slice()[i])
    }

    /// Classified groups, in fetch order.
    pub fn groups(&self) -> impl ExactSizeIterator<Item = &Entry> + '_ {
        self.groups.iter().map(move |&i| &self.store.as_slice()[i])
    }

    /// Both partitions at once.
    pub fn classification(&self) -> Classification<'_> {
        Classification {
            users: self.users().collect(),
            groups: self.groups().collect(),
        }
    }

    /// Classified user with this DN. With duplicates, the last one fetched.
    pub fn find_user(&self, dn: &str) -> Option<&Entry> {
        self.users().filter(|e| e.dn == dn).last()
    }

    /// Classified group with this DN. With duplicates, the last one fetched.
    pub fn find_group(&self, dn: &str) -> Option<&Entry> {
        self.groups().filter(|e| e.dn == dn).last()
    }

    /// Resolve both DNs and ask the associator, keeping unknown DNs apart.
    ///
    /// The group is resolved first, so a query where neither DN is known
    /// reports [`Membership::UnknownGroup`].
    pub fn membership(&self, user_dn: &str, group_dn: &str) -> Membership {
        let Some(group) = self.find_group(group_dn) else {
            return Membership::UnknownGroup;
        };
        let Some(user) = self.find_user(user_dn) else {
            return Membership::UnknownUser;
        };

        if self.membership.is_member(user, group) {
            Membership::Member
        } else {
            Membership::NotMember
        }
    }

    /// Whether `user_dn` belongs to `group_dn`. Unknown DNs give `false`.
    pub fn is_member(&self, user_dn: &str, group_dn: &str) -> bool {
        self.membership(user_dn, group_dn).is_member()
    }

    /// Build the membership report.
    ///
    /// Every (user, group) pair is evaluated once; member lists follow user
    /// fetch order. Pairs are resolved by DN exactly like [`Self::is_member`],
    /// so a duplicated user DN is listed once per classified entry and judged
    /// by the last entry with that DN.
    #[instrument(skip(self), fields(users = self.users.len(), groups = self.groups.len()))]
    pub fn report(&self) -> MembershipReport {
        let user_by_dn = last_by_dn(self.users());
        let group_by_dn = last_by_dn(self.groups());

        let mut groups: Vec<Group> = self
            .groups()
            .map(|g| Group {
                id: simple_name(&g.dn).to_string(),
                distinguished_name: g.dn.clone(),
                member_dns: Vec::new(),
            })
            .collect();

        let mut users = Vec::with_capacity(self.users.len());
        for user in self.users() {
            users.push(User {
                id: simple_name(&user.dn).to_string(),
                distinguished_name: user.dn.clone(),
            });

            let resolved_user = user_by_dn.get(user.dn.as_str()).copied().unwrap_or(user);
            for (group, record) in self.groups().zip(groups.iter_mut()) {
                let resolved_group = group_by_dn.get(group.dn.as_str()).copied().unwrap_or(group);
                if self.membership.is_member(resolved_user, resolved_group) {
                    record.member_dns.push(user.dn.clone());
                }
            }
        }

        let report = MembershipReport { users, groups };

        info!(
            users = report.users.len(),
            groups = report.groups.len(),
            memberships = report.membership_count(),
            "Membership report built"
        );

        report
    }
}

/// DN index where a later entry replaces an earlier one with the same DN.
fn last_by_dn<'a>(entries: impl Iterator<Item = &'a Entry>) -> HashMap<&'a str, &'a Entry> {
    entries.map(|e| (e.dn.as_str(), e)).collect()
}

/// Classify `entries` with `rules` and build the membership report.
pub fn project(entries: impl Into<EntryStore>, rules: &SyncRules) -> MembershipReport {
    DirectorySnapshot::new(entries, rules).report()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterExpression, FilterNode};
    use crate::membership::{Constraint, MembershipNode};
    use crate::rule::Operator;

    fn posix_rules() -> SyncRules {
        SyncRules::new(
            FilterNode::new(Operator::And)
                .with_expression(FilterExpression::new("objectClass", "^posixAccount$")),
            FilterNode::new(Operator::And)
                .with_expression(FilterExpression::new("objectClass", "^posixGroup$")),
            MembershipNode::new(Operator::And).with_constraint(Constraint::new("uid", "memberUid")),
        )
    }

    fn user(uid: &str) -> Entry {
        Entry::new(format!("uid={uid},ou=people,dc=example,dc=org"))
            .with("objectClass", ["posixAccount"])
            .with("uid", [uid])
    }

    fn group(cn: &str, members: &[&str]) -> Entry {
        Entry::new(format!("cn={cn},ou=groups,dc=example,dc=org"))
            .with("objectClass", ["posixGroup"])
            .with("memberUid", members.iter().copied())
    }

    fn entries() -> Vec<Entry> {
        vec![
            group("g1", &["u1", "u2"]),
            user("u1"),
            Entry::new("ou=people,dc=example,dc=org").with("objectClass", ["organizationalUnit"]),
            user("u2"),
            group("g2", &["u2"]),
            user("u3"),
        ]
    }

    #[test]
    fn test_classify_preserves_fetch_order() {
        let rules = posix_rules().compile();
        let entries = entries();
        let c = classify(&entries, &rules.user_filter, &rules.group_filter);

        let users: Vec<_> = c.users.iter().map(|e| e.simple_name()).collect();
        let groups: Vec<_> = c.groups.iter().map(|e| e.simple_name()).collect();
        assert_eq!(users, vec!["u1", "u2", "u3"]);
        assert_eq!(groups, vec!["g1", "g2"]);
    }

    #[test]
    fn test_overlapping_filters_put_entry_in_both() {
        let rules = SyncRules::new(
            FilterNode::new(Operator::And),
            FilterNode::new(Operator::And),
            MembershipNode::default(),
        );
        let snapshot = DirectorySnapshot::new(vec![user("u1")], &rules);
        assert_eq!(snapshot.users().len(), 1);
        assert_eq!(snapshot.groups().len(), 1);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_rule_changes() {
        let mut rules = posix_rules();
        let snapshot = DirectorySnapshot::new(entries(), &rules);
        let before = snapshot.classification();

        rules.user_filter = FilterNode::new(Operator::Or);
        rules.group_filter = FilterNode::new(Operator::Or);

        assert_eq!(snapshot.classification(), before);
        assert_eq!(snapshot.users().len(), 3);
        assert_eq!(snapshot.groups().len(), 2);
    }

    #[test]
    fn test_is_member() {
        let snapshot = DirectorySnapshot::new(entries(), &posix_rules());
        let g1 = "cn=g1,ou=groups,dc=example,dc=org";
        let g2 = "cn=g2,ou=groups,dc=example,dc=org";

        assert!(snapshot.is_member("uid=u1,ou=people,dc=example,dc=org", g1));
        assert!(!snapshot.is_member("uid=u1,ou=people,dc=example,dc=org", g2));
        assert!(snapshot.is_member("uid=u2,ou=people,dc=example,dc=org", g2));
    }

    #[test]
    fn test_unknown_dns_are_not_members() {
        let snapshot = DirectorySnapshot::new(entries(), &posix_rules());
        let g1 = "cn=g1,ou=groups,dc=example,dc=org";

        assert!(!snapshot.is_member("uid=ghost,ou=people,dc=example,dc=org", g1));
        assert_eq!(
            snapshot.membership("uid=ghost,ou=people,dc=example,dc=org", g1),
            Membership::UnknownUser
        );
        assert_eq!(
            snapshot.membership("uid=u1,ou=people,dc=example,dc=org", "cn=ghost"),
            Membership::UnknownGroup
        );
        assert_eq!(
            snapshot.membership("uid=ghost", "cn=ghost"),
            Membership::UnknownGroup
        );
        assert_eq!(
            snapshot.membership("uid=u3,ou=people,dc=example,dc=org", g1),
            Membership::NotMember
        );
    }

    #[test]
    fn test_group_entry_is_not_a_user() {
        // The DN exists in the store but was classified as a group only.
        let snapshot = DirectorySnapshot::new(entries(), &posix_rules());
        let g1 = "cn=g1,ou=groups,dc=example,dc=org";
        assert_eq!(snapshot.membership(g1, g1), Membership::UnknownUser);
    }

    #[test]
    fn test_project_cross_product() {
        let report = project(entries(), &posix_rules());

        assert_eq!(report.users.len(), 3);
        assert_eq!(report.groups.len(), 2);

        let g1 = &report.groups[0];
        assert_eq!(g1.id, "g1");
        assert_eq!(
            g1.member_dns,
            vec![
                "uid=u1,ou=people,dc=example,dc=org".to_string(),
                "uid=u2,ou=people,dc=example,dc=org".to_string(),
            ]
        );
        assert_eq!(
            report.groups[1].member_dns,
            vec!["uid=u2,ou=people,dc=example,dc=org".to_string()]
        );
        assert_eq!(report.users[2].id, "u3");
        assert_eq!(report.groups_of("uid=u3,ou=people,dc=example,dc=org").count(), 0);
    }

    #[test]
    fn test_duplicate_user_dn_resolves_to_last_entry() {
        // Overlapping base DNs return the same DN twice; the later copy wins.
        let rules = SyncRules::new(
            FilterNode::new(Operator::And)
                .with_expression(FilterExpression::new("objectClass", "^person$")),
            FilterNode::new(Operator::And)
                .with_expression(FilterExpression::new("objectClass", "^posixGroup$")),
            MembershipNode::new(Operator::And).with_constraint(Constraint::new("uid", "memberUid")),
        );
        let entries = vec![
            Entry::new("uid=u,dc=x")
                .with("objectClass", ["person"])
                .with("uid", ["old"]),
            Entry::new("uid=u,dc=x")
                .with("objectClass", ["person"])
                .with("uid", ["u"]),
            Entry::new("cn=g,dc=x")
                .with("objectClass", ["posixGroup"])
                .with("memberUid", ["u"]),
        ];

        let snapshot = DirectorySnapshot::new(entries, &rules);
        assert!(snapshot.is_member("uid=u,dc=x", "cn=g,dc=x"));
        assert_eq!(snapshot.find_user("uid=u,dc=x").unwrap().values("uid").next(), Some("u"));

        let report = snapshot.report();
        assert_eq!(report.users.len(), 2);
        assert_eq!(report.groups[0].member_dns, vec!["uid=u,dc=x", "uid=u,dc=x"]);
    }

    #[test]
    fn test_report_agrees_with_is_member() {
        let snapshot = DirectorySnapshot::new(entries(), &posix_rules());
        let report = snapshot.report();
        for user in snapshot.users() {
            for group in &report.groups {
                assert_eq!(
                    group.member_dns.contains(&user.dn),
                    snapshot.is_member(&user.dn, &group.distinguished_name)
                );
            }
        }
    }

    #[test]
    fn test_project_empty_store() {
        let report = project(Vec::<Entry>::new(), &posix_rules());
        assert!(report.users.is_empty());
        assert!(report.groups.is_empty());
    }

    #[test]
    fn test_snapshot_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DirectorySnapshot>();
    }
}
