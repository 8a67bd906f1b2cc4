//! End-to-end tests: entries in, membership report out.

use ldapsync_core::async_trait;
use ldapsync_core::prelude::*;
use ldapsync_core::sync;

const BASE: &str = "dc=example,dc=org";

fn user_dn(uid: &str) -> String {
    format!("uid={uid},ou=people,{BASE}")
}

fn group_dn(cn: &str) -> String {
    format!("cn={cn},ou=groups,{BASE}")
}

/// FreeIPA-like layout: users carry `memberOf`, groups are `groupOfNames`.
fn directory() -> Vec<Entry> {
    vec![
        Entry::new(BASE).with("objectClass", ["domain"]),
        Entry::new(format!("ou=people,{BASE}")).with("objectClass", ["organizationalUnit"]),
        Entry::new(user_dn("user1"))
            .with("objectClass", ["person", "inetOrgPerson"])
            .with("uid", ["user1"])
            .with("memberOf", [group_dn("group1")]),
        Entry::new(group_dn("group1"))
            .with("objectClass", ["groupOfNames"])
            .with("cn", ["group1"]),
        Entry::new(user_dn("user2"))
            .with("objectClass", ["person", "inetOrgPerson"])
            .with("uid", ["user2"])
            .with("memberOf", [group_dn("group1"), group_dn("group2")]),
        Entry::new(group_dn("group2"))
            .with("objectClass", ["groupOfNames"])
            .with("cn", ["group2"]),
        Entry::new(user_dn("user3"))
            .with("objectClass", ["person", "inetOrgPerson"])
            .with("uid", ["user3"]),
    ]
}

fn rules() -> SyncRules {
    SyncRules::new(
        FilterNode::new(Operator::And)
            .with_expression(FilterExpression::new("objectClass", "inetOrgPerson")),
        FilterNode::new(Operator::And)
            .with_expression(FilterExpression::new("objectClass", "groupOfNames")),
        MembershipNode::new(Operator::And).with_constraint(Constraint::new("memberOf", "dn")),
    )
}

#[test]
fn test_two_groups_three_users() {
    let report = project(directory(), &rules());

    let ids: Vec<_> = report.users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["user1", "user2", "user3"]);

    assert_eq!(report.groups.len(), 2);
    assert_eq!(
        report.groups[0].member_dns,
        vec![user_dn("user1"), user_dn("user2")]
    );
    assert_eq!(report.groups[1].member_dns, vec![user_dn("user2")]);
    assert_eq!(report.groups_of(&user_dn("user3")).count(), 0);
}

#[test]
fn test_member_order_follows_users_not_group_attribute() {
    // Group lists members in reverse; report still follows user fetch order.
    let entries = vec![
        Entry::new(group_dn("ops"))
            .with("objectClass", ["groupOfNames"])
            .with("member", [user_dn("b"), user_dn("a")]),
        Entry::new(user_dn("a")).with("objectClass", ["inetOrgPerson"]),
        Entry::new(user_dn("b")).with("objectClass", ["inetOrgPerson"]),
    ];
    let mut rules = rules();
    rules.group_membership =
        MembershipNode::new(Operator::Or).with_constraint(Constraint::new("dn", "member"));

    let report = project(entries, &rules);
    assert_eq!(report.groups[0].member_dns, vec![user_dn("a"), user_dn("b")]);
}

#[test]
fn test_nested_rules_from_yaml_like_config() {
    // Users: inetOrgPerson AND (uid is user1 OR dn is user3)
    let rules: SyncRules = serde_json::from_value(serde_json::json!({
        "userFilter": {
            "operator": "and",
            "expressions": [{"name": "objectClass", "value": "inetOrgPerson"}],
            "children": [{
                "operator": "or",
                "expressions": [
                    {"name": "uid", "value": "^user1$"},
                    {"name": "DN", "value": user_dn("user3")}
                ]
            }]
        },
        "groupFilter": {"expressions": [{"name": "objectClass", "value": "groupOfNames"}]},
        "groupMembership": {
            "operator": "or",
            "constraints": [{"userAttribute": "memberOf", "groupAttribute": "dn"}]
        }
    }))
    .unwrap();

    let snapshot = DirectorySnapshot::new(directory(), &rules);
    let users: Vec<_> = snapshot.users().map(|u| u.dn.clone()).collect();
    assert_eq!(users, vec![user_dn("user1"), user_dn("user3")]);

    assert!(snapshot.is_member(&user_dn("user1"), &group_dn("group1")));
    // user2 is a member by attribute but was not classified as a user
    assert!(!snapshot.is_member(&user_dn("user2"), &group_dn("group1")));
    assert_eq!(
        snapshot.membership(&user_dn("user2"), &group_dn("group1")),
        Membership::UnknownUser
    );
}

#[test]
fn test_invalid_pattern_in_config_degrades_to_no_match() {
    let mut rules = rules();
    rules.user_filter = FilterNode::new(Operator::Or)
        .with_expression(FilterExpression::new("uid", "user(1"))
        .with_expression(FilterExpression::new("uid", "^user3$"));

    let report = project(directory(), &rules);
    let ids: Vec<_> = report.users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["user3"]);
}

#[tokio::test]
async fn test_sync_run_matches_project() {
    let source = StaticSource::new(directory()).with_name("fixture");

    let snapshot = sync::run(&source, &rules()).await.unwrap();

    assert_eq!(snapshot.entries().len(), directory().len());
    assert_eq!(snapshot.report(), project(directory(), &rules()));
}

#[tokio::test]
async fn test_sync_run_propagates_source_errors() {
    struct Unreachable;

    #[async_trait]
    impl DirectorySource for Unreachable {
        fn display_name(&self) -> &str {
            "unreachable"
        }

        async fn fetch_entries(&self) -> DirectoryResult<Vec<Entry>> {
            Err(DirectoryError::connection_failed("connection refused"))
        }
    }

    let err = sync::run(&Unreachable, &rules()).await.unwrap_err();
    assert_eq!(err.error_code(), "CONNECTION_FAILED");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_capitalised_dump_keeps_attributes() {
    let source = StaticSource::from_json(
        r#"[{"DN":"uid=u1,dc=x","Attributes":[{"Name":"objectClass","Values":["inetOrgPerson"]}]}]"#,
    )
    .unwrap();

    let report = sync::run(&source, &rules()).await.unwrap().report();
    assert_eq!(report.users.len(), 1);
    assert_eq!(report.users[0].id, "u1");
}
