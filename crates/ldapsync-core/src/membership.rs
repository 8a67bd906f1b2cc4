//! Membership associator
//!
//! Decides whether a user entry belongs to a group entry by comparing a user
//! attribute with a group attribute, e.g. `{ uid, memberUid }` for posix
//! groups or `{ dn, member }` for `groupOfNames`.

use serde::{Deserialize, Serialize};

use crate::entry::{is_dn_attribute, Entry};
use crate::rule::{Operator, RuleNode};

/// A single user-attribute/group-attribute comparison.
///
/// Either side may be the `"dn"` pseudo-attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    /// User attribute to match against the group attribute (e.g. `memberOf`).
    #[serde(alias = "UserAttribute")]
    pub user_attribute: String,
    /// Group attribute to match against the user attribute (e.g. `dn`).
    #[serde(alias = "GroupAttribute")]
    pub group_attribute: String,
}

impl Constraint {
    /// Create a constraint.
    pub fn new(user_attribute: impl Into<String>, group_attribute: impl Into<String>) -> Self {
        Self {
            user_attribute: user_attribute.into(),
            group_attribute: group_attribute.into(),
        }
    }

    /// Evaluate this constraint for a (user, group) pair.
    pub fn is_member(&self, user: &Entry, group: &Entry) -> bool {
        ConstraintPredicate::from(self).is_member(user, group)
    }
}

/// Configuration form of a membership tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipNode {
    #[serde(default)]
    pub operator: Operator,

    #[serde(default)]
    pub constraints: Vec<Constraint>,

    #[serde(default, alias = "additionalRules")]
    pub children: Vec<MembershipNode>,
}

impl MembershipNode {
    /// Create an empty node.
    pub fn new(operator: Operator) -> Self {
        Self {
            operator,
            constraints: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a constraint using builder pattern.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Add a child node using builder pattern.
    #[must_use]
    pub fn with_child(mut self, child: MembershipNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A constraint with its `"dn"` sides resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintPredicate {
    /// User DN equals group DN.
    DnDn,
    /// Group attribute values contain the user DN.
    DnToAttribute { group_attribute: String },
    /// User attribute values contain the group DN.
    AttributeToDn { user_attribute: String },
    /// User and group attribute values intersect.
    AttributeToAttribute {
        user_attribute: String,
        group_attribute: String,
    },
}

impl From<&Constraint> for ConstraintPredicate {
    fn from(c: &Constraint) -> Self {
        match (
            is_dn_attribute(&c.user_attribute),
            is_dn_attribute(&c.group_attribute),
        ) {
            (true, true) => ConstraintPredicate::DnDn,
            (true, false) => ConstraintPredicate::DnToAttribute {
                group_attribute: c.group_attribute.clone(),
            },
            (false, true) => ConstraintPredicate::AttributeToDn {
                user_attribute: c.user_attribute.clone(),
            },
            (false, false) => ConstraintPredicate::AttributeToAttribute {
                user_attribute: c.user_attribute.clone(),
                group_attribute: c.group_attribute.clone(),
            },
        }
    }
}

impl ConstraintPredicate {
    /// Evaluate for a (user, group) pair. Missing attributes give `false`.
    pub fn is_member(&self, user: &Entry, group: &Entry) -> bool {
        match self {
            ConstraintPredicate::DnDn => user.dn == group.dn,
            ConstraintPredicate::DnToAttribute { group_attribute } => {
                group.has_value(group_attribute, &user.dn)
            }
            ConstraintPredicate::AttributeToDn { user_attribute } => {
                user.has_value(user_attribute, &group.dn)
            }
            ConstraintPredicate::AttributeToAttribute {
                user_attribute,
                group_attribute,
            } => {
                let (Some(user_values), Some(group_values)) = (
                    user.attribute(user_attribute),
                    group.attribute(group_attribute),
                ) else {
                    return false;
                };
                user_values.iter().any(|uv| group_values.contains(uv))
            }
        }
    }
}

/// An immutable, ready-to-evaluate membership tree.
#[derive(Debug, Clone)]
pub struct CompiledMembership {
    root: RuleNode<ConstraintPredicate>,
}

impl CompiledMembership {
    /// Compile a membership tree.
    pub fn compile(node: &MembershipNode) -> Self {
        Self {
            root: compile_node(node),
        }
    }

    /// Decide whether `user` is a member of `group`.
    pub fn is_member(&self, user: &Entry, group: &Entry) -> bool {
        self.root
            .evaluate(&|constraint: &ConstraintPredicate| constraint.is_member(user, group))
    }

    /// The compiled tree.
    pub fn root(&self) -> &RuleNode<ConstraintPredicate> {
        &self.root
    }
}

impl From<&MembershipNode> for CompiledMembership {
    fn from(node: &MembershipNode) -> Self {
        Self::compile(node)
    }
}

fn compile_node(node: &MembershipNode) -> RuleNode<ConstraintPredicate> {
    RuleNode::new(
        node.operator,
        node.constraints.iter().map(ConstraintPredicate::from).collect(),
        node.children.iter().map(compile_node).collect(),
    )
}
