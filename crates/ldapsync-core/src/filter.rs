//! Filter engine
//!
//! Classifies entries as users or groups. A [`FilterNode`] is the
//! configuration form; [`CompiledFilter::compile`] turns it into an immutable
//! tree whose regular expressions are built up front, so evaluation never
//! mutates anything and a compiled filter can be shared across threads.
//!
//! ```
//! use ldapsync_core::entry::Entry;
//! use ldapsync_core::filter::{CompiledFilter, FilterExpression, FilterNode};
//! use ldapsync_core::rule::Operator;
//!
//! // (&(memberOf=cn=access,ou=groups,dc=example,dc=org)(cn=Developers))
//! let node = FilterNode::new(Operator::And)
//!     .with_expression(FilterExpression::new("memberOf", "^cn=access,"))
//!     .with_expression(FilterExpression::new("cn", "Dev"));
//! let filter = CompiledFilter::compile(&node);
//!
//! let entry = Entry::new("cn=Developers,ou=groups,dc=example,dc=org")
//!     .with("cn", ["Developers"])
//!     .with("memberOf", ["cn=access,ou=groups,dc=example,dc=org"]);
//! assert!(filter.matches_entry(&entry));
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entry::{is_dn_attribute, Entry};
use crate::rule::{Operator, RuleNode};

/// A single filter test against one attribute.
///
/// When `name` is `"dn"` (any case) `value` is compared literally with the
/// entry DN. Otherwise `value` is a regular expression searched for in every
/// value of the attribute called `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterExpression {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Value")]
    pub value: String,
}

impl FilterExpression {
    /// Create a filter expression.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create an exact DN expression.
    pub fn dn(value: impl Into<String>) -> Self {
        Self::new("dn", value)
    }
}

/// Configuration form of a filter tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterNode {
    #[serde(default, alias = "Operator")]
    pub operator: Operator,

    #[serde(default, alias = "filters", alias = "Filters")]
    pub expressions: Vec<FilterExpression>,

    #[serde(default, alias = "filterGroups", alias = "FilterGroups")]
    pub children: Vec<FilterNode>,
}

impl FilterNode {
    /// Create an empty node.
    pub fn new(operator: Operator) -> Self {
        Self {
            operator,
            expressions: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an expression using builder pattern.
    #[must_use]
    pub fn with_expression(mut self, expression: FilterExpression) -> Self {
        self.expressions.push(expression);
        self
    }

    /// Add a child node using builder pattern.
    #[must_use]
    pub fn with_child(mut self, child: FilterNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A compiled filter predicate.
#[derive(Debug, Clone)]
pub enum FilterPredicate {
    /// Literal DN equality.
    Dn { value: String },
    /// Regular expression searched in the values of `attribute`.
    Regex { attribute: String, regex: Regex },
    /// Pattern that failed to compile. Never matches.
    Invalid { attribute: String, pattern: String },
}

impl FilterPredicate {
    fn compile(expression: &FilterExpression) -> Self {
        if is_dn_attribute(&expression.name) {
            return FilterPredicate::Dn {
                value: expression.value.clone(),
            };
        }

        match Regex::new(&expression.value) {
            Ok(regex) => FilterPredicate::Regex {
                attribute: expression.name.clone(),
                regex,
            },
            Err(e) => {
                warn!(
                    attribute = %expression.name,
                    pattern = %expression.value,
                    error = %e,
                    "Filter pattern does not compile; expression will never match"
                );
                FilterPredicate::Invalid {
                    attribute: expression.name.clone(),
                    pattern: expression.value.clone(),
                }
            }
        }
    }

    /// Test this predicate against an entry.
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            FilterPredicate::Dn { value } => entry.dn == *value,
            FilterPredicate::Regex { attribute, regex } => {
                entry.values(attribute).any(|v| regex.is_match(v))
            }
            FilterPredicate::Invalid { .. } => false,
        }
    }

    /// Check whether this predicate came from a pattern that failed to compile.
    pub fn is_invalid(&self) -> bool {
        matches!(self, FilterPredicate::Invalid { .. })
    }
}

/// An immutable, ready-to-evaluate filter tree.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    root: RuleNode<FilterPredicate>,
}

impl CompiledFilter {
    /// Compile a filter tree. Invalid patterns are kept as never-matching
    /// predicates rather than rejected.
    pub fn compile(node: &FilterNode) -> Self {
        Self {
            root: compile_node(node),
        }
    }

    /// Test an entry that may be absent. An absent entry never matches.
    pub fn matches(&self, entry: Option<&Entry>) -> bool {
        entry.is_some_and(|e| self.matches_entry(e))
    }

    /// Test an entry.
    pub fn matches_entry(&self, entry: &Entry) -> bool {
        self.root.evaluate(&|predicate: &FilterPredicate| predicate.matches(entry))
    }

    /// The compiled tree.
    pub fn root(&self) -> &RuleNode<FilterPredicate> {
        &self.root
    }

    /// Number of predicates whose pattern failed to compile.
    pub fn invalid_count(&self) -> usize {
        self.root.walk().filter(|p| p.is_invalid()).count()
    }
}

impl From<&FilterNode> for CompiledFilter {
    fn from(node: &FilterNode) -> Self {
        Self::compile(node)
    }
}

fn compile_node(node: &FilterNode) -> RuleNode<FilterPredicate> {
    RuleNode::new(
        node.operator,
        node.expressions.iter().map(FilterPredicate::compile).collect(),
        node.children.iter().map(compile_node).collect(),
    )
}
