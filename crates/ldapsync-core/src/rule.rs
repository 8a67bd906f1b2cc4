//! AND/OR rule trees
//!
//! Both the user/group filters and the membership associator are trees of
//! predicates joined by an [`Operator`]. They share [`RuleNode`] and its
//! short-circuiting [`RuleNode::evaluate`] fold.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Logical operator joining the predicates and children of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Every predicate and every child must hold.
    #[default]
    And,
    /// At least one predicate or child must hold.
    Or,
}

impl Operator {
    /// Get the lowercase name of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" | "&" => Ok(Operator::And),
            "or" | "|" => Ok(Operator::Or),
            other => Err(format!("unknown operator '{other}', expected 'and' or 'or'")),
        }
    }
}

// Accepts names ("and", "OR", "&") and the numeric codes of older sync
// configurations (0 = and, 1 = or).
impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(u64),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Code(0) => Ok(Operator::And),
            Repr::Code(1) => Ok(Operator::Or),
            Repr::Code(n) => Err(de::Error::custom(format!("unknown operator code {n}"))),
            Repr::Name(name) => name.parse().map_err(de::Error::custom),
        }
    }
}

/// A compiled rule tree: predicates of type `P` plus nested child nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleNode<P> {
    operator: Operator,
    predicates: Vec<P>,
    children: Vec<RuleNode<P>>,
}

impl<P> RuleNode<P> {
    /// Create a node.
    pub fn new(operator: Operator, predicates: Vec<P>, children: Vec<RuleNode<P>>) -> Self {
        Self {
            operator,
            predicates,
            children,
        }
    }

    /// Operator of this node.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Predicates of this node, in evaluation order.
    pub fn predicates(&self) -> &[P] {
        &self.predicates
    }

    /// Child nodes, in evaluation order.
    pub fn children(&self) -> &[RuleNode<P>] {
        &self.children
    }

    /// Iterate over every predicate of the tree, depth first.
    pub fn walk(&self) -> Box<dyn Iterator<Item = &P> + '_> {
        Box::new(
            self.predicates
                .iter()
                .chain(self.children.iter().flat_map(RuleNode::walk)),
        )
    }

    /// Evaluate the tree with `eval` deciding each predicate.
    ///
    /// Predicates are visited before children, both in order, and evaluation
    /// stops at the first decisive result: the first `false` under
    /// [`Operator::And`], the first `true` under [`Operator::Or`]. A node with
    /// nothing to evaluate is `true` under `And` and `false` under `Or`.
    pub fn evaluate<F>(&self, eval: &F) -> bool
    where
        F: Fn(&P) -> bool,
    {
        match self.operator {
            Operator::And => {
                self.predicates.iter().all(eval)
                    && self.children.iter().all(|child| child.evaluate(eval))
            }
            Operator::Or => {
                self.predicates.iter().any(eval)
                    || self.children.iter().any(|child| child.evaluate(eval))
            }
        }
    }
}
