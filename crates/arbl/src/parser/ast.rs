//! Public AST types for ICU-style message templates.
//!
//! These types are public to enable external tooling (validators, coverage
//! reports, editors).

use std::collections::{BTreeMap, BTreeSet};

use crate::types::PluralCategory;

/// A parsed message: an ordered sequence of nodes rendered by concatenation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub nodes: Vec<Node>,
}

/// A node within a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text (escapes already resolved).
    Literal(String),
    /// A named placeholder: `{name}`.
    Placeholder(String),
    /// The `#` token inside a plural case body: the offset-adjusted count.
    PluralValue,
    /// `{arg, plural, offset:N? selector{...} ...}`
    Plural {
        arg: String,
        offset: i64,
        cases: BTreeMap<PluralSelector, Message>,
    },
    /// `{arg, select, selector{...} ... other{...}}`
    Select {
        arg: String,
        cases: BTreeMap<String, Message>,
    },
}

/// A case selector inside a plural construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluralSelector {
    /// `=N`: matches exactly this value.
    Exact(i64),
    /// A CLDR category keyword, including `other`.
    Category(PluralCategory),
}

impl PluralSelector {
    /// The `other` selector every plural construct must carry.
    pub const OTHER: PluralSelector = PluralSelector::Category(PluralCategory::Other);
}

impl Message {
    /// Whether the message renders to nothing.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visit every node in the tree, depth first, in source order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        for node in &self.nodes {
            visit(node);
            match node {
                Node::Plural { cases, .. } => {
                    for body in cases.values() {
                        body.walk(visit);
                    }
                }
                Node::Select { cases, .. } => {
                    for body in cases.values() {
                        body.walk(visit);
                    }
                }
                Node::Literal(_) | Node::Placeholder(_) | Node::PluralValue => {}
            }
        }
    }

    /// Names of every argument referenced anywhere in the message.
    pub fn arguments(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.walk(&mut |node| match node {
            Node::Placeholder(name) => {
                names.insert(name.as_str());
            }
            Node::Plural { arg, .. } | Node::Select { arg, .. } => {
                names.insert(arg.as_str());
            }
            Node::Literal(_) | Node::PluralValue => {}
        });
        names
    }

    /// The argument of the root plural construct, when the message is a
    /// single plural (optionally surrounded by whitespace).
    pub fn root_plural_argument(&self) -> Option<&str> {
        let mut significant = self
            .nodes
            .iter()
            .filter(|node| !matches!(node, Node::Literal(text) if text.trim().is_empty()));
        match (significant.next(), significant.next()) {
            (Some(Node::Plural { arg, .. }), None) => Some(arg),
            _ => None,
        }
    }
}
