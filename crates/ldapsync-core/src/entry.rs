//! Directory entries and the entry store
//!
//! Entries are fetched once per sync and never change afterwards.

use serde::{Deserialize, Serialize};

/// Pseudo-attribute name standing for the distinguished name.
pub const DN_ATTRIBUTE: &str = "dn";

/// Check whether an attribute name refers to the distinguished name.
pub fn is_dn_attribute(name: &str) -> bool {
    name.eq_ignore_ascii_case(DN_ATTRIBUTE)
}

/// A named, multi-valued attribute of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, compared case-sensitively.
    #[serde(alias = "Name")]
    pub name: String,
    /// Values in the order the server returned them.
    #[serde(default, alias = "Values")]
    pub values: Vec<String>,
}

impl Attribute {
    /// Create an attribute from a name and its values.
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {:?}", self.name, self.values)
    }
}

/// A directory entry: a distinguished name and its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Distinguished name (e.g. "uid=johnd,ou=users,dc=example,dc=com").
    #[serde(alias = "DN", alias = "distinguishedName")]
    pub dn: String,
    /// Attributes in fetch order.
    #[serde(default, alias = "Attributes")]
    pub attributes: Vec<Attribute>,
}

impl Entry {
    /// Create an entry with no attributes.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: Vec::new(),
        }
    }

    /// Add an attribute using builder pattern.
    #[must_use]
    pub fn with<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.attributes.push(Attribute::new(name, values));
        self
    }

    /// Values of the first attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|att| att.name == name)
            .map(|att| att.values.as_slice())
    }

    /// Values of every attribute called `name`, in order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attributes
            .iter()
            .filter(move |att| att.name == name)
            .flat_map(|att| att.values.iter().map(String::as_str))
    }

    /// Check whether any attribute called `name` carries exactly `value`.
    pub fn has_value(&self, name: &str, value: &str) -> bool {
        self.values(name).any(|v| v == value)
    }

    /// Simple name of the entry, see [`simple_name`].
    pub fn simple_name(&self) -> &str {
        simple_name(&self.dn)
    }
}

/// Value of the first RDN of a DN: the text after the first `=` of the first
/// comma-separated component. Empty when that component has no `=`.
///
/// Only the first `=` splits; later ones stay in the value, so `cn=a=b,dc=x`
/// gives `a=b`, not `a`.
pub fn simple_name(dn: &str) -> &str {
    let first_rdn = dn.split(',').next().unwrap_or_default();
    match first_rdn.split_once('=') {
        Some((_, value)) => value,
        None => "",
    }
}

/// Immutable list of fetched entries, in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryStore {
    entries: Vec<Entry>,
}

impl EntryStore {
    /// Wrap fetched entries.
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in fetch order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// All entries as a slice.
    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

}

impl From<Vec<Entry>> for EntryStore {
    fn from(entries: Vec<Entry>) -> Self {
        Self::new(entries)
    }
}

impl FromIterator<Entry> for EntryStore {
    fn from_iter<T: IntoIterator<Item = Entry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EntryStore {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
