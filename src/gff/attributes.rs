//! The GFF3 attribute column codec.
//!
//! The ninth GFF3 column is a `;`-delimited list of `key=value` pairs. Parsing keeps
//! the first-seen key order (an [`IndexMap`]), and serialization can hoist the reserved
//! keys to the front; see [`CanonicalOrder`].
//!
//! Parsing is deliberately lenient:
//!
//!  - empty segments (e.g. a trailing `;`) are ignored,
//!  - GTF-style `key "value"` segments are accepted when the value is fully quoted,
//!    with the quotes stripped,
//!  - segments with neither form are logged as malformed and dropped,
//!  - an empty value (`Parent=`) is kept as an empty string, which is distinct from the
//!    key being absent.

use indexmap::IndexMap;
use log::warn;

pub const ID: &str = "ID";
pub const NAME: &str = "Name";
pub const PARENT: &str = "Parent";
pub const LOCUS_TAG: &str = "locus_tag";

/// Key ordering used when serializing an [`Attributes`] map.
///
/// This is a stable partial reorder: the hoisted keys move to the front and every other
/// key keeps its relative insertion order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CanonicalOrder {
    /// `ID`, `Name`, `Parent`, then the remaining keys.
    #[default]
    IdNameParent,
    /// `ID`, then the remaining keys in insertion order.
    IdFirst,
    /// Strict insertion order.
    Insertion,
}

impl CanonicalOrder {
    fn hoisted(&self) -> &'static [&'static str] {
        match self {
            CanonicalOrder::IdNameParent => &[ID, NAME, PARENT],
            CanonicalOrder::IdFirst => &[ID],
            CanonicalOrder::Insertion => &[],
        }
    }
}

/// An ordered mapping of attribute keys to their raw string values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    map: IndexMap<String, String>,
}

fn strip_value(value: &str) -> String {
    value.trim().trim_matches('"').trim().to_string()
}

/// Split a GTF-style `key "value"` segment. The value must be fully quoted.
fn split_quoted(segment: &str) -> Option<(&str, &str)> {
    let (key, value) = segment.split_once(char::is_whitespace)?;
    let value = value.trim();
    let quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    quoted.then_some((key.trim(), value))
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw attribute column. Malformed segments are logged and skipped, never
    /// raised as errors.
    pub fn parse(raw: &str) -> Self {
        Self::parse_counted(raw).0
    }

    /// Like [`Attributes::parse`], also returning how many segments were dropped as
    /// malformed.
    pub fn parse_counted(raw: &str) -> (Self, usize) {
        let mut attrs = Self::new();
        let mut malformed = 0;
        let raw = raw.trim();
        if raw.is_empty() || raw == "." {
            return (attrs, malformed);
        }
        for segment in raw.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            if let Some((key, value)) = segment.split_once('=') {
                attrs.set(key.trim(), strip_value(value));
            } else if let Some((key, value)) = split_quoted(segment) {
                attrs.set(key, strip_value(value));
            } else {
                warn!("{:?} is not a well formatted attribute: no tag", segment);
                malformed += 1;
            }
        }
        (attrs, malformed)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// Set a key's value. An existing key keeps its position; a new key is appended.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    /// Remove a key, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.map.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn id(&self) -> Option<&str> {
        self.get(ID)
    }

    pub fn parent(&self) -> Option<&str> {
        self.get(PARENT)
    }

    pub fn name(&self) -> Option<&str> {
        self.get(NAME)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize to `key=value;key=value`, ordered according to `order`. An empty
    /// map serializes to GFF3's missing-value placeholder `.`.
    pub fn serialize(&self, order: CanonicalOrder) -> String {
        if self.is_empty() {
            return ".".to_string();
        }
        let hoisted = order.hoisted();
        let front = hoisted
            .iter()
            .filter_map(|key| self.map.get_key_value(*key));
        let rest = self
            .map
            .iter()
            .filter(|(key, _)| !hoisted.contains(&key.as_str()));
        front
            .chain(rest)
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl std::fmt::Display for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.serialize(CanonicalOrder::Insertion))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attrs = Attributes::new();
        for (key, value) in iter {
            attrs.set(key, value);
        }
        attrs
    }
}
