// Nameday module
// In-memory name-day table decoded from the JSON data file

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::utils::date::DateKey;

/// One table value: either a single name or several names for the same day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamedayEntry {
    Single(String),
    Multiple(Vec<String>),
}

impl NamedayEntry {
    /// Raw display text; multiple names are joined in their original order.
    ///
    /// # Examples
    /// ```
    /// use nameday_bar::models::nameday::NamedayEntry;
    ///
    /// let entry = NamedayEntry::Multiple(vec!["Adam".into(), "Eva".into()]);
    /// assert_eq!(entry.display_text(), "Adam, Eva");
    /// ```
    pub fn display_text(&self) -> String {
        match self {
            NamedayEntry::Single(name) => name.clone(),
            NamedayEntry::Multiple(names) => names.join(", "),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            NamedayEntry::Single(name) => vec![name.as_str()],
            NamedayEntry::Multiple(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for NamedayEntry {
    fn from(name: &str) -> Self {
        NamedayEntry::Single(name.to_string())
    }
}

impl From<Vec<&str>> for NamedayEntry {
    fn from(names: Vec<&str>) -> Self {
        NamedayEntry::Multiple(names.into_iter().map(str::to_string).collect())
    }
}

/// Mapping of `MM-DD` keys to entries. Keys are kept as written in the
/// file; entries under keys that are not valid dates are never looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedayTable {
    entries: HashMap<String, NamedayEntry>,
}

impl NamedayTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<NamedayEntry>) {
        self.entries.insert(key.into(), entry.into());
    }

    pub fn get(&self, key: &DateKey) -> Option<&NamedayEntry> {
        self.entries.get(&key.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamedayEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Keys present in the file that do not parse as `MM-DD`, sorted.
    pub fn invalid_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .entries
            .keys()
            .map(String::as_str)
            .filter(|key| key.parse::<DateKey>().is_err())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Calendar days (leap day included) that have no entry, in calendar order.
    pub fn missing_keys(&self) -> Vec<DateKey> {
        DateKey::all().filter(|key| self.get(key).is_none()).collect()
    }
}

impl FromIterator<(String, NamedayEntry)> for NamedayTable {
    fn from_iter<I: IntoIterator<Item = (String, NamedayEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
