//! Parameter maps: captured path parameters and alias-keyed tables.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Result, RouterError};

/// Path parameters captured by a single match attempt.
///
/// Entries keep the order in which their placeholders appear in the route
/// template. A placeholder that neither matched nor has a default is present
/// with no value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, Option<String>)>,
}

impl PathParams {
    /// Creates new empty path params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, keeping the position of an existing entry.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self.params.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => *slot = value,
            None => self.params.push((key, value)),
        }
    }

    /// Gets a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Gets a parameter value or returns an error.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::MissingParameter`] when the parameter is absent.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| RouterError::MissingParameter(key.to_string()))
    }

    /// Parses a parameter as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Returns `true` if the template declares a placeholder with this name.
    pub fn declares(&self, key: &str) -> bool {
        self.params.iter().any(|(name, _)| name == key)
    }

    /// Returns an iterator over the parameters in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Returns the number of declared parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if the route declares no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// A table keyed by placeholder name, filled from alias-set keys.
///
/// A key such as `"id|user_id"` assigns the same value to `id` and `user_id`.
/// Used for both constraint fragments and default values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<String, String>")]
pub struct AliasMap {
    entries: HashMap<String, String>,
}

impl AliasMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value under every alias of `alias_set`.
    pub fn insert(&mut self, alias_set: &str, value: impl Into<String>) {
        let value = value.into();
        for alias in alias_set.split('|').map(str::trim).filter(|a| !a.is_empty()) {
            self.entries.insert(alias.to_string(), value.clone());
        }
    }

    /// Adds a single entry, builder style.
    #[must_use]
    pub fn with(mut self, alias_set: &str, value: impl Into<String>) -> Self {
        self.insert(alias_set, value);
        self
    }

    /// Copies every entry of `other` into this map; `other` wins on conflict.
    pub fn merge(&mut self, other: &Self) {
        for (name, value) in &other.entries {
            self.entries.insert(name.clone(), value.clone());
        }
    }

    /// Gets the value for a placeholder name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Returns an iterator over the expanded entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of expanded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for AliasMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (alias_set, value) in iter {
            map.insert(alias_set.as_ref(), value);
        }
        map
    }
}

impl From<HashMap<String, String>> for AliasMap {
    fn from(raw: HashMap<String, String>) -> Self {
        raw.into_iter().collect()
    }
}

impl IntoIterator for AliasMap {
    type Item = (String, String);
    type IntoIter = std::collections::hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
