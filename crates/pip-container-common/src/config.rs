//! Flat, ordered configuration parameters.
//!
//! [`ConfigParams`] is the single configuration currency of the workspace:
//! container configuration, component configuration, and template parameters
//! are all flat string maps with dotted keys (`connection.host`). Nested
//! JSON/YAML documents are flattened into this form, preserving the document
//! order of their keys.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ContainerError, Result};

/// Insertion-ordered map of configuration keys to string values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigParams {
    values: IndexMap<String, String>,
}

impl ConfigParams {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates parameters from key-value pairs.
    #[must_use]
    pub fn from_tuples(pairs: &[(&str, &str)]) -> Self {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Flattens a JSON value into dotted keys.
    ///
    /// Objects contribute their field names and arrays their indexes as key
    /// segments. Scalars are rendered as text, `null` as an empty string.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Self {
        let mut params = Self::new();
        flatten_into(&mut params, None, value);
        params
    }

    /// Captures every process environment variable.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::vars().collect()
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Sets `key` to `value`, keeping the original position of an existing key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let _ = self.values.insert(key.into(), value.into());
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.shift_remove(key)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the value for `key`, or `default` when missing.
    #[must_use]
    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_owned()
    }

    /// Returns the first non-empty value among `keys`.
    #[must_use]
    pub fn get_first(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.is_empty())
    }

    /// Parses the value for `key` as an integer.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// Parses the value for `key` as an integer, or returns `default`.
    #[must_use]
    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }

    /// Parses the value for `key` as a boolean (`true`/`false`, `1`/`0`, `yes`/`no`).
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" | "t" => Some(true),
            "false" | "0" | "no" | "n" | "f" => Some(false),
            _ => None,
        }
    }

    /// Parses the value for `key` as a boolean, or returns `default`.
    #[must_use]
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// Names of top-level sections in first-appearance order.
    ///
    /// A key `a.b.c` belongs to section `a`; a key without dots is a section
    /// of its own.
    #[must_use]
    pub fn section_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for key in self.values.keys() {
            let name = key.split_once('.').map_or(key.as_str(), |(head, _)| head);
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_owned());
            }
        }
        names
    }

    /// Returns the parameters under `name.` with the prefix stripped.
    #[must_use]
    pub fn get_section(&self, name: &str) -> Self {
        let prefix = format!("{name}.");
        self.values
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(&prefix).map(|rest| (rest, v.as_str())))
            .collect()
    }

    /// Adds every entry of `section` under the `name.` prefix.
    pub fn add_section(&mut self, name: &str, section: &Self) {
        for (key, value) in section.iter() {
            self.set(format!("{name}.{key}"), value);
        }
    }

    /// Returns a copy where entries of `other` replace entries of `self`.
    #[must_use]
    pub fn override_with(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (key, value) in other.iter() {
            result.set(key, value);
        }
        result
    }

    /// Returns a copy where entries of `defaults` fill keys missing in `self`.
    #[must_use]
    pub fn set_defaults(&self, defaults: &Self) -> Self {
        defaults.override_with(self)
    }
}

fn flatten_into(params: &mut ConfigParams, prefix: Option<&str>, value: &serde_json::Value) {
    let child_key = |segment: &str| match prefix {
        Some(p) => format!("{p}.{segment}"),
        None => segment.to_owned(),
    };
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                flatten_into(params, Some(&child_key(key)), child);
            }
        }
        serde_json::Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(params, Some(&child_key(&index.to_string())), child);
            }
        }
        serde_json::Value::Null => {
            if let Some(key) = prefix {
                params.set(key, "");
            }
        }
        serde_json::Value::String(s) => {
            if let Some(key) = prefix {
                params.set(key, s.as_str());
            }
        }
        scalar => {
            if let Some(key) = prefix {
                params.set(key, scalar.to_string());
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

/// Parses `key1=value1;key2=value2`. Empty pairs are skipped.
impl FromStr for ConfigParams {
    type Err = ContainerError;

    fn from_str(value: &str) -> Result<Self> {
        let mut params = Self::new();
        for pair in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, val)) = pair.split_once('=') else {
                return Err(ContainerError::config(format!(
                    "parameter \"{pair}\" is in wrong format, expected key=value"
                )));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ContainerError::config(format!(
                    "parameter \"{pair}\" has an empty key"
                )));
            }
            params.set(key, val.trim());
        }
        Ok(params)
    }
}

impl fmt::Display for ConfigParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                f.write_str(";")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}
