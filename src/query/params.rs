//! # Query Parameters
//!
//! The immutable input of the translator: URL query-string pairs grouped by
//! key. Repeated keys collapse into a multi-valued entry.

use std::collections::BTreeMap;

use super::errors::{MalformedQueryError, QueryResult};

/// Value of a single query parameter key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Key appeared once
    Single(String),

    /// Key appeared more than once, in order of appearance
    Many(Vec<String>),
}

impl ParamValue {
    /// The value if the key appeared exactly once
    pub fn as_single(&self) -> Option<&str> {
        match self {
            ParamValue::Single(v) => Some(v),
            ParamValue::Many(_) => None,
        }
    }

    fn push(&mut self, value: String) {
        match self {
            ParamValue::Single(first) => {
                *self = ParamValue::Many(vec![std::mem::take(first), value]);
            }
            ParamValue::Many(values) => values.push(value),
        }
    }
}

/// Parsed query-string parameters, ordered by key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    entries: BTreeMap<String, ParamValue>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw (still percent-encoded) query string
    pub fn parse(query: &str) -> QueryResult<Self> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| MalformedQueryError::new("", format!("invalid query string: {}", e)))?;

        Ok(pairs.into_iter().collect())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Value of a key that must not be repeated
    pub fn single(&self, key: &str) -> QueryResult<Option<&str>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(ParamValue::Single(v)) => Ok(Some(v)),
            Some(ParamValue::Many(_)) => Err(MalformedQueryError::new(
                key,
                "parameter may only be given once",
            )),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy keeping only parameters whose field name is in `fields`.
    ///
    /// `age[gte]` counts as field `age`.
    pub fn restricted_to(&self, fields: &[&str]) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(key, _)| fields.contains(&field_name(key)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self { entries }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: BTreeMap<String, ParamValue> = BTreeMap::new();

        for (key, value) in iter {
            let key = key.into();
            let value = value.into();
            match entries.get_mut(&key) {
                Some(existing) => existing.push(value),
                None => {
                    entries.insert(key, ParamValue::Single(value));
                }
            }
        }

        Self { entries }
    }
}

/// Field part of a parameter key (`age[gte]` -> `age`)
pub fn field_name(key: &str) -> &str {
    key.split('[').next().unwrap_or(key)
}
