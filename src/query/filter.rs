//! # Filter Builder
//!
//! Turns the non-control query parameters into field predicates.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use super::errors::{MalformedQueryError, QueryResult};
use super::operator::{rewrite_key, ComparisonOp, ParsedKey};
use super::params::{field_name, ParamValue, QueryParameters};
use super::value::{coerce_cmp, lookup_path};

/// Condition on a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field equals the value
    Eq(Value),

    /// Field equals any of the values (repeated parameter)
    AnyOf(Vec<Value>),

    /// Every listed comparison holds
    Compare(BTreeMap<ComparisonOp, Value>),
}

impl Predicate {
    /// Evaluate against the stored value (if any)
    pub fn matches(&self, stored: Option<&Value>) -> bool {
        match (self, stored) {
            (Predicate::Eq(wanted), None) => wanted.is_null(),
            (Predicate::Eq(wanted), Some(stored)) => equals(stored, wanted),
            (Predicate::AnyOf(options), None) => options.iter().any(Value::is_null),
            (Predicate::AnyOf(options), Some(stored)) => {
                options.iter().any(|wanted| equals(stored, wanted))
            }
            (Predicate::Compare(_), None) => false,
            (Predicate::Compare(ops), Some(stored)) => compares(stored, ops),
        }
    }
}

fn equals(stored: &Value, wanted: &Value) -> bool {
    if coerce_cmp(stored, wanted) == Some(Ordering::Equal) {
        return true;
    }
    match stored {
        Value::Array(items) => items
            .iter()
            .any(|item| coerce_cmp(item, wanted) == Some(Ordering::Equal)),
        other => other == wanted,
    }
}

fn compares(stored: &Value, ops: &BTreeMap<ComparisonOp, Value>) -> bool {
    let check = |value: &Value| {
        ops.iter().all(|(op, wanted)| {
            coerce_cmp(value, wanted)
                .map(|ordering| op.accepts(ordering))
                .unwrap_or(false)
        })
    };

    match stored {
        Value::Array(items) => items.iter().any(check),
        other => check(other),
    }
}

/// Conjunction of field predicates; empty matches everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: BTreeMap<String, Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`, replacing any earlier predicate
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates
            .insert(field.into(), Predicate::Eq(value.into()));
        self
    }

    pub fn get(&self, field: &str) -> Option<&Predicate> {
        self.predicates.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.predicates.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Check if a document matches all predicates
    pub fn matches(&self, doc: &Value) -> bool {
        self.predicates
            .iter()
            .all(|(field, predicate)| predicate.matches(lookup_path(doc, field)))
    }

    /// Render in the document-store dialect (`{"age": {"$gte": "18"}}`)
    pub fn to_backend(&self) -> Value {
        let mut out = serde_json::Map::new();
        for (field, predicate) in &self.predicates {
            let rendered = match predicate {
                Predicate::Eq(value) => value.clone(),
                Predicate::AnyOf(values) => {
                    serde_json::json!({ "$in": values })
                }
                Predicate::Compare(ops) => Value::Object(
                    ops.iter()
                        .map(|(op, v)| (op.backend_marker().to_string(), v.clone()))
                        .collect(),
                ),
            };
            out.insert(field.clone(), rendered);
        }
        Value::Object(out)
    }
}

/// Build the filter from every parameter whose field is not a control key
pub fn build_filter(params: &QueryParameters, control_keys: &[String]) -> QueryResult<Filter> {
    let mut predicates: BTreeMap<String, Predicate> = BTreeMap::new();

    for (key, value) in params.iter() {
        if control_keys.iter().any(|c| c == field_name(key)) {
            continue;
        }

        match rewrite_key(key)? {
            ParsedKey::Plain(field) => {
                let predicate = match value {
                    ParamValue::Single(v) => Predicate::Eq(Value::String(v.clone())),
                    ParamValue::Many(vs) => {
                        Predicate::AnyOf(vs.iter().cloned().map(Value::String).collect())
                    }
                };
                if predicates.contains_key(&field) {
                    return Err(mixed(key));
                }
                predicates.insert(field, predicate);
            }
            ParsedKey::Operator { field, op } => {
                let wanted = value.as_single().ok_or_else(|| {
                    MalformedQueryError::new(key, "comparison may only be given once")
                })?;

                match predicates
                    .entry(field)
                    .or_insert_with(|| Predicate::Compare(BTreeMap::new()))
                {
                    Predicate::Compare(ops) => {
                        ops.insert(op, Value::String(wanted.to_string()));
                    }
                    _ => return Err(mixed(key)),
                }
            }
        }
    }

    Ok(Filter { predicates })
}

fn mixed(key: &str) -> MalformedQueryError {
    MalformedQueryError::new(key, "field is given both as equality and as comparison")
}
