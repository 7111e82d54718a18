//! # Sort Builder
//!
//! Two modes, picked by whether an alias table is configured:
//! - field list: `sort=name,-age`
//! - alias + order: `sort=priority&order=desc`

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use super::errors::{MalformedQueryError, QueryResult};
use super::operator::validate_field;
use super::params::QueryParameters;
use super::value::{lookup_path, sort_order};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One (field, direction) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Parse the sort specification, falling back to `default` when absent
pub fn build_sort(
    params: &QueryParameters,
    default: &[SortKey],
    aliases: Option<&BTreeMap<String, String>>,
) -> QueryResult<Vec<SortKey>> {
    let raw = match params.single("sort")? {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(default.to_vec()),
    };

    let keys = match aliases {
        None => parse_field_list(raw)?,
        Some(aliases) => {
            let direction = match params.single("order")? {
                Some(order) if order.eq_ignore_ascii_case("desc") => SortDirection::Descending,
                _ => SortDirection::Ascending,
            };
            parse_aliased(raw, aliases, direction)?
        }
    };

    if keys.is_empty() {
        return Ok(default.to_vec());
    }
    Ok(keys)
}

fn parse_field_list(raw: &str) -> QueryResult<Vec<SortKey>> {
    let mut keys = Vec::new();

    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let key = match part.strip_prefix('-') {
            Some(field) => {
                if field.is_empty() {
                    return Err(MalformedQueryError::new("sort", "'-' without a field name"));
                }
                validate_field("sort", field)?;
                SortKey::desc(field)
            }
            None => {
                validate_field("sort", part)?;
                SortKey::asc(part)
            }
        };
        keys.push(key);
    }

    Ok(keys)
}

fn parse_aliased(
    raw: &str,
    aliases: &BTreeMap<String, String>,
    direction: SortDirection,
) -> QueryResult<Vec<SortKey>> {
    let mut keys = Vec::new();

    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if part.starts_with('-') {
            return Err(MalformedQueryError::new(
                "sort",
                "direction is set by the 'order' parameter",
            ));
        }
        validate_field("sort", part)?;

        let field = aliases.get(part).map(String::as_str).unwrap_or(part);
        keys.push(SortKey {
            field: field.to_string(),
            direction,
        });
    }

    Ok(keys)
}

/// Compare two documents by the sort keys; missing fields go last when ascending
pub fn compare_documents(a: &Value, b: &Value, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = match (lookup_path(a, &key.field), lookup_path(b, &key.field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => sort_order(x, y),
        };

        let ordering = match key.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
