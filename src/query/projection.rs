//! # Field Projector

use serde_json::{Map, Value};

use super::errors::{MalformedQueryError, QueryResult};
use super::operator::validate_field;
use super::params::QueryParameters;
use super::value::lookup_path;

/// Which fields of a document are returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Only these fields (plus `_id`)
    Include(Vec<String>),

    /// Everything except these fields
    Exclude(Vec<String>),
}

impl Projection {
    /// Project a stored document. `hidden` fields are dropped unless included by name.
    pub fn apply(&self, doc: &Value, hidden: &[&str]) -> Value {
        let Some(source) = doc.as_object() else {
            return doc.clone();
        };

        match self {
            Projection::Include(fields) => {
                let mut out = Map::new();
                if let Some(id) = source.get("_id") {
                    out.insert("_id".to_string(), id.clone());
                }
                for field in fields {
                    if let Some(value) = lookup_path(doc, field) {
                        insert_path(&mut out, field, value.clone());
                    }
                }
                Value::Object(out)
            }
            Projection::Exclude(fields) => {
                let mut out = source.clone();
                for field in fields.iter().map(String::as_str).chain(hidden.iter().copied()) {
                    remove_path(&mut out, field);
                }
                Value::Object(out)
            }
        }
    }
}

fn insert_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}

fn remove_path(target: &mut Map<String, Value>, path: &str) {
    match path.split_once('.') {
        None => {
            target.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(child)) = target.get_mut(head) {
                remove_path(child, rest);
            }
        }
    }
}

/// Parse `fields`; absent or empty excludes only the metadata field
pub fn build_projection(params: &QueryParameters, metadata_field: &str) -> QueryResult<Projection> {
    let raw = match params.single("fields")? {
        Some(raw) => raw,
        None => return Ok(Projection::Exclude(vec![metadata_field.to_string()])),
    };

    let mut fields: Vec<String> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if part.starts_with('-') {
            return Err(MalformedQueryError::new(
                "fields",
                "exclusions cannot be mixed into an inclusion list",
            ));
        }
        validate_field("fields", part)?;

        if !fields.iter().any(|f| f == part) {
            fields.push(part.to_string());
        }
    }

    if fields.is_empty() {
        return Ok(Projection::Exclude(vec![metadata_field.to_string()]));
    }
    Ok(Projection::Include(fields))
}
