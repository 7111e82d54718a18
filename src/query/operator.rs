//! # Operator Rewriter
//!
//! Recognizes `field[op]` parameter keys and maps the bracketed keyword to a
//! comparison operator. Only whole tokens are recognized, so a field that
//! merely contains an operator name (`gte_count`) is left alone.

use serde::{Deserialize, Serialize};

use super::errors::{MalformedQueryError, QueryResult};

/// Comparison operators accepted in bracket form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// Greater than
    #[serde(rename = "gt")]
    Gt,

    /// Greater than or equal
    #[serde(rename = "gte")]
    Gte,

    /// Less than
    #[serde(rename = "lt")]
    Lt,

    /// Less than or equal
    #[serde(rename = "lte")]
    Lte,
}

impl ComparisonOp {
    /// Keyword as it appears in a parameter key
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Gt => "gt",
            ComparisonOp::Gte => "gte",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Lte => "lte",
        }
    }

    /// Operator marker in the document-store dialect
    pub fn backend_marker(&self) -> &'static str {
        match self {
            ComparisonOp::Gt => "$gt",
            ComparisonOp::Gte => "$gte",
            ComparisonOp::Lt => "$lt",
            ComparisonOp::Lte => "$lte",
        }
    }

    /// Exact-token lookup
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(ComparisonOp::Gt),
            "gte" => Some(ComparisonOp::Gte),
            "lt" => Some(ComparisonOp::Lt),
            "lte" => Some(ComparisonOp::Lte),
            _ => None,
        }
    }

    /// Whether a stored-vs-wanted ordering satisfies this operator
    pub fn accepts(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;

        match self {
            ComparisonOp::Gt => ordering == Greater,
            ComparisonOp::Gte => ordering != Less,
            ComparisonOp::Lt => ordering == Less,
            ComparisonOp::Lte => ordering != Greater,
        }
    }
}

/// A parameter key after rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedKey {
    /// `field=value` equality
    Plain(String),

    /// `field[op]=value` comparison
    Operator { field: String, op: ComparisonOp },
}

/// Rewrite one parameter key
pub fn rewrite_key(key: &str) -> QueryResult<ParsedKey> {
    let Some(open) = key.find('[') else {
        if key.contains(']') {
            return Err(MalformedQueryError::new(key, "unbalanced bracket"));
        }
        validate_field(key, key)?;
        return Ok(ParsedKey::Plain(key.to_string()));
    };

    let field = &key[..open];
    let token = key[open + 1..]
        .strip_suffix(']')
        .ok_or_else(|| MalformedQueryError::new(key, "unbalanced bracket"))?;

    if token.contains('[') || token.contains(']') {
        return Err(MalformedQueryError::new(key, "nested brackets are not supported"));
    }

    validate_field(key, field)?;

    let op = ComparisonOp::from_token(token)
        .ok_or_else(|| MalformedQueryError::new(key, format!("unknown operator '{}'", token)))?;

    Ok(ParsedKey::Operator {
        field: field.to_string(),
        op,
    })
}

/// Field names must be non-empty, free of whitespace and not start with `$`
pub(crate) fn validate_field(key: &str, field: &str) -> QueryResult<()> {
    if field.is_empty() {
        return Err(MalformedQueryError::new(key, "empty field name"));
    }
    if field.chars().any(char::is_whitespace) {
        return Err(MalformedQueryError::new(key, "field name contains whitespace"));
    }
    if field.starts_with('$') {
        return Err(MalformedQueryError::new(key, "field name may not start with '$'"));
    }
    Ok(())
}
