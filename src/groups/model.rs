//! Contact group model.

use std::sync::OnceLock;

use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::http_server::{ApiError, ApiResult};
use crate::store::CollectionSpec;

/// Groups carry `createdAt` only, set on creation
pub const GROUPS: CollectionSpec = CollectionSpec {
    name: "groups",
    hidden: &[],
    unique: &["name"],
    timestamps: false,
};

/// Contact fields copied into a group's `members` on reads
pub const MEMBER_FIELDS: &[&str] = &["firstName", "lastName", "email"];

fn is_hex_color(color: &str) -> bool {
    static HEX_COLOR: OnceLock<Option<Regex>> = OnceLock::new();
    HEX_COLOR
        .get_or_init(|| Regex::new(r"(?i)^#([0-9A-F]{3}){1,2}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(color))
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupInput {
    #[validate(length(min = 1, message = "A group must have a name"))]
    pub name: Option<String>,

    #[validate(length(max = 100, message = "A group description can not be more than 100 characters"))]
    pub description: Option<String>,

    pub color: Option<String>,

    /// Owner; must be the caller when given
    pub user_id: Option<String>,

    /// Contact ids
    pub members: Option<Vec<String>>,
}

impl GroupInput {
    /// Checked fields for the store, owned by `owner`
    pub fn into_document(mut self, owner: &str, creating: bool) -> ApiResult<Map<String, Value>> {
        self.name = self.name.map(|n| n.trim().to_string());
        self.validate()?;

        if let Some(user_id) = &self.user_id {
            if user_id != owner {
                let message = if creating {
                    "You can't create a group for another user"
                } else {
                    "You can't access this group"
                };
                return Err(ApiError::Forbidden(message.to_string()));
            }
        }

        let mut doc = Map::new();

        match self.name {
            Some(name) => {
                doc.insert("name".into(), Value::String(name));
            }
            None if creating => {
                return Err(ApiError::Validation("A group must have a name".to_string()))
            }
            None => {}
        }

        if let Some(description) = self.description {
            doc.insert("description".into(), Value::String(description));
        }

        if let Some(color) = self.color {
            if !is_hex_color(&color) {
                return Err(ApiError::Validation(
                    "Color must be a valid hex color code".to_string(),
                ));
            }
            doc.insert("color".into(), Value::String(color));
        }

        if let Some(members) = self.members {
            doc.insert(
                "members".into(),
                Value::Array(members.into_iter().map(Value::String).collect()),
            );
        } else if creating {
            doc.insert("members".into(), Value::Array(Vec::new()));
        }

        if creating {
            doc.insert("userId".into(), Value::String(owner.to_string()));
            doc.insert(
                "createdAt".into(),
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }

        Ok(doc)
    }
}
