//! Contact document model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::http_server::{ApiError, ApiResult};
use crate::query::parse_instant;
use crate::store::CollectionSpec;

pub const CONTACTS: CollectionSpec = CollectionSpec {
    name: "contacts",
    hidden: &[],
    unique: &[],
    timestamps: true,
};

/// Parameters honoured by contact search
pub const SEARCH_FIELDS: &[&str] = &["firstName", "lastName", "email", "phone", "company"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialMedia {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
}

/// Create and update body for a contact
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "A first name is required"))]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "A last name is required"))]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "note cannot be longer than 1000 characters"))]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_media: Option<SocialMedia>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl ContactInput {
    /// Checked fields ready for the store. Creation requires both names and
    /// an email, and defaults `isFavorite` to false.
    pub fn into_document(mut self, creating: bool) -> ApiResult<Map<String, Value>> {
        self.validate()?;

        if creating {
            if self.first_name.is_none() {
                return Err(ApiError::Validation("A first name is required".to_string()));
            }
            if self.last_name.is_none() {
                return Err(ApiError::Validation("A last name is required".to_string()));
            }
            if self.email.is_none() {
                return Err(ApiError::Validation("A user must have an email".to_string()));
            }
            self.is_favorite.get_or_insert(false);
        }

        if let Some(raw) = self.birthday.take() {
            let birthday = parse_instant(&raw)
                .ok_or_else(|| ApiError::Validation(format!("Invalid birthday: {}", raw)))?;
            self.birthday = Some(birthday.to_rfc3339());
        }

        match serde_json::to_value(self) {
            Ok(Value::Object(doc)) => Ok(doc),
            Ok(_) => Err(ApiError::Internal("contact did not serialize to an object".to_string())),
            Err(e) => Err(ApiError::Internal(e.to_string())),
        }
    }
}
