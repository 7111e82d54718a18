//! # User Management
//!
//! User documents live in the `users` collection. The password hash and the
//! reset-token fields are hidden: they are stored but never returned.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{AuthError, AuthResult};
use crate::query::{Filter, QueryParameters, QueryTranslator, RetrievalDirective};
use crate::store::{Collection, CollectionSpec, DocumentStore};

/// Fields that never leave the server
pub const CREDENTIAL_FIELDS: &[&str] = &[
    "password",
    "passwordResetToken",
    "passwordResetExpires",
    "passwordChangedAt",
];

/// The `users` collection
pub const USERS: CollectionSpec = CollectionSpec {
    name: "users",
    hidden: CREDENTIAL_FIELDS,
    unique: &["email"],
    timestamps: true,
};

/// User document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Unique, stored lowercase
    pub email: String,

    /// Argon2id hash, never plaintext
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<DateTime<Utc>>,

    /// SHA-256 of the emailed reset token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_reset_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_reset_expires: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn from_document(doc: Value) -> AuthResult<Self> {
        serde_json::from_value(doc).map_err(|e| AuthError::Storage(format!("Invalid user document: {}", e)))
    }

    /// Whether the password changed after a token issued at `iat` (Unix seconds)
    pub fn changed_password_after(&self, iat: i64) -> bool {
        self.password_changed_at
            .map(|changed| changed.timestamp() > iat)
            .unwrap_or(false)
    }

    /// Public JSON form, credentials removed
    pub fn public(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            for field in CREDENTIAL_FIELDS {
                map.remove(*field);
            }
        }
        value
    }

    #[cfg(test)]
    pub(crate) fn for_tests(id: &str, email: &str) -> Self {
        Self {
            id: id.to_string(),
            first_name: None,
            last_name: None,
            username: None,
            email: email.to_string(),
            password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            password_changed_at: None,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Fields for a new user; the password is already hashed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub email: String,
    pub password: String,
}

/// User repository trait
///
/// Abstracts storage operations for users.
pub trait UserRepository: Send + Sync {
    fn find_by_id(&self, id: &str) -> AuthResult<Option<User>>;

    /// Lookup by (already lowercased) email
    fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Lookup by hashed reset token, expiry not checked
    fn find_by_reset_token(&self, token_hash: &str) -> AuthResult<Option<User>>;

    fn create(&self, user: NewUser) -> AuthResult<User>;

    /// Replace the stored user with `user`; returns the stored form
    fn save(&self, user: &User) -> AuthResult<User>;
}

/// [`UserRepository`] over the document store
#[derive(Debug, Clone)]
pub struct StoreUserRepository {
    users: Collection,
}

impl StoreUserRepository {
    pub fn new(store: &DocumentStore) -> Self {
        Self {
            users: store.collection(USERS),
        }
    }

    fn find_one(&self, filter: Filter) -> AuthResult<Option<User>> {
        self.users
            .find_one(&filter)?
            .map(User::from_document)
            .transpose()
    }
}

impl UserRepository for StoreUserRepository {
    fn find_by_id(&self, id: &str) -> AuthResult<Option<User>> {
        self.users
            .find_by_id(id)?
            .map(User::from_document)
            .transpose()
    }

    fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        self.find_one(Filter::new().and_eq("email", email))
    }

    fn find_by_reset_token(&self, token_hash: &str) -> AuthResult<Option<User>> {
        self.find_one(Filter::new().and_eq("passwordResetToken", token_hash))
    }

    fn create(&self, user: NewUser) -> AuthResult<User> {
        let doc = serde_json::to_value(user).map_err(|e| AuthError::Storage(e.to_string()))?;
        User::from_document(self.users.insert(doc)?)
    }

    fn save(&self, user: &User) -> AuthResult<User> {
        let Value::Object(replacement) =
            serde_json::to_value(user).map_err(|e| AuthError::Storage(e.to_string()))?
        else {
            return Err(AuthError::Storage("User did not serialize to an object".to_string()));
        };

        let stored = self
            .users
            .update_with(&user.id, |doc| *doc = replacement)?
            .ok_or(AuthError::UserNoLongerExists)?;

        User::from_document(stored)
    }
}

/// Read-only listing of users through the query translator
#[derive(Clone)]
pub struct UserDirectory {
    users: Collection,
    translator: Arc<QueryTranslator>,
}

impl UserDirectory {
    pub fn new(store: &DocumentStore) -> Self {
        Self {
            users: store.collection(USERS),
            translator: Arc::new(QueryTranslator::default()),
        }
    }

    /// List users. Credential fields cannot be filtered or sorted on, and are
    /// stripped even if selected.
    pub fn list(&self, params: &QueryParameters) -> crate::http_server::ApiResult<Vec<Value>> {
        let directive: RetrievalDirective =
            self.translator.translate(params)?.forbid(CREDENTIAL_FIELDS)?;
        let docs = directive.run_against(&self.users).exec()?;

        Ok(docs
            .into_iter()
            .map(|mut doc| {
                if let Value::Object(map) = &mut doc {
                    for field in CREDENTIAL_FIELDS {
                        map.remove(*field);
                    }
                }
                doc
            })
            .collect())
    }
}
