//! Contact operations over the `contacts` collection.

use serde_json::Value;
use tracing::info;

use super::model::{ContactInput, CONTACTS, SEARCH_FIELDS};
use crate::http_server::{ApiError, ApiResult};
use crate::query::{QueryParameters, QueryTranslator, TranslatorConfig};
use crate::store::{Collection, DocumentStore};

/// Contact book service
pub struct ContactService {
    contacts: Collection,
    translator: QueryTranslator,
}

impl ContactService {
    pub fn new(store: &DocumentStore) -> Self {
        Self {
            contacts: store.collection(CONTACTS),
            translator: QueryTranslator::new(TranslatorConfig::default()),
        }
    }

    pub fn list(&self, params: &QueryParameters) -> ApiResult<Vec<Value>> {
        let directive = self.translator.translate(params)?;
        Ok(directive.run_against(&self.contacts).exec()?)
    }

    /// Filter on the searchable fields only; every other parameter is dropped
    pub fn search(&self, params: &QueryParameters) -> ApiResult<Vec<Value>> {
        let honoured = params.restricted_to(SEARCH_FIELDS);
        self.list(&honoured)
    }

    pub fn favorites(&self, params: &QueryParameters) -> ApiResult<Vec<Value>> {
        let directive = self.translator.translate(params)?.and_where("isFavorite", true);
        Ok(directive.run_against(&self.contacts).exec()?)
    }

    pub fn create(&self, input: ContactInput) -> ApiResult<Value> {
        let doc = input.into_document(true)?;
        let stored = self.contacts.insert(Value::Object(doc))?;

        info!(id = stored["_id"].as_str(), "Created contact");
        Ok(self.contacts.present(&stored))
    }

    pub fn get(&self, id: &str) -> ApiResult<Value> {
        self.contacts
            .find_by_id(id)?
            .map(|doc| self.contacts.present(&doc))
            .ok_or(ApiError::NotFound("contact"))
    }

    pub fn update(&self, id: &str, input: ContactInput) -> ApiResult<Value> {
        let patch = input.into_document(false)?;
        self.contacts
            .update_by_id(id, Value::Object(patch))?
            .map(|doc| self.contacts.present(&doc))
            .ok_or(ApiError::NotFound("contact"))
    }

    pub fn delete(&self, id: &str) -> ApiResult<()> {
        self.contacts
            .delete_by_id(id)?
            .map(|_| info!(id, "Deleted contact"))
            .ok_or(ApiError::NotFound("contact"))
    }

    pub fn toggle_favorite(&self, id: &str) -> ApiResult<Value> {
        self.contacts
            .update_with(id, |doc| {
                let favorite = doc.get("isFavorite").and_then(Value::as_bool).unwrap_or(false);
                doc.insert("isFavorite".to_string(), Value::Bool(!favorite));
            })?
            .map(|doc| self.contacts.present(&doc))
            .ok_or(ApiError::NotFound("contact"))
    }

    /// Contacts by id, reduced to the given fields. Unknown ids are skipped.
    pub(crate) fn summaries(&self, ids: &[String], fields: &[&str]) -> ApiResult<Vec<Value>> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(Value::Object(doc)) = self.contacts.find_by_id(id)? {
                let summary = doc
                    .into_iter()
                    .filter(|(key, _)| key == "_id" || fields.contains(&key.as_str()))
                    .collect();
                found.push(Value::Object(summary));
            }
        }
        Ok(found)
    }
}
