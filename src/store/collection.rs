//! Collection handle and its CRUD operations.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::cursor::Cursor;
use super::errors::{StoreError, StoreResult};
use super::{CollectionSpec, Document, DocumentStore};
use crate::query::{Filter, Findable, Projection};

const ID_FIELD: &str = "_id";
const VERSION_FIELD: &str = "__v";

/// Handle to a named collection
#[derive(Debug, Clone)]
pub struct Collection {
    store: DocumentStore,
    spec: CollectionSpec,
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn id_of(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

impl Collection {
    pub(crate) fn new(store: DocumentStore, spec: CollectionSpec) -> Self {
        Self { store, spec }
    }

    pub fn spec(&self) -> &CollectionSpec {
        &self.spec
    }

    pub(crate) fn store(&self) -> &DocumentStore {
        &self.store
    }

    fn prepare(&self, doc: Value) -> StoreResult<Document> {
        let Value::Object(mut doc) = doc else {
            return Err(StoreError::NotAnObject);
        };

        if id_of(&doc).is_none() {
            doc.insert(
                ID_FIELD.to_string(),
                Value::String(Uuid::new_v4().simple().to_string()),
            );
        }
        doc.insert(VERSION_FIELD.to_string(), Value::from(0));

        if self.spec.timestamps {
            let stamp = now();
            doc.entry("createdAt").or_insert_with(|| stamp.clone());
            doc.insert("updatedAt".to_string(), stamp);
        }

        Ok(doc)
    }

    fn check_unique(&self, docs: &[Document], candidate: &Document) -> StoreResult<()> {
        let id = id_of(candidate);

        for field in self.spec.unique {
            let Some(value) = candidate.get(*field).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = docs
                .iter()
                .any(|other| id_of(other) != id && other.get(*field) == Some(value));
            if taken {
                return Err(StoreError::DuplicateKey {
                    field: field.to_string(),
                });
            }
        }

        if docs.iter().any(|other| id_of(other) == id) {
            return Err(StoreError::DuplicateKey {
                field: ID_FIELD.to_string(),
            });
        }
        Ok(())
    }

    /// Insert one document; returns the stored form
    pub fn insert(&self, doc: Value) -> StoreResult<Value> {
        let doc = self.prepare(doc)?;

        let mut collections = self.store.write()?;
        let docs = collections.entry(self.spec.name.to_string()).or_default();
        self.check_unique(docs, &doc)?;
        docs.push(doc.clone());
        if let Err(e) = self.store.flush(self.spec.name, docs) {
            docs.pop();
            return Err(e);
        }

        debug!(collection = self.spec.name, id = id_of(&doc), "Inserted document");
        Ok(Value::Object(doc))
    }

    /// Insert a batch; nothing is stored if any document is rejected
    pub fn insert_many(&self, batch: Vec<Value>) -> StoreResult<usize> {
        let prepared = batch
            .into_iter()
            .map(|doc| self.prepare(doc))
            .collect::<StoreResult<Vec<_>>>()?;

        let mut collections = self.store.write()?;
        let docs = collections.entry(self.spec.name.to_string()).or_default();

        let mut staged = docs.clone();
        for doc in prepared {
            self.check_unique(&staged, &doc)?;
            staged.push(doc);
        }
        let inserted = staged.len() - docs.len();

        self.store.flush(self.spec.name, &staged)?;
        *docs = staged;

        debug!(collection = self.spec.name, inserted, "Inserted documents");
        Ok(inserted)
    }

    /// Stored form of a document, hidden fields included
    pub fn find_by_id(&self, id: &str) -> StoreResult<Option<Value>> {
        let collections = self.store.read()?;
        Ok(collections
            .get(self.spec.name)
            .and_then(|docs| docs.iter().find(|d| id_of(d) == Some(id)))
            .map(|d| Value::Object(d.clone())))
    }

    /// First document matching the filter, hidden fields included
    pub fn find_one(&self, filter: &Filter) -> StoreResult<Option<Value>> {
        let collections = self.store.read()?;
        Ok(collections.get(self.spec.name).and_then(|docs| {
            docs.iter()
                .map(|d| Value::Object(d.clone()))
                .find(|d| filter.matches(d))
        }))
    }

    /// Shallow-merge `patch` into a document. `_id` cannot be changed.
    pub fn update_by_id(&self, id: &str, patch: Value) -> StoreResult<Option<Value>> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::NotAnObject);
        };

        self.update_with(id, |doc| {
            for (key, value) in patch {
                doc.insert(key, value);
            }
        })
    }

    /// Apply a closure to a stored document; returns the updated form
    pub fn update_with<F>(&self, id: &str, apply: F) -> StoreResult<Option<Value>>
    where
        F: FnOnce(&mut Document),
    {
        let mut collections = self.store.write()?;
        let Some(docs) = collections.get_mut(self.spec.name) else {
            return Ok(None);
        };
        let Some(index) = docs.iter().position(|d| id_of(d) == Some(id)) else {
            return Ok(None);
        };

        let mut updated = docs[index].clone();
        apply(&mut updated);

        updated.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        let version = docs[index]
            .get(VERSION_FIELD)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        updated.insert(VERSION_FIELD.to_string(), Value::from(version + 1));
        if self.spec.timestamps {
            if let Some(created) = docs[index].get("createdAt") {
                updated.insert("createdAt".to_string(), created.clone());
            }
            updated.insert("updatedAt".to_string(), now());
        }

        let others: Vec<Document> = docs
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, d)| d.clone())
            .collect();
        self.check_unique(&others, &updated)?;

        let previous = std::mem::replace(&mut docs[index], updated.clone());
        if let Err(e) = self.store.flush(self.spec.name, docs) {
            docs[index] = previous;
            return Err(e);
        }

        debug!(collection = self.spec.name, id, "Updated document");
        Ok(Some(Value::Object(updated)))
    }

    /// Remove a document; returns what was removed
    pub fn delete_by_id(&self, id: &str) -> StoreResult<Option<Value>> {
        let mut collections = self.store.write()?;
        let Some(docs) = collections.get_mut(self.spec.name) else {
            return Ok(None);
        };
        let Some(index) = docs.iter().position(|d| id_of(d) == Some(id)) else {
            return Ok(None);
        };

        let removed = docs.remove(index);
        if let Err(e) = self.store.flush(self.spec.name, docs) {
            docs.insert(index, removed);
            return Err(e);
        }

        debug!(collection = self.spec.name, id, "Deleted document");
        Ok(Some(Value::Object(removed)))
    }

    /// Remove every matching document; returns how many were removed
    pub fn delete_many(&self, filter: &Filter) -> StoreResult<usize> {
        let mut collections = self.store.write()?;
        let Some(docs) = collections.get_mut(self.spec.name) else {
            return Ok(0);
        };

        let original = docs.clone();
        let (removed, kept): (Vec<Document>, Vec<Document>) = docs
            .drain(..)
            .partition(|d| filter.matches(&Value::Object(d.clone())));
        *docs = kept;

        if let Err(e) = self.store.flush(self.spec.name, docs) {
            *docs = original;
            return Err(e);
        }

        debug!(collection = self.spec.name, removed = removed.len(), "Deleted documents");
        Ok(removed.len())
    }

    pub fn count(&self, filter: &Filter) -> StoreResult<usize> {
        let collections = self.store.read()?;
        Ok(collections
            .get(self.spec.name)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(&Value::Object((*d).clone())))
                    .count()
            })
            .unwrap_or(0))
    }

    /// Default visible form: hidden fields and the version counter removed
    pub fn present(&self, doc: &Value) -> Value {
        Projection::Exclude(vec![VERSION_FIELD.to_string()]).apply(doc, self.spec.hidden)
    }
}

impl Findable for Collection {
    type Cursor = Cursor;

    fn find(&self, filter: &Filter) -> Cursor {
        Cursor::new(self.clone(), filter.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryCursor, SortKey};
    use serde_json::json;

    const PEOPLE: CollectionSpec = CollectionSpec {
        name: "people",
        hidden: &["secret"],
        unique: &["email"],
        timestamps: true,
    };

    fn people() -> Collection {
        DocumentStore::in_memory().collection(PEOPLE)
    }

    #[test]
    fn test_insert_assigns_id_version_and_timestamps() {
        let people = people();
        let doc = people.insert(json!({"email": "a@x.io"})).unwrap();

        assert_eq!(doc["_id"].as_str().map(str::len), Some(32));
        assert_eq!(doc["__v"], json!(0));
        assert!(doc["createdAt"].is_string());
        assert_eq!(doc["createdAt"], doc["updatedAt"]);
    }

    #[test]
    fn test_insert_rejects_non_objects_and_duplicates() {
        let people = people();
        assert!(matches!(people.insert(json!([1])), Err(StoreError::NotAnObject)));

        people.insert(json!({"email": "a@x.io"})).unwrap();
        let err = people.insert(json!({"email": "a@x.io"})).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { ref field } if field == "email"));
        assert_eq!(people.count(&Filter::new()).unwrap(), 1);
    }

    #[test]
    fn test_update_merges_and_bumps_version() {
        let people = people();
        let doc = people.insert(json!({"email": "a@x.io", "name": "A"})).unwrap();
        let id = doc["_id"].as_str().unwrap();

        let updated = people
            .update_by_id(id, json!({"name": "B", "_id": "hijack"}))
            .unwrap()
            .unwrap();

        assert_eq!(updated["_id"], json!(id));
        assert_eq!(updated["name"], json!("B"));
        assert_eq!(updated["email"], json!("a@x.io"));
        assert_eq!(updated["__v"], json!(1));
        assert_eq!(updated["createdAt"], doc["createdAt"]);
        assert!(people.update_by_id("missing", json!({})).unwrap().is_none());
    }

    #[test]
    fn test_update_checks_uniqueness_against_others() {
        let people = people();
        people.insert(json!({"email": "a@x.io"})).unwrap();
        let b = people.insert(json!({"email": "b@x.io"})).unwrap();
        let id = b["_id"].as_str().unwrap();

        // Re-saving its own value is fine
        people.update_by_id(id, json!({"email": "b@x.io"})).unwrap();
        assert!(people.update_by_id(id, json!({"email": "a@x.io"})).is_err());
        assert_eq!(
            people.find_by_id(id).unwrap().unwrap()["email"],
            json!("b@x.io")
        );
    }

    #[test]
    fn test_insert_many_is_all_or_nothing() {
        let people = people();
        let err = people.insert_many(vec![
            json!({"email": "a@x.io"}),
            json!({"email": "a@x.io"}),
        ]);
        assert!(err.is_err());
        assert_eq!(people.count(&Filter::new()).unwrap(), 0);

        assert_eq!(
            people
                .insert_many(vec![json!({"email": "a@x.io"}), json!({"email": "b@x.io"})])
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_delete() {
        let people = people();
        let a = people.insert(json!({"email": "a@x.io", "team": "red"})).unwrap();
        people.insert(json!({"email": "b@x.io", "team": "red"})).unwrap();
        people.insert(json!({"email": "c@x.io", "team": "blue"})).unwrap();

        assert!(people.delete_by_id(a["_id"].as_str().unwrap()).unwrap().is_some());
        assert!(people.delete_by_id("missing").unwrap().is_none());
        assert_eq!(people.delete_many(&Filter::new().and_eq("team", "red")).unwrap(), 1);
        assert_eq!(people.count(&Filter::new()).unwrap(), 1);
    }

    #[test]
    fn test_failed_delete_many_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        let people = store.collection(PEOPLE);
        for (email, team) in [("a@x.io", "red"), ("b@x.io", "blue"), ("c@x.io", "red")] {
            people.insert(json!({"email": email, "team": team})).unwrap();
        }

        std::fs::remove_dir_all(dir.path()).unwrap();
        assert!(people.delete_many(&Filter::new().and_eq("team", "red")).is_err());

        let emails: Vec<Value> = people
            .find(&Filter::new())
            .exec()
            .unwrap()
            .into_iter()
            .map(|d| d["email"].clone())
            .collect();
        assert_eq!(emails, vec![json!("a@x.io"), json!("b@x.io"), json!("c@x.io")]);
    }

    #[test]
    fn test_present_hides_fields() {
        let people = people();
        let doc = people.insert(json!({"email": "a@x.io", "secret": "s"})).unwrap();
        let shown = people.present(&doc);

        assert!(shown.get("secret").is_none());
        assert!(shown.get("__v").is_none());
        assert_eq!(shown["email"], json!("a@x.io"));
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = DocumentStore::open(dir.path()).unwrap();
            let people = store.collection(PEOPLE);
            people.insert(json!({"email": "a@x.io", "n": 2})).unwrap();
            people.insert(json!({"email": "b@x.io", "n": 1})).unwrap();
        }

        let reopened = DocumentStore::open(dir.path()).unwrap().collection(PEOPLE);
        let docs = reopened
            .find(&Filter::new())
            .sort(&[SortKey::asc("n")])
            .exec()
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["email"], json!("b@x.io"));
    }
}
