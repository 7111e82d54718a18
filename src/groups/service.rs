//! Group operations, scoped to the calling user.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::model::{GroupInput, GROUPS, MEMBER_FIELDS};
use crate::contacts::ContactService;
use crate::http_server::{ApiError, ApiResult};
use crate::query::{Filter, Findable, QueryCursor, SortKey};
use crate::store::{Collection, DocumentStore};

const NOT_OWNER: &str = "You can't access this group";

/// Contact group service
pub struct GroupService {
    groups: Collection,
    contacts: Arc<ContactService>,
}

impl GroupService {
    pub fn new(store: &DocumentStore, contacts: Arc<ContactService>) -> Self {
        Self {
            groups: store.collection(GROUPS),
            contacts,
        }
    }

    /// The caller's groups, oldest first
    pub fn list(&self, owner: &str) -> ApiResult<Vec<Value>> {
        let filter = Filter::new().and_eq("userId", owner);
        let groups = self
            .groups
            .find(&filter)
            .sort(&[SortKey::asc("createdAt")])
            .exec()?;

        groups
            .iter()
            .map(|g| self.populate(self.groups.present(g)))
            .collect()
    }

    pub fn create(&self, owner: &str, input: GroupInput) -> ApiResult<Value> {
        let doc = input.into_document(owner, true)?;
        let stored = self.groups.insert(Value::Object(doc))?;

        info!(id = stored["_id"].as_str(), owner, "Created group");
        self.populate(self.groups.present(&stored))
    }

    pub fn get(&self, owner: &str, id: &str) -> ApiResult<Value> {
        let group = self.owned(owner, id)?;
        self.populate(self.groups.present(&group))
    }

    pub fn update(&self, owner: &str, id: &str, input: GroupInput) -> ApiResult<Value> {
        self.owned(owner, id)?;
        let patch = input.into_document(owner, false)?;

        let updated = self
            .groups
            .update_by_id(id, Value::Object(patch))?
            .ok_or(ApiError::NotFound("group"))?;
        self.populate(self.groups.present(&updated))
    }

    pub fn delete(&self, owner: &str, id: &str) -> ApiResult<()> {
        self.owned(owner, id)?;
        self.groups
            .delete_by_id(id)?
            .map(|_| info!(id, owner, "Deleted group"))
            .ok_or(ApiError::NotFound("group"))
    }

    fn owned(&self, owner: &str, id: &str) -> ApiResult<Value> {
        let group = self
            .groups
            .find_by_id(id)?
            .ok_or(ApiError::NotFound("group"))?;

        if group["userId"].as_str() != Some(owner) {
            warn!(id, caller = owner, "Group access by non-owner");
            return Err(ApiError::Forbidden(NOT_OWNER.to_string()));
        }
        Ok(group)
    }

    /// Replace member ids with contact summaries
    fn populate(&self, mut group: Value) -> ApiResult<Value> {
        let ids: Vec<String> = group["members"]
            .as_array()
            .map(|members| {
                members
                    .iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        if let Value::Object(doc) = &mut group {
            let members = self.contacts.summaries(&ids, MEMBER_FIELDS)?;
            doc.insert("members".to_string(), Value::Array(members));
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use serde_json::json;

    fn setup() -> (GroupService, Arc<ContactService>) {
        let store = DocumentStore::in_memory();
        let contacts = Arc::new(ContactService::new(&store));
        (GroupService::new(&store, contacts.clone()), contacts)
    }

    fn group(value: Value) -> GroupInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_members_are_populated() {
        let (groups, contacts) = setup();
        let ada = contacts
            .create(
                serde_json::from_value(json!({
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": "ada@example.com",
                    "company": "Analytical",
                }))
                .unwrap(),
            )
            .unwrap();

        let created = groups
            .create("u1", group(json!({"name": "Friends", "members": [ada["_id"]]})))
            .unwrap();

        let member = &created["members"][0];
        assert_eq!(member["firstName"], json!("Ada"));
        assert_eq!(member["email"], json!("ada@example.com"));
        assert!(member.get("company").is_none());
    }

    #[test]
    fn test_owner_scoping() {
        let (groups, _) = setup();
        let mine = groups.create("u1", group(json!({"name": "Mine"}))).unwrap();
        groups.create("u2", group(json!({"name": "Theirs"}))).unwrap();
        let id = mine["_id"].as_str().unwrap();

        assert_eq!(groups.list("u1").unwrap().len(), 1);
        assert!(matches!(groups.get("u2", id), Err(ApiError::Forbidden(_))));
        assert!(matches!(
            groups.update("u2", id, group(json!({"name": "Stolen"}))),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(groups.delete("u2", id), Err(ApiError::Forbidden(_))));
        assert!(matches!(groups.get("u1", "missing"), Err(ApiError::NotFound("group"))));

        groups.delete("u1", id).unwrap();
        assert!(groups.list("u1").unwrap().is_empty());
    }

    #[test]
    fn test_owner_cannot_be_reassigned() {
        let (groups, _) = setup();
        let mine = groups.create("u1", group(json!({"name": "Mine"}))).unwrap();
        let id = mine["_id"].as_str().unwrap();

        let result = groups.update("u1", id, group(json!({"userId": "u2"})));
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        assert_eq!(groups.get("u1", id).unwrap()["userId"], json!("u1"));
    }

    #[test]
    fn test_duplicate_names_conflict() {
        let (groups, _) = setup();
        groups.create("u1", group(json!({"name": "Work"}))).unwrap();

        let err = groups.create("u2", group(json!({"name": "Work"}))).unwrap_err();
        assert!(matches!(err, ApiError::Store(StoreError::DuplicateKey { .. })));
        assert_eq!(err.status_code().as_u16(), 409);
    }
}
