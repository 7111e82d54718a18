//! Todo operations over the `todos` collection.

use serde_json::Value;
use tracing::info;

use super::model::{TodoInput, TodoStats, TODOS};
use crate::http_server::{ApiError, ApiResult};
use crate::query::{Filter, QueryParameters, QueryTranslator, TranslatorConfig};
use crate::store::{Collection, DocumentStore};

/// To-do list service
pub struct TodoService {
    todos: Collection,
    translator: QueryTranslator,
}

impl TodoService {
    /// Lists sort by `priority` through its hidden rank, direction from `order`
    pub fn new(store: &DocumentStore) -> Self {
        Self {
            todos: store.collection(TODOS),
            translator: QueryTranslator::new(
                TranslatorConfig::default().with_sort_alias("priority", "priorityOrder"),
            ),
        }
    }

    pub fn create(&self, input: TodoInput) -> ApiResult<Value> {
        let doc = input.into_document(true)?;
        let stored = self.todos.insert(Value::Object(doc))?;

        info!(id = stored["_id"].as_str(), "Created todo");
        Ok(self.todos.present(&stored))
    }

    pub fn list(&self, params: &QueryParameters) -> ApiResult<Vec<Value>> {
        let directive = self.translator.translate(params)?;
        Ok(directive.run_against(&self.todos).exec()?)
    }

    pub fn get(&self, id: &str) -> ApiResult<Value> {
        self.todos
            .find_by_id(id)?
            .map(|doc| self.todos.present(&doc))
            .ok_or(ApiError::NotFound("todo"))
    }

    pub fn update(&self, id: &str, input: TodoInput) -> ApiResult<Value> {
        let patch = input.into_document(false)?;
        self.todos
            .update_by_id(id, Value::Object(patch))?
            .map(|doc| self.todos.present(&doc))
            .ok_or(ApiError::NotFound("todo"))
    }

    pub fn delete(&self, id: &str) -> ApiResult<()> {
        self.todos
            .delete_by_id(id)?
            .map(|_| info!(id, "Deleted todo"))
            .ok_or(ApiError::NotFound("todo"))
    }

    /// Flip `completed`
    pub fn toggle(&self, id: &str) -> ApiResult<Value> {
        self.todos
            .update_with(id, |doc| {
                let completed = doc.get("completed").and_then(Value::as_bool).unwrap_or(false);
                doc.insert("completed".to_string(), Value::Bool(!completed));
            })?
            .map(|doc| self.todos.present(&doc))
            .ok_or(ApiError::NotFound("todo"))
    }

    pub fn stats(&self) -> ApiResult<TodoStats> {
        Ok(TodoStats {
            total: self.todos.count(&Filter::new())?,
            completed: self.todos.count(&Filter::new().and_eq("completed", true))?,
            pending: self.todos.count(&Filter::new().and_eq("completed", false))?,
        })
    }
}
