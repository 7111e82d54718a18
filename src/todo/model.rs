//! Todo document model and input checks.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::http_server::{ApiError, ApiResult};
use crate::query::parse_instant;
use crate::store::CollectionSpec;

/// The `todos` collection; `priorityOrder` only exists for sorting
pub const TODOS: CollectionSpec = CollectionSpec {
    name: "todos",
    hidden: &["priorityOrder"],
    unique: &[],
    timestamps: true,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Sort rank: high first
    pub fn order(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// Body of create and update requests. Every field is optional so the same
/// type serves partial updates; creation additionally requires a title.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TodoInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,

    #[validate(length(max = 50, message = "description cannot be more than 50 characters"))]
    pub description: Option<String>,

    pub completed: Option<bool>,

    pub priority: Option<String>,

    pub due_date: Option<String>,

    #[validate(length(max = 50, message = "category cannot be more than 50 characters"))]
    pub category: Option<String>,
}

impl TodoInput {
    /// Checked fields ready for the store. `creating` requires a title and
    /// fills defaults for `completed` and `priority`.
    pub fn into_document(mut self, creating: bool) -> ApiResult<Map<String, Value>> {
        self.title = self.title.map(|t| t.trim().to_string());
        self.category = self.category.map(|c| c.trim().to_string());
        self.validate()?;

        let mut doc = Map::new();

        match self.title {
            Some(title) => {
                doc.insert("title".into(), Value::String(title));
            }
            None if creating => return Err(ApiError::Validation("Title is required".to_string())),
            None => {}
        }

        if let Some(description) = self.description {
            doc.insert("description".into(), Value::String(description));
        }

        match self.completed {
            Some(completed) => {
                doc.insert("completed".into(), Value::Bool(completed));
            }
            None if creating => {
                doc.insert("completed".into(), Value::Bool(false));
            }
            None => {}
        }

        let priority = match self.priority.as_deref() {
            Some(raw) => Some(Priority::parse(raw).ok_or_else(|| {
                ApiError::Validation("priority can either be low, medium or high".to_string())
            })?),
            None if creating => Some(Priority::default()),
            None => None,
        };
        if let Some(priority) = priority {
            doc.insert("priority".into(), Value::String(priority.as_str().to_string()));
            doc.insert("priorityOrder".into(), Value::from(priority.order()));
        }

        if let Some(raw) = self.due_date {
            let due = parse_instant(&raw)
                .ok_or_else(|| ApiError::Validation(format!("Invalid due date: {}", raw)))?;
            if due.date_naive() < Utc::now().date_naive() {
                return Err(ApiError::Validation(
                    "The due date cannot be in the past".to_string(),
                ));
            }
            doc.insert("dueDate".into(), Value::String(due.to_rfc3339()));
        }

        if let Some(category) = self.category {
            doc.insert("category".into(), Value::String(category));
        }

        Ok(doc)
    }
}

/// Completion counts over the whole collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}
