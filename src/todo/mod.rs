//! # To-do API
//!
//! Todos with a priority, an optional due date and a category. Lists sort by
//! priority rank rather than the priority name.

mod model;
mod service;

pub use model::{Priority, TodoInput, TodoStats, TODOS};
pub use service::TodoService;
