//! recordkeep - to-do and contact-book REST services over a document store
//!
//! Both APIs share one query translator: URL query strings become a filter,
//! sort order, page window and field projection, run against the store.

pub mod auth;
pub mod cli;
pub mod contacts;
pub mod groups;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod store;
pub mod todo;
