//! # Groups
//!
//! Named sets of contacts, each owned by one user.

mod model;
mod service;

pub use model::{GroupInput, GROUPS, MEMBER_FIELDS};
pub use service::GroupService;
