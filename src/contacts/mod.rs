//! # Contacts
//!
//! The contact book: CRUD, search over a fixed set of fields, and favorites.

mod model;
mod service;

pub use model::{Address, ContactInput, SocialMedia, CONTACTS, SEARCH_FIELDS};
pub use service::ContactService;
