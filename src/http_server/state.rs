//! Shared handler state.

use std::sync::Arc;

use crate::auth::{AuthConfig, AuthService, EmailSender, StoreUserRepository, UserDirectory};
use crate::contacts::ContactService;
use crate::groups::GroupService;
use crate::store::DocumentStore;
use crate::todo::TodoService;

/// Services over one [`DocumentStore`]
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub auth: Arc<AuthService>,
    pub todos: Arc<TodoService>,
    pub contacts: Arc<ContactService>,
    pub groups: Arc<GroupService>,
    pub users: Arc<UserDirectory>,
}

impl AppState {
    pub fn new(store: DocumentStore, auth: AuthConfig, mailer: Arc<dyn EmailSender>) -> Self {
        let repository = Arc::new(StoreUserRepository::new(&store));
        let contacts = Arc::new(ContactService::new(&store));

        Self {
            auth: Arc::new(AuthService::new(auth, repository, mailer)),
            todos: Arc::new(TodoService::new(&store)),
            groups: Arc::new(GroupService::new(&store, contacts.clone())),
            contacts,
            users: Arc::new(UserDirectory::new(&store)),
            store,
        }
    }
}
