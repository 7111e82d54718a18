//! # Document Store
//!
//! Named collections of JSON object documents kept in insertion order.
//! A store is either purely in memory or backed by a data directory, in
//! which case every mutation rewrites that collection's file.
//!
//! Every inserted document receives an `_id` and a `__v` version counter.
//! Collections with timestamps also maintain `createdAt` and `updatedAt`.

mod collection;
mod cursor;
mod errors;
mod persist;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use collection::Collection;
pub use cursor::Cursor;
pub use errors::{StoreError, StoreResult};

/// A stored document
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Static description of a collection
#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec {
    pub name: &'static str,

    /// Stored but never returned unless a projection names them
    pub hidden: &'static [&'static str],

    /// Fields whose values must be unique across the collection
    pub unique: &'static [&'static str],

    /// Maintain `createdAt` / `updatedAt`
    pub timestamps: bool,
}

/// Shared handle to the document store
#[derive(Debug, Clone)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    data_dir: Option<PathBuf>,
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl DocumentStore {
    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                data_dir: None,
                collections: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Store persisted under `data_dir`
    pub fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let collections = persist::load_all(&data_dir)?;

        Ok(Self {
            inner: Arc::new(StoreInner {
                data_dir: Some(data_dir),
                collections: RwLock::new(collections),
            }),
        })
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.inner.data_dir.as_deref()
    }

    /// Handle to one collection
    pub fn collection(&self, spec: CollectionSpec) -> Collection {
        Collection::new(self.clone(), spec)
    }

    pub(crate) fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Vec<Document>>>> {
        self.inner
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned)
    }

    pub(crate) fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Vec<Document>>>> {
        self.inner
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)
    }

    /// Persist one collection if the store is backed by a directory
    pub(crate) fn flush(&self, name: &str, docs: &[Document]) -> StoreResult<()> {
        match &self.inner.data_dir {
            Some(dir) => persist::write_collection(dir, name, docs),
            None => Ok(()),
        }
    }
}
