//! Pending query over a collection.

use serde_json::Value;

use super::collection::Collection;
use super::errors::StoreResult;
use crate::query::{compare_documents, Filter, Projection, QueryCursor, SortKey};

/// Builder for a query; nothing runs until [`Cursor::exec`]
#[derive(Debug, Clone)]
pub struct Cursor {
    collection: Collection,
    filter: Filter,
    sort: Vec<SortKey>,
    skip: u64,
    limit: Option<u64>,
    projection: Option<Projection>,
}

impl Cursor {
    pub(crate) fn new(collection: Collection, filter: Filter) -> Self {
        Self {
            collection,
            filter,
            sort: Vec::new(),
            skip: 0,
            limit: None,
            projection: None,
        }
    }

    /// Run the query
    pub fn exec(self) -> StoreResult<Vec<Value>> {
        let spec = *self.collection.spec();
        let collections = self.collection.store().read()?;

        let mut matched: Vec<Value> = collections
            .get(spec.name)
            .map(|docs| {
                docs.iter()
                    .map(|d| Value::Object(d.clone()))
                    .filter(|d| self.filter.matches(d))
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        if !self.sort.is_empty() {
            // stable: ties keep insertion order
            matched.sort_by(|a, b| compare_documents(a, b, &self.sort));
        }

        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = self
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        let hidden_only = Projection::Exclude(Vec::new());
        let projection = self.projection.as_ref().unwrap_or(&hidden_only);

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| projection.apply(&doc, spec.hidden))
            .collect())
    }
}

impl QueryCursor for Cursor {
    fn sort(mut self, keys: &[SortKey]) -> Self {
        self.sort = keys.to_vec();
        self
    }

    fn skip(mut self, n: u64) -> Self {
        self.skip = n;
        self
    }

    fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    fn select(mut self, projection: &Projection) -> Self {
        self.projection = Some(projection.clone());
        self
    }
}
