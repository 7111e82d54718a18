//! # Query Translator
//!
//! Runs the pipeline Filter -> Sort -> Pagination -> Projection over a set of
//! query parameters. The translator is stateless; every call builds a fresh
//! [`RetrievalDirective`].

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use super::errors::{MalformedQueryError, QueryResult};
use super::filter::{build_filter, Filter};
use super::pagination::build_page;
use super::params::QueryParameters;
use super::projection::{build_projection, Projection};
use super::sort::{build_sort, SortKey};

/// Defaults and mode switches for a translator
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    /// Parameters that never become filter predicates
    pub control_keys: Vec<String>,

    /// Sort used when `sort` is absent
    pub default_sort: Vec<SortKey>,

    pub default_page: u64,

    pub default_limit: u64,

    /// Version counter hidden by the default projection
    pub metadata_field: String,

    /// Alias table; `Some` switches the sort builder to alias+order mode
    pub sort_aliases: Option<BTreeMap<String, String>>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            control_keys: ["page", "sort", "limit", "fields", "order"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            default_sort: vec![SortKey::desc("createdAt")],
            default_page: 1,
            default_limit: 100,
            metadata_field: "__v".to_string(),
            sort_aliases: None,
        }
    }
}

impl TranslatorConfig {
    /// Add a sort alias, enabling alias+order mode
    pub fn with_sort_alias(mut self, alias: impl Into<String>, field: impl Into<String>) -> Self {
        self.sort_aliases
            .get_or_insert_with(BTreeMap::new)
            .insert(alias.into(), field.into());
        self
    }
}

/// Output of one translation pass
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalDirective {
    pub filter: Filter,
    pub sort: Vec<SortKey>,
    pub skip: u64,
    pub limit: u64,
    pub projection: Projection,
}

impl RetrievalDirective {
    /// Force an equality predicate on top of the translated filter
    pub fn and_where(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = self.filter.and_eq(field, value);
        self
    }

    /// Refuse filters or sort keys on any of `fields` (or paths below them)
    pub fn forbid(self, fields: &[&str]) -> QueryResult<Self> {
        let blocked = |path: &str| {
            let root = path.split('.').next().unwrap_or(path);
            fields.contains(&root)
        };

        if let Some((field, _)) = self.filter.iter().find(|(field, _)| blocked(*field)) {
            return Err(MalformedQueryError::new(field, "field cannot be filtered on"));
        }
        if let Some(key) = self.sort.iter().find(|key| blocked(key.field.as_str())) {
            return Err(MalformedQueryError::new(key.field.as_str(), "field cannot be sorted on"));
        }
        Ok(self)
    }

    /// Apply the directive to any source with the cursor-builder capabilities
    pub fn run_against<S: Findable + ?Sized>(&self, source: &S) -> S::Cursor {
        source
            .find(&self.filter)
            .sort(&self.sort)
            .skip(self.skip)
            .limit(self.limit)
            .select(&self.projection)
    }
}

/// Pending query over a record source
pub trait QueryCursor: Sized {
    fn sort(self, keys: &[SortKey]) -> Self;
    fn skip(self, n: u64) -> Self;
    fn limit(self, n: u64) -> Self;
    fn select(self, projection: &Projection) -> Self;
}

/// A record source that can start a cursor from a filter
pub trait Findable {
    type Cursor: QueryCursor;

    fn find(&self, filter: &Filter) -> Self::Cursor;
}

/// Translates query parameters into retrieval directives
#[derive(Debug, Clone, Default)]
pub struct QueryTranslator {
    config: TranslatorConfig,
}

impl QueryTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn translate(&self, params: &QueryParameters) -> QueryResult<RetrievalDirective> {
        let filter = build_filter(params, &self.config.control_keys)?;
        let sort = build_sort(
            params,
            &self.config.default_sort,
            self.config.sort_aliases.as_ref(),
        )?;
        let page = build_page(params, self.config.default_page, self.config.default_limit);
        let projection = build_projection(params, &self.config.metadata_field)?;

        debug!(
            predicates = filter.len(),
            sort_keys = sort.len(),
            skip = page.skip,
            limit = page.limit,
            "Translated query parameters"
        );

        Ok(RetrievalDirective {
            filter,
            sort,
            skip: page.skip,
            limit: page.limit,
            projection,
        })
    }
}
