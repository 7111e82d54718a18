//! # Query Translation
//!
//! Converts URL query parameters into a [`RetrievalDirective`]: filter
//! predicates, sort order, a pagination window and a field projection.
//!
//! ```text
//! ?priority=high&age[gte]=18&sort=-createdAt&page=2&limit=10&fields=title
//!        │
//!        ▼
//! Filter ──► Sort ──► Pagination ──► Projection
//! ```
//!
//! The directive is handed to any [`Findable`] source; the document store in
//! [`crate::store`] is one.

mod errors;
mod filter;
mod operator;
mod pagination;
mod params;
mod projection;
mod sort;
mod translator;
mod value;

pub use errors::{MalformedQueryError, QueryResult};
pub use filter::{build_filter, Filter, Predicate};
pub use operator::{rewrite_key, ComparisonOp, ParsedKey};
pub use pagination::{build_page, Page};
pub use params::{ParamValue, QueryParameters};
pub use projection::{build_projection, Projection};
pub use sort::{build_sort, compare_documents, SortDirection, SortKey};
pub use translator::{Findable, QueryCursor, QueryTranslator, RetrievalDirective, TranslatorConfig};
pub use value::{coerce_cmp, lookup_path, parse_instant};
