//! # Pagination Calculator
//!
//! Bad or missing `page`/`limit` values fall back to the defaults; they are
//! never an error.

use super::params::QueryParameters;

/// Pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

/// Derive (skip, limit) from `page` and `limit`
pub fn build_page(params: &QueryParameters, default_page: u64, default_limit: u64) -> Page {
    let page = positive(params, "page").unwrap_or(default_page.max(1));
    let limit = positive(params, "limit").unwrap_or(default_limit.max(1));

    Page {
        skip: (page - 1).saturating_mul(limit),
        limit,
    }
}

fn positive(params: &QueryParameters, key: &str) -> Option<u64> {
    let raw = params.get(key)?.as_single()?;
    let n: i64 = raw.trim().parse().ok()?;
    u64::try_from(n).ok().filter(|n| *n > 0)
}
