//! Page window arithmetic
//!
//! A [`Paginator`] is the resolved `(limit, offset)` window for one request.
//! It is derived from the raw `page[size]` / `page[number]` query values and
//! the configured bounds, never from global state.
//!
//! Resolution rules:
//! - `page[size]` absent or not an integer: the configured default size
//! - `page[size]` above the configured maximum, or below 1: invalid page value
//! - `page[number]` absent or not an integer: 1
//! - `page[number]` below 1: invalid page value
//! - offset = size × (number − 1)
//!
//! # Example
//!
//! ```rust
//! use jsonapi_engine::config::PaginationConfig;
//! use jsonapi_engine::pagination::resolve_page;
//!
//! let config = PaginationConfig::default();
//! let page = resolve_page(Some("10"), Some("3"), &config).unwrap();
//! assert_eq!(page.page_count(), 10);
//! assert_eq!(page.page_offset(), 20);
//!
//! assert!(resolve_page(Some("25"), None, &config).is_err());
//! assert!(resolve_page(None, Some("0"), &config).is_err());
//! ```

use serde_json::Value;

use crate::config::PaginationConfig;
use crate::handlers::{JsonApiError, JsonApiResult};

/// Query parameter carrying the page size
pub const PAGE_SIZE_PARAMETER: &str = "page[size]";

/// Query parameter carrying the 1-based page number
pub const PAGE_NUMBER_PARAMETER: &str = "page[number]";

const NOTHING: &str = "*Nothing*";

/// A resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_count: i64,
    page_number: i64,
    page_offset: i64,
}

impl Paginator {
    /// Build a window from an already-parsed size and number
    ///
    /// # Errors
    ///
    /// Invalid page value when `page_count < 1`, `page_number < 1`, or the
    /// offset does not fit in an `i64`.
    pub fn new(page_count: i64, page_number: i64) -> JsonApiResult<Self> {
        if page_count < 1 {
            return Err(invalid(PAGE_SIZE_PARAMETER, page_count));
        }
        if page_number < 1 {
            return Err(invalid(PAGE_NUMBER_PARAMETER, page_number));
        }
        let page_offset = page_count
            .checked_mul(page_number - 1)
            .ok_or_else(|| invalid(PAGE_NUMBER_PARAMETER, page_number))?;

        Ok(Self {
            page_count,
            page_number,
            page_offset,
        })
    }

    /// The first page of the given size; sizes below 1 are raised to 1
    pub fn first_page(page_count: i64) -> Self {
        Self {
            page_count: page_count.max(1),
            page_number: 1,
            page_offset: 0,
        }
    }

    /// Resolve the window from a parsed query (see [`crate::query::parse_query`])
    ///
    /// Reads `page.size` and `page.number` from the nested `page` object.
    ///
    /// # Errors
    ///
    /// Invalid page object when `page` is present but is not an object, plus
    /// every error of [`resolve_page`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use jsonapi_engine::config::PaginationConfig;
    /// use jsonapi_engine::pagination::Paginator;
    /// use jsonapi_engine::query::parse_query;
    ///
    /// let query = parse_query("page[size]=5&page[number]=2");
    /// let page = Paginator::from_query(&query, &PaginationConfig::default()).unwrap();
    /// assert_eq!(page.page_offset(), 5);
    /// ```
    pub fn from_query(
        query: &serde_json::Map<String, Value>,
        config: &PaginationConfig,
    ) -> JsonApiResult<Self> {
        let page = match query.get("page") {
            None => return resolve_page(None, None, config),
            Some(Value::Object(page)) => page,
            Some(_) => {
                return Err(JsonApiError::invalid_page_object().with_parameter("page"));
            }
        };
        resolve_page(
            page.get("size").and_then(Value::as_str),
            page.get("number").and_then(Value::as_str),
            config,
        )
    }

    /// Number of records in the window (the limit)
    pub fn page_count(&self) -> i64 {
        self.page_count
    }

    /// 1-based page number
    pub fn page_number(&self) -> i64 {
        self.page_number
    }

    /// Number of records skipped before the window
    pub fn page_offset(&self) -> i64 {
        self.page_offset
    }
}

/// Resolve a page window from raw query values and configured bounds
///
/// # Errors
///
/// Invalid page value, with `source.parameter` naming the offending
/// parameter, when the size exceeds the maximum or is below 1, or when the
/// number is below 1.
pub fn resolve_page(
    raw_size: Option<&str>,
    raw_number: Option<&str>,
    config: &PaginationConfig,
) -> JsonApiResult<Paginator> {
    let page_count = raw_size
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(config.default_page_size);
    if page_count > config.maximum_page_size || page_count < 1 {
        return Err(invalid(PAGE_SIZE_PARAMETER, raw_size.unwrap_or(NOTHING)));
    }

    let page_number = raw_number
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(1);
    if page_number < 1 {
        return Err(invalid(PAGE_NUMBER_PARAMETER, raw_number.unwrap_or(NOTHING)));
    }

    let paginator = Paginator::new(page_count, page_number)?;
    tracing::trace!(
        page_count = paginator.page_count,
        page_number = paginator.page_number,
        page_offset = paginator.page_offset,
        "resolved page window"
    );
    Ok(paginator)
}

fn invalid(parameter: &str, value: impl std::fmt::Display) -> JsonApiError {
    JsonApiError::invalid_page_value(parameter, value).with_parameter(parameter)
}
