//! JSON:API media type and content negotiation predicates
//!
//! Every request must list `application/vnd.api+json` (without media type
//! parameters) in its `Accept` header, and every request that creates or
//! updates must send exactly that `Content-Type`. The predicates here answer
//! both questions; the `require_*` helpers turn a failed check into the
//! matching [`JsonApiError`].
//!
//! # Example
//!
//! ```rust
//! use jsonapi_engine::config::MediaTypeConfig;
//!
//! let media = MediaTypeConfig::default();
//! assert!(media.accepts(Some("text/html, application/vnd.api+json")));
//! assert!(!media.accepts(Some("application/vnd.api+json; ext=bulk")));
//! assert!(media.is_content_type(Some("application/vnd.api+json")));
//! assert!(!media.is_content_type(None));
//! ```

use http::{header, HeaderMap};

use crate::config::MediaTypeConfig;
use crate::handlers::{JsonApiError, JsonApiResult};

/// The JSON:API media type
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

const NO_ACCEPT_HEADER: &str = "*No Accept header*";
const NO_CONTENT_TYPE_HEADER: &str = "*No Content-Type header*";

impl MediaTypeConfig {
    /// Whether an `Accept` header value lists the media type without parameters
    ///
    /// Entries are split on `,`, trimmed and compared case-insensitively.
    pub fn accepts(&self, accept: Option<&str>) -> bool {
        accept.is_some_and(|accept| {
            accept
                .split(',')
                .any(|entry| entry.trim().eq_ignore_ascii_case(&self.media_type))
        })
    }

    /// Whether a `Content-Type` header value is exactly the media type
    pub fn is_content_type(&self, content_type: Option<&str>) -> bool {
        content_type.is_some_and(|value| value.trim().eq_ignore_ascii_case(&self.media_type))
    }

    /// Check the `Accept` header of a request
    ///
    /// # Errors
    ///
    /// [`JsonApiErrorKind::NotAcceptable`](crate::handlers::JsonApiErrorKind::NotAcceptable)
    /// quoting the header, or `*No Accept header*` when it is absent.
    pub fn require_accept(&self, headers: &HeaderMap) -> JsonApiResult<()> {
        let accept = header_str(headers, header::ACCEPT);
        if self.accepts(accept) {
            return Ok(());
        }
        Err(JsonApiError::not_acceptable(
            &self.media_type,
            accept.unwrap_or(NO_ACCEPT_HEADER),
        ))
    }

    /// Check the `Content-Type` header of a create or update request
    ///
    /// # Errors
    ///
    /// [`JsonApiErrorKind::UnsupportedMediaType`](crate::handlers::JsonApiErrorKind::UnsupportedMediaType)
    /// quoting the header, or `*No Content-Type header*` when it is absent.
    pub fn require_content_type(&self, headers: &HeaderMap) -> JsonApiResult<()> {
        let content_type = header_str(headers, header::CONTENT_TYPE);
        if self.is_content_type(content_type) {
            return Ok(());
        }
        Err(JsonApiError::unsupported_media_type(
            &self.media_type,
            content_type.unwrap_or(NO_CONTENT_TYPE_HEADER),
        ))
    }
}

// Non-UTF-8 header values count as absent.
fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
