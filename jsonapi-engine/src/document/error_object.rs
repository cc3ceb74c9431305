//! JSON:API error objects

use http::StatusCode;
use serde::{Deserialize, Serialize};

use super::Meta;

/// Reference to the part of the request that caused an error
///
/// Exactly one of `pointer` (a JSON pointer into the request document) or
/// `parameter` (a query parameter name) is normally set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorSource {
    /// JSON pointer into the request document, e.g. `/data/attributes/title`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    /// Name of the offending query parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl ErrorSource {
    /// Source pointing into the request document
    pub fn pointer(pointer: impl Into<String>) -> Self {
        Self {
            pointer: Some(pointer.into()),
            parameter: None,
        }
    }

    /// Source naming a query parameter
    pub fn parameter(parameter: impl Into<String>) -> Self {
        Self {
            pointer: None,
            parameter: Some(parameter.into()),
        }
    }
}

/// Links member of an error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLinks {
    /// Link leading to further details about this particular occurrence
    pub about: String,
}

/// One entry of a document's `errors` array
///
/// # Example
///
/// ```rust
/// use http::StatusCode;
/// use jsonapi_engine::document::ErrorObject;
///
/// let error = ErrorObject::new(StatusCode::NOT_FOUND, "404", "Record not found", "No such article");
/// let json = serde_json::to_value(&error).unwrap();
/// assert_eq!(json["status"], "404");
/// assert!(json.get("source").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    links: Option<ErrorLinks>,
    status: String,
    code: String,
    title: String,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<ErrorSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
}

impl ErrorObject {
    /// Create an error object; `status` is rendered as its numeric string
    pub fn new(
        status: StatusCode,
        code: impl Into<String>,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            links: None,
            status: status.as_u16().to_string(),
            code: code.into(),
            title: title.into(),
            detail: detail.into(),
            source: None,
            meta: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_about_link(mut self, about: impl Into<String>) -> Self {
        self.links = Some(ErrorLinks {
            about: about.into(),
        });
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: ErrorSource) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn links(&self) -> Option<&ErrorLinks> {
        self.links.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn source(&self) -> Option<&ErrorSource> {
        self.source.as_ref()
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }
}
