//! JSON:API error taxonomy
//!
//! Every failure the engine reports to a client is a [`JsonApiError`]: a
//! terminal value carrying one [`JsonApiErrorKind`] (which fixes the HTTP
//! status and the string `code`), a human title and a detail message. Errors
//! never wrap an underlying cause; they are rendered as-is into a one-element
//! `errors` document by the boundary adapter in [`super::response`].
//!
//! # Example
//!
//! ```rust
//! use jsonapi_engine::handlers::{JsonApiError, JsonApiErrorKind};
//!
//! let error = JsonApiError::record_not_found("42");
//! assert_eq!(error.kind, JsonApiErrorKind::RecordNotFound);
//! assert_eq!(error.code(), "404");
//! assert_eq!(error.detail, "The record identified by 42 could not be found.");
//! ```

use std::fmt;

use http::StatusCode;
use thiserror::Error;

use crate::document::{ErrorObject, ErrorSource, Meta};

/// Result type for operations that fail with a renderable JSON:API error
pub type JsonApiResult<T> = std::result::Result<T, JsonApiError>;

/// Category of JSON:API error
///
/// The set is closed: each kind is bound to exactly one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonApiErrorKind {
    /// Programmer or invariant violation (500)
    InternalServerError,
    /// A referenced id does not resolve (404)
    RecordNotFound,
    /// Unknown relationship name on read (404)
    RelationshipNotFound,
    /// Unknown relationship name on write, or the operation is not configured (400)
    RelationshipNotAllowed,
    /// To-many replace attempted without a replacer (403)
    ToManySetReplacementForbidden,
    /// Payload `type` does not match the declared resource type (409)
    TypeConflict,
    /// Request `Content-Type` mismatch (415)
    UnsupportedMediaType,
    /// Request `Accept` mismatch (406)
    NotAcceptable,
    /// `page[size]` or `page[number]` out of bounds (400)
    InvalidPageValue,
    /// A required parameter is missing from the payload (400)
    ParameterMissing,
    /// The resource object has no `id` (400)
    MissingKey,
    /// The payload `id` differs from the id in the URL (400)
    KeyNotIncludedInUrl,
    /// Generic malformed request (400)
    BadRequest,
    /// Unknown resource (400)
    InvalidResource,
    /// A to-many member is already linked (400)
    HasManyRelationExists,
    /// The request body is not an object (400)
    InvalidRequestFormat,
    /// Filter expression cannot be parsed (400)
    InvalidFiltersSyntax,
    /// Filter is not allowed on this resource (400)
    FilterNotAllowed,
    /// Filter value is invalid (400)
    InvalidFilterValue,
    /// Field value is invalid (400)
    InvalidFieldValue,
    /// Sparse fieldset lacks a type (400)
    InvalidFieldFormat,
    /// `data` is not an object (400)
    InvalidDataFormat,
    /// Links object is malformed (400)
    InvalidLinksObject,
    /// Type is not valid for this operation (400)
    TypeMismatch,
    /// Unknown field for a type (400)
    InvalidField,
    /// Unknown include path (400)
    InvalidInclude,
    /// Unknown sort criteria (400)
    InvalidSortCriteria,
    /// Query parameter is not allowed (400)
    ParameterNotAllowed,
    /// Resource is locked (423)
    RecordLocked,
    /// Persisting failed or was cancelled (422)
    SaveFailed,
    /// The `page` parameter is not an object (400)
    InvalidPageObject,
    /// Unknown `page[...]` member (400)
    PageParameterNotAllowed,
}

impl fmt::Display for JsonApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InternalServerError => "internal_server_error",
            Self::RecordNotFound => "record_not_found",
            Self::RelationshipNotFound => "relationship_not_found",
            Self::RelationshipNotAllowed => "relationship_not_allowed",
            Self::ToManySetReplacementForbidden => "to_many_set_replacement_forbidden",
            Self::TypeConflict => "type_conflict",
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::NotAcceptable => "not_acceptable",
            Self::InvalidPageValue => "invalid_page_value",
            Self::ParameterMissing => "parameter_missing",
            Self::MissingKey => "missing_key",
            Self::KeyNotIncludedInUrl => "key_not_included_in_url",
            Self::BadRequest => "bad_request",
            Self::InvalidResource => "invalid_resource",
            Self::HasManyRelationExists => "has_many_relation_exists",
            Self::InvalidRequestFormat => "invalid_request_format",
            Self::InvalidFiltersSyntax => "invalid_filters_syntax",
            Self::FilterNotAllowed => "filter_not_allowed",
            Self::InvalidFilterValue => "invalid_filter_value",
            Self::InvalidFieldValue => "invalid_field_value",
            Self::InvalidFieldFormat => "invalid_field_format",
            Self::InvalidDataFormat => "invalid_data_format",
            Self::InvalidLinksObject => "invalid_links_object",
            Self::TypeMismatch => "type_mismatch",
            Self::InvalidField => "invalid_field",
            Self::InvalidInclude => "invalid_include",
            Self::InvalidSortCriteria => "invalid_sort_criteria",
            Self::ParameterNotAllowed => "parameter_not_allowed",
            Self::RecordLocked => "record_locked",
            Self::SaveFailed => "save_failed",
            Self::InvalidPageObject => "invalid_page_object",
            Self::PageParameterNotAllowed => "page_parameter_not_allowed",
        };
        f.write_str(name)
    }
}

impl JsonApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RecordNotFound | Self::RelationshipNotFound => StatusCode::NOT_FOUND,
            Self::ToManySetReplacementForbidden => StatusCode::FORBIDDEN,
            Self::TypeConflict => StatusCode::CONFLICT,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            Self::RecordLocked => StatusCode::LOCKED,
            Self::SaveFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RelationshipNotAllowed
            | Self::InvalidPageValue
            | Self::ParameterMissing
            | Self::MissingKey
            | Self::KeyNotIncludedInUrl
            | Self::BadRequest
            | Self::InvalidResource
            | Self::HasManyRelationExists
            | Self::InvalidRequestFormat
            | Self::InvalidFiltersSyntax
            | Self::FilterNotAllowed
            | Self::InvalidFilterValue
            | Self::InvalidFieldValue
            | Self::InvalidFieldFormat
            | Self::InvalidDataFormat
            | Self::InvalidLinksObject
            | Self::TypeMismatch
            | Self::InvalidField
            | Self::InvalidInclude
            | Self::InvalidSortCriteria
            | Self::ParameterNotAllowed
            | Self::InvalidPageObject
            | Self::PageParameterNotAllowed => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code string for this error kind
    ///
    /// JSON:API codes are the numeric HTTP status rendered as a string.
    #[must_use]
    pub fn error_code(&self) -> String {
        self.status_code().as_u16().to_string()
    }
}

/// A renderable JSON:API error
///
/// # Example
///
/// ```rust
/// use jsonapi_engine::handlers::JsonApiError;
///
/// let error = JsonApiError::invalid_page_value("page[size]", "25")
///     .with_parameter("page[size]");
/// assert_eq!(error.status_code().as_u16(), 400);
/// assert!(error.to_string().contains("25 is not a valid value"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{title} ({kind}): {detail}")]
pub struct JsonApiError {
    /// The category of error
    pub kind: JsonApiErrorKind,
    /// Short human-readable summary
    pub title: String,
    /// Human-readable explanation specific to this occurrence
    pub detail: String,
    /// Where in the request the error originated
    pub location: Option<ErrorSource>,
    /// Non-standard meta information
    pub meta: Option<Meta>,
}

impl JsonApiError {
    /// Create a new error of the given kind
    pub fn new(kind: JsonApiErrorKind, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            detail: detail.into(),
            location: None,
            meta: None,
        }
    }

    /// Internal server error with the default title and detail
    pub fn internal_server_error() -> Self {
        Self::new(
            JsonApiErrorKind::InternalServerError,
            "Internal Server Error",
            "Internal Server Error",
        )
    }

    /// Internal server error with a specific detail
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            JsonApiErrorKind::InternalServerError,
            "Internal Server Error",
            detail,
        )
    }

    /// An entity was fetched or constructed without a usable id
    pub fn missing_id() -> Self {
        Self::internal("A fetched model does not seem to have a valid id.")
    }

    pub fn record_not_found(id: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::RecordNotFound,
            "Record not found",
            format!("The record identified by {id} could not be found."),
        )
    }

    pub fn relationship_not_found(relationship: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::RelationshipNotFound,
            "Relationship not found",
            format!("The relationship identified by {relationship} could not be found."),
        )
    }

    pub fn relationship_not_allowed(relationship: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::RelationshipNotAllowed,
            "Relationship not allowed",
            format!("{relationship} is not allowed."),
        )
    }

    pub fn to_many_set_replacement_forbidden() -> Self {
        Self::new(
            JsonApiErrorKind::ToManySetReplacementForbidden,
            "Complete replacement forbidden",
            "Complete replacement forbidden for this relationship",
        )
    }

    pub fn type_conflict(resource_type: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::TypeConflict,
            "Invalid type value",
            format!("{resource_type} is not a valid type value."),
        )
    }

    /// `Content-Type` of a mutating request is not the JSON:API media type
    pub fn unsupported_media_type(expected: &str, found: &str) -> Self {
        Self::new(
            JsonApiErrorKind::UnsupportedMediaType,
            "Unsupported media type",
            format!(
                "All requests that create or update must use the '{expected}' Content-Type. \
                 This request specified '{found}'."
            ),
        )
    }

    /// `Accept` does not list the JSON:API media type without parameters
    pub fn not_acceptable(expected: &str, found: &str) -> Self {
        Self::new(
            JsonApiErrorKind::NotAcceptable,
            "Not acceptable",
            format!(
                "All requests must use the '{expected}' Accept without media type parameters. \
                 This request specified '{found}'."
            ),
        )
    }

    pub fn invalid_page_value(page: impl fmt::Display, value: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::InvalidPageValue,
            "Invalid page value",
            format!("{value} is not a valid value for {page} page parameter."),
        )
    }

    pub fn parameter_missing(parameter: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::ParameterMissing,
            "Missing Parameter",
            format!("The required parameter, {parameter}, is missing."),
        )
    }

    pub fn missing_key() -> Self {
        Self::new(
            JsonApiErrorKind::MissingKey,
            "A key is required",
            "The resource object does not contain a key.",
        )
    }

    pub fn key_not_included_in_url(key: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::KeyNotIncludedInUrl,
            "Key is not included in URL",
            format!("The URL does not support the key {key}."),
        )
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(JsonApiErrorKind::BadRequest, "Bad Request", detail)
    }

    pub fn invalid_resource(resource: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::InvalidResource,
            "Invalid resource",
            format!("{resource} is not a valid resource."),
        )
    }

    pub fn has_many_relation_exists(id: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::HasManyRelationExists,
            "Relation exists",
            format!("The relation to {id} already exists."),
        )
    }

    pub fn invalid_request_format() -> Self {
        Self::new(
            JsonApiErrorKind::InvalidRequestFormat,
            "Bad Request",
            "Request must be a hash",
        )
    }

    pub fn invalid_filters_syntax(filters: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::InvalidFiltersSyntax,
            "Invalid filters syntax",
            format!("{filters} is not a valid syntax for filtering."),
        )
    }

    pub fn filter_not_allowed(filter: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::FilterNotAllowed,
            "Filter not allowed",
            format!("{filter} is not allowed."),
        )
    }

    pub fn invalid_filter_value(filter: impl fmt::Display, value: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::InvalidFilterValue,
            "Invalid filter value",
            format!("{value} is not a valid value for {filter}."),
        )
    }

    pub fn invalid_field_value(field: impl fmt::Display, value: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::InvalidFieldValue,
            "Invalid field value",
            format!("{value} is not a valid value for {field}."),
        )
    }

    pub fn invalid_field_format() -> Self {
        Self::new(
            JsonApiErrorKind::InvalidFieldFormat,
            "Invalid field format",
            "Fields must specify a type.",
        )
    }

    pub fn invalid_data_format() -> Self {
        Self::new(
            JsonApiErrorKind::InvalidDataFormat,
            "Invalid data format",
            "Data must be a hash.",
        )
    }

    pub fn invalid_links_object() -> Self {
        Self::new(
            JsonApiErrorKind::InvalidLinksObject,
            "Invalid Links Object",
            "Data is not a valid Links Object.",
        )
    }

    pub fn type_mismatch(resource_type: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::TypeMismatch,
            "Type Mismatch",
            format!("{resource_type} is not a valid type for this operation."),
        )
    }

    pub fn invalid_field(resource_type: impl fmt::Display, field: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::InvalidField,
            "Invalid field",
            format!("{field} is not a valid field for {resource_type}."),
        )
    }

    pub fn invalid_include(resource: impl fmt::Display, relationship: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::InvalidInclude,
            "Invalid field",
            format!("{relationship} is not a valid relationship of {resource}."),
        )
    }

    pub fn invalid_sort_criteria(resource: impl fmt::Display, criteria: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::InvalidSortCriteria,
            "Invalid sort criteria",
            format!("{criteria} is not a valid sort criteria for {resource}."),
        )
    }

    pub fn parameter_not_allowed(parameter: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::ParameterNotAllowed,
            "Param not allowed",
            format!("{parameter} is not allowed."),
        )
    }

    pub fn record_locked(message: impl Into<String>) -> Self {
        Self::new(JsonApiErrorKind::RecordLocked, "Locked resource", message)
    }

    pub fn save_failed() -> Self {
        Self::new(
            JsonApiErrorKind::SaveFailed,
            "Save failed or was cancelled",
            "Save failed or was cancelled",
        )
    }

    pub fn invalid_page_object() -> Self {
        Self::new(
            JsonApiErrorKind::InvalidPageObject,
            "Invalid Page Object",
            "Invalid Page Object.",
        )
    }

    pub fn page_parameter_not_allowed(parameter: impl fmt::Display) -> Self {
        Self::new(
            JsonApiErrorKind::PageParameterNotAllowed,
            "Page parameter not allowed",
            format!("{parameter} is not an allowed page parameter."),
        )
    }

    /// Point at the offending member of the request document
    ///
    /// # Example
    ///
    /// ```rust
    /// use jsonapi_engine::handlers::JsonApiError;
    ///
    /// let error = JsonApiError::parameter_missing("type").with_pointer("/data/type");
    /// let location = error.location.unwrap();
    /// assert_eq!(location.pointer.as_deref(), Some("/data/type"));
    /// ```
    #[must_use]
    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.location = Some(ErrorSource::pointer(pointer));
        self
    }

    /// Name the offending query parameter
    #[must_use]
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.location = Some(ErrorSource::parameter(parameter));
        self
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// HTTP status bound to this error's kind
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    /// String-encoded status, as carried in the `code` member
    #[must_use]
    pub fn code(&self) -> String {
        self.kind.error_code()
    }

    /// Whether this error indicates a defect on the server side
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Render this error as a JSON:API error object
    ///
    /// # Example
    ///
    /// ```rust
    /// use jsonapi_engine::handlers::JsonApiError;
    ///
    /// let object = JsonApiError::type_conflict("people").to_error_object();
    /// assert_eq!(object.status(), "409");
    /// assert_eq!(object.code(), "409");
    /// assert_eq!(object.title(), "Invalid type value");
    /// ```
    #[must_use]
    pub fn to_error_object(&self) -> ErrorObject {
        let mut object = ErrorObject::new(
            self.status_code(),
            self.code(),
            self.title.clone(),
            self.detail.clone(),
        );
        if let Some(location) = &self.location {
            object = object.with_source(location.clone());
        }
        if let Some(meta) = &self.meta {
            object = object.with_meta(meta.clone());
        }
        object
    }
}

impl From<crate::error::Error> for JsonApiError {
    fn from(err: crate::error::Error) -> Self {
        tracing::error!(error = %err, "engine error escaped to the JSON:API boundary");
        Self::internal_server_error()
    }
}

impl From<serde_json::Error> for JsonApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!(error = %err, "JSON encoding failed");
        Self::internal_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(JsonApiErrorKind::RecordNotFound.to_string(), "record_not_found");
        assert_eq!(JsonApiErrorKind::KeyNotIncludedInUrl.to_string(), "key_not_included_in_url");
        assert_eq!(
            JsonApiErrorKind::ToManySetReplacementForbidden.to_string(),
            "to_many_set_replacement_forbidden"
        );
    }

    #[test]
    fn test_error_kind_status_codes() {
        assert_eq!(
            JsonApiErrorKind::InternalServerError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(JsonApiErrorKind::RecordNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(JsonApiErrorKind::RelationshipNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            JsonApiErrorKind::RelationshipNotAllowed.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            JsonApiErrorKind::ToManySetReplacementForbidden.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(JsonApiErrorKind::TypeConflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            JsonApiErrorKind::UnsupportedMediaType.status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(JsonApiErrorKind::NotAcceptable.status_code(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(JsonApiErrorKind::InvalidPageValue.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(JsonApiErrorKind::RecordLocked.status_code(), StatusCode::LOCKED);
        assert_eq!(
            JsonApiErrorKind::SaveFailed.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_error_code_is_numeric_status() {
        assert_eq!(JsonApiErrorKind::InternalServerError.error_code(), "500");
        assert_eq!(JsonApiErrorKind::TypeConflict.error_code(), "409");
        assert_eq!(JsonApiErrorKind::MissingKey.error_code(), "400");
    }

    #[test]
    fn test_not_acceptable_detail_quotes_header() {
        let error = JsonApiError::not_acceptable("application/vnd.api+json", "text/html");
        assert_eq!(error.title, "Not acceptable");
        assert!(error.detail.contains("'application/vnd.api+json'"));
        assert!(error.detail.ends_with("This request specified 'text/html'."));
    }

    #[test]
    fn test_unsupported_media_type_detail() {
        let error = JsonApiError::unsupported_media_type("application/vnd.api+json", "application/json");
        assert_eq!(error.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(error.detail.contains("'application/json'"));
    }

    #[test]
    fn test_missing_id_is_internal() {
        let error = JsonApiError::missing_id();
        assert!(error.is_server_error());
        assert_eq!(error.detail, "A fetched model does not seem to have a valid id.");
    }

    #[test]
    fn test_client_errors_are_not_server_errors() {
        assert!(!JsonApiError::record_not_found("1").is_server_error());
        assert!(!JsonApiError::type_conflict("people").is_server_error());
        assert!(!JsonApiError::to_many_set_replacement_forbidden().is_server_error());
    }

    #[test]
    fn test_to_error_object_carries_source_and_meta() {
        let mut meta = Meta::new();
        meta.insert("hint".to_string(), serde_json::json!("use 1 or more"));
        let object = JsonApiError::invalid_page_value("page[number]", "0")
            .with_parameter("page[number]")
            .with_meta(meta)
            .to_error_object();

        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "400",
                "code": "400",
                "title": "Invalid page value",
                "detail": "0 is not a valid value for page[number] page parameter.",
                "source": { "parameter": "page[number]" },
                "meta": { "hint": "use 1 or more" }
            })
        );
    }

    #[test]
    fn test_display() {
        let error = JsonApiError::relationship_not_allowed("comments");
        assert_eq!(
            error.to_string(),
            "Relationship not allowed (relationship_not_allowed): comments is not allowed."
        );
    }

    #[test]
    fn test_crate_error_becomes_internal() {
        let err = crate::error::Error::Internal("boom".to_string());
        let api: JsonApiError = err.into();
        assert_eq!(api, JsonApiError::internal_server_error());
    }

    #[test]
    fn test_error_is_error_trait() {
        let error: Box<dyn std::error::Error> = Box::new(JsonApiError::missing_key());
        assert!(error.to_string().contains("A key is required"));
        assert!(error.source().is_none());
    }
}
