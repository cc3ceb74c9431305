//! Boundary adapter from documents and errors to HTTP responses
//!
//! [`JsonApiResponse`] pairs a status with an optional [`Document`]. Errors
//! are rendered as a one-element `errors` document whose status is the one
//! bound to the error's kind. Any error that is not a [`JsonApiError`] is a
//! defect and renders as an internal server error.
//!
//! # Example
//!
//! ```rust
//! use http::StatusCode;
//! use jsonapi_engine::handlers::{JsonApiError, JsonApiResponse};
//!
//! let response = JsonApiResponse::from(JsonApiError::record_not_found("7"));
//! assert_eq!(response.status(), StatusCode::NOT_FOUND);
//!
//! let document = response.document().unwrap();
//! assert_eq!(document.errors().unwrap()[0].code(), "404");
//! ```

use http::StatusCode;

use super::error::JsonApiError;
use crate::document::Document;

/// A document paired with the HTTP status it should be sent with
#[derive(Debug, Clone, PartialEq)]
pub struct JsonApiResponse {
    status: StatusCode,
    document: Option<Document>,
}

impl JsonApiResponse {
    /// Respond with an arbitrary status
    pub fn new(status: StatusCode, document: Document) -> Self {
        Self {
            status,
            document: Some(document),
        }
    }

    /// 200 OK
    pub fn ok(document: Document) -> Self {
        Self::new(StatusCode::OK, document)
    }

    /// 201 Created
    pub fn created(document: Document) -> Self {
        Self::new(StatusCode::CREATED, document)
    }

    /// 204 No Content, as returned by successful relationship updates
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            document: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }
}

impl From<JsonApiError> for JsonApiResponse {
    fn from(error: JsonApiError) -> Self {
        log_error(&error);
        Self::new(
            error.status_code(),
            Document::from_errors(vec![error.to_error_object()]),
        )
    }
}

/// Render any error as a JSON:API response
///
/// A [`JsonApiError`] keeps its kind; anything else is logged and rendered
/// as an internal server error.
///
/// # Example
///
/// ```rust
/// use http::StatusCode;
/// use jsonapi_engine::handlers::render_error;
///
/// let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
/// let response = render_error(&io);
/// assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
pub fn render_error(err: &(dyn std::error::Error + 'static)) -> JsonApiResponse {
    match err.downcast_ref::<JsonApiError>() {
        Some(error) => JsonApiResponse::from(error.clone()),
        None => {
            tracing::error!(error = %err, "unrecognized error reached the JSON:API boundary");
            JsonApiResponse::from(JsonApiError::internal_server_error())
        }
    }
}

fn log_error(error: &JsonApiError) {
    let status = error.status_code().as_u16();
    if error.is_server_error() {
        tracing::error!(
            kind = %error.kind,
            status,
            code = %error.code(),
            "JSON:API error: {}", error.detail
        );
    } else {
        tracing::warn!(
            kind = %error.kind,
            status,
            code = %error.code(),
            "JSON:API error: {}", error.detail
        );
    }
}

#[cfg(feature = "http")]
mod axum_impl {
    use axum::{
        body::Body,
        http::{header, HeaderValue},
        response::{IntoResponse, Response},
    };

    use super::{JsonApiError, JsonApiResponse, StatusCode};
    use crate::media_type::JSON_API_MEDIA_TYPE;

    const FALLBACK_BODY: &str = r#"{"errors":[{"status":"500","code":"500","title":"Internal Server Error","detail":"Internal Server Error"}]}"#;

    fn with_media_type(status: StatusCode, body: impl Into<Body>) -> Response {
        let body: Body = body.into();
        let mut response = (status, body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_API_MEDIA_TYPE),
        );
        response
    }

    impl IntoResponse for JsonApiResponse {
        fn into_response(self) -> Response {
            let Some(document) = self.document else {
                return self.status.into_response();
            };

            match serde_json::to_vec(&document) {
                Ok(bytes) => with_media_type(self.status, bytes),
                Err(err) => {
                    tracing::error!(error = %err, "failed to encode JSON:API document");
                    with_media_type(StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_BODY)
                }
            }
        }
    }

    impl IntoResponse for JsonApiError {
        fn into_response(self) -> Response {
            JsonApiResponse::from(self).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Data, ErrorSource};
    use crate::handlers::JsonApiErrorKind;

    #[test]
    fn test_error_renders_single_error_document() {
        let response = JsonApiResponse::from(JsonApiError::type_conflict("people"));
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let errors = response.document().unwrap().errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].status(), "409");
        assert_eq!(errors[0].title(), "Invalid type value");
    }

    #[test]
    fn test_error_source_is_preserved() {
        let response = JsonApiResponse::from(
            JsonApiError::invalid_page_value("page[size]", "25").with_parameter("page[size]"),
        );
        let errors = response.document().unwrap().errors().unwrap();
        assert_eq!(errors[0].source(), Some(&ErrorSource::parameter("page[size]")));
    }

    #[test]
    fn test_render_error_keeps_taxonomy_kind() {
        let error = JsonApiError::to_many_set_replacement_forbidden();
        let response = render_error(&error);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_render_error_foreign_error_is_internal() {
        let err = crate::error::Error::Internal("boom".to_string());
        let response = render_error(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let errors = response.document().unwrap().errors().unwrap();
        assert_eq!(errors[0].detail(), "Internal Server Error");
        assert_eq!(
            JsonApiErrorKind::InternalServerError.error_code(),
            errors[0].code()
        );
    }

    #[test]
    fn test_no_content_has_no_document() {
        let response = JsonApiResponse::no_content();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.document().is_none());
    }

    #[cfg(feature = "http")]
    mod into_response {
        use super::*;
        use axum::body::to_bytes;
        use axum::http::header;
        use axum::response::IntoResponse;

        #[tokio::test]
        async fn test_into_response_sets_media_type_and_body() {
            let response = JsonApiResponse::ok(Document::from_data(Data::Null)).into_response();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).unwrap(),
                "application/vnd.api+json"
            );

            let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json, serde_json::json!({ "data": null }));
        }

        #[tokio::test]
        async fn test_error_into_response() {
            let response = JsonApiError::not_acceptable("application/vnd.api+json", "text/html")
                .into_response();
            assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);

            let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["errors"][0]["status"], "406");
            assert_eq!(json["errors"][0]["title"], "Not acceptable");
        }

        #[tokio::test]
        async fn test_no_content_into_response_has_empty_body() {
            let response = JsonApiResponse::no_content().into_response();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
            let body = to_bytes(response.into_body(), 1024).await.unwrap();
            assert!(body.is_empty());
        }
    }
}
