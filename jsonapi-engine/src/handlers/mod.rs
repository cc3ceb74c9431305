//! Error taxonomy and the JSON:API response boundary
//!
//! Everything that can go wrong while reading a request or building a
//! document is reported as a [`JsonApiError`]. At the edge of a handler, the
//! error (or a successful [`Document`](crate::document::Document)) is turned
//! into an HTTP response by [`JsonApiResponse`], which sets the JSON:API
//! media type and the status bound to the error's kind.
//!
//! # Integration with Axum
//!
//! Both [`JsonApiResponse`] and [`JsonApiError`] implement `IntoResponse`
//! (feature `http`), so handlers can use `?` freely:
//!
//! ```rust,ignore
//! use axum::{extract::{Path, State}, http::HeaderMap};
//! use jsonapi_engine::prelude::*;
//!
//! async fn get_article(
//!     State(app): State<AppState>,
//!     headers: HeaderMap,
//!     Path(id): Path<String>,
//! ) -> Result<JsonApiResponse, JsonApiError> {
//!     app.config.media_type.require_accept(&headers)?;
//!     let article = app.store.article(&id).ok_or_else(|| JsonApiError::record_not_found(&id))?;
//!     let document = app.serializer.resource_document(article.as_ref())?;
//!     Ok(JsonApiResponse::ok(document))
//! }
//! ```

mod error;
mod response;

pub use error::{JsonApiError, JsonApiErrorKind, JsonApiResult};
pub use response::{render_error, JsonApiResponse};
