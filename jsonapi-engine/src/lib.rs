//! # jsonapi-engine
//!
//! JSON:API document model and a resource-graph serialization engine.
//!
//! Domain entities describe themselves through [`resource::JsonApiResource`]:
//! a type, an id, attributes, and descriptors for their parent, children and
//! siblings relationships. The engine turns them into JSON:API documents,
//! validates and applies relationship changes from request payloads, and
//! renders every failure as a JSON:API error document.
//!
//! ## Features
//!
//! - **Document model**: data/errors exclusivity, null vs. empty linkage, links with meta
//! - **Serializer**: resource, collection, related and relationship documents
//! - **Relationship descriptors**: type-erased parent/children/siblings with typed constructors
//! - **Mutation protocol**: validate every relationship change before applying any
//! - **Pagination**: `page[size]` / `page[number]` resolution against configured bounds
//! - **Query parsing**: bracket-notation query strings (`page[size]=10&tags[]=a`)
//! - **Error taxonomy**: closed set of error kinds bound to HTTP statuses
//! - **axum integration** (`http` feature): documents and errors implement `IntoResponse`
//!
//! ## Example
//!
//! ```rust,no_run
//! use jsonapi_engine::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let query = parse_query("page[size]=5&page[number]=2");
//!     let page = Paginator::from_query(&query, &config.pagination)
//!         .map_err(|err| Error::Internal(err.to_string()))?;
//!     assert_eq!(page.page_offset(), 5);
//!
//!     let _serializer =
//!         ResourceSerializer::from_config(&config).with_linkage(LinkageMode::Resolve);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod handlers;
pub mod media_type;
pub mod pagination;
pub mod query;
pub mod resource;

#[cfg(feature = "observability")]
pub mod observability;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, MediaTypeConfig, PaginationConfig, ServiceConfig};
    pub use crate::error::{Error, Result};

    pub use crate::document::{
        Attributes, Data, Document, ErrorObject, ErrorSource, Link, LinksObject, Meta,
        RelationshipObject, RelationshipsObject, ResourceIdentifierObject, ResourceLinkage,
        ResourceObject,
    };
    pub use crate::handlers::{
        render_error, JsonApiError, JsonApiErrorKind, JsonApiResponse, JsonApiResult,
    };
    pub use crate::media_type::JSON_API_MEDIA_TYPE;
    pub use crate::pagination::{resolve_page, Paginator};
    pub use crate::query::{parse_query, parse_uri_query, QueryMap};
    pub use crate::resource::{
        serialize_identifier, Association, JsonApiResource, LinkageMode, LinkagePayload,
        ParentRelationship, RelationshipDescriptor, RelationshipMutation, RelationshipSet,
        ResourceKind, ResourcePayload, ResourceRef, ResourceSerializer, ToManyRelationship,
    };

    #[cfg(feature = "observability")]
    pub use crate::observability::init_tracing;
}
