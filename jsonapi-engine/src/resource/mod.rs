//! Resource capability and the resource-graph engine
//!
//! A domain entity takes part in JSON:API documents by implementing
//! [`JsonApiResource`]: it names its type and id, projects its attributes,
//! and hands out relationship descriptors for its parent, children and
//! siblings relations. The engine never sees how those relations are loaded
//! or persisted; descriptors wrap that behind closures.
//!
//! # Overview
//!
//! - [`JsonApiResource`]: capability trait implemented per entity type
//! - [`ParentRelationship`] / [`ToManyRelationship`]: relationship descriptors
//! - [`ResourceSerializer`]: entity (+ descriptors) to resource objects and documents
//! - [`ResourcePayload`]: create/update request bodies
//! - [`RelationshipMutation`]: validates and applies relationship changes
//!
//! # Example
//!
//! ```rust
//! use jsonapi_engine::document::Attributes;
//! use jsonapi_engine::handlers::JsonApiResult;
//! use jsonapi_engine::resource::{JsonApiResource, ResourceSerializer};
//! use serde_json::json;
//!
//! struct Person {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl JsonApiResource for Person {
//!     fn resource_type(&self) -> &str {
//!         "people"
//!     }
//!
//!     fn id(&self) -> Option<String> {
//!         Some(self.id.to_string())
//!     }
//!
//!     fn attributes(&self) -> JsonApiResult<Attributes> {
//!         let mut attributes = Attributes::new();
//!         attributes.insert("name".to_string(), json!(self.name));
//!         Ok(attributes)
//!     }
//! }
//!
//! let serializer = ResourceSerializer::new("http://example.com");
//! let person = Person { id: 9, name: "Dan".to_string() };
//! let resource = serializer.serialize(&person).unwrap();
//!
//! assert_eq!(resource.id(), "9");
//! assert_eq!(resource.links().unwrap().self_link().href(), "http://example.com/people/9");
//! ```

mod association;
mod mutation;
mod payload;
mod relationship;
mod serializer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use association::Association;
pub use mutation::{MutationPlan, PlannedChange, RelationshipMutation};
pub use payload::{IdentifierPayload, LinkagePayload, RelationshipPayload, ResourcePayload};
pub use relationship::{
    Finder, ParentRelationship, RelationshipDescriptor, RelationshipSet, ToManyGetter,
    ToManyRelationship, ToManyWriter, ToOneGetter, ToOneSetter,
};
pub use serializer::{serialize_identifier, LinkageMode, ResourceSerializer};

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::document::{Attributes, Meta};
use crate::handlers::{JsonApiError, JsonApiResult};

/// Shared, type-erased handle to a resource
pub type ResourceRef = Arc<dyn JsonApiResource>;

/// Parent (to-one) relationships of an entity, by name
pub type ParentRelationships = BTreeMap<String, ParentRelationship>;

/// Children or siblings (to-many) relationships of an entity, by name
pub type ToManyRelationships = BTreeMap<String, ToManyRelationship>;

/// Capability of an entity to appear in JSON:API documents
///
/// Only `resource_type`, `id` and `attributes` are required. Relationship
/// maps default to empty. Descriptors are built fresh on every call and
/// usually capture the entity's id and a handle to its store.
pub trait JsonApiResource: AsAny + Send + Sync {
    /// The JSON:API `type` member
    fn resource_type(&self) -> &str;

    /// The JSON:API `id` member; `None` for an entity that has not been persisted
    fn id(&self) -> Option<String>;

    /// Attribute projection; explicit `null` values are kept
    fn attributes(&self) -> JsonApiResult<Attributes>;

    /// To-one relationships
    fn parent_relationships(&self) -> ParentRelationships {
        BTreeMap::new()
    }

    /// Owned to-many relationships
    fn children_relationships(&self) -> ToManyRelationships {
        BTreeMap::new()
    }

    /// Many-to-many relationships through an association
    fn siblings_relationships(&self) -> ToManyRelationships {
        BTreeMap::new()
    }

    /// Resource-level meta
    fn meta(&self) -> Option<Meta> {
        None
    }
}

/// Entity types with a fixed resource type, used by the typed descriptor constructors
pub trait ResourceKind: JsonApiResource + Sized + 'static {
    const RESOURCE_TYPE: &'static str;
}

/// Upcast to [`Any`] so type-erased resources can be recovered as concrete types
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Borrow a type-erased resource as its concrete type
pub fn downcast_ref<T: JsonApiResource + 'static>(resource: &dyn JsonApiResource) -> Option<&T> {
    resource.as_any().downcast_ref::<T>()
}

/// Recover the concrete `Arc<T>` behind a [`ResourceRef`]
///
/// # Errors
///
/// Internal server error when the resource is not a `T`.
pub fn downcast_arc<T: ResourceKind>(resource: ResourceRef) -> JsonApiResult<Arc<T>> {
    let resource_type = resource.resource_type().to_string();
    resource.into_any_arc().downcast::<T>().map_err(|_| {
        JsonApiError::internal(format!(
            "A {resource_type} resource could not be used where {} was expected.",
            T::RESOURCE_TYPE
        ))
    })
}

/// The entity's id, which must be present and non-empty
pub(crate) fn require_id(entity: &dyn JsonApiResource) -> JsonApiResult<String> {
    entity
        .id()
        .filter(|id| !id.is_empty())
        .ok_or_else(JsonApiError::missing_id)
}
