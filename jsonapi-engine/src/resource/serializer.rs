//! Entity to resource object serialization
//!
//! [`ResourceSerializer`] turns anything implementing [`JsonApiResource`]
//! into resource objects and whole documents. Links are derived from the
//! base URL and the resource path `/{type}/{id}`:
//!
//! | Link | Value |
//! |---|---|
//! | resource `self` | `{base}/{type}/{id}` |
//! | relationship `self` | `{base}/{type}/{id}/relationships/{name}` |
//! | relationship `related` | `{base}/{type}/{id}/{name}` |
//!
//! Relationship linkage is opt-in ([`LinkageMode::Resolve`]) because it may
//! cost extra fetches; to-many linkage is bounded by the linkage paginator
//! and never affects primary data.
//!
//! # Example
//!
//! ```rust,ignore
//! use jsonapi_engine::config::Config;
//! use jsonapi_engine::resource::{LinkageMode, ResourceSerializer};
//!
//! let config = Config::load()?;
//! let serializer = ResourceSerializer::from_config(&config).with_linkage(LinkageMode::Resolve);
//!
//! let document = serializer.resource_document(article.as_ref())?;
//! let comments = serializer.related_document(article.as_ref(), "comments", &paginator)?;
//! ```

use super::relationship::{RelationshipDescriptor, RelationshipSet};
use super::{require_id, JsonApiResource};
use crate::config::Config;
use crate::document::{
    Data, Document, LinksObject, RelationshipObject, RelationshipsObject, ResourceIdentifierObject,
    ResourceLinkage, ResourceObject,
};
use crate::handlers::{JsonApiError, JsonApiResult};
use crate::pagination::Paginator;

/// Whether relationship objects carry resolved `data`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkageMode {
    /// Links only; the `data` member is omitted
    #[default]
    LinksOnly,
    /// Fetch related resources and embed their identifiers
    Resolve,
}

/// Builds resource objects and documents from entities
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSerializer {
    base_url: String,
    linkage: LinkageMode,
    linkage_paginator: Paginator,
}

impl ResourceSerializer {
    /// Serializer with link-only relationships and a 50-record linkage page
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            linkage: LinkageMode::default(),
            linkage_paginator: Paginator::first_page(50),
        }
    }

    /// Serializer using the configured base URL and linkage page size
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.service.base_url.as_str()).with_linkage_paginator(Paginator::first_page(
            config.pagination.linkage_page_size,
        ))
    }

    #[must_use]
    pub fn with_linkage(mut self, linkage: LinkageMode) -> Self {
        self.linkage = linkage;
        self
    }

    #[must_use]
    pub fn with_linkage_paginator(mut self, paginator: Paginator) -> Self {
        self.linkage_paginator = paginator;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn linkage(&self) -> LinkageMode {
        self.linkage
    }

    /// Absolute URL of a resource: `{base}/{type}/{id}`
    pub fn resource_url(&self, resource_type: &str, id: &str) -> String {
        format!("{}/{resource_type}/{id}", self.base_url)
    }

    /// Serialize one entity into a resource object
    ///
    /// # Errors
    ///
    /// Internal server error when the entity or any resolved related entity
    /// has no id; any error raised by the entity's attribute projection or
    /// relationship getters.
    pub fn serialize(&self, entity: &dyn JsonApiResource) -> JsonApiResult<ResourceObject> {
        let id = require_id(entity)?;
        let resource_type = entity.resource_type();
        let resource_url = self.resource_url(resource_type, &id);
        tracing::trace!(resource_type, id = %id, "serializing resource");

        let mut relationships = RelationshipsObject::new();
        for (name, descriptor) in RelationshipSet::of(entity).iter() {
            let links = LinksObject::new(
                format!("{resource_url}/relationships/{name}"),
                format!("{resource_url}/{name}"),
            );
            let mut relationship = RelationshipObject::from_links(name, links);
            if self.linkage == LinkageMode::Resolve {
                let linkage = self.linkage_of(descriptor, &self.linkage_paginator)?;
                relationship = relationship.with_linkage(linkage);
            }
            relationships.insert(relationship)?;
        }

        let mut resource = ResourceObject::new(id, resource_type)?
            .with_attributes(entity.attributes()?)
            .with_links(LinksObject::self_only(resource_url));
        if !relationships.is_empty() {
            resource = resource.with_relationships(relationships);
        }
        if let Some(meta) = entity.meta() {
            resource = resource.with_meta(meta);
        }
        Ok(resource)
    }

    /// Document with a single resource as primary data
    pub fn resource_document(&self, entity: &dyn JsonApiResource) -> JsonApiResult<Document> {
        Ok(Document::from_data(self.serialize(entity)?))
    }

    /// Document with a list of resources as primary data; an empty list stays `[]`
    pub fn collection_document<R>(&self, entities: &[R]) -> JsonApiResult<Document>
    where
        R: AsRef<dyn JsonApiResource>,
    {
        let resources = entities
            .iter()
            .map(|entity| self.serialize(entity.as_ref()))
            .collect::<JsonApiResult<Vec<_>>>()?;
        tracing::debug!(count = resources.len(), "serialized resource collection");
        Ok(Document::from_data(resources))
    }

    /// Document with the related resource(s) of one relationship as primary data
    ///
    /// A parent relationship yields a resource or `null`; a to-many
    /// relationship yields one page of resources.
    ///
    /// # Errors
    ///
    /// Relationship not found when the entity has no relationship `name`.
    pub fn related_document(
        &self,
        entity: &dyn JsonApiResource,
        name: &str,
        paginator: &Paginator,
    ) -> JsonApiResult<Document> {
        let relationships = RelationshipSet::of(entity);
        let descriptor = relationships
            .get(name)
            .ok_or_else(|| JsonApiError::relationship_not_found(name))?;

        let data = match descriptor {
            RelationshipDescriptor::Parent(parent) => match parent.get()? {
                Some(related) => Data::from(self.serialize(related.as_ref())?),
                None => Data::Null,
            },
            RelationshipDescriptor::Children(many) | RelationshipDescriptor::Siblings(many) => {
                let related = many
                    .get(paginator)?
                    .iter()
                    .map(|related| self.serialize(related.as_ref()))
                    .collect::<JsonApiResult<Vec<_>>>()?;
                Data::from(related)
            }
        };
        tracing::debug!(relationship = name, "serialized related resources");
        Ok(Document::from_data(data))
    }

    /// Linkage-only document for one relationship
    ///
    /// # Errors
    ///
    /// Relationship not found when the entity has no relationship `name`.
    pub fn relationship_document(
        &self,
        entity: &dyn JsonApiResource,
        name: &str,
        paginator: &Paginator,
    ) -> JsonApiResult<Document> {
        let relationships = RelationshipSet::of(entity);
        let descriptor = relationships
            .get(name)
            .ok_or_else(|| JsonApiError::relationship_not_found(name))?;
        Ok(Document::from_data(self.linkage_of(descriptor, paginator)?))
    }

    fn linkage_of(
        &self,
        descriptor: &RelationshipDescriptor,
        paginator: &Paginator,
    ) -> JsonApiResult<ResourceLinkage> {
        match descriptor {
            RelationshipDescriptor::Parent(parent) => {
                let identifier = parent
                    .get()?
                    .map(|related| linked_identifier(descriptor, related.as_ref()))
                    .transpose()?;
                Ok(ResourceLinkage::ToOne(identifier))
            }
            RelationshipDescriptor::Children(many) | RelationshipDescriptor::Siblings(many) => {
                let identifiers = many
                    .get(paginator)?
                    .iter()
                    .map(|related| linked_identifier(descriptor, related.as_ref()))
                    .collect::<JsonApiResult<Vec<_>>>()?;
                Ok(ResourceLinkage::ToMany(identifiers))
            }
        }
    }
}

/// Identifier object for an entity, skipping attributes and relationships
///
/// # Errors
///
/// Internal server error when the entity has no id.
pub fn serialize_identifier(entity: &dyn JsonApiResource) -> JsonApiResult<ResourceIdentifierObject> {
    ResourceIdentifierObject::new(require_id(entity)?, entity.resource_type())
}

// Linkage carries the declared type; a getter returning anything else is a bug.
fn linked_identifier(
    descriptor: &RelationshipDescriptor,
    related: &dyn JsonApiResource,
) -> JsonApiResult<ResourceIdentifierObject> {
    if related.resource_type() != descriptor.resource_type() {
        return Err(JsonApiError::internal(format!(
            "Relationship of type {} returned a resource of type {}.",
            descriptor.resource_type(),
            related.resource_type()
        )));
    }
    serialize_identifier(related)
}
