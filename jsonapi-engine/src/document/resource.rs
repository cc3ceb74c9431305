//! Resource objects, identifiers, linkage and links
//!
//! These values are built per request from entity state and dropped after
//! serialization. Constructors enforce the invariants the wire format relies
//! on: non-empty `id`/`type`, unique relationship names, and the distinction
//! between an empty to-one linkage (`null`) and an empty to-many linkage (`[]`).

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::Meta;
use crate::handlers::{JsonApiError, JsonApiResult};

/// Attributes object of a resource: field name to JSON value
pub type Attributes = serde_json::Map<String, serde_json::Value>;

fn require_non_empty(id: &str, resource_type: &str) -> JsonApiResult<()> {
    if id.is_empty() {
        return Err(JsonApiError::missing_id());
    }
    if resource_type.is_empty() {
        return Err(JsonApiError::internal("A resource was built without a type."));
    }
    Ok(())
}

/// A lightweight `{id, type}` reference to a resource
///
/// # Example
///
/// ```rust
/// use jsonapi_engine::document::ResourceIdentifierObject;
///
/// let identifier = ResourceIdentifierObject::new("9", "people").unwrap();
/// assert_eq!(
///     serde_json::to_value(&identifier).unwrap(),
///     serde_json::json!({ "id": "9", "type": "people" })
/// );
///
/// assert!(ResourceIdentifierObject::new("", "people").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceIdentifierObject {
    id: String,
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
}

impl ResourceIdentifierObject {
    /// Create an identifier; fails with an internal error if `id` or `type` is empty
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> JsonApiResult<Self> {
        let id = id.into();
        let resource_type = resource_type.into();
        require_non_empty(&id, &resource_type)?;
        Ok(Self {
            id,
            resource_type,
            meta: None,
        })
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }
}

/// A link: either a bare URI string or an `{href, meta}` object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Link {
    /// Bare URI
    Url(String),
    /// URI with meta information
    Object {
        /// The link's URI
        href: String,
        /// Meta information about the link
        meta: Meta,
    },
}

impl Link {
    /// The URI this link points at
    pub fn href(&self) -> &str {
        match self {
            Self::Url(href) | Self::Object { href, .. } => href,
        }
    }

    fn with_meta(self, meta: Meta) -> Self {
        Self::Object {
            href: match self {
                Self::Url(href) | Self::Object { href, .. } => href,
            },
            meta,
        }
    }
}

/// A `self`/`related` link pair
///
/// Resource objects only carry `self`; relationship objects carry both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinksObject {
    #[serde(rename = "self")]
    self_link: Link,
    #[serde(skip_serializing_if = "Option::is_none")]
    related: Option<Link>,
}

impl LinksObject {
    /// Link pair for a relationship
    pub fn new(self_link: impl Into<String>, related: impl Into<String>) -> Self {
        Self {
            self_link: Link::Url(self_link.into()),
            related: Some(Link::Url(related.into())),
        }
    }

    /// Only a `self` link, as used on resource objects
    pub fn self_only(self_link: impl Into<String>) -> Self {
        Self {
            self_link: Link::Url(self_link.into()),
            related: None,
        }
    }

    /// Attach meta to the `self` link, turning it into `{href, meta}`
    #[must_use]
    pub fn with_self_meta(mut self, meta: Meta) -> Self {
        self.self_link = self.self_link.with_meta(meta);
        self
    }

    /// Attach meta to the `related` link; no-op when there is no related link
    #[must_use]
    pub fn with_related_meta(mut self, meta: Meta) -> Self {
        self.related = self.related.map(|link| link.with_meta(meta));
        self
    }

    pub fn self_link(&self) -> &Link {
        &self.self_link
    }

    pub fn related(&self) -> Option<&Link> {
        self.related.as_ref()
    }
}

/// The `data` member of a relationship object
///
/// `ToOne(None)` renders as `null` (empty to-one); `ToMany(vec![])` renders
/// as `[]` (empty to-many). A relationship that omits linkage altogether has
/// no `ResourceLinkage` at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceLinkage {
    /// Single identifier, or `null` for an empty to-one relationship
    ToOne(Option<ResourceIdentifierObject>),
    /// Identifier list, possibly empty
    ToMany(Vec<ResourceIdentifierObject>),
}

impl ResourceLinkage {
    pub fn is_to_many(&self) -> bool {
        matches!(self, Self::ToMany(_))
    }

    /// All identifiers referenced by this linkage
    pub fn identifiers(&self) -> Vec<&ResourceIdentifierObject> {
        match self {
            Self::ToOne(identifier) => identifier.iter().collect(),
            Self::ToMany(identifiers) => identifiers.iter().collect(),
        }
    }
}

/// One named entry of a resource's `relationships`
///
/// # Example
///
/// ```rust
/// use jsonapi_engine::document::{LinksObject, RelationshipObject, ResourceLinkage};
///
/// let links = LinksObject::new(
///     "http://example.com/articles/1/relationships/author",
///     "http://example.com/articles/1/author",
/// );
/// let author = RelationshipObject::from_links("author", links)
///     .with_linkage(ResourceLinkage::ToOne(None));
///
/// let json = serde_json::to_value(&author).unwrap();
/// assert!(json["data"].is_null());
/// assert!(json.get("name").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipObject {
    #[serde(skip)]
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    links: Option<LinksObject>,
    #[serde(rename = "data", skip_serializing_if = "Option::is_none")]
    linkage: Option<ResourceLinkage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
}

impl RelationshipObject {
    /// Link-only relationship (linkage not resolved)
    pub fn from_links(name: impl Into<String>, links: LinksObject) -> Self {
        Self {
            name: name.into(),
            links: Some(links),
            linkage: None,
            meta: None,
        }
    }

    pub fn from_linkage(name: impl Into<String>, linkage: ResourceLinkage) -> Self {
        Self {
            name: name.into(),
            links: None,
            linkage: Some(linkage),
            meta: None,
        }
    }

    pub fn from_meta(name: impl Into<String>, meta: Meta) -> Self {
        Self {
            name: name.into(),
            links: None,
            linkage: None,
            meta: Some(meta),
        }
    }

    #[must_use]
    pub fn with_links(mut self, links: LinksObject) -> Self {
        self.links = Some(links);
        self
    }

    #[must_use]
    pub fn with_linkage(mut self, linkage: ResourceLinkage) -> Self {
        self.linkage = Some(linkage);
        self
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn links(&self) -> Option<&LinksObject> {
        self.links.as_ref()
    }

    pub fn linkage(&self) -> Option<&ResourceLinkage> {
        self.linkage.as_ref()
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }
}

/// The `relationships` member of a resource object
///
/// Serializes as a JSON object keyed by relationship name, in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationshipsObject {
    entries: Vec<RelationshipObject>,
}

impl RelationshipsObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relationship; a second entry with the same name is an internal error
    pub fn insert(&mut self, relationship: RelationshipObject) -> JsonApiResult<()> {
        if self.get(relationship.name()).is_some() {
            return Err(JsonApiError::internal(format!(
                "The relationship {} is declared more than once.",
                relationship.name()
            )));
        }
        self.entries.push(relationship);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RelationshipObject> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationshipObject> {
        self.entries.iter()
    }
}

impl Serialize for RelationshipsObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, entry)?;
        }
        map.end()
    }
}

/// A fully serialized entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    id: String,
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<Attributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relationships: Option<RelationshipsObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    links: Option<LinksObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
}

impl ResourceObject {
    /// Create a resource object; fails with an internal error if `id` or `type` is empty
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> JsonApiResult<Self> {
        let id = id.into();
        let resource_type = resource_type.into();
        require_non_empty(&id, &resource_type)?;
        Ok(Self {
            id,
            resource_type,
            attributes: None,
            relationships: None,
            links: None,
            meta: None,
        })
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    #[must_use]
    pub fn with_relationships(mut self, relationships: RelationshipsObject) -> Self {
        self.relationships = Some(relationships);
        self
    }

    #[must_use]
    pub fn with_links(mut self, links: LinksObject) -> Self {
        self.links = Some(links);
        self
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        self.attributes.as_ref()
    }

    pub fn relationships(&self) -> Option<&RelationshipsObject> {
        self.relationships.as_ref()
    }

    pub fn links(&self) -> Option<&LinksObject> {
        self.links.as_ref()
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    /// The identifier object referring to this resource
    pub fn identifier(&self) -> ResourceIdentifierObject {
        ResourceIdentifierObject {
            id: self.id.clone(),
            resource_type: self.resource_type.clone(),
            meta: None,
        }
    }
}
