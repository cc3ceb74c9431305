//! JSON:API document model
//!
//! A [`Document`] is the top-level value of every response body. It carries
//! either primary `data` or a list of `errors`, never both, plus optional
//! top-level `meta`. Primary data takes one of five shapes, all represented
//! by [`Data`]:
//!
//! - `null`
//! - a single resource object
//! - a list of resource objects
//! - a single resource identifier
//! - a list of resource identifiers
//!
//! # Example
//!
//! ```rust
//! use jsonapi_engine::document::{Data, Document, ResourceIdentifierObject};
//!
//! let identifier = ResourceIdentifierObject::new("9", "people").unwrap();
//! let document = Document::from_data(Data::from(identifier));
//!
//! assert_eq!(
//!     document.to_value().unwrap(),
//!     serde_json::json!({ "data": { "id": "9", "type": "people" } })
//! );
//! ```

mod error_object;
mod resource;

pub use error_object::{ErrorLinks, ErrorObject, ErrorSource};
pub use resource::{
    Attributes, Link, LinksObject, RelationshipObject, RelationshipsObject, ResourceIdentifierObject,
    ResourceLinkage, ResourceObject,
};

use serde::Serialize;

use crate::error::{Error, Result};

/// Free-form meta information
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// Primary data of a document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data {
    /// Explicit `null` (e.g. an empty to-one related resource)
    Null,
    /// A single resource object
    Resource(Box<ResourceObject>),
    /// A list of resource objects, possibly empty
    Resources(Vec<ResourceObject>),
    /// A single resource identifier
    Identifier(ResourceIdentifierObject),
    /// A list of resource identifiers, possibly empty
    Identifiers(Vec<ResourceIdentifierObject>),
}

impl From<ResourceObject> for Data {
    fn from(resource: ResourceObject) -> Self {
        Self::Resource(Box::new(resource))
    }
}

impl From<Vec<ResourceObject>> for Data {
    fn from(resources: Vec<ResourceObject>) -> Self {
        Self::Resources(resources)
    }
}

impl From<ResourceIdentifierObject> for Data {
    fn from(identifier: ResourceIdentifierObject) -> Self {
        Self::Identifier(identifier)
    }
}

impl From<Vec<ResourceIdentifierObject>> for Data {
    fn from(identifiers: Vec<ResourceIdentifierObject>) -> Self {
        Self::Identifiers(identifiers)
    }
}

impl From<ResourceLinkage> for Data {
    fn from(linkage: ResourceLinkage) -> Self {
        match linkage {
            ResourceLinkage::ToOne(Some(identifier)) => Self::Identifier(identifier),
            ResourceLinkage::ToOne(None) => Self::Null,
            ResourceLinkage::ToMany(identifiers) => Self::Identifiers(identifiers),
        }
    }
}

/// Top-level JSON:API document
///
/// `data` and `errors` are mutually exclusive; the constructors make the
/// invalid combinations unrepresentable except through [`Document::new`],
/// which checks them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Data>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<ErrorObject>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
}

impl Document {
    /// Document with primary data
    pub fn from_data(data: impl Into<Data>) -> Self {
        Self {
            data: Some(data.into()),
            errors: None,
            meta: None,
        }
    }

    /// Document with a list of errors
    ///
    /// The list should not be empty; [`Document::new`] enforces this.
    pub fn from_errors(errors: Vec<ErrorObject>) -> Self {
        Self {
            data: None,
            errors: Some(errors),
            meta: None,
        }
    }

    /// Build a document from optional parts
    ///
    /// Exactly one of `data` and `errors` must be present, and `errors`
    /// must not be empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] when both or neither are given, or when
    /// the error list is empty.
    pub fn new(data: Option<Data>, errors: Option<Vec<ErrorObject>>) -> Result<Self> {
        match (data, errors) {
            (Some(data), None) => Ok(Self::from_data(data)),
            (None, Some(errors)) if errors.is_empty() => Err(Error::Document(
                "an error document needs at least one error".to_string(),
            )),
            (None, Some(errors)) => Ok(Self::from_errors(errors)),
            (Some(_), Some(_)) => Err(Error::Document(
                "a document cannot carry both data and errors".to_string(),
            )),
            (None, None) => Err(Error::Document(
                "a document needs either data or errors".to_string(),
            )),
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    pub fn errors(&self) -> Option<&[ErrorObject]> {
        self.errors.as_deref()
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    /// Whether this is an error document
    pub fn is_error(&self) -> bool {
        self.errors.is_some()
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
