//! Create and update request bodies
//!
//! Parsing happens before anything is written, so a malformed or
//! mistyped payload never reaches the persistence layer.
//!
//! # Example
//!
//! ```rust
//! use jsonapi_engine::resource::{LinkagePayload, ResourcePayload};
//! use serde_json::json;
//!
//! let body = json!({
//!     "data": {
//!         "type": "articles",
//!         "id": "1",
//!         "attributes": { "title": "Rails is Omakase" },
//!         "relationships": {
//!             "author": { "data": { "type": "people", "id": "9" } }
//!         }
//!     }
//! });
//!
//! let payload = ResourcePayload::parse(&body, "articles", Some("1")).unwrap();
//! assert_eq!(payload.attributes["title"], "Rails is Omakase");
//! assert!(matches!(payload.relationships[0].data, LinkagePayload::ToOne(Some(_))));
//! ```

use serde_json::{Map, Value};

use crate::document::Attributes;
use crate::handlers::{JsonApiError, JsonApiResult};

/// An `{id, type}` pair named in a request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierPayload {
    pub id: String,
    pub resource_type: String,
}

/// The `data` member of a relationship in a request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkagePayload {
    /// An identifier, or `null` to clear a to-one relationship
    ToOne(Option<IdentifierPayload>),
    /// A list of identifiers
    ToMany(Vec<IdentifierPayload>),
}

/// One named relationship of a resource payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipPayload {
    pub name: String,
    pub data: LinkagePayload,
}

/// The resource object of a create or update body
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePayload {
    /// Client-supplied id; always present for updates
    pub id: Option<String>,
    pub resource_type: String,
    pub attributes: Attributes,
    pub relationships: Vec<RelationshipPayload>,
}

impl ResourcePayload {
    /// Parse a request body against the endpoint's resource type
    ///
    /// `url_id` is the id in the request URL for updates, `None` for creates.
    ///
    /// # Errors
    ///
    /// - invalid request format: the body is not an object
    /// - parameter missing: no `data`, no `data.type`, or a relationship without `data`
    /// - invalid data format: `data`, `attributes` or `relationships` is not an object
    /// - type conflict: `data.type` differs from `expected_type`
    /// - missing key: an update without `data.id`
    /// - key not included in URL: `data.id` differs from `url_id`
    pub fn parse(body: &Value, expected_type: &str, url_id: Option<&str>) -> JsonApiResult<Self> {
        let data = document_data(body)?;
        let data = data
            .as_object()
            .ok_or_else(|| JsonApiError::invalid_data_format().with_pointer("/data"))?;

        let resource_type = non_empty_str(data, "type")
            .ok_or_else(|| JsonApiError::parameter_missing("type").with_pointer("/data/type"))?;
        if resource_type != expected_type {
            return Err(JsonApiError::type_conflict(resource_type).with_pointer("/data/type"));
        }

        let id = non_empty_str(data, "id").map(str::to_string);
        if let Some(url_id) = url_id {
            let id = id
                .as_deref()
                .ok_or_else(|| JsonApiError::missing_key().with_pointer("/data/id"))?;
            if id != url_id {
                return Err(JsonApiError::key_not_included_in_url(id).with_pointer("/data/id"));
            }
        }

        let attributes = match data.get("attributes") {
            None | Some(Value::Null) => Attributes::new(),
            Some(Value::Object(attributes)) => attributes.clone(),
            Some(_) => {
                return Err(JsonApiError::invalid_data_format().with_pointer("/data/attributes"));
            }
        };

        let relationships = match data.get("relationships") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(relationships)) => relationships
                .iter()
                .map(|(name, relationship)| RelationshipPayload::parse(name, relationship))
                .collect::<JsonApiResult<Vec<_>>>()?,
            Some(_) => {
                return Err(
                    JsonApiError::invalid_data_format().with_pointer("/data/relationships")
                );
            }
        };

        Ok(Self {
            id,
            resource_type: resource_type.to_string(),
            attributes,
            relationships,
        })
    }
}

impl RelationshipPayload {
    fn parse(name: &str, relationship: &Value) -> JsonApiResult<Self> {
        let pointer = format!("/data/relationships/{name}");
        let relationship = relationship
            .as_object()
            .ok_or_else(|| JsonApiError::invalid_data_format().with_pointer(pointer.as_str()))?;
        let data = relationship.get("data").ok_or_else(|| {
            JsonApiError::parameter_missing("data").with_pointer(format!("{pointer}/data"))
        })?;

        Ok(Self {
            name: name.to_string(),
            data: LinkagePayload::parse(data, &format!("{pointer}/data"))?,
        })
    }
}

impl LinkagePayload {
    /// Parse the body of a relationship endpoint (`{"data": ...}`)
    ///
    /// # Example
    ///
    /// ```rust
    /// use jsonapi_engine::resource::LinkagePayload;
    /// use serde_json::json;
    ///
    /// let linkage = LinkagePayload::from_body(&json!({ "data": null })).unwrap();
    /// assert_eq!(linkage, LinkagePayload::ToOne(None));
    ///
    /// let linkage = LinkagePayload::from_body(&json!({ "data": [] })).unwrap();
    /// assert_eq!(linkage, LinkagePayload::ToMany(vec![]));
    /// ```
    pub fn from_body(body: &Value) -> JsonApiResult<Self> {
        Self::parse(document_data(body)?, "/data")
    }

    /// Parse a linkage value found at `pointer`
    pub fn parse(data: &Value, pointer: &str) -> JsonApiResult<Self> {
        match data {
            Value::Null => Ok(Self::ToOne(None)),
            Value::Object(_) => Ok(Self::ToOne(Some(IdentifierPayload::parse(data, pointer)?))),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| IdentifierPayload::parse(item, &format!("{pointer}/{index}")))
                .collect::<JsonApiResult<Vec<_>>>()
                .map(Self::ToMany),
            _ => Err(JsonApiError::invalid_data_format().with_pointer(pointer)),
        }
    }

    /// All identifiers named by this linkage
    pub fn identifiers(&self) -> Vec<&IdentifierPayload> {
        match self {
            Self::ToOne(identifier) => identifier.iter().collect(),
            Self::ToMany(identifiers) => identifiers.iter().collect(),
        }
    }
}

impl IdentifierPayload {
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
        }
    }

    fn parse(value: &Value, pointer: &str) -> JsonApiResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| JsonApiError::invalid_data_format().with_pointer(pointer))?;
        let resource_type = non_empty_str(object, "type").ok_or_else(|| {
            JsonApiError::parameter_missing("type").with_pointer(format!("{pointer}/type"))
        })?;
        let id = non_empty_str(object, "id")
            .ok_or_else(|| JsonApiError::missing_key().with_pointer(format!("{pointer}/id")))?;
        Ok(Self::new(id, resource_type))
    }
}

fn document_data(body: &Value) -> JsonApiResult<&Value> {
    let body = body
        .as_object()
        .ok_or_else(JsonApiError::invalid_request_format)?;
    body.get("data")
        .ok_or_else(|| JsonApiError::parameter_missing("data").with_pointer("/data"))
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
