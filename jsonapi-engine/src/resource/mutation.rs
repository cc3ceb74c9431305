//! Relationship mutation protocol
//!
//! Relationship changes named by a create/update payload, or sent to a
//! relationship endpoint, are checked in two phases. Planning validates every
//! change and resolves every referenced resource without writing anything;
//! applying the resulting [`MutationPlan`] invokes the setters, replacers and
//! adders in order. A payload that fails validation on any relationship
//! therefore leaves every relationship untouched. Once applying starts there
//! is no rollback beyond what the persistence layer provides.
//!
//! Per relationship, checks run in this order:
//! 1. name lookup (parent, then children, then siblings)
//! 2. payload shape (to-one vs to-many)
//! 3. for each identifier: declared type, then lookup by id
//! 4. capability (setter / replacer / adder configured)
//!
//! # Example
//!
//! ```rust,ignore
//! use jsonapi_engine::resource::{RelationshipMutation, ResourcePayload};
//!
//! let payload = ResourcePayload::parse(&body, "articles", Some(&id))?;
//! let article = store.update_attributes(&id, payload.attributes)?;
//! RelationshipMutation::new(article.as_ref()).update(&payload.relationships)?;
//! ```

use std::collections::HashSet;
use std::fmt;

use super::payload::{IdentifierPayload, LinkagePayload, RelationshipPayload};
use super::relationship::{RelationshipDescriptor, RelationshipSet, ToManyRelationship};
use super::relationship::{ToManyWriter, ToOneSetter};
use super::{JsonApiResource, ResourceRef};
use crate::handlers::{JsonApiError, JsonApiResult};
use crate::pagination::Paginator;

const SCAN_PAGE_SIZE: i64 = 100;

/// One validated relationship change, ready to apply
#[derive(Clone)]
pub enum PlannedChange {
    /// Point a to-one relationship at a resource, or clear it
    SetParent {
        name: String,
        setter: ToOneSetter,
        related: Option<ResourceRef>,
    },
    /// Replace every member of a to-many relationship
    ReplaceMany {
        name: String,
        replacer: ToManyWriter,
        related: Vec<ResourceRef>,
    },
    /// Add members to a to-many relationship
    AddMany {
        name: String,
        adder: ToManyWriter,
        related: Vec<ResourceRef>,
    },
}

impl PlannedChange {
    pub fn name(&self) -> &str {
        match self {
            Self::SetParent { name, .. }
            | Self::ReplaceMany { name, .. }
            | Self::AddMany { name, .. } => name,
        }
    }

    fn apply(self) -> JsonApiResult<()> {
        match self {
            Self::SetParent {
                name,
                setter,
                related,
            } => {
                tracing::debug!(
                    relationship = %name,
                    related_id = ?related.as_ref().and_then(|related| related.id()),
                    "setting to-one relationship"
                );
                setter(related)
            }
            Self::ReplaceMany {
                name,
                replacer,
                related,
            } => {
                tracing::debug!(relationship = %name, count = related.len(), "replacing to-many relationship");
                replacer(related)
            }
            Self::AddMany {
                name,
                adder,
                related,
            } => {
                tracing::debug!(relationship = %name, count = related.len(), "adding to to-many relationship");
                adder(related)
            }
        }
    }
}

impl fmt::Debug for PlannedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (operation, count) = match self {
            Self::SetParent { related, .. } => ("set", usize::from(related.is_some())),
            Self::ReplaceMany { related, .. } => ("replace", related.len()),
            Self::AddMany { related, .. } => ("add", related.len()),
        };
        f.debug_struct("PlannedChange")
            .field("name", &self.name())
            .field("operation", &operation)
            .field("count", &count)
            .finish()
    }
}

/// Validated changes for one entity
#[derive(Debug, Clone, Default)]
pub struct MutationPlan {
    changes: Vec<PlannedChange>,
}

impl MutationPlan {
    pub fn changes(&self) -> &[PlannedChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Apply every change in order, stopping at the first failure
    pub fn apply(self) -> JsonApiResult<()> {
        self.changes.into_iter().try_for_each(PlannedChange::apply)
    }
}

/// Relationship mutation for one entity
#[derive(Debug, Clone)]
pub struct RelationshipMutation {
    relationships: RelationshipSet,
}

impl RelationshipMutation {
    pub fn new(entity: &dyn JsonApiResource) -> Self {
        Self {
            relationships: RelationshipSet::of(entity),
        }
    }

    /// Validate the relationships of a create/update payload
    ///
    /// To-one entries set (or clear) the parent; to-many entries replace the
    /// whole set.
    pub fn plan_update(&self, payload: &[RelationshipPayload]) -> JsonApiResult<MutationPlan> {
        let changes = payload
            .iter()
            .map(|relationship| self.plan_replace(&relationship.name, &relationship.data))
            .collect::<JsonApiResult<Vec<_>>>()?;
        Ok(MutationPlan { changes })
    }

    /// Validate a full replacement of one relationship
    ///
    /// # Errors
    ///
    /// - relationship not allowed: unknown name, or a parent without setter
    /// - bad request: payload shape does not match the relationship's multiplicity
    /// - type conflict / record not found: an identifier does not resolve
    /// - to-many set replacement forbidden: a to-many relationship without replacer
    pub fn plan_replace(&self, name: &str, data: &LinkagePayload) -> JsonApiResult<PlannedChange> {
        let descriptor = self.descriptor(name)?;
        match (descriptor, data) {
            (RelationshipDescriptor::Parent(parent), LinkagePayload::ToOne(identifier)) => {
                let related = identifier
                    .as_ref()
                    .map(|identifier| resolve(descriptor, identifier))
                    .transpose()?;
                let setter = parent
                    .setter()
                    .cloned()
                    .ok_or_else(|| JsonApiError::relationship_not_allowed(name))?;
                Ok(PlannedChange::SetParent {
                    name: name.to_string(),
                    setter,
                    related,
                })
            }
            (RelationshipDescriptor::Parent(_), LinkagePayload::ToMany(_)) => {
                Err(JsonApiError::bad_request(format!(
                    "{name} is a to-one relationship and takes a single resource identifier or null."
                )))
            }
            (_, LinkagePayload::ToMany(identifiers)) => {
                let related = resolve_all(descriptor, identifiers)?;
                let replacer = to_many(descriptor)?
                    .replacer()
                    .cloned()
                    .ok_or_else(JsonApiError::to_many_set_replacement_forbidden)?;
                Ok(PlannedChange::ReplaceMany {
                    name: name.to_string(),
                    replacer,
                    related,
                })
            }
            (_, LinkagePayload::ToOne(_)) => Err(to_many_shape_error(name)),
        }
    }

    /// Validate adding members to a to-many relationship
    ///
    /// # Errors
    ///
    /// - relationship not allowed: unknown name, a parent relationship, or no adder
    /// - bad request: payload is not a list of identifiers
    /// - type conflict / record not found: an identifier does not resolve
    /// - has-many relation exists: a member is already linked, or named twice
    pub fn plan_add(&self, name: &str, data: &LinkagePayload) -> JsonApiResult<PlannedChange> {
        let descriptor = self.descriptor(name)?;
        let many = descriptor
            .as_to_many()
            .ok_or_else(|| JsonApiError::relationship_not_allowed(name))?;
        let LinkagePayload::ToMany(identifiers) = data else {
            return Err(to_many_shape_error(name));
        };

        let related = resolve_all(descriptor, identifiers)?;
        let adder = many
            .adder()
            .cloned()
            .ok_or_else(|| JsonApiError::relationship_not_allowed(name))?;

        let mut linked = current_ids(many)?;
        for identifier in identifiers {
            if !linked.insert(identifier.id.clone()) {
                return Err(JsonApiError::has_many_relation_exists(&identifier.id));
            }
        }

        Ok(PlannedChange::AddMany {
            name: name.to_string(),
            adder,
            related,
        })
    }

    /// Validate then apply every relationship of a create/update payload
    pub fn update(&self, payload: &[RelationshipPayload]) -> JsonApiResult<()> {
        self.plan_update(payload)?.apply()
    }

    /// Validate then apply a full replacement of one relationship
    pub fn replace(&self, name: &str, data: &LinkagePayload) -> JsonApiResult<()> {
        self.plan_replace(name, data)?.apply()
    }

    /// Validate then apply adding members to a to-many relationship
    pub fn add_to_many(&self, name: &str, data: &LinkagePayload) -> JsonApiResult<()> {
        self.plan_add(name, data)?.apply()
    }

    fn descriptor(&self, name: &str) -> JsonApiResult<&RelationshipDescriptor> {
        self.relationships
            .get(name)
            .ok_or_else(|| JsonApiError::relationship_not_allowed(name))
    }
}

fn to_many(descriptor: &RelationshipDescriptor) -> JsonApiResult<&ToManyRelationship> {
    descriptor
        .as_to_many()
        .ok_or_else(|| JsonApiError::internal("Expected a to-many relationship."))
}

fn to_many_shape_error(name: &str) -> JsonApiError {
    JsonApiError::bad_request(format!(
        "{name} is a to-many relationship and takes a list of resource identifiers."
    ))
}

// The declared type is checked before the finder runs: a mistyped identifier
// is a type conflict even when its id does not resolve, and never reaches the store.
fn resolve(
    descriptor: &RelationshipDescriptor,
    identifier: &IdentifierPayload,
) -> JsonApiResult<ResourceRef> {
    if identifier.resource_type != descriptor.resource_type() {
        return Err(JsonApiError::type_conflict(&identifier.resource_type));
    }
    descriptor
        .find(&identifier.id)?
        .ok_or_else(|| JsonApiError::record_not_found(&identifier.id))
}

fn resolve_all(
    descriptor: &RelationshipDescriptor,
    identifiers: &[IdentifierPayload],
) -> JsonApiResult<Vec<ResourceRef>> {
    identifiers
        .iter()
        .map(|identifier| resolve(descriptor, identifier))
        .collect()
}

// Every id currently linked, read page by page through the getter.
fn current_ids(many: &ToManyRelationship) -> JsonApiResult<HashSet<String>> {
    let mut ids = HashSet::new();
    let mut page_number = 1;
    loop {
        let page = many.get(&Paginator::new(SCAN_PAGE_SIZE, page_number)?)?;
        let fetched = page.len();
        let known = ids.len();
        ids.extend(page.iter().filter_map(|related| related.id()));
        // A getter that ignores the paginator returns the whole set on every call.
        if fetched != SCAN_PAGE_SIZE as usize || ids.len() == known {
            return Ok(ids);
        }
        page_number += 1;
    }
}
