//! Relationship descriptors
//!
//! A descriptor wraps one relation of an entity as a uniform contract: a
//! mandatory getter, a by-id finder for the related side, the declared
//! related resource type, and optional mutation operations. A missing
//! mutation operation is a state of its own; the mutation protocol reports it
//! as "not allowed" (or "replacement forbidden") rather than doing nothing.
//!
//! The closures are type-erased over [`ResourceRef`] so one entity can hold
//! relations to several concrete types. The `typed` constructors layer a
//! single concrete related type on top.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use jsonapi_engine::handlers::JsonApiResult;
//! use jsonapi_engine::resource::{Finder, ParentRelationship, ResourceRef, ToOneGetter};
//!
//! let getter: ToOneGetter = Arc::new(|| -> JsonApiResult<Option<ResourceRef>> { Ok(None) });
//! let finder: Finder = Arc::new(|_id: &str| -> JsonApiResult<Option<ResourceRef>> { Ok(None) });
//! let author = ParentRelationship::new("people", getter, finder);
//! assert_eq!(author.resource_type(), "people");
//! assert!(!author.can_set());
//! ```

use std::fmt;
use std::sync::Arc;

use super::association::Association;
use super::{downcast_arc, JsonApiResource, ResourceKind, ResourceRef};
use crate::handlers::JsonApiResult;
use crate::pagination::Paginator;

/// Reads the current to-one related resource
pub type ToOneGetter = Arc<dyn Fn() -> JsonApiResult<Option<ResourceRef>> + Send + Sync>;

/// Points a to-one relationship at a resource, or clears it with `None`
pub type ToOneSetter = Arc<dyn Fn(Option<ResourceRef>) -> JsonApiResult<()> + Send + Sync>;

/// Reads one page of a to-many relationship
pub type ToManyGetter = Arc<dyn Fn(&Paginator) -> JsonApiResult<Vec<ResourceRef>> + Send + Sync>;

/// Adds members to, or replaces the members of, a to-many relationship
pub type ToManyWriter = Arc<dyn Fn(Vec<ResourceRef>) -> JsonApiResult<()> + Send + Sync>;

/// Looks up a related resource by id
pub type Finder = Arc<dyn Fn(&str) -> JsonApiResult<Option<ResourceRef>> + Send + Sync>;

fn erase<T: ResourceKind>(resource: Option<Arc<T>>) -> Option<ResourceRef> {
    resource.map(|resource| resource as ResourceRef)
}

/// A to-one relationship
#[derive(Clone)]
pub struct ParentRelationship {
    resource_type: String,
    getter: ToOneGetter,
    setter: Option<ToOneSetter>,
    finder: Finder,
}

impl ParentRelationship {
    pub fn new(resource_type: impl Into<String>, getter: ToOneGetter, finder: Finder) -> Self {
        Self {
            resource_type: resource_type.into(),
            getter,
            setter: None,
            finder,
        }
    }

    /// Descriptor for a single concrete related type
    pub fn typed<T, G, F>(getter: G, finder: F) -> Self
    where
        T: ResourceKind,
        G: Fn() -> JsonApiResult<Option<Arc<T>>> + Send + Sync + 'static,
        F: Fn(&str) -> JsonApiResult<Option<Arc<T>>> + Send + Sync + 'static,
    {
        Self::new(
            T::RESOURCE_TYPE,
            Arc::new(move || getter().map(erase)),
            Arc::new(move |id: &str| finder(id).map(erase)),
        )
    }

    #[must_use]
    pub fn with_setter(mut self, setter: ToOneSetter) -> Self {
        self.setter = Some(setter);
        self
    }

    /// Setter receiving the concrete related type
    ///
    /// A resource of another concrete type reaching the setter is an
    /// internal error.
    #[must_use]
    pub fn with_typed_setter<T, S>(self, setter: S) -> Self
    where
        T: ResourceKind,
        S: Fn(Option<Arc<T>>) -> JsonApiResult<()> + Send + Sync + 'static,
    {
        self.with_setter(Arc::new(move |resource: Option<ResourceRef>| {
            let resource = resource.map(downcast_arc::<T>).transpose()?;
            setter(resource)
        }))
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn get(&self) -> JsonApiResult<Option<ResourceRef>> {
        (self.getter)()
    }

    pub fn find(&self, id: &str) -> JsonApiResult<Option<ResourceRef>> {
        (self.finder)(id)
    }

    pub fn can_set(&self) -> bool {
        self.setter.is_some()
    }

    pub fn setter(&self) -> Option<&ToOneSetter> {
        self.setter.as_ref()
    }
}

impl fmt::Debug for ParentRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentRelationship")
            .field("resource_type", &self.resource_type)
            .field("setter", &self.setter.is_some())
            .finish_non_exhaustive()
    }
}

/// A to-many relationship, used for both children and siblings
#[derive(Clone)]
pub struct ToManyRelationship {
    resource_type: String,
    getter: ToManyGetter,
    finder: Finder,
    adder: Option<ToManyWriter>,
    replacer: Option<ToManyWriter>,
}

impl ToManyRelationship {
    pub fn new(resource_type: impl Into<String>, getter: ToManyGetter, finder: Finder) -> Self {
        Self {
            resource_type: resource_type.into(),
            getter,
            finder,
            adder: None,
            replacer: None,
        }
    }

    /// Descriptor for a single concrete related type
    pub fn typed<T, G, F>(getter: G, finder: F) -> Self
    where
        T: ResourceKind,
        G: Fn(&Paginator) -> JsonApiResult<Vec<Arc<T>>> + Send + Sync + 'static,
        F: Fn(&str) -> JsonApiResult<Option<Arc<T>>> + Send + Sync + 'static,
    {
        Self::new(
            T::RESOURCE_TYPE,
            Arc::new(move |paginator: &Paginator| {
                getter(paginator).map(|resources| {
                    resources
                        .into_iter()
                        .map(|resource| resource as ResourceRef)
                        .collect()
                })
            }),
            Arc::new(move |id: &str| finder(id).map(erase)),
        )
    }

    /// Siblings descriptor reading and writing through an association store
    ///
    /// The getter pages through `related`, the adder attaches each new
    /// member, and the replacer detaches everything before attaching the new
    /// set.
    pub fn through<A>(
        resource_type: impl Into<String>,
        owner_id: impl Into<String>,
        association: Arc<A>,
    ) -> Self
    where
        A: Association + 'static,
    {
        let owner_id: Arc<str> = Arc::from(owner_id.into());

        let getter: ToManyGetter = {
            let association = Arc::clone(&association);
            let owner_id = Arc::clone(&owner_id);
            Arc::new(move |paginator: &Paginator| association.related(&owner_id, paginator))
        };
        let finder: Finder = {
            let association = Arc::clone(&association);
            Arc::new(move |id: &str| association.find(id))
        };
        let adder: ToManyWriter = {
            let association = Arc::clone(&association);
            let owner_id = Arc::clone(&owner_id);
            Arc::new(move |resources: Vec<ResourceRef>| {
                resources
                    .iter()
                    .try_for_each(|resource| association.attach(&owner_id, resource))
            })
        };
        let replacer: ToManyWriter = Arc::new(move |resources: Vec<ResourceRef>| {
            association.detach_all(&owner_id)?;
            resources
                .iter()
                .try_for_each(|resource| association.attach(&owner_id, resource))
        });

        Self::new(resource_type, getter, finder)
            .with_adder(adder)
            .with_replacer(replacer)
    }

    #[must_use]
    pub fn with_adder(mut self, adder: ToManyWriter) -> Self {
        self.adder = Some(adder);
        self
    }

    #[must_use]
    pub fn with_replacer(mut self, replacer: ToManyWriter) -> Self {
        self.replacer = Some(replacer);
        self
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn get(&self, paginator: &Paginator) -> JsonApiResult<Vec<ResourceRef>> {
        (self.getter)(paginator)
    }

    pub fn find(&self, id: &str) -> JsonApiResult<Option<ResourceRef>> {
        (self.finder)(id)
    }

    pub fn can_add(&self) -> bool {
        self.adder.is_some()
    }

    pub fn can_replace(&self) -> bool {
        self.replacer.is_some()
    }

    pub fn adder(&self) -> Option<&ToManyWriter> {
        self.adder.as_ref()
    }

    pub fn replacer(&self) -> Option<&ToManyWriter> {
        self.replacer.as_ref()
    }
}

impl fmt::Debug for ToManyRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToManyRelationship")
            .field("resource_type", &self.resource_type)
            .field("adder", &self.adder.is_some())
            .field("replacer", &self.replacer.is_some())
            .finish_non_exhaustive()
    }
}

/// One relationship of an entity, tagged by multiplicity
#[derive(Debug, Clone)]
pub enum RelationshipDescriptor {
    /// To-one
    Parent(ParentRelationship),
    /// Owned to-many
    Children(ToManyRelationship),
    /// Many-to-many through an association
    Siblings(ToManyRelationship),
}

impl RelationshipDescriptor {
    /// Declared type of the related resources
    pub fn resource_type(&self) -> &str {
        match self {
            Self::Parent(parent) => parent.resource_type(),
            Self::Children(many) | Self::Siblings(many) => many.resource_type(),
        }
    }

    pub fn find(&self, id: &str) -> JsonApiResult<Option<ResourceRef>> {
        match self {
            Self::Parent(parent) => parent.find(id),
            Self::Children(many) | Self::Siblings(many) => many.find(id),
        }
    }

    pub fn is_to_many(&self) -> bool {
        !matches!(self, Self::Parent(_))
    }

    /// The to-many descriptor, if this is a children or siblings relationship
    pub fn as_to_many(&self) -> Option<&ToManyRelationship> {
        match self {
            Self::Parent(_) => None,
            Self::Children(many) | Self::Siblings(many) => Some(many),
        }
    }
}

/// Every relationship of one entity, in lookup order
///
/// Parent relationships come first, then children, then siblings; within
/// each group names are sorted. [`RelationshipSet::get`] returns the first
/// match in that order.
#[derive(Debug, Clone, Default)]
pub struct RelationshipSet {
    entries: Vec<(String, RelationshipDescriptor)>,
}

impl RelationshipSet {
    /// Collect the descriptors an entity hands out
    pub fn of(entity: &dyn JsonApiResource) -> Self {
        let parents = entity
            .parent_relationships()
            .into_iter()
            .map(|(name, parent)| (name, RelationshipDescriptor::Parent(parent)));
        let children = entity
            .children_relationships()
            .into_iter()
            .map(|(name, many)| (name, RelationshipDescriptor::Children(many)));
        let siblings = entity
            .siblings_relationships()
            .into_iter()
            .map(|(name, many)| (name, RelationshipDescriptor::Siblings(many)));

        Self {
            entries: parents.chain(children).chain(siblings).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RelationshipDescriptor> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, descriptor)| descriptor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationshipDescriptor)> {
        self.entries
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::fixtures::Store;

    #[test]
    fn test_lookup_order_parent_children_siblings() {
        let store = Store::seeded();
        let article = store.article("1").unwrap();
        let relationships = RelationshipSet::of(article.as_ref());

        let names: Vec<&str> = relationships.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["author", "comments", "tags"]);
        assert!(matches!(relationships.get("author"), Some(RelationshipDescriptor::Parent(_))));
        assert!(matches!(
            relationships.get("comments"),
            Some(RelationshipDescriptor::Children(_))
        ));
        assert!(matches!(relationships.get("tags"), Some(RelationshipDescriptor::Siblings(_))));
        assert!(relationships.get("editor").is_none());
    }

    #[test]
    fn test_parent_name_shadows_to_many() {
        let store = Store::seeded();
        let shadowed = store.shadowed_article("1");
        let relationships = RelationshipSet::of(&shadowed);
        assert_eq!(relationships.len(), 2);
        assert!(!relationships.get("author").unwrap().is_to_many());
    }

    #[test]
    fn test_declared_capabilities() {
        let store = Store::seeded();
        let article = store.article("1").unwrap();
        let relationships = RelationshipSet::of(article.as_ref());

        let RelationshipDescriptor::Parent(author) = relationships.get("author").unwrap() else {
            panic!("author should be a parent relationship");
        };
        assert!(author.can_set());
        assert_eq!(author.resource_type(), "people");

        let comments = relationships.get("comments").unwrap().as_to_many().unwrap();
        assert!(!comments.can_add());
        assert!(!comments.can_replace());

        let tags = relationships.get("tags").unwrap().as_to_many().unwrap();
        assert!(tags.can_add());
        assert!(tags.can_replace());
    }

    #[test]
    fn test_typed_getter_and_finder_erase_types() {
        let store = Store::seeded();
        let comment = store.comment("5").unwrap();
        let relationships = RelationshipSet::of(comment.as_ref());
        let article = relationships.get("article").unwrap();

        assert_eq!(article.resource_type(), "articles");
        let found = article.find("1").unwrap().unwrap();
        assert_eq!(found.resource_type(), "articles");
        assert!(article.find("404").unwrap().is_none());
    }

    #[test]
    fn test_through_association_pages_and_writes() {
        let store = Store::seeded();
        let article = store.article("1").unwrap();
        let relationships = RelationshipSet::of(article.as_ref());
        let tags = relationships.get("tags").unwrap().as_to_many().unwrap();

        let first = tags.get(&Paginator::new(1, 1).unwrap()).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(tags.get(&Paginator::first_page(10)).unwrap().len(), 2);

        let t3 = tags.find("t3").unwrap().unwrap();
        (tags.replacer().unwrap())(vec![t3]).unwrap();
        let ids: Vec<String> = tags
            .get(&Paginator::first_page(10))
            .unwrap()
            .iter()
            .filter_map(|tag| tag.id())
            .collect();
        assert_eq!(ids, vec!["t3".to_string()]);
    }

    #[test]
    fn test_typed_setter_rejects_foreign_type() {
        let store = Store::seeded();
        let article = store.article("1").unwrap();
        let relationships = RelationshipSet::of(article.as_ref());
        let RelationshipDescriptor::Parent(author) = relationships.get("author").unwrap() else {
            panic!("author should be a parent relationship");
        };

        let tag: ResourceRef = store.tag("t1").unwrap();
        let err = (author.setter().unwrap())(Some(tag)).unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_debug_hides_closures() {
        let store = Store::seeded();
        let article = store.article("1").unwrap();
        let debug = format!("{:?}", RelationshipSet::of(article.as_ref()));
        assert!(debug.contains("resource_type: \"people\""));
    }
}
