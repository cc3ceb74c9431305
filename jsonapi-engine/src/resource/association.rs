use super::ResourceRef;
use crate::handlers::JsonApiResult;
use crate::pagination::Paginator;

/// A many-to-many association store, seen from one owning side
///
/// Siblings relationships built with
/// [`ToManyRelationship::through`](super::ToManyRelationship::through) read
/// and write membership through this trait instead of a foreign key.
pub trait Association: Send + Sync {
    /// One page of records associated with `owner_id`
    fn related(&self, owner_id: &str, paginator: &Paginator) -> JsonApiResult<Vec<ResourceRef>>;

    /// Create one association record
    fn attach(&self, owner_id: &str, related: &ResourceRef) -> JsonApiResult<()>;

    /// Remove every association record of `owner_id`
    fn detach_all(&self, owner_id: &str) -> JsonApiResult<()>;

    /// Look up a record on the related side by id
    fn find(&self, id: &str) -> JsonApiResult<Option<ResourceRef>>;
}
