//! In-memory resource graph for tests
//!
//! people ← articles (author) → comments, articles ↔ tags. Every write goes
//! through [`Store`] and bumps a counter so tests can assert that nothing was
//! applied.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;

use super::{
    Association, JsonApiResource, ParentRelationship, ParentRelationships, ResourceKind,
    ResourceRef, ToManyRelationship, ToManyRelationships,
};
use crate::document::Attributes;
use crate::handlers::JsonApiResult;
use crate::pagination::Paginator;

#[derive(Debug, Clone)]
struct ArticleRow {
    title: String,
    subtitle: Option<String>,
    author_id: Option<String>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: String,
    body: String,
    article_id: String,
}

#[derive(Debug, Default)]
pub(crate) struct Store {
    people: Mutex<BTreeMap<String, String>>,
    articles: Mutex<BTreeMap<String, ArticleRow>>,
    comments: Mutex<Vec<CommentRow>>,
    tags: Mutex<BTreeMap<String, String>>,
    article_tags: Mutex<Vec<(String, String)>>,
    writes: AtomicUsize,
}

fn page<T>(items: Vec<T>, paginator: &Paginator) -> Vec<T> {
    let offset = usize::try_from(paginator.page_offset()).unwrap_or(usize::MAX);
    let count = usize::try_from(paginator.page_count()).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(count).collect()
}

impl Store {
    pub(crate) fn seeded() -> Arc<Self> {
        let store = Self::default();
        {
            let mut people = store.people.lock().unwrap();
            people.insert("9".to_string(), "Dan Gebhardt".to_string());
            people.insert("10".to_string(), "Yehuda Katz".to_string());
        }
        {
            let mut articles = store.articles.lock().unwrap();
            articles.insert(
                "1".to_string(),
                ArticleRow {
                    title: "JSON:API paints my bikeshed!".to_string(),
                    subtitle: None,
                    author_id: Some("9".to_string()),
                },
            );
            articles.insert(
                "2".to_string(),
                ArticleRow {
                    title: "Rails is Omakase".to_string(),
                    subtitle: Some("A lengthy essay".to_string()),
                    author_id: None,
                },
            );
        }
        {
            let mut comments = store.comments.lock().unwrap();
            for (id, body) in [("5", "First!"), ("12", "I like XML better")] {
                comments.push(CommentRow {
                    id: id.to_string(),
                    body: body.to_string(),
                    article_id: "1".to_string(),
                });
            }
        }
        {
            let mut tags = store.tags.lock().unwrap();
            for (id, label) in [("t1", "rust"), ("t2", "json"), ("t3", "api")] {
                tags.insert(id.to_string(), label.to_string());
            }
        }
        {
            let mut article_tags = store.article_tags.lock().unwrap();
            article_tags.push(("1".to_string(), "t1".to_string()));
            article_tags.push(("1".to_string(), "t2".to_string()));
        }
        Arc::new(store)
    }

    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn person(&self, id: &str) -> Option<Arc<Person>> {
        let people = self.people.lock().unwrap();
        people.get(id).map(|name| {
            Arc::new(Person {
                id: Some(id.to_string()),
                name: name.clone(),
            })
        })
    }

    pub(crate) fn unsaved_person(&self, name: &str) -> Person {
        Person {
            id: None,
            name: name.to_string(),
        }
    }

    pub(crate) fn tag(&self, id: &str) -> Option<Arc<Tag>> {
        let tags = self.tags.lock().unwrap();
        tags.get(id).map(|label| {
            Arc::new(Tag {
                id: id.to_string(),
                label: label.clone(),
            })
        })
    }

    pub(crate) fn article(self: &Arc<Self>, id: &str) -> Option<Arc<Article>> {
        let articles = self.articles.lock().unwrap();
        articles.get(id).map(|row| {
            Arc::new(Article {
                id: id.to_string(),
                row: row.clone(),
                store: Arc::clone(self),
            })
        })
    }

    pub(crate) fn comment(self: &Arc<Self>, id: &str) -> Option<Arc<Comment>> {
        let comments = self.comments.lock().unwrap();
        comments.iter().find(|row| row.id == id).map(|row| {
            Arc::new(Comment {
                row: row.clone(),
                store: Arc::clone(self),
            })
        })
    }

    pub(crate) fn shadowed_article(self: &Arc<Self>, id: &str) -> ShadowedArticle {
        ShadowedArticle { id: id.to_string() }
    }

    pub(crate) fn author_id(&self, article_id: &str) -> Option<String> {
        let articles = self.articles.lock().unwrap();
        articles.get(article_id).and_then(|row| row.author_id.clone())
    }

    pub(crate) fn tag_ids(&self, article_id: &str) -> Vec<String> {
        let article_tags = self.article_tags.lock().unwrap();
        article_tags
            .iter()
            .filter(|(owner, _)| owner == article_id)
            .map(|(_, tag)| tag.clone())
            .collect()
    }

    /// Point an article at a person record whose id is empty
    pub(crate) fn link_unsaved_author(&self, article_id: &str) {
        self.people
            .lock()
            .unwrap()
            .insert(String::new(), "Nobody".to_string());
        if let Some(row) = self.articles.lock().unwrap().get_mut(article_id) {
            row.author_id = Some(String::new());
        }
    }

    fn set_author(&self, article_id: &str, author_id: Option<String>) {
        self.record_write();
        if let Some(row) = self.articles.lock().unwrap().get_mut(article_id) {
            row.author_id = author_id;
        }
    }

    fn comments_of(self: &Arc<Self>, article_id: &str, paginator: &Paginator) -> Vec<Arc<Comment>> {
        let rows: Vec<CommentRow> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.article_id == article_id)
            .cloned()
            .collect();
        page(rows, paginator)
            .into_iter()
            .map(|row| {
                Arc::new(Comment {
                    row,
                    store: Arc::clone(self),
                })
            })
            .collect()
    }
}

#[derive(Debug)]
pub(crate) struct Person {
    id: Option<String>,
    name: String,
}

impl Person {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

impl JsonApiResource for Person {
    fn resource_type(&self) -> &str {
        Self::RESOURCE_TYPE
    }

    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn attributes(&self) -> JsonApiResult<Attributes> {
        let mut attributes = Attributes::new();
        attributes.insert("name".to_string(), json!(self.name));
        Ok(attributes)
    }
}

impl ResourceKind for Person {
    const RESOURCE_TYPE: &'static str = "people";
}

#[derive(Debug)]
pub(crate) struct Tag {
    id: String,
    label: String,
}

impl Tag {
    pub(crate) fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

impl JsonApiResource for Tag {
    fn resource_type(&self) -> &str {
        Self::RESOURCE_TYPE
    }

    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn attributes(&self) -> JsonApiResult<Attributes> {
        let mut attributes = Attributes::new();
        attributes.insert("label".to_string(), json!(self.label));
        Ok(attributes)
    }
}

impl ResourceKind for Tag {
    const RESOURCE_TYPE: &'static str = "tags";
}

pub(crate) struct Article {
    id: String,
    row: ArticleRow,
    store: Arc<Store>,
}

impl JsonApiResource for Article {
    fn resource_type(&self) -> &str {
        Self::RESOURCE_TYPE
    }

    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn attributes(&self) -> JsonApiResult<Attributes> {
        let mut attributes = Attributes::new();
        attributes.insert("title".to_string(), json!(self.row.title));
        attributes.insert("subtitle".to_string(), json!(self.row.subtitle));
        Ok(attributes)
    }

    fn parent_relationships(&self) -> ParentRelationships {
        let getter_store = Arc::clone(&self.store);
        let finder_store = Arc::clone(&self.store);
        let setter_store = Arc::clone(&self.store);
        let getter_id = self.id.clone();
        let setter_id = self.id.clone();

        let author = ParentRelationship::typed::<Person, _, _>(
            move || {
                Ok(getter_store
                    .author_id(&getter_id)
                    .and_then(|author_id| getter_store.person(&author_id)))
            },
            move |id: &str| Ok(finder_store.person(id)),
        )
        .with_typed_setter::<Person, _>(move |person| {
            setter_store.set_author(&setter_id, person.and_then(|person| person.id.clone()));
            Ok(())
        });

        ParentRelationships::from([("author".to_string(), author)])
    }

    fn children_relationships(&self) -> ToManyRelationships {
        let getter_store = Arc::clone(&self.store);
        let finder_store = Arc::clone(&self.store);
        let article_id = self.id.clone();

        let comments = ToManyRelationship::typed::<Comment, _, _>(
            move |paginator: &Paginator| Ok(getter_store.comments_of(&article_id, paginator)),
            move |id: &str| Ok(finder_store.comment(id)),
        );

        ToManyRelationships::from([("comments".to_string(), comments)])
    }

    fn siblings_relationships(&self) -> ToManyRelationships {
        let tags = ToManyRelationship::through(
            Tag::RESOURCE_TYPE,
            self.id.clone(),
            Arc::new(ArticleTags {
                store: Arc::clone(&self.store),
            }),
        );
        ToManyRelationships::from([("tags".to_string(), tags)])
    }
}

impl ResourceKind for Article {
    const RESOURCE_TYPE: &'static str = "articles";
}

struct ArticleTags {
    store: Arc<Store>,
}

impl Association for ArticleTags {
    fn related(&self, owner_id: &str, paginator: &Paginator) -> JsonApiResult<Vec<ResourceRef>> {
        Ok(page(self.store.tag_ids(owner_id), paginator)
            .iter()
            .filter_map(|id| self.store.tag(id))
            .map(|tag| tag as ResourceRef)
            .collect())
    }

    fn attach(&self, owner_id: &str, related: &ResourceRef) -> JsonApiResult<()> {
        self.store.record_write();
        self.store
            .article_tags
            .lock()
            .unwrap()
            .push((owner_id.to_string(), related.id().unwrap_or_default()));
        Ok(())
    }

    fn detach_all(&self, owner_id: &str) -> JsonApiResult<()> {
        self.store.record_write();
        self.store
            .article_tags
            .lock()
            .unwrap()
            .retain(|(owner, _)| owner != owner_id);
        Ok(())
    }

    fn find(&self, id: &str) -> JsonApiResult<Option<ResourceRef>> {
        Ok(self.store.tag(id).map(|tag| tag as ResourceRef))
    }
}

pub(crate) struct Comment {
    row: CommentRow,
    store: Arc<Store>,
}

impl JsonApiResource for Comment {
    fn resource_type(&self) -> &str {
        Self::RESOURCE_TYPE
    }

    fn id(&self) -> Option<String> {
        Some(self.row.id.clone())
    }

    fn attributes(&self) -> JsonApiResult<Attributes> {
        let mut attributes = Attributes::new();
        attributes.insert("body".to_string(), json!(self.row.body));
        Ok(attributes)
    }

    fn parent_relationships(&self) -> ParentRelationships {
        let getter_store = Arc::clone(&self.store);
        let finder_store = Arc::clone(&self.store);
        let article_id = self.row.article_id.clone();

        let article = ParentRelationship::typed::<Article, _, _>(
            move || Ok(getter_store.article(&article_id)),
            move |id: &str| Ok(finder_store.article(id)),
        );
        ParentRelationships::from([("article".to_string(), article)])
    }
}

impl ResourceKind for Comment {
    const RESOURCE_TYPE: &'static str = "comments";
}

/// Declares `author` both as a parent and as a to-many relationship
pub(crate) struct ShadowedArticle {
    id: String,
}

impl JsonApiResource for ShadowedArticle {
    fn resource_type(&self) -> &str {
        "articles"
    }

    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn attributes(&self) -> JsonApiResult<Attributes> {
        Ok(Attributes::new())
    }

    fn parent_relationships(&self) -> ParentRelationships {
        let author = ParentRelationship::typed::<Person, _, _>(|| Ok(None), |_id: &str| Ok(None));
        ParentRelationships::from([("author".to_string(), author)])
    }

    fn children_relationships(&self) -> ToManyRelationships {
        let authors = ToManyRelationship::typed::<Person, _, _>(
            |_paginator: &Paginator| Ok(Vec::new()),
            |_id: &str| Ok(None),
        );
        ToManyRelationships::from([("author".to_string(), authors)])
    }
}
