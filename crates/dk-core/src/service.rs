//! # Docket service
//!
//! Listing and mutation operations over the items and threads documents.
//!
//! Every mutation is one read-modify-write cycle: read the whole collection
//! and its revision, change it in memory, write the whole collection back
//! conditioned on that revision. Validation happens before anything is read,
//! so invalid input never touches the store. A failed write drops the
//! in-memory change; the next call starts from a fresh read.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::collection::{read_collection, write_collection};
use crate::error::{AppError, Result};
use crate::models::{
    clean_note, parse_tags, Actor, Document, Item, Link, NewItem, NewLink, NewReply, NewThread,
    Post, Thread,
};
use crate::query::{filter_items, filter_threads, ItemQuery, ThreadQuery};
use crate::traits::DocumentStore;

/// Entry point used by the presentation layer.
#[derive(Clone)]
pub struct Docket {
    store: Arc<dyn DocumentStore>,
}

impl Docket {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn list_items(&self, query: &ItemQuery) -> Result<Vec<Item>> {
        let col = read_collection::<Item>(self.store.as_ref(), Document::Items).await?;
        Ok(filter_items(&col.entries, query))
    }

    pub async fn list_threads(&self, query: &ThreadQuery) -> Result<Vec<Thread>> {
        let col = read_collection::<Thread>(self.store.as_ref(), Document::Threads).await?;
        Ok(filter_threads(&col.entries, query))
    }

    /// Appends a new item. `created_at == updated_at` and `upvotes == 0`.
    pub async fn create_item(&self, actor: &Actor, input: NewItem) -> Result<Item> {
        input.validate()?;
        let now = Utc::now();

        let mut item = Item {
            id: Uuid::now_v7(),
            title: input.title.trim().to_string(),
            project_code: input.project_code.trim().to_string(),
            work_type: input.work_type.trim().to_string(),
            links: Vec::new(),
            tags: parse_tags(&input.tags),
            created_by: actor.to_string(),
            created_at: now,
            updated_at: Some(now),
            upvotes: 0,
        };
        if let Some(url) = input.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            item.links.push(new_link(actor, url, input.note.as_deref(), now));
        }

        let mut col = read_collection::<Item>(self.store.as_ref(), Document::Items).await?;
        col.entries.push(item.clone());
        write_collection(
            self.store.as_ref(),
            Document::Items,
            &col.entries,
            col.revision,
            &format!("create item {}", item.id),
        )
        .await?;
        Ok(item)
    }

    pub async fn add_link(&self, actor: &Actor, item_id: Uuid, input: NewLink) -> Result<Item> {
        let url = input.url.trim();
        if url.is_empty() {
            return Err(AppError::ValidationError(vec!["url"]));
        }
        self.update_item(item_id, &format!("add link to item {item_id}"), |item, now| {
            item.links.push(new_link(actor, url, input.note.as_deref(), now));
        })
        .await
    }

    /// Adds exactly one vote. Repeat votes by the same actor all count.
    pub async fn upvote(&self, _actor: &Actor, item_id: Uuid) -> Result<Item> {
        self.update_item(item_id, &format!("upvote item {item_id}"), |item, _| {
            item.upvotes = item.upvotes.saturating_add(1);
        })
        .await
    }

    /// Opens a thread with its first post; new threads go to the front.
    pub async fn create_thread(&self, actor: &Actor, input: NewThread) -> Result<Thread> {
        input.validate()?;
        let now = Utc::now();

        let thread = Thread {
            id: Uuid::now_v7(),
            title: input.title.trim().to_string(),
            created_by: actor.to_string(),
            created_at: now,
            tags: parse_tags(&input.tags),
            posts: vec![new_post(actor, input.message.trim(), now)],
        };

        let mut col = read_collection::<Thread>(self.store.as_ref(), Document::Threads).await?;
        col.entries.insert(0, thread.clone());
        write_collection(
            self.store.as_ref(),
            Document::Threads,
            &col.entries,
            col.revision,
            &format!("create thread {}", thread.id),
        )
        .await?;
        Ok(thread)
    }

    /// Appends a post. Blank replies are rejected.
    pub async fn reply(&self, actor: &Actor, thread_id: Uuid, input: NewReply) -> Result<Thread> {
        let text = input.text.trim();
        if text.is_empty() {
            return Err(AppError::ValidationError(vec!["text"]));
        }

        let mut col = read_collection::<Thread>(self.store.as_ref(), Document::Threads).await?;
        let thread = col
            .entries
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| AppError::NotFound("thread", thread_id.to_string()))?;
        thread.posts.push(new_post(actor, text, Utc::now()));
        let updated = thread.clone();

        write_collection(
            self.store.as_ref(),
            Document::Threads,
            &col.entries,
            col.revision,
            &format!("reply thread {thread_id}"),
        )
        .await?;
        Ok(updated)
    }

    /// Read-modify-write of one item; bumps `updated_at`.
    async fn update_item<F>(&self, item_id: Uuid, message: &str, mutate: F) -> Result<Item>
    where
        F: FnOnce(&mut Item, DateTime<Utc>),
    {
        let mut col = read_collection::<Item>(self.store.as_ref(), Document::Items).await?;
        let item = col
            .entries
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| AppError::NotFound("item", item_id.to_string()))?;

        let now = Utc::now();
        mutate(item, now);
        item.updated_at = Some(now);
        let updated = item.clone();

        write_collection(self.store.as_ref(), Document::Items, &col.entries, col.revision, message)
            .await?;
        Ok(updated)
    }
}

fn new_link(actor: &Actor, url: &str, note: Option<&str>, at: DateTime<Utc>) -> Link {
    Link {
        url: url.to_string(),
        by: actor.to_string(),
        at,
        note: clean_note(note),
    }
}

fn new_post(actor: &Actor, text: &str, at: DateTime<Utc>) -> Post {
    Post {
        id: Uuid::now_v7(),
        by: actor.to_string(),
        at,
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockDocumentStore;

    fn actor() -> Actor {
        Actor::resolve(Some("ana@corp.com"), "anon")
    }

    #[tokio::test]
    async fn invalid_item_never_touches_the_store() {
        let mut store = MockDocumentStore::new();
        store.expect_load().never();
        store.expect_save().never();
        store.expect_backend_name().return_const("mock");

        let docket = Docket::new(Arc::new(store));
        let err = docket
            .create_item(&actor(), NewItem { title: "Carta".into(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref f) if f == &vec!["project_code", "work_type"]));
    }

    #[tokio::test]
    async fn blank_url_is_rejected_before_reading() {
        let mut store = MockDocumentStore::new();
        store.expect_load().never();
        store.expect_save().never();

        let docket = Docket::new(Arc::new(store));
        let err = docket
            .add_link(&actor(), Uuid::now_v7(), NewLink { url: "   ".into(), note: None })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref f) if f == &vec!["url"]));
    }

    #[tokio::test]
    async fn save_is_conditioned_on_the_read_revision() {
        use crate::traits::{Revision, Snapshot};
        use mockall::predicate::{always, eq};

        let mut store = MockDocumentStore::new();
        store.expect_load().returning(|_| {
            Ok(Some(Snapshot {
                value: serde_json::json!([]),
                revision: Some(Revision("r1".into())),
            }))
        });
        store
            .expect_save()
            .with(eq(Document::Threads), always(), eq(Some(Revision("r1".into()))), always())
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        store.expect_backend_name().return_const("mock");

        let docket = Docket::new(Arc::new(store));
        let thread = docket
            .create_thread(
                &actor(),
                NewThread { title: "Drenagem".into(), tags: String::new(), message: "oi".into() },
            )
            .await
            .unwrap();
        assert_eq!(thread.posts.len(), 1);
    }
}
