//! Read-through snapshot cache in front of any [`DocumentStore`].
//!
//! Remote backends are slow and rate limited, so reads are served from an
//! in-process cache. Any write to a document drops its cached entry once the
//! backend has answered (success or conflict), so the next read is fresh.
//! A read already in flight when that happens returns its result but does
//! not cache it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::Document;
use crate::traits::{DocumentStore, Revision, Snapshot};

struct CacheEntry {
    snapshot: Option<Snapshot>,
    fetched_at: Instant,
}

/// Per-document state. `generation` moves on every invalidation, so a read
/// that started before a write cannot repopulate the slot after it.
#[derive(Default)]
struct Slot {
    generation: u64,
    cached: Option<CacheEntry>,
}

pub struct CachedStore {
    inner: Arc<dyn DocumentStore>,
    slots: DashMap<Document, Slot>,
    /// `None` keeps entries until the next write.
    ttl: Option<Duration>,
}

impl CachedStore {
    pub fn new(inner: Arc<dyn DocumentStore>, ttl: Option<Duration>) -> Self {
        Self { inner, slots: DashMap::new(), ttl }
    }

    pub fn invalidate(&self, doc: Document) {
        let mut slot = self.slots.entry(doc).or_default();
        slot.generation = slot.generation.wrapping_add(1);
        slot.cached = None;
    }

    fn fresh(&self, entry: &CacheEntry) -> bool {
        self.ttl.map_or(true, |ttl| entry.fetched_at.elapsed() < ttl)
    }
}

#[async_trait]
impl DocumentStore for CachedStore {
    async fn load(&self, doc: Document) -> Result<Option<Snapshot>> {
        let generation = {
            let slot = self.slots.entry(doc).or_default();
            if let Some(entry) = slot.cached.as_ref().filter(|e| self.fresh(e)) {
                debug!("cache hit for {doc}");
                return Ok(entry.snapshot.clone());
            }
            slot.generation
        };

        let snapshot = self.inner.load(doc).await?;

        let mut slot = self.slots.entry(doc).or_default();
        if slot.generation == generation {
            slot.cached = Some(CacheEntry { snapshot: snapshot.clone(), fetched_at: Instant::now() });
        } else {
            debug!("{doc} was written during the read; not caching it");
        }
        Ok(snapshot)
    }

    async fn save(
        &self,
        doc: Document,
        value: &Value,
        revision: Option<Revision>,
        message: &str,
    ) -> Result<()> {
        let result = self.inner.save(doc, value, revision, message).await;
        if matches!(result, Ok(()) | Err(AppError::Conflict(_))) {
            self.invalidate(doc);
        }
        result
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
