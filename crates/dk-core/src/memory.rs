//! In-memory document store for testing and ephemeral use.
//!
//! [`MemoryStore`] keeps every document in a `HashMap` behind a `RwLock` and
//! versions them with a SHA-256 content hash, enforcing the same
//! optimistic-concurrency rules as the remote backend. Data is lost when the
//! store is dropped.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::models::Document;
use crate::traits::{DocumentStore, Revision, Snapshot};

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<Document, Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document without a revision check.
    pub fn with_document(self, doc: Document, value: Value) -> Self {
        if let Ok(mut docs) = self.docs.write() {
            let revision = Some(content_revision(&value));
            docs.insert(doc, Snapshot { value, revision });
        }
        self
    }
}

fn content_revision(value: &Value) -> Revision {
    let mut hasher = Sha256::new();
    hasher.update(value.to_string().as_bytes());
    Revision(hex::encode(hasher.finalize()))
}

fn poisoned<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Persistence(format!("lock poisoned: {e}"))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, doc: Document) -> Result<Option<Snapshot>> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs.get(&doc).cloned())
    }

    async fn save(
        &self,
        doc: Document,
        value: &Value,
        revision: Option<Revision>,
        _message: &str,
    ) -> Result<()> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        let current = docs.get(&doc).and_then(|s| s.revision.clone());

        match (&revision, &current) {
            (Some(given), Some(cur)) if given != cur => {
                return Err(AppError::Conflict(format!(
                    "{doc} is at revision {}, not {}",
                    cur.as_str(),
                    given.as_str()
                )));
            }
            (Some(given), None) => {
                return Err(AppError::Conflict(format!(
                    "{doc} does not exist at revision {}",
                    given.as_str()
                )));
            }
            (None, Some(_)) => {
                return Err(AppError::Conflict(format!("{doc} already exists")));
            }
            _ => {}
        }

        docs.insert(
            doc,
            Snapshot { value: value.clone(), revision: Some(content_revision(value)) },
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
