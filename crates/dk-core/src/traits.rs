//! # Core Traits (Ports)
//!
//! Any storage plugin must implement [`DocumentStore`] to be used by the binary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::models::Document;

/// Opaque token identifying one exact version of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Revision(pub String);

impl Revision {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A document as read from the backend, with the revision it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub value: Value,
    /// `None` for backends that cannot version documents.
    pub revision: Option<Revision>,
}

/// Whole-document persistence contract.
///
/// Documents are read and written as a single unit; there is no per-entity
/// update. Versioned backends condition `save` on `revision`:
/// - `Some(rev)` must match the current revision, otherwise the save fails
///   with `AppError::Conflict` and nothing is written.
/// - `None` creates the document.
///
/// Unversioned backends accept and ignore the token (last write wins).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns `Ok(None)` when the document does not exist.
    async fn load(&self, doc: Document) -> Result<Option<Snapshot>>;

    /// Replaces the whole document. `message` describes the change (used as
    /// the commit message by version-controlled backends).
    async fn save(
        &self,
        doc: Document,
        value: &Value,
        revision: Option<Revision>,
        message: &str,
    ) -> Result<()>;

    /// Short human label for the storage banner and logs.
    fn backend_name(&self) -> &'static str;
}
