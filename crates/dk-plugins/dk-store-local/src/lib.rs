//! # dk-store-local
//! docket/crates/dk-plugins/dk-store-local/src/lib.rs
//! Local filesystem implementation of `DocumentStore`.
//! Features: pretty-printed UTF-8 JSON, atomic replace via temp file + rename.
//!
//! Files are not versioned: `load` never returns a revision and `save`
//! ignores the one it is given, so concurrent writers simply overwrite each
//! other (last write wins).

use async_trait::async_trait;
use dk_core::{AppError, Document, DocumentStore, Result, Revision, Snapshot};
use log::warn;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct LocalDocumentStore {
    /// Directory the document paths are resolved against (e.g. ".")
    root_path: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root_path: root }
    }

    /// Resolves a document to its file: "<root>/data/items.json"
    pub fn document_path(&self, doc: Document) -> PathBuf {
        self.root_path.join(doc.path())
    }
}

fn io_error(path: &Path, err: std::io::Error) -> AppError {
    AppError::Persistence(format!("{}: {}", path.display(), err))
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn load(&self, doc: Document) -> Result<Option<Snapshot>> {
        let path = self.document_path(doc);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };

        // Unparseable content reads as a missing document.
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(Snapshot { value, revision: None })),
            Err(e) => {
                warn!("{} is not valid JSON ({}); using empty default", path.display(), e);
                Ok(None)
            }
        }
    }

    async fn save(
        &self,
        doc: Document,
        value: &Value,
        _revision: Option<Revision>,
        _message: &str,
    ) -> Result<()> {
        let path = self.document_path(doc);
        let mut body = serde_json::to_string_pretty(value)?;
        body.push('\n');

        // 1. Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| io_error(parent, e))?;
        }

        // 2. Write beside the target, then swap it in
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, body.as_bytes()).await.map_err(|e| io_error(&temp_path, e))?;
        fs::rename(&temp_path, &path).await.map_err(|e| io_error(&path, e))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
