//! Typed read/write of whole collections on top of a [`DocumentStore`].

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::Document;
use crate::traits::{DocumentStore, Revision};

/// A decoded list document plus the revision it was read at.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    pub entries: Vec<T>,
    pub revision: Option<Revision>,
}

/// Reads a list document.
///
/// A missing document yields an empty list with no revision. A document that
/// is not a JSON array is replaced by the empty default (the revision is kept
/// so the next write overwrites it). Entries that fail to decode are reported
/// as [`AppError::Corrupt`].
pub async fn read_collection<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    doc: Document,
) -> Result<Collection<T>> {
    let Some(snapshot) = store.load(doc).await? else {
        return Ok(Collection { entries: Vec::new(), revision: None });
    };

    let raw = match snapshot.value {
        Value::Array(raw) => raw,
        other => {
            warn!(
                "document {} is a {} instead of a list; using empty default",
                doc,
                json_kind(&other)
            );
            Vec::new()
        }
    };

    let entries = raw
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            serde_json::from_value(v)
                .map_err(|e| AppError::Corrupt(doc, format!("entry {i}: {e}")))
        })
        .collect::<Result<Vec<T>>>()?;

    Ok(Collection { entries, revision: snapshot.revision })
}

/// Writes a list document back, conditioned on `revision`.
pub async fn write_collection<T: Serialize>(
    store: &dyn DocumentStore,
    doc: Document,
    entries: &[T],
    revision: Option<Revision>,
    message: &str,
) -> Result<()> {
    let value = serde_json::to_value(entries)?;
    match store.save(doc, &value, revision, message).await {
        Ok(()) => {
            info!("saved {} via {} ({})", doc, store.backend_name(), message);
            Ok(())
        }
        Err(e) => {
            log::error!("failed to save {} via {}: {}", doc, store.backend_name(), e);
            Err(e)
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
