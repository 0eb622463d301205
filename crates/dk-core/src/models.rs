//! # Domain Models
//!
//! These structs represent the core entities of Docket: directory items with
//! their document links, and forum threads with their posts.
//! Ids are UUID v7 so freshly created entities sort by creation time.
//!
//! Deserialization is lenient about optional fields so documents edited by
//! hand (or written by older tooling) still load.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A directory entry cataloging document links under a project / work type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    /// Display title (e.g. "Carta Status"). Empty means missing.
    #[serde(default)]
    pub title: String,
    /// Internal project code (e.g. "FT02")
    #[serde(default)]
    pub project_code: String,
    /// Kind of work (e.g. "subestação", "drenagem")
    #[serde(default)]
    pub work_type: String,
    /// Append-only, in insertion order.
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub upvotes: u64,
}

/// A document link attached to an [`Item`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default)]
    pub by: String,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A forum topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Chronological, append-only.
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// A single message inside a [`Thread`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    #[serde(default)]
    pub by: String,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub text: String,
}

/// The free-text identity attributed to a create/mutate action.
///
/// Not an account: whatever label the session supplied, trimmed, or the
/// configured fallback identity when the label is blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(String);

impl Actor {
    pub fn resolve(label: Option<&str>, fallback: &str) -> Self {
        match label.map(str::trim) {
            Some(l) if !l.is_empty() => Self(l.to_string()),
            _ => Self(fallback.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The named JSON documents the store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Items,
    Threads,
    /// Reserved for future auth; nothing in the app reads or writes it.
    Users,
}

impl Document {
    /// Path of the document relative to the data root (or repository root).
    pub fn path(&self) -> &'static str {
        match self {
            Document::Items => "data/items.json",
            Document::Threads => "data/threads.json",
            Document::Users => "data/users.json",
        }
    }

    /// Value substituted when the document is missing or has the wrong shape.
    pub fn default_value(&self) -> serde_json::Value {
        match self {
            Document::Items | Document::Threads => serde_json::Value::Array(Vec::new()),
            Document::Users => serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Document::Items => "items",
            Document::Threads => "threads",
            Document::Users => "users",
        };
        f.write_str(name)
    }
}

/// Input for creating a directory item (form or JSON body).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub project_code: String,
    #[serde(default)]
    pub work_type: String,
    /// Comma separated.
    #[serde(default)]
    pub tags: String,
    /// Optional first link.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewItem {
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.project_code.trim().is_empty() {
            missing.push("project_code");
        }
        if self.work_type.trim().is_empty() {
            missing.push("work_type");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationError(missing))
        }
    }
}

/// Input for attaching a link to an existing item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewLink {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Input for opening a forum thread.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewThread {
    #[serde(default)]
    pub title: String,
    /// Comma separated.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub message: String,
}

impl NewThread {
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.message.trim().is_empty() {
            missing.push("message");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationError(missing))
        }
    }
}

/// Input for replying to a thread.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewReply {
    #[serde(default)]
    pub text: String,
}

/// Splits a comma separated tag list, trimming pieces and dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trims an optional note, mapping blank notes to `None`.
pub(crate) fn clean_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
}
