//! # dk-ui
//!
//! Askama templates for the directory, new-item and forum pages, plus the
//! flattened view models they render. Templates never see domain types
//! directly; timestamps and optional fields are preformatted here.

use askama::Template;
use chrono::{DateTime, Utc};
use dk_core::{Item, Link, Post, Thread};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

fn fmt_time(at: &DateTime<Utc>) -> String {
    at.format(TIME_FORMAT).to_string()
}

/// Page chrome shared by every template (identity box, banners).
#[derive(Debug, Clone, Default)]
pub struct Chrome<'a> {
    pub actor: &'a str,
    pub backend: &'a str,
    /// Request path the identity form returns to.
    pub path: &'a str,
    pub notice: &'a str,
    pub error: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkView {
    pub url: String,
    pub by: String,
    pub at: String,
    pub note: String,
}

impl From<&Link> for LinkView {
    fn from(link: &Link) -> Self {
        Self {
            url: link.url.clone(),
            by: link.by.clone(),
            at: fmt_time(&link.at),
            note: link.note.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub id: String,
    pub title: String,
    pub project_code: String,
    pub work_type: String,
    pub links: Vec<LinkView>,
    pub tags: Vec<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
    pub upvotes: u64,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
        Self {
            id: item.id.to_string(),
            title: or_dash(&item.title),
            project_code: or_dash(&item.project_code),
            work_type: or_dash(&item.work_type),
            links: item.links.iter().map(LinkView::from).collect(),
            tags: item.tags.clone(),
            created_by: or_dash(&item.created_by),
            created_at: fmt_time(&item.created_at),
            updated_at: item.updated_at.as_ref().map_or_else(|| "?".to_string(), fmt_time),
            upvotes: item.upvotes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostView {
    pub by: String,
    pub at: String,
    pub text: String,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self { by: post.by.clone(), at: fmt_time(&post.at), text: post.text.clone() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThreadView {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub created_by: String,
    pub created_at: String,
    pub posts: Vec<PostView>,
}

impl From<&Thread> for ThreadView {
    fn from(thread: &Thread) -> Self {
        Self {
            id: thread.id.to_string(),
            title: thread.title.clone(),
            tags: thread.tags.clone(),
            created_by: thread.created_by.clone(),
            created_at: fmt_time(&thread.created_at),
            posts: thread.posts.iter().map(PostView::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "directory.html")]
pub struct DirectoryTemplate<'a> {
    pub chrome: Chrome<'a>,
    pub items: &'a [ItemView],
    pub q: &'a str,
    pub code: &'a str,
    pub work_type: &'a str,
    /// "recent" | "upvotes" | "title"
    pub sort: &'a str,
}

#[derive(Template)]
#[template(path = "new_item.html")]
pub struct NewItemTemplate<'a> {
    pub chrome: Chrome<'a>,
    pub title: &'a str,
    pub project_code: &'a str,
    pub work_type: &'a str,
    pub tags: &'a str,
    pub url: &'a str,
    pub note: &'a str,
}

#[derive(Template)]
#[template(path = "forum.html")]
pub struct ForumTemplate<'a> {
    pub chrome: Chrome<'a>,
    pub threads: &'a [ThreadView],
    pub q: &'a str,
    /// "recent" | "replies" | "title"
    pub sort: &'a str,
    pub new_title: &'a str,
    pub new_tags: &'a str,
    pub new_message: &'a str,
    /// Thread id whose reply box is refilled with `reply_text`.
    pub reply_to: &'a str,
    pub reply_text: &'a str,
}
