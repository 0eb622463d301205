//! docket/crates/dk-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Docket: a
//! directory of document links plus a discussion forum, persisted as two
//! whole JSON documents behind a pluggable [`DocumentStore`].

pub mod cache;
pub mod collection;
pub mod error;
pub mod memory;
pub mod models;
pub mod query;
pub mod service;
pub mod traits;

// Re-exporting for easier access in other crates
pub use cache::CachedStore;
pub use collection::{read_collection, write_collection, Collection};
pub use error::*;
pub use memory::MemoryStore;
pub use models::*;
pub use query::*;
pub use service::Docket;
pub use traits::*;
