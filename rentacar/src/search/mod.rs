//! # Search Index
//!
//! The secondary store: a per-resource document index answering query-string
//! searches. It mirrors the primary store and is allowed to lag behind it.
//!
//! [`SearchStore`] is the seam; [`InMemorySearchStore`] is the in-process
//! implementation used by the binary and the tests.

pub mod in_memory;
pub mod query;
pub mod tokenizer;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use in_memory::InMemorySearchStore;
pub use query::{ParsedQuery, parse_query};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search store unavailable: {0}")]
    Unavailable(String),

    #[error("search store did not answer within {0} ms")]
    Timeout(u64),

    #[error("search document (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A record as stored in the index: its id and its JSON form.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDocument {
    pub id: i64,
    pub source: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: i64,
    pub score: f32,
    pub source: Value,
}

/// One page of hits plus the number of matching documents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchHits {
    pub total: u64,
    pub hits: Vec<SearchHit>,
}

#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Insert or replace the document with `document.id` in `index`.
    async fn upsert(&self, index: &str, document: SearchDocument) -> Result<(), SearchError>;

    /// Remove a document. Removing an absent document succeeds.
    async fn delete(&self, index: &str, id: i64) -> Result<(), SearchError>;

    /// Run a query-string search, best match first, ties by ascending id.
    async fn search(
        &self,
        index: &str,
        query: &str,
        offset: u64,
        limit: u64,
    ) -> Result<SearchHits, SearchError>;

    /// Drop every document of `index`.
    async fn clear(&self, index: &str) -> Result<(), SearchError>;
}
