#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use rentacar::{
    AppServices, build_router,
    filtering::PagingConfig,
    migration::Migrator,
    search::{InMemorySearchStore, SearchDocument, SearchError, SearchHits, SearchStore},
};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::ServiceExt;

/// Per-test source of distinct names, so tests never share fixtures.
#[derive(Default)]
pub struct TestContext {
    counter: AtomicUsize,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> i64 {
        i64::try_from(self.counter.fetch_add(1, Ordering::SeqCst) + 1).unwrap()
    }

    pub fn unique_name(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.next_id())
    }
}

pub const WRITE_TIMEOUT: Duration = Duration::from_millis(200);

// Helper function to get database URL from environment or default to SQLite
fn get_test_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(&get_test_database_url()).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// A fresh database, an in-memory index and the services over both.
pub async fn setup_services() -> (AppServices, Arc<InMemorySearchStore>) {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let store = Arc::new(InMemorySearchStore::new());
    let search: Arc<dyn SearchStore> = store.clone();
    (AppServices::new(&db, &search, WRITE_TIMEOUT), store)
}

/// Services whose search store is `search`.
pub async fn setup_services_with(search: Arc<dyn SearchStore>) -> AppServices {
    let db = setup_test_db().await.expect("Failed to setup test database");
    AppServices::new(&db, &search, WRITE_TIMEOUT)
}

pub async fn setup_test_app() -> (Router, AppServices) {
    let (services, _) = setup_services().await;
    let app = build_router(&services, PagingConfig::default());
    (app, services)
}

/// A search store that refuses everything.
pub struct FailingSearchStore;

#[async_trait]
impl SearchStore for FailingSearchStore {
    async fn upsert(&self, _index: &str, _document: SearchDocument) -> Result<(), SearchError> {
        Err(SearchError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _index: &str, _id: i64) -> Result<(), SearchError> {
        Err(SearchError::Unavailable("connection refused".into()))
    }

    async fn search(
        &self,
        _index: &str,
        _query: &str,
        _offset: u64,
        _limit: u64,
    ) -> Result<SearchHits, SearchError> {
        Err(SearchError::Unavailable("connection refused".into()))
    }

    async fn clear(&self, _index: &str) -> Result<(), SearchError> {
        Err(SearchError::Unavailable("connection refused".into()))
    }
}

/// A search store that never answers writes within [`WRITE_TIMEOUT`].
pub struct StalledSearchStore;

#[async_trait]
impl SearchStore for StalledSearchStore {
    async fn upsert(&self, _index: &str, _document: SearchDocument) -> Result<(), SearchError> {
        tokio::time::sleep(WRITE_TIMEOUT * 10).await;
        Ok(())
    }

    async fn delete(&self, _index: &str, _id: i64) -> Result<(), SearchError> {
        tokio::time::sleep(WRITE_TIMEOUT * 10).await;
        Ok(())
    }

    async fn search(
        &self,
        _index: &str,
        _query: &str,
        _offset: u64,
        _limit: u64,
    ) -> Result<SearchHits, SearchError> {
        Ok(SearchHits::default())
    }

    async fn clear(&self, _index: &str) -> Result<(), SearchError> {
        Ok(())
    }
}

/// An in-memory store that counts the writes it receives.
#[derive(Default)]
pub struct RecordingSearchStore {
    pub inner: InMemorySearchStore,
    upserts: AtomicUsize,
    deletes: AtomicUsize,
}

impl RecordingSearchStore {
    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchStore for RecordingSearchStore {
    async fn upsert(&self, index: &str, document: SearchDocument) -> Result<(), SearchError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(index, document).await
    }

    async fn delete(&self, index: &str, id: i64) -> Result<(), SearchError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(index, id).await
    }

    async fn search(
        &self,
        index: &str,
        query: &str,
        offset: u64,
        limit: u64,
    ) -> Result<SearchHits, SearchError> {
        self.inner.search(index, query, offset, limit).await
    }

    async fn clear(&self, index: &str) -> Result<(), SearchError> {
        self.inner.clear(index).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Send one request through the router. Empty bodies come back as `Null`.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!(
                "non-JSON response ({status}): {}",
                String::from_utf8_lossy(&bytes)
            )
        })
    };
    TestResponse {
        status,
        headers,
        body,
    }
}
