use sea_orm::{ActiveModelTrait, Condition, DatabaseConnection, DbErr, Order};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

use super::traits::CrudResource;
use crate::filtering::{Page, PageRequest, resolve_sort};
use crate::search::{SearchDocument, SearchError, SearchStore};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Entity operations over the primary store, mirrored into the search store.
///
/// Every write hits the primary store first. The search store is updated
/// afterwards; a failed or timed-out mirror write is logged under the
/// `rentacar::sync` target and counted in [`Self::lagging_writes`], never
/// returned to the caller. [`Self::reindex`] rebuilds the index from the
/// primary store.
pub struct EntityService<R> {
    db: DatabaseConnection,
    search: Arc<dyn SearchStore>,
    write_timeout: Duration,
    lagging: Arc<AtomicU64>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for EntityService<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            search: Arc::clone(&self.search),
            write_timeout: self.write_timeout,
            lagging: Arc::clone(&self.lagging),
            _resource: PhantomData,
        }
    }
}

impl<R: CrudResource> EntityService<R> {
    #[must_use]
    pub fn new(db: DatabaseConnection, search: Arc<dyn SearchStore>, write_timeout: Duration) -> Self {
        Self {
            db,
            search,
            write_timeout,
            lagging: Arc::new(AtomicU64::new(0)),
            _resource: PhantomData,
        }
    }

    /// Name of the search index holding this resource.
    #[must_use]
    pub const fn index_name() -> &'static str {
        R::RESOURCE_NAME_SINGULAR
    }

    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Mirror writes that failed since this service was created.
    #[must_use]
    pub fn lagging_writes(&self) -> u64 {
        self.lagging.load(Ordering::Relaxed)
    }

    /// Insert or fully replace a record, then mirror it.
    ///
    /// Without an id the store assigns one. With an id that exists the record
    /// is replaced; with an id that does not exist it is inserted under that
    /// id.
    ///
    /// # Errors
    ///
    /// Propagates primary-store errors. Search-store failures are not errors.
    pub async fn save(&self, dto: R) -> Result<R, DbErr> {
        tracing::debug!("Request to save {} : {dto:?}", R::RESOURCE_NAME_SINGULAR);
        let saved = match dto.id() {
            Some(id) if R::find_model(&self.db, id).await?.is_some() => {
                R::update(&self.db, dto.into_active_model()).await?
            }
            _ => R::insert(&self.db, dto.into_active_model()).await?,
        };
        self.mirror_upsert(&saved).await;
        Ok(saved)
    }

    /// Merge the non-null fields of `dto` onto the stored record.
    ///
    /// Returns `None` when `dto` has no id or no record has it; the search
    /// store is then left untouched.
    ///
    /// # Errors
    ///
    /// Propagates primary-store errors.
    pub async fn partial_update(&self, dto: R) -> Result<Option<R>, DbErr> {
        tracing::debug!(
            "Request to partially update {} : {dto:?}",
            R::RESOURCE_NAME_SINGULAR
        );
        let Some(id) = dto.id() else {
            return Ok(None);
        };
        let Some(existing) = R::find_model(&self.db, id).await? else {
            return Ok(None);
        };
        let active = dto.merge_into_active_model(existing.clone());
        let updated = if active.is_changed() {
            R::update(&self.db, active).await?
        } else {
            R::from_model(existing)
        };
        self.mirror_upsert(&updated).await;
        Ok(Some(updated))
    }

    /// # Errors
    ///
    /// Propagates primary-store errors.
    pub async fn find_all(&self, page: &PageRequest) -> Result<Page<R>, DbErr> {
        tracing::debug!("Request to get all {}", R::RESOURCE_NAME_PLURAL);
        let condition = Condition::all();
        let order = resolve_sort(&page.sort, R::ID_COLUMN, |name| {
            R::field(name).map(|f| f.column)
        });
        let total_elements = R::total_count(&self.db, &condition).await?;
        let content =
            R::get_all(&self.db, &condition, &order, page.offset(), Some(page.size)).await?;
        Ok(Page {
            content,
            total_elements,
            number: page.page,
            size: page.size,
        })
    }

    /// # Errors
    ///
    /// Propagates primary-store errors.
    pub async fn find_one(&self, id: i64) -> Result<Option<R>, DbErr> {
        tracing::debug!("Request to get {} : {id}", R::RESOURCE_NAME_SINGULAR);
        R::get_one(&self.db, id).await
    }

    /// # Errors
    ///
    /// Propagates primary-store errors.
    pub async fn exists(&self, id: i64) -> Result<bool, DbErr> {
        Ok(R::find_model(&self.db, id).await?.is_some())
    }

    /// Delete from the primary store, then from the search store. Deleting a
    /// missing id succeeds; the index delete is attempted regardless.
    ///
    /// # Errors
    ///
    /// Propagates primary-store errors.
    pub async fn delete(&self, id: i64) -> Result<(), DbErr> {
        tracing::debug!("Request to delete {} : {id}", R::RESOURCE_NAME_SINGULAR);
        R::delete(&self.db, id).await?;
        let result = tokio::time::timeout(
            self.write_timeout,
            self.search.delete(Self::index_name(), id),
        )
        .await;
        self.settle_mirror_write("delete", id, result);
        Ok(())
    }

    /// Query-string search against the search store only.
    ///
    /// # Errors
    ///
    /// Search-store failures and undecodable documents are returned.
    pub async fn search(&self, query: &str, page: &PageRequest) -> Result<Page<R>, ServiceError> {
        tracing::debug!(
            "Request to search for a page of {} for query {query}",
            R::RESOURCE_NAME_PLURAL
        );
        let hits = self
            .search
            .search(Self::index_name(), query, page.offset(), page.size)
            .await?;
        let content = hits
            .hits
            .into_iter()
            .map(|hit| serde_json::from_value::<R>(hit.source).map_err(SearchError::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            content,
            total_elements: hits.total,
            number: page.page,
            size: page.size,
        })
    }

    /// Rebuild this resource's index from the primary store. Returns the
    /// number of documents indexed.
    ///
    /// # Errors
    ///
    /// Unlike ordinary mirror writes, search-store failures are returned.
    pub async fn reindex(&self) -> Result<u64, ServiceError> {
        tracing::info!("Reindexing {}", R::RESOURCE_NAME_PLURAL);
        let all = R::get_all(
            &self.db,
            &Condition::all(),
            &[(R::ID_COLUMN, Order::Asc)],
            0,
            None,
        )
        .await?;
        self.search.clear(Self::index_name()).await?;
        let mut indexed = 0;
        for dto in all {
            let Some(id) = dto.id() else { continue };
            let source = serde_json::to_value(&dto).map_err(SearchError::from)?;
            self.search
                .upsert(Self::index_name(), SearchDocument { id, source })
                .await?;
            indexed += 1;
        }
        tracing::info!("Reindexed {indexed} {}", R::RESOURCE_NAME_PLURAL);
        Ok(indexed)
    }

    async fn mirror_upsert(&self, dto: &R) {
        let Some(id) = dto.id() else {
            return;
        };
        let source = match serde_json::to_value(dto) {
            Ok(source) => source,
            Err(e) => {
                self.record_lag("upsert", id, &SearchError::from(e));
                return;
            }
        };
        let result = tokio::time::timeout(
            self.write_timeout,
            self.search
                .upsert(Self::index_name(), SearchDocument { id, source }),
        )
        .await;
        self.settle_mirror_write("upsert", id, result);
    }

    fn settle_mirror_write(
        &self,
        operation: &'static str,
        id: i64,
        result: Result<Result<(), SearchError>, tokio::time::error::Elapsed>,
    ) {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.record_lag(operation, id, &e),
            Err(_) => {
                let millis = u64::try_from(self.write_timeout.as_millis()).unwrap_or(u64::MAX);
                self.record_lag(operation, id, &SearchError::Timeout(millis));
            }
        }
    }

    fn record_lag(&self, operation: &'static str, id: i64, error: &SearchError) {
        self.lagging.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            target: "rentacar::sync",
            entity = R::RESOURCE_NAME_SINGULAR,
            id,
            operation,
            error = %error,
            "search index write failed; index is behind the primary store"
        );
    }
}
