use sea_orm::{Condition, DatabaseConnection, DbErr, Order};
use std::marker::PhantomData;

use super::traits::Filterable;
use crate::filtering::{Criteria, Page, PageRequest, lower_predicate, resolve_sort};

/// Read-only criteria queries against the primary store.
pub struct QueryService<R> {
    db: DatabaseConnection,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for QueryService<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R> QueryService<R> {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _resource: PhantomData,
        }
    }
}

impl<R: Filterable> QueryService<R> {
    /// Lower `criteria` into a condition over `R`'s columns. `None` matches
    /// every record.
    ///
    /// # Errors
    ///
    /// Returns [`DbErr::Custom`] if the criteria names a field `R` does not
    /// describe.
    pub fn create_specification(criteria: Option<&R::Criteria>) -> Result<Condition, DbErr> {
        match criteria {
            None => Ok(Condition::all()),
            Some(criteria) => lower_predicate(&criteria.to_predicate(), R::lookup_field),
        }
    }

    /// Every match, ordered by id.
    ///
    /// # Errors
    ///
    /// Propagates primary-store errors.
    pub async fn find_by_criteria(&self, criteria: &R::Criteria) -> Result<Vec<R>, DbErr> {
        tracing::debug!(
            "find {} by criteria : {criteria:?}",
            R::RESOURCE_NAME_SINGULAR
        );
        let condition = Self::create_specification(Some(criteria))?;
        R::get_all(&self.db, &condition, &[(R::ID_COLUMN, Order::Asc)], 0, None).await
    }

    /// One page of matches in the requested order, `id ASC` breaking ties.
    ///
    /// # Errors
    ///
    /// Propagates primary-store errors.
    pub async fn find_by_criteria_page(
        &self,
        criteria: &R::Criteria,
        page: &PageRequest,
    ) -> Result<Page<R>, DbErr> {
        tracing::debug!(
            "find {} by criteria : {criteria:?}, page: {page:?}",
            R::RESOURCE_NAME_SINGULAR
        );
        let condition = Self::create_specification(Some(criteria))?;
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

    /// Number of matches; always the length of [`Self::find_by_criteria`].
    ///
    /// # Errors
    ///
    /// Propagates primary-store errors.
    pub async fn count_by_criteria(&self, criteria: &R::Criteria) -> Result<u64, DbErr> {
        tracing::debug!(
            "count {} by criteria : {criteria:?}",
            R::RESOURCE_NAME_SINGULAR
        );
        let condition = Self::create_specification(Some(criteria))?;
        R::total_count(&self.db, &condition).await
    }
}
