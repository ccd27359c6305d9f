//! # Criteria Filtering, Sorting & Pagination
//!
//! This module turns query-string filters into database conditions without
//! writing SQL by hand.
//!
//! ## Pipeline
//!
//! 1. **Decode**: `field.operator=value` pairs are parsed into a typed
//!    criteria struct declared with [`criteria!`](crate::criteria). Unknown
//!    fields, unknown operators and unparseable values are rejected with a
//!    [`CriteriaError`].
//! 2. **Build**: [`Criteria::to_predicate`] folds every set filter into a
//!    [`Predicate`], a conjunction of leaf comparisons that knows nothing
//!    about SQL.
//! 3. **Lower**: [`lower_predicate`] turns the predicate into a Sea-ORM
//!    `Condition` over the entity's columns.
//!
//! ## Query Parameter Examples
//!
//! ```text
//! // Equality and inequality
//! GET /api/brands?brandName.equals=Toyota
//! GET /api/brands?brandName.notEquals=Honda
//!
//! // Ranges (numbers and timestamps)
//! GET /api/cars?dailyPrice.greaterThanOrEqual=40&dailyPrice.lessThan=90.5
//! GET /api/rentals?rentDate.greaterThan=2024-01-01T00:00:00Z
//!
//! // Lists and null checks
//! GET /api/cars?colorId.in=1,2,3
//! GET /api/cars?description.specified=false
//!
//! // Case-insensitive substring match (text only)
//! GET /api/cars?description.contains=diesel
//!
//! // Paging and sorting
//! GET /api/cars?page=2&size=50&sort=dailyPrice,desc&sort=modelYear
//! ```
//!
//! A record whose field is NULL never satisfies `notEquals`, `notIn` or
//! `doesNotContain` on that field.

pub mod conditions;
pub mod criteria;
pub mod filter;
pub mod pagination;
pub mod predicate;
pub mod sort;

pub use conditions::lower_predicate;
pub use criteria::{Criteria, CriteriaError};
pub use filter::{
    DoubleFilter, Filter, FilterScalar, LongFilter, StringFilter, TimestampFilter,
};
pub use pagination::{Page, PageRequest, PagingConfig, pagination_headers};
pub use predicate::{CompareOp, FieldKind, FieldValue, Predicate};
pub use sort::{SortDirection, SortOrder, resolve_sort};
