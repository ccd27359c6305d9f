//! Car-rental CRUD backend on Axum and Sea-ORM.
//!
//! Six resources (brands, cars, colors, car images, rentals, customers) are
//! stored in a relational primary store and mirrored into a full-text search
//! index. The primary store is authoritative; the index is eventually
//! consistent and can be rebuilt with [`app::AppServices::reindex_all`].

pub mod app;
pub mod config;
pub mod core;
pub mod entities;
pub mod errors;
pub mod filtering;
pub mod migration;
pub mod routes;
pub mod search;

pub use app::{AppServices, build_router};
pub use config::AppConfig;
pub use crate::core::{CrudResource, EntityService, Filterable, QueryService};
pub use errors::ApiError;
