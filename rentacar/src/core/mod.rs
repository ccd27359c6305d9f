//! Generic resource plumbing: the per-entity trait and the services built on it.

pub mod entity_service;
pub mod query_service;
pub mod traits;

pub use entity_service::{EntityService, ServiceError};
pub use query_service::QueryService;
pub use traits::{CrudResource, FieldDescriptor, Filterable, same_identity};
