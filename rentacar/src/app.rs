use axum::{Json, Router, routing::get};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use utoipa::OpenApi;

use crate::core::{EntityService, ServiceError};
use crate::entities::{BrandDto, CarDto, CarImageDto, ColorDto, CustomerDto, RentalDto};
use crate::filtering::PagingConfig;
use crate::routes::{ResourceState, filterable_router, resource_router};
use crate::search::SearchStore;

#[derive(OpenApi)]
#[openapi(
    info(title = "rentacar", description = "Car-rental CRUD API"),
    components(schemas(BrandDto, CarDto, ColorDto, CarImageDto, RentalDto, CustomerDto))
)]
pub struct ApiDoc;

/// One entity service per resource, sharing a database and a search store.
#[derive(Clone)]
pub struct AppServices {
    pub brands: EntityService<BrandDto>,
    pub cars: EntityService<CarDto>,
    pub colors: EntityService<ColorDto>,
    pub car_images: EntityService<CarImageDto>,
    pub rentals: EntityService<RentalDto>,
    pub customers: EntityService<CustomerDto>,
}

impl AppServices {
    #[must_use]
    pub fn new(db: &DatabaseConnection, search: &Arc<dyn SearchStore>, write_timeout: Duration) -> Self {
        Self {
            brands: EntityService::new(db.clone(), Arc::clone(search), write_timeout),
            cars: EntityService::new(db.clone(), Arc::clone(search), write_timeout),
            colors: EntityService::new(db.clone(), Arc::clone(search), write_timeout),
            car_images: EntityService::new(db.clone(), Arc::clone(search), write_timeout),
            rentals: EntityService::new(db.clone(), Arc::clone(search), write_timeout),
            customers: EntityService::new(db.clone(), Arc::clone(search), write_timeout),
        }
    }

    /// Rebuild every search index from the primary store. Returns the total
    /// number of documents indexed.
    ///
    /// # Errors
    ///
    /// Stops at the first resource that fails.
    pub async fn reindex_all(&self) -> Result<u64, ServiceError> {
        Ok(self.brands.reindex().await?
            + self.cars.reindex().await?
            + self.colors.reindex().await?
            + self.car_images.reindex().await?
            + self.rentals.reindex().await?
            + self.customers.reindex().await?)
    }

    /// Mirror writes that failed across all resources.
    #[must_use]
    pub fn lagging_writes(&self) -> u64 {
        self.brands.lagging_writes()
            + self.cars.lagging_writes()
            + self.colors.lagging_writes()
            + self.car_images.lagging_writes()
            + self.rentals.lagging_writes()
            + self.customers.lagging_writes()
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// The full API: every resource plus the OpenAPI document.
pub fn build_router(services: &AppServices, paging: PagingConfig) -> Router {
    Router::new()
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(filterable_router(ResourceState::new(services.brands.clone(), paging)))
        .merge(filterable_router(ResourceState::new(services.cars.clone(), paging)))
        .merge(filterable_router(ResourceState::new(services.colors.clone(), paging)))
        .merge(filterable_router(ResourceState::new(services.car_images.clone(), paging)))
        .merge(filterable_router(ResourceState::new(services.rentals.clone(), paging)))
        .merge(resource_router(ResourceState::new(services.customers.clone(), paging)))
}
