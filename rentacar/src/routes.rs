//! Generic REST handlers, mounted once per resource under `/api`.
//!
//! | Method   | Path                       | Notes                              |
//! |----------|----------------------------|------------------------------------|
//! | `POST`   | `/api/{plural}`            | 201 + `Location`, 400 if id given  |
//! | `PUT`    | `/api/{plural}/{id}`       | full replacement                   |
//! | `PATCH`  | `/api/{plural}/{id}`       | merge-patch, null leaves unchanged |
//! | `GET`    | `/api/{plural}`            | criteria, `page`, `size`, `sort`   |
//! | `GET`    | `/api/{plural}/count`      | criteria resources only            |
//! | `GET`    | `/api/{plural}/{id}`       | 404 when absent                    |
//! | `DELETE` | `/api/{plural}/{id}`       | 204, also when absent              |
//! | `GET`    | `/api/_search/{plural}`    | `query`, `page`, `size`            |
//! | `POST`   | `/api/_reindex/{plural}`   | rebuild the search index           |

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header::LOCATION},
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::core::{CrudResource, EntityService, Filterable, QueryService};
use crate::errors::ApiError;
use crate::filtering::{Criteria, PageRequest, PagingConfig, pagination_headers};

type QueryPairs = Vec<(String, String)>;

/// Everything a resource's handlers need.
pub struct ResourceState<R> {
    pub service: EntityService<R>,
    pub query: QueryService<R>,
    pub paging: PagingConfig,
}

impl<R> Clone for ResourceState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            query: self.query.clone(),
            paging: self.paging,
        }
    }
}

impl<R: CrudResource> ResourceState<R> {
    #[must_use]
    pub fn new(service: EntityService<R>, paging: PagingConfig) -> Self {
        Self {
            query: QueryService::new(service.db().clone()),
            service,
            paging,
        }
    }
}

fn collection_path<R: CrudResource>() -> String {
    format!("/api/{}", R::RESOURCE_NAME_PLURAL)
}

fn parse_path_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request_alert("idinvalid", format!("Invalid id '{raw}'")))
}

fn body<R>(payload: Result<Json<R>, JsonRejection>) -> Result<R, ApiError> {
    payload
        .map(|Json(dto)| dto)
        .map_err(|rejection| ApiError::bad_request_alert("badrequest", rejection.body_text()))
}

fn pairs_as_str(pairs: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
    pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}

/// Path id and body id must both be present and agree, and the record must
/// exist.
async fn check_update_target<R: CrudResource>(
    state: &ResourceState<R>,
    path_id: &str,
    dto: &R,
) -> Result<i64, ApiError> {
    let Some(id) = dto.id() else {
        return Err(ApiError::bad_request_alert("idnull", "Invalid id"));
    };
    if parse_path_id(path_id)? != id {
        return Err(ApiError::bad_request_alert("idinvalid", "Invalid ID"));
    }
    if !state.service.exists(id).await? {
        return Err(ApiError::bad_request_alert("idnotfound", "Entity not found"));
    }
    Ok(id)
}

pub async fn create_one<R: CrudResource>(
    State(state): State<ResourceState<R>>,
    payload: Result<Json<R>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<R>), ApiError> {
    let dto = body(payload)?;
    tracing::debug!("REST request to save {} : {dto:?}", R::RESOURCE_NAME_SINGULAR);
    if dto.id().is_some() {
        return Err(ApiError::bad_request_alert(
            "idexists",
            format!("A new {} cannot already have an ID", R::RESOURCE_NAME_SINGULAR),
        ));
    }
    let saved = state.service.save(dto).await?;

    let mut headers = HeaderMap::new();
    if let Some(id) = saved.id()
        && let Ok(location) = HeaderValue::from_str(&format!("{}/{id}", collection_path::<R>()))
    {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(saved)))
}

pub async fn update_one<R: CrudResource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
    payload: Result<Json<R>, JsonRejection>,
) -> Result<Json<R>, ApiError> {
    let dto = body(payload)?;
    tracing::debug!(
        "REST request to update {} : {id}, {dto:?}",
        R::RESOURCE_NAME_SINGULAR
    );
    check_update_target(&state, &id, &dto).await?;
    Ok(Json(state.service.save(dto).await?))
}

pub async fn partial_update_one<R: CrudResource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
    payload: Result<Json<R>, JsonRejection>,
) -> Result<Json<R>, ApiError> {
    let dto = body(payload)?;
    tracing::debug!(
        "REST request to partial update {} partially : {id}, {dto:?}",
        R::RESOURCE_NAME_SINGULAR
    );
    let id = check_update_target(&state, &id, &dto).await?;
    state
        .service
        .partial_update(dto)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(R::RESOURCE_NAME_SINGULAR, Some(id.to_string())))
}

pub async fn get_one<R: CrudResource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
) -> Result<Json<R>, ApiError> {
    tracing::debug!("REST request to get {} : {id}", R::RESOURCE_NAME_SINGULAR);
    let id = parse_path_id(&id)?;
    state
        .service
        .find_one(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(R::RESOURCE_NAME_SINGULAR, Some(id.to_string())))
}

pub async fn delete_one<R: CrudResource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    tracing::debug!("REST request to delete {} : {id}", R::RESOURCE_NAME_SINGULAR);
    let id = parse_path_id(&id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unfiltered listing, for resources without criteria.
pub async fn get_all<R: CrudResource>(
    State(state): State<ResourceState<R>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<(HeaderMap, Json<Vec<R>>), ApiError> {
    tracing::debug!("REST request to get a page of {}", R::RESOURCE_NAME_PLURAL);
    let request = PageRequest::from_query_pairs(&pairs, &state.paging)?;
    let page = state.service.find_all(&request).await?;
    let headers = pagination_headers(
        R::RESOURCE_NAME_PLURAL,
        &collection_path::<R>(),
        &pairs,
        &page,
    );
    Ok((headers, Json(page.content)))
}

pub async fn get_all_by_criteria<R: Filterable>(
    State(state): State<ResourceState<R>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<(HeaderMap, Json<Vec<R>>), ApiError> {
    let criteria = R::Criteria::from_query_pairs(pairs_as_str(&pairs))?;
    tracing::debug!(
        "REST request to get {} by criteria: {criteria:?}",
        R::RESOURCE_NAME_PLURAL
    );
    let request = PageRequest::from_query_pairs(&pairs, &state.paging)?;
    let page = state.query.find_by_criteria_page(&criteria, &request).await?;
    let headers = pagination_headers(
        R::RESOURCE_NAME_PLURAL,
        &collection_path::<R>(),
        &pairs,
        &page,
    );
    Ok((headers, Json(page.content)))
}

pub async fn count_by_criteria<R: Filterable>(
    State(state): State<ResourceState<R>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<u64>, ApiError> {
    let criteria = R::Criteria::from_query_pairs(pairs_as_str(&pairs))?;
    tracing::debug!(
        "REST request to count {} by criteria: {criteria:?}",
        R::RESOURCE_NAME_PLURAL
    );
    Ok(Json(state.query.count_by_criteria(&criteria).await?))
}

pub async fn search<R: CrudResource>(
    State(state): State<ResourceState<R>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<(HeaderMap, Json<Vec<R>>), ApiError> {
    let query = pairs
        .iter()
        .find(|(k, _)| k == "query")
        .map_or("", |(_, v)| v.as_str());
    tracing::debug!(
        "REST request to search for a page of {} for query {query}",
        R::RESOURCE_NAME_PLURAL
    );
    let request = PageRequest::from_query_pairs(&pairs, &state.paging)?;
    let page = state.service.search(query, &request).await?;
    let headers = pagination_headers(
        R::RESOURCE_NAME_PLURAL,
        &format!("/api/_search/{}", R::RESOURCE_NAME_PLURAL),
        &pairs,
        &page,
    );
    Ok((headers, Json(page.content)))
}

pub async fn reindex<R: CrudResource>(
    State(state): State<ResourceState<R>>,
) -> Result<Json<Value>, ApiError> {
    let indexed = state.service.reindex().await?;
    Ok(Json(json!({ "indexed": indexed })))
}

/// Routes shared by every resource.
fn common_routes<R: CrudResource>() -> Router<ResourceState<R>> {
    let plural = R::RESOURCE_NAME_PLURAL;
    Router::new()
        .route(
            &format!("/api/{plural}/{{id}}"),
            get(get_one::<R>)
                .put(update_one::<R>)
                .patch(partial_update_one::<R>)
                .delete(delete_one::<R>),
        )
        .route(&format!("/api/_search/{plural}"), get(search::<R>))
        .route(&format!("/api/_reindex/{plural}"), post(reindex::<R>))
}

/// Router for a resource listed without criteria.
pub fn resource_router<R: CrudResource>(state: ResourceState<R>) -> Router {
    common_routes::<R>()
        .route(
            &collection_path::<R>(),
            get(get_all::<R>).post(create_one::<R>),
        )
        .with_state(state)
}

/// Router for a resource listed and counted through its criteria.
pub fn filterable_router<R: Filterable>(state: ResourceState<R>) -> Router {
    common_routes::<R>()
        .route(
            &collection_path::<R>(),
            get(get_all_by_criteria::<R>).post(create_one::<R>),
        )
        .route(
            &format!("{}/count", collection_path::<R>()),
            get(count_by_criteria::<R>),
        )
        .with_state(state)
}
