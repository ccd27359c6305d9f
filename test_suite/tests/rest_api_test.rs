// REST API behaviour through the full router

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{FailingSearchStore, send, setup_services_with, setup_test_app};
use rentacar::{build_router, filtering::PagingConfig};
use std::sync::Arc;

#[tokio::test]
async fn test_create_returns_created_with_location() {
    let (app, _) = setup_test_app().await;
    let response = send(
        &app,
        Method::POST,
        "/api/brands",
        Some(json!({"brandId": 1, "brandName": "Toyota"})),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["id"].as_i64().expect("id assigned");
    assert_eq!(response.body["brandName"], "Toyota");
    assert_eq!(
        response.header("location"),
        Some(format!("/api/brands/{id}").as_str())
    );

    let fetched = send(&app, Method::GET, &format!("/api/brands/{id}"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, response.body);
}

#[tokio::test]
async fn test_create_with_id_is_rejected() {
    let (app, services) = setup_test_app().await;
    let response = send(
        &app,
        Method::POST,
        "/api/colors",
        Some(json!({"id": 5, "colorName": "Red"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errorKey"], "idexists");
    assert!(services.colors.find_one(5).await.unwrap().is_none());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, _) = setup_test_app().await;
    let response = send(
        &app,
        Method::POST,
        "/api/cars",
        Some(json!({"dailyPrice": "cheap"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errorKey"], "badrequest");
}

#[tokio::test]
async fn test_put_checks_ids_and_existence() {
    let (app, _) = setup_test_app().await;
    let created = send(
        &app,
        Method::POST,
        "/api/customers",
        Some(json!({"userId": 3, "companyName": "Acme"})),
    )
    .await;
    let id = created.body["id"].as_i64().unwrap();
    let uri = format!("/api/customers/{id}");

    let no_id = send(&app, Method::PUT, &uri, Some(json!({"companyName": "Acme"}))).await;
    assert_eq!(no_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_id.body["errorKey"], "idnull");

    let mismatch = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"id": id + 1, "companyName": "Acme"})),
    )
    .await;
    assert_eq!(mismatch.status, StatusCode::BAD_REQUEST);
    assert_eq!(mismatch.body["errorKey"], "idinvalid");

    let missing = send(
        &app,
        Method::PUT,
        "/api/customers/9999",
        Some(json!({"id": 9999, "companyName": "Ghost"})),
    )
    .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["errorKey"], "idnotfound");

    let replaced = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"id": id, "companyName": "Acme Ltd"})),
    )
    .await;
    assert_eq!(replaced.status, StatusCode::OK);
    assert_eq!(replaced.body["companyName"], "Acme Ltd");
    assert_eq!(replaced.body["userId"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_patch_merges_non_null_fields() {
    let (app, _) = setup_test_app().await;
    let created = send(
        &app,
        Method::POST,
        "/api/cars",
        Some(json!({"brandId": 1, "modelYear": "2022", "dailyPrice": 180.0})),
    )
    .await;
    let id = created.body["id"].as_i64().unwrap();

    let patched = send(
        &app,
        Method::PATCH,
        &format!("/api/cars/{id}"),
        Some(json!({"id": id, "dailyPrice": 150.0, "modelYear": null})),
    )
    .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.body["dailyPrice"], 150.0);
    assert_eq!(patched.body["modelYear"], "2022");
    assert_eq!(patched.body["brandId"], 1);
}

#[tokio::test]
async fn test_get_and_delete() {
    let (app, _) = setup_test_app().await;
    let missing = send(&app, Method::GET, "/api/rentals/42", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let invalid = send(&app, Method::GET, "/api/rentals/abc", None).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body["errorKey"], "idinvalid");

    let created = send(
        &app,
        Method::POST,
        "/api/rentals",
        Some(json!({"rentDate": "2024-03-01T10:00:00Z", "carId": 7, "customerId": 2})),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let uri = format!("/api/rentals/{}", created.body["id"]);

    let deleted = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(
        send(&app, Method::GET, &uri, None).await.status,
        StatusCode::NOT_FOUND
    );

    // deleting again still succeeds
    let deleted = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_list_with_criteria_and_paging_headers() {
    let (app, _) = setup_test_app().await;
    for (brand, year) in [(1, "2019"), (1, "2020"), (2, "2021"), (1, "2022"), (1, "2023")] {
        send(
            &app,
            Method::POST,
            "/api/cars",
            Some(json!({"brandId": brand, "modelYear": year})),
        )
        .await;
    }

    let response = send(
        &app,
        Method::GET,
        "/api/cars?brandId.equals=1&page=1&size=2&sort=modelYear,desc",
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let years: Vec<_> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["modelYear"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(years, vec!["2020", "2019"]);
    assert_eq!(response.header("x-total-count"), Some("4"));
    assert_eq!(response.header("content-range"), Some("cars 2-3/4"));

    let link = response.header("link").unwrap();
    assert!(link.contains("brandId.equals=1"));
    assert!(link.contains("page=0&size=2>; rel=\"prev\""));
    assert!(link.contains("page=1&size=2>; rel=\"last\""));
    assert!(!link.contains("rel=\"next\""));

    let first = link
        .split(',')
        .find(|l| l.ends_with("rel=\"first\""))
        .and_then(|l| l.split_once('<'))
        .and_then(|(_, rest)| rest.split_once('>'))
        .map(|(target, _)| target)
        .unwrap();
    let url = url::Url::parse(&format!("http://localhost{first}")).unwrap();
    let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(params.contains(&("sort".into(), "modelYear,desc".into())));
    assert!(params.contains(&("page".into(), "0".into())));

    let count = send(&app, Method::GET, "/api/cars/count?brandId.equals=1", None).await;
    assert_eq!(count.status, StatusCode::OK);
    assert_eq!(count.body, json!(4));
}

#[tokio::test]
async fn test_bad_criteria_is_bad_request() {
    let (app, _) = setup_test_app().await;
    for uri in [
        "/api/cars?mileage.equals=3",
        "/api/cars?brandId.contains=1",
        "/api/cars?dailyPrice.greaterThan=lots",
        "/api/cars?page=-1",
        "/api/cars/count?colorId.between=1",
    ] {
        let response = send(&app, Method::GET, uri, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "for {uri}");
        assert_eq!(response.body["errorKey"], "badcriteria", "for {uri}");
    }
}

#[tokio::test]
async fn test_unreachable_page_is_bad_request() {
    let (app, _) = setup_test_app().await;
    send(
        &app,
        Method::POST,
        "/api/brands",
        Some(json!({"brandName": "Toyota"})),
    )
    .await;

    for uri in [
        "/api/brands?page=18446744073709551615&size=20",
        "/api/customers?page=18446744073709551615",
        "/api/_search/brands?query=toyota&page=461168601842738791&size=20",
    ] {
        let response = send(&app, Method::GET, uri, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "for {uri}");
        assert_eq!(response.body["errorKey"], "badcriteria", "for {uri}");
    }

    let last_page = send(
        &app,
        Method::GET,
        "/api/brands?page=461168601842738790&size=20",
        None,
    )
    .await;
    assert_eq!(last_page.status, StatusCode::OK);
    assert_eq!(last_page.body, json!([]));
}

#[tokio::test]
async fn test_customers_list_without_criteria() {
    let (app, _) = setup_test_app().await;
    for name in ["Acme", "Globex", "Initech"] {
        send(
            &app,
            Method::POST,
            "/api/customers",
            Some(json!({"companyName": name})),
        )
        .await;
    }
    let response = send(&app, Method::GET, "/api/customers?size=2", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 2);
    assert_eq!(response.header("x-total-count"), Some("3"));

    // customers have no count endpoint
    let count = send(&app, Method::GET, "/api/customers/count", None).await;
    assert_eq!(count.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_endpoint() {
    let (app, _) = setup_test_app().await;
    for name in ["Toyota", "Honda", "Toyota Motor Europe"] {
        send(
            &app,
            Method::POST,
            "/api/brands",
            Some(json!({"brandName": name})),
        )
        .await;
    }

    let response = send(&app, Method::GET, "/api/_search/brands?query=toyota", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<_> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["brandName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Toyota", "Toyota Motor Europe"]);
    assert_eq!(response.header("x-total-count"), Some("2"));

    let none = send(&app, Method::GET, "/api/_search/brands?query=mazda", None).await;
    assert_eq!(none.status, StatusCode::OK);
    assert_eq!(none.body, json!([]));
}

#[tokio::test]
async fn test_search_unavailable() {
    let services = setup_services_with(Arc::new(FailingSearchStore)).await;
    let app = build_router(&services, PagingConfig::default());

    // writes still succeed
    let created = send(
        &app,
        Method::POST,
        "/api/brands",
        Some(json!({"brandName": "Toyota"})),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let response = send(&app, Method::GET, "/api/_search/brands?query=toyota", None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_reindex_endpoint() {
    let (app, _) = setup_test_app().await;
    send(
        &app,
        Method::POST,
        "/api/colors",
        Some(json!({"colorName": "Blue"})),
    )
    .await;
    let response = send(&app, Method::POST, "/api/_reindex/colors", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"indexed": 1}));
}

#[tokio::test]
async fn test_openapi_document_lists_schemas() {
    let (app, _) = setup_test_app().await;
    let response = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let schemas = &response.body["components"]["schemas"];
    for name in ["BrandDto", "CarDto", "ColorDto", "CarImageDto", "RentalDto", "CustomerDto"] {
        assert!(schemas.get(name).is_some(), "missing schema {name}");
    }
}
