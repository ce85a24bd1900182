use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use chrono::Utc;
use dashstore::{AppState, DocumentStore, RateLimiter, Registry, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> axum::Router {
    let store = Arc::new(DocumentStore::new(Registry::dashboard_default()));
    let limiter = Arc::new(RateLimiter::new(10_000, Duration::from_secs(60)));
    build_router(AppState::new(store, limiter))
}

async fn send_json(
    app: &axum::Router,
    method: Method,
    uri: &str,
    payload: Value,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    if body.is_empty() {
        return (status, Value::Null);
    }

    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, json)
}

async fn send_empty(app: &axum::Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    if body.is_empty() {
        return (status, Value::Null);
    }

    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, json)
}

fn assert_envelope(status: StatusCode, body: &Value) {
    let obj = body.as_object().expect("envelope should be an object");
    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["data", "message", "status"]);
    assert_eq!(body["status"], status.as_u16());
}

#[tokio::test]
async fn create_and_fetch_by_id() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/v1",
        json!({ "name": "Alice", "email": "alice@example.com" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_envelope(status, &body);
    let id = body["data"]["id"].as_str().expect("created record has id");
    assert!(body["data"]["createdAt"].is_string());

    let (status, fetched) =
        send_empty(&app, Method::GET, &format!("/api/users/v1?id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_envelope(status, &fetched);
    assert_eq!(fetched["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn missing_record_and_unknown_resource_are_enveloped_404s() {
    let app = app();

    let (status, body) = send_empty(&app, Method::GET, "/api/users/v1?id=nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_envelope(status, &body);

    let (status, body) = send_empty(&app, Method::GET, "/api/wizards/v1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_envelope(status, &body);
    assert!(body["message"].as_str().unwrap().contains("wizards"));
}

#[tokio::test]
async fn duplicate_unique_field_is_400_with_structured_payload() {
    let app = app();

    let payload = json!({ "name": "Alice", "email": "dup@example.com" });
    let (status, _) = send_json(&app, Method::POST, "/api/users/v1", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(&app, Method::POST, "/api/users/v1", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(status, &body);

    let message = body["message"].as_str().unwrap();
    assert!(message.contains("email"));
    assert!(message.contains("dup@example.com"));
    assert_eq!(body["data"]["field"], "email");
}

#[tokio::test]
async fn unknown_field_fails_validation() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/v1",
        json!({ "name": "Alice", "email": "a@b.c", "shoe_size": 43 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(status, &body);
    assert!(body["message"].as_str().unwrap().contains("shoe_size"));
}

#[tokio::test]
async fn pagination_defaults_and_page_two_of_twenty_five() {
    let app = app();

    for i in 0..25 {
        let (status, _) = send_json(
            &app,
            Method::POST,
            "/api/products/v1",
            json!({ "title": format!("item {i}"), "sku": format!("SKU-{i}"), "price": 10 }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send_empty(&app, Method::GET, "/api/products/v1?page=2&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 25);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 10);

    // Defaults: page 1, limit 10.
    let (_, body) = send_empty(&app, Method::GET, "/api/products/v1").await;
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["limit"], 10);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn most_recently_updated_sorts_first() {
    let app = app();

    let mut ids = Vec::new();
    for i in 0..3 {
        let (_, body) = send_json(
            &app,
            Method::POST,
            "/api/blogs/v1",
            json!({ "title": format!("post {i}"), "slug": format!("post-{i}") }),
        )
        .await;
        ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    // Touch the oldest post; it must lead the listing afterwards.
    let (status, _) = send_json(
        &app,
        Method::PUT,
        "/api/blogs/v1",
        json!({ "id": ids[0], "title": "post 0 revised" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_empty(&app, Method::GET, "/api/blogs/v1").await;
    assert_eq!(body["data"]["items"][0]["id"], ids[0].as_str());
}

#[tokio::test]
async fn free_text_search_matches_any_searchable_field() {
    let app = app();

    for (name, email) in [
        ("Foo Fighter", "one@example.com"),
        ("Plain Person", "foo@example.com"),
        ("No Match", "two@example.com"),
    ] {
        send_json(
            &app,
            Method::POST,
            "/api/users/v1",
            json!({ "name": name, "email": email }),
        )
        .await;
    }

    let (status, body) = send_empty(&app, Method::GET, "/api/users/v1?q=FOO").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn numeric_search_hits_numeric_fields() {
    let app = app();

    send_json(
        &app,
        Method::POST,
        "/api/reviews/v1",
        json!({ "title": "great", "rating": 5 }),
    )
    .await;
    send_json(
        &app,
        Method::POST,
        "/api/reviews/v1",
        json!({ "title": "meh", "rating": 3 }),
    )
    .await;

    let (_, body) = send_empty(&app, Method::GET, "/api/reviews/v1?q=5").await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["title"], "great");
}

#[tokio::test]
async fn created_range_query_filters_on_creation_day() {
    let app = app();

    send_json(
        &app,
        Method::POST,
        "/api/contacts/v1",
        json!({ "name": "A", "email": "a@b.c", "message": "hello" }),
    )
    .await;

    let today = Utc::now().format("%Y-%m-%d").to_string();
    let uri = format!("/api/contacts/v1?q=createdAt:range:{today}_{today}");
    let (_, body) = send_empty(&app, Method::GET, &uri).await;
    assert_eq!(body["data"]["total"], 1);

    let (_, body) = send_empty(
        &app,
        Method::GET,
        "/api/contacts/v1?q=createdAt:range:2000-01-01_2000-01-02",
    )
    .await;
    assert_eq!(body["data"]["total"], 0);

    // Malformed range degrades to match-all instead of erroring.
    let (status, body) = send_empty(
        &app,
        Method::GET,
        "/api/contacts/v1?q=createdAt:range:2000-01-01_oops",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn single_update_and_delete_round_trip() {
    let app = app();

    let (_, created) = send_json(
        &app,
        Method::POST,
        "/api/coupons/v1",
        json!({ "code": "SAVE10", "percent_off": 10 }),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/api/coupons/v1",
        json!({ "id": id, "percent_off": 15 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["percent_off"], 15);

    let (status, body) =
        send_json(&app, Method::DELETE, "/api/coupons/v1", json!({ "id": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deletedCount"], 1);

    let (status, _) =
        send_json(&app, Method::DELETE, "/api/coupons/v1", json!({ "id": id })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_without_id_is_a_validation_error() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/api/users/v1",
        json!({ "name": "Nameless" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(status, &body);
}

#[tokio::test]
async fn summary_reports_total_and_last_24_hours() {
    let app = app();

    for i in 0..2 {
        send_json(
            &app,
            Method::POST,
            "/api/subscribers/v1",
            json!({ "email": format!("s{i}@example.com") }),
        )
        .await;
    }

    let (status, body) = send_empty(&app, Method::GET, "/api/subscribers/v1/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_envelope(status, &body);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["last24Hours"], 2);
}

#[tokio::test]
async fn over_limit_requests_get_enveloped_429() {
    let store = Arc::new(DocumentStore::new(Registry::dashboard_default()));
    let limiter = Arc::new(RateLimiter::new(2, Duration::from_secs(60)));
    let app = build_router(AppState::new(store, limiter));

    for _ in 0..2 {
        let (status, _) = send_empty(&app, Method::GET, "/api/users/v1").await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send_empty(&app, Method::GET, "/api/users/v1").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_envelope(status, &body);
}
