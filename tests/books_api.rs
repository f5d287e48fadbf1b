use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use bookshelf_app::App;
use bookshelf_kernel::settings::{DatabaseBackend, Settings};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn router_for(backend: DatabaseBackend) -> Router {
    let mut settings = Settings::default();
    settings.database.backend = backend;
    settings.database.path = ":memory:".to_string();

    let app = App::build(settings).unwrap();
    app.migrate().await.unwrap();
    app.router()
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn crud_lifecycle(backend: DatabaseBackend) {
    let router = router_for(backend).await;

    let (status, body) = call(&router, "GET", "/api/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, created) = call(
        &router,
        "POST",
        "/api/books",
        Some(json!({
            "title": "john",
            "author": "test",
            "isbn": "1234",
            "publishedDate": "2024-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["publishedDate"], "2024-01-01");

    let (status, fetched) = call(&router, "GET", &format!("/api/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = call(
        &router,
        "PUT",
        &format!("/api/books/{id}"),
        Some(json!({
            "id": id + 100,
            "title": "Updated",
            "author": "john",
            "isbn": "1234",
            "publishedDate": "2024-02-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id);
    assert_eq!(updated["title"], "Updated");

    let (_, listed) = call(&router, "GET", "/api/books", None).await;
    assert_eq!(listed, json!([updated]));

    let (status, _) = call(&router, "GET", &format!("/api/books/{}", id + 100), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&router, "DELETE", &format!("/api/books/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = call(&router, "GET", &format!("/api/books/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = call(&router, "DELETE", &format!("/api/books/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn crud_lifecycle_in_memory() {
    crud_lifecycle(DatabaseBackend::Memory).await;
}

#[tokio::test]
async fn crud_lifecycle_sqlite() {
    crud_lifecycle(DatabaseBackend::Sqlite).await;
}

#[tokio::test]
async fn update_of_unknown_id_does_not_create_a_record() {
    let router = router_for(DatabaseBackend::Sqlite).await;

    let (status, body) = call(
        &router,
        "PUT",
        "/api/books/42",
        Some(json!({
            "title": "ghost",
            "author": "nobody",
            "isbn": "0000",
            "publishedDate": "2024-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "book 42 not found");

    let (_, listed) = call(&router, "GET", "/api/books", None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn responses_carry_a_request_id_and_openapi_lists_books() {
    let router = router_for(DatabaseBackend::Memory).await;

    let response = router
        .clone()
        .oneshot(Request::get("/api/books/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let (status, spec) = call(&router, "GET", "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/api/books"]["post"].is_object());
    assert!(spec["paths"]["/api/books/{id}"]["put"].is_object());
    assert!(spec["components"]["schemas"]["Book"].is_object());
}

#[tokio::test]
async fn partial_books_round_trip_through_sqlite() {
    let router = router_for(DatabaseBackend::Sqlite).await;

    let (status, created) = call(
        &router,
        "POST",
        "/api/books",
        Some(json!({ "title": "only title", "publishedDate": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["author"], Value::Null);

    let (status, fetched) = call(&router, "GET", &format!("/api/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}
