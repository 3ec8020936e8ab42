use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, load_seed, Record};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_users_empty() {
    let resp = app().oneshot(empty_request("GET", "/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<Record> = body_json(resp).await;
    assert!(users.is_empty());
}

#[tokio::test]
async fn unknown_collection_returns_404() {
    let resp = app().oneshot(empty_request("GET", "/widgets")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_items_filters_and_sorts() {
    let seed = load_seed(json!({
        "items": [
            {"id": 1, "owner": "u1", "createdAt": 100},
            {"id": 2, "owner": "u2", "createdAt": 300},
            {"id": 3, "owner": "u1", "createdAt": 200}
        ]
    }))
    .unwrap();
    let resp = app_with(seed)
        .oneshot(empty_request(
            "GET",
            "/items?owner=u1&_sort=createdAt&_order=desc",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let items: Vec<Value> = body_json(resp).await;
    let ids: Vec<&Value> = items.iter().map(|item| &item["id"]).collect();
    assert_eq!(ids, [&json!(3), &json!(1)]);
}

// --- create ---

#[tokio::test]
async fn create_with_trailing_slash_keeps_supplied_id() {
    let resp = app()
        .oneshot(json_request("POST", "/users/", r#"{"id":"u1","name":"Ada"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Value = body_json(resp).await;
    assert_eq!(user, json!({"id": "u1", "name": "Ada"}));
}

#[tokio::test]
async fn create_without_id_assigns_one() {
    let resp = app()
        .oneshot(json_request("POST", "/items", r#"{"owner":"u1"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: Value = body_json(resp).await;
    assert!(item["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(item["owner"], "u1");
}

#[tokio::test]
async fn create_duplicate_id_returns_409() {
    let seed = load_seed(json!({"users": [{"id": "u1"}]})).unwrap();
    let resp = app_with(seed)
        .oneshot(json_request("POST", "/users/", r#"{"id":"u1"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_non_object_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/users/", "[1,2]"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get / update / delete on missing records ---

#[tokio::test]
async fn get_missing_record_returns_404() {
    let resp = app().oneshot(empty_request("GET", "/users/ghost")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_missing_record_returns_404() {
    let resp = app()
        .oneshot(json_request("PATCH", "/items/ghost", r#"{"title":"Nope"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_record_returns_404() {
    let resp = app().oneshot(empty_request("DELETE", "/items/ghost")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn item_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/items/",
            r#"{"id":"i1","owner":"u1","title":"Lamp","createdAt":1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/items/i1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = body_json(resp).await;
    assert_eq!(fetched["title"], "Lamp");

    // patch merges and ignores id changes
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            "/items/i1",
            r#"{"id":"other","title":"Desk lamp","color":"red"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(
        updated,
        json!({"id": "i1", "owner": "u1", "title": "Desk lamp", "createdAt": 1, "color": "red"})
    );

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", "/items/i1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"{}");

    // get after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/items/i1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
