use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use rolodex_store::{Directory, SqliteStorage};
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::util::ServiceExt;

use crate::bootstrap::{self, App};

fn app() -> App {
    bootstrap::app_with(Directory::in_memory())
}

async fn send(app: &App, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("infallible")
}

async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn form(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_req(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn assert_redirect_to_list(resp: &Response) {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/contact")
    );
}

async fn seed(app: &App, name: &str, phone: &str, email: &str) {
    let resp = send(
        app,
        json_req(
            Method::POST,
            "/contact",
            json!({"name": name, "phone": phone, "email": email}),
        ),
    )
    .await;
    assert_redirect_to_list(&resp);
}

#[tokio::test]
async fn healthz_reports_ok() {
    let resp = send(&app(), get("/healthz")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"ok": true}));
}

#[tokio::test]
async fn create_redirects_and_flashes_once() {
    let app = app();
    let resp = send(
        &app,
        form(
            Method::POST,
            "/contact",
            "name=Rizki&phone=081234567890&email=rizki%40gmail.com",
        ),
    )
    .await;
    assert_redirect_to_list(&resp);

    let list = body_json(send(&app, get("/contact")).await).await;
    assert_eq!(list["msg"], "contact added");
    let contacts = list["contacts"].as_array().expect("contacts");
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["name"], "Rizki");
    assert!(contacts[0]["id"].as_str().is_some());

    let again = body_json(send(&app, get("/contact")).await).await;
    assert_eq!(again["msg"], Value::Null);
}

#[tokio::test]
async fn duplicate_name_is_unprocessable() {
    let app = app();
    seed(&app, "Rizki", "081234567890", "rizki@gmail.com").await;
    let _ = send(&app, get("/contact")).await;

    let resp = send(
        &app,
        json_req(
            Method::POST,
            "/contact",
            json!({"name": "Rizki", "phone": "081234567890", "email": "x@y.com"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["errors"][0]["field"], "name");
    assert_eq!(body["errors"][0]["code"], "duplicate_name");
    assert_eq!(body["contact"]["email"], "x@y.com");

    let list = body_json(send(&app, get("/contact")).await).await;
    assert_eq!(list["msg"], Value::Null);
    assert_eq!(list["contacts"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn format_errors_are_listed_in_rule_order() {
    let app = app();
    let resp = send(
        &app,
        form(Method::POST, "/contact", "name=Andi&phone=12345&email=nope&admin=true"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    let codes: Vec<_> = body["errors"]
        .as_array()
        .expect("errors")
        .iter()
        .map(|e| e["code"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(codes, ["invalid_email", "invalid_phone"]);
    assert!(body["contact"].get("admin").is_none());
}

#[tokio::test]
async fn detail_and_edit_form_404_for_unknown_names() {
    let app = app();
    seed(&app, "Joni", "085712345678", "joni@gmail.com").await;

    let resp = send(&app, get("/contact/Joni")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["contact"]["email"], "joni@gmail.com");

    let resp = send(&app, get("/contact/edit/Rizal")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["status"], 404);

    let resp = send(&app, get("/contact/add")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["contact"]["name"], "");
}

#[tokio::test]
async fn update_through_method_override_keeps_id() {
    let app = app();
    seed(&app, "Joni", "085712345678", "joni@gmail.com").await;
    let before = body_json(send(&app, get("/contact/edit/Joni")).await).await;
    let id = before["contact"]["id"].as_str().expect("id").to_string();

    let body = format!(
        "id={id}&old_name=Joni&name=Joni&phone=081298765432&email=joni.baru%40gmail.com"
    );
    let resp = send(&app, form(Method::POST, "/contact?_method=PUT", &body)).await;
    assert_redirect_to_list(&resp);

    let after = body_json(send(&app, get("/contact/Joni")).await).await;
    assert_eq!(after["contact"]["id"], id.as_str());
    assert_eq!(after["contact"]["email"], "joni.baru@gmail.com");
    let list = body_json(send(&app, get("/contact")).await).await;
    assert_eq!(list["msg"], "contact updated");
}

#[tokio::test]
async fn rejected_update_echoes_submission() {
    let app = app();
    seed(&app, "Rizki", "081234567890", "rizki@gmail.com").await;
    let before = body_json(send(&app, get("/contact/Rizki")).await).await;
    let id = before["contact"]["id"].as_str().expect("id").to_string();

    let resp = send(
        &app,
        json_req(
            Method::PUT,
            "/contact",
            json!({
                "id": id,
                "old_name": "Rizki",
                "name": "Rizki",
                "phone": "081234567890",
                "email": "not-an-email"
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["code"], "invalid_email");
    assert_eq!(body["contact"]["old_name"], "Rizki");

    let after = body_json(send(&app, get("/contact/Rizki")).await).await;
    assert_eq!(after["contact"]["email"], "rizki@gmail.com");
}

#[tokio::test]
async fn update_with_malformed_id_is_bad_request() {
    let resp = send(
        &app(),
        json_req(
            Method::PUT,
            "/contact",
            json!({"id": "nope", "old_name": "Joni", "name": "Joni"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_of_vanished_contact_is_not_found() {
    let resp = send(
        &app(),
        json_req(
            Method::PUT,
            "/contact",
            json!({
                "id": "6f1c0d52-8a4e-4b55-9a4e-0c6a2b8f9d11",
                "old_name": "Joni",
                "name": "Joni",
                "phone": "085712345678",
                "email": "joni@gmail.com"
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_absent_contact_still_redirects() {
    let app = app();
    seed(&app, "Rizki", "081234567890", "rizki@gmail.com").await;

    let resp = send(&app, form(Method::POST, "/contact?_method=DELETE", "name=Rizal")).await;
    assert_redirect_to_list(&resp);
    let list = body_json(send(&app, get("/contact")).await).await;
    assert_eq!(list["msg"], "contact deleted");
    assert_eq!(list["contacts"].as_array().map(Vec::len), Some(1));

    let resp = send(&app, form(Method::DELETE, "/contact", "name=Rizki")).await;
    assert_redirect_to_list(&resp);
    let list = body_json(send(&app, get("/contact")).await).await;
    assert_eq!(list["contacts"], json!([]));
}

#[tokio::test]
async fn about_lists_registered_endpoints() {
    let body = body_json(send(&app(), get("/about")).await).await;
    let endpoints: Vec<_> = body["endpoints"]
        .as_array()
        .expect("endpoints")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(endpoints.contains(&"GET /contact"));
    assert!(endpoints.contains(&"DELETE /contact"));
    assert!(endpoints.contains(&"GET /contact/edit/{name}"));
}

#[tokio::test]
async fn sqlite_backend_serves_the_same_surface() {
    let dir = tempdir().expect("tempdir");
    let store = SqliteStorage::open(&dir.path().join("contacts.sqlite")).expect("open sqlite");
    let app = bootstrap::app_with(Directory::new(Arc::new(store)));
    seed(&app, "Rizki", "081234567890", "rizki@gmail.com").await;

    let resp = send(
        &app,
        json_req(
            Method::POST,
            "/contact",
            json!({"name": "Rizki", "phone": "081234567890", "email": "rizki@gmail.com"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let list = body_json(send(&app, get("/contact")).await).await;
    assert_eq!(list["contacts"].as_array().map(Vec::len), Some(1));
}
