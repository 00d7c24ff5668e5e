use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::startup::{build_app, build_state};

async fn build_test_app() -> anyhow::Result<Router> {
    let db = models::db::connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    let mut cfg = configs::AppConfig::default();
    cfg.auth.jwt_secret = "test-secret".into();
    let state = build_state(db, &cfg);
    state.auth.seed_roles().await?;
    Ok(build_app(state))
}

fn post_json(uri: &str, body: Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?)
}

fn get_with_token(uri: &str, token: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?)
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn register(app: &Router, email: &str) -> anyhow::Result<Value> {
    let resp = app
        .clone()
        .oneshot(post_json("/auth/register", json!({"name": "Tester", "email": email, "password": "S3curePass!"}))?)
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

#[tokio::test]
async fn register_then_login_sets_cookie() -> anyhow::Result<()> {
    let app = build_test_app().await?;

    let registered = register(&app, "user@example.com").await?;
    assert_eq!(registered["roles"], json!(["USER"]));
    assert!(registered["token"].as_str().is_some_and(|t| !t.is_empty()));

    let resp = app
        .clone()
        .oneshot(post_json("/auth/login", json!({"email": "user@example.com", "password": "S3curePass!"}))?)
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.headers().get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));

    let body = body_json(resp).await?;
    assert_eq!(body["id"], registered["id"]);
    assert_eq!(body["email"], "user@example.com");
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_conflict() -> anyhow::Result<()> {
    let app = build_test_app().await?;
    register(&app, "dup@example.com").await?;

    let resp = app
        .clone()
        .oneshot(post_json("/auth/register", json!({"name": "Other", "email": "dup@example.com", "password": "An0therPass"}))?)
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await?["error"], "conflict");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized_without_detail() -> anyhow::Result<()> {
    let app = build_test_app().await?;
    register(&app, "w@example.com").await?;

    let resp = app
        .clone()
        .oneshot(post_json("/auth/login", json!({"email": "w@example.com", "password": "wrong-password"}))?)
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(resp).await?, json!({"error": "unauthorized"}));
    Ok(())
}

#[tokio::test]
async fn short_password_is_a_validation_error() -> anyhow::Result<()> {
    let app = build_test_app().await?;
    let resp = app
        .oneshot(post_json("/auth/register", json!({"name": "T", "email": "t@example.com", "password": "short"}))?)
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await?["error"], "validation");
    Ok(())
}

#[tokio::test]
async fn malformed_json_body_is_a_validation_error() -> anyhow::Result<()> {
    let app = build_test_app().await?;
    let resp = app.oneshot(post_json("/auth/register", json!({"email": "x@y.z"}))?).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let ct = resp.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(ct.starts_with("application/json"));
    let body = body_json(resp).await?;
    assert_eq!(body["error"], "validation");
    assert!(body["message"].as_str().is_some_and(|m| m.contains("name")));
    Ok(())
}

#[tokio::test]
async fn me_requires_a_token() -> anyhow::Result<()> {
    let app = build_test_app().await?;
    let registered = register(&app, "me@example.com").await?;

    let missing = app.clone().oneshot(Request::builder().uri("/auth/me").body(Body::empty())?).await?;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let invalid = app.clone().oneshot(get_with_token("/auth/me", "not-a-token")?).await?;
    assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

    let token = registered["token"].as_str().unwrap_or_default();
    let ok = app.clone().oneshot(get_with_token("/auth/me", token)?).await?;
    assert_eq!(ok.status(), StatusCode::OK);
    let me = body_json(ok).await?;
    assert_eq!(me["email"], "me@example.com");
    assert_eq!(me["roles"], json!(["USER"]));
    Ok(())
}

#[tokio::test]
async fn cookie_is_accepted_in_place_of_header() -> anyhow::Result<()> {
    let app = build_test_app().await?;
    let registered = register(&app, "c@example.com").await?;
    let token = registered["token"].as_str().unwrap_or_default();

    let req = Request::builder()
        .uri("/auth/me")
        .header(header::COOKIE, format!("auth_token={token}"))
        .body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn users_are_listed_in_pages() -> anyhow::Result<()> {
    let app = build_test_app().await?;
    let first = register(&app, "a@example.com").await?;
    register(&app, "b@example.com").await?;
    register(&app, "c@example.com").await?;
    let token = first["token"].as_str().unwrap_or_default();

    let resp = app.clone().oneshot(get_with_token("/users?page=0&size=2&sort=email,desc", token)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await?;
    assert_eq!(page["total_elements"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["content"][0]["email"], "c@example.com");
    assert_eq!(page["content"][1]["email"], "b@example.com");
    assert!(page["content"][0].get("password_hash").is_none());

    let bad_size = app.clone().oneshot(get_with_token("/users?size=101", token)?).await?;
    assert_eq!(bad_size.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(bad_size).await?["error"], "validation");

    let bad_page = app.clone().oneshot(get_with_token("/users?page=abc", token)?).await?;
    assert_eq!(bad_page.status(), StatusCode::BAD_REQUEST);
    let ct = bad_page.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(ct.starts_with("application/json"));
    assert_eq!(body_json(bad_page).await?["error"], "validation");

    let past_the_end = app.clone().oneshot(get_with_token("/users?page=9223372036854775807&size=100", token)?).await?;
    assert_eq!(past_the_end.status(), StatusCode::OK);
    let page = body_json(past_the_end).await?;
    assert_eq!(page["content"], json!([]));
    assert_eq!(page["total_elements"], 3);

    let bad_sort = app.clone().oneshot(get_with_token("/users?sort=password_hash", token)?).await?;
    assert_eq!(bad_sort.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> anyhow::Result<()> {
    let app = build_test_app().await?;
    let req = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(header::COOKIE, "auth_token=stale")
        .body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let cookie = resp.headers().get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(cookie.starts_with("auth_token=;"));
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn health_and_openapi_are_public() -> anyhow::Result<()> {
    let app = build_test_app().await?;
    let health = app.clone().oneshot(Request::builder().uri("/health").body(Body::empty())?).await?;
    assert_eq!(body_json(health).await?, json!({"status": "ok"}));

    let doc = app.oneshot(Request::builder().uri("/api-docs/openapi.json").body(Body::empty())?).await?;
    assert_eq!(doc.status(), StatusCode::OK);
    assert!(body_json(doc).await?["paths"]["/users"].is_object());
    Ok(())
}
