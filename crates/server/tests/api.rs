use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, NewUser, Role};
use migration::MigratorTrait;
use server::TokenKeys;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .create_user(
            NewUser {
                first_name: Some("Root".to_string()),
                last_name: None,
                email: "root@example.com".to_string(),
                password: "root-password".to_string(),
                currency: "EUR".to_string(),
            },
            Role::Admin,
        )
        .await
        .unwrap();
    server::app(engine, TokenKeys::new(b"test-secret", Duration::hours(1)))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> (String, i64) {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "firstName": "Test",
            "email": email,
            "password": "password123",
            "currency": "EUR"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_i64().unwrap(),
    )
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_account(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/accounts",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_then_login_and_read_self() {
    let app = test_app().await;
    let (token, id) = register(&app, "alice@example.com").await;

    let (status, me) = send(&app, "GET", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], id);
    assert_eq!(me["email"], "alice@example.com");
    assert_eq!(me["role"], "USER");
    assert_eq!(me["accountIds"], json!([]));
    assert!(me.get("password").is_none());

    let token = login(&app, "alice@example.com", "password123").await;
    let (status, _) = send(&app, "GET", &format!("/users/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "nope-nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app().await;
    register(&app, "alice@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "email": "alice@example.com",
            "password": "password123",
            "currency": "EUR"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "User with email alice@example.com already exists."
    );
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/records", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, "GET", "/records", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = TokenKeys::new(b"other-secret", Duration::hours(1))
        .issue(1)
        .unwrap();
    let (status, _) = send(&app, "GET", "/users/me", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleted_user_token_stops_working() {
    let app = test_app().await;
    let admin = login(&app, "root@example.com", "root-password").await;
    let (token, id) = register(&app, "alice@example.com").await;

    let (status, _) = send(&app, "DELETE", &format!("/users/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "DELETE", &format!("/users/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, "GET", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn record_lifecycle_over_http() {
    let app = test_app().await;
    let admin = login(&app, "root@example.com", "root-password").await;
    let (token, user_id) = register(&app, "alice@example.com").await;
    let account_id = create_account(&app, &token, "Wallet").await;

    let (status, category) = send(
        &app,
        "POST",
        "/categories",
        Some(&admin),
        Some(json!({ "name": "Food", "icon": "fork", "color": "#00ff00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, record) = send(
        &app,
        "POST",
        "/records",
        Some(&token),
        Some(json!({
            "amount": -20.5,
            "label": "Groceries",
            "date": "2024-02-10",
            "accountId": account_id,
            "categoryId": category["id"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{record}");
    assert_eq!(record["amount"], json!(-20.5));
    assert_eq!(record["date"], "2024-02-10T00:00:00Z");
    assert_eq!(record["note"], Value::Null);
    assert_eq!(
        record["account"],
        json!({ "id": account_id, "name": "Wallet", "userId": user_id })
    );
    assert_eq!(record["category"], category);

    let id = record["id"].as_i64().unwrap();
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/records/{id}"),
        Some(&token),
        Some(json!({ "note": "weekly" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["note"], "weekly");
    assert_eq!(updated["label"], "Groceries");
    assert_eq!(updated["amount"], json!(-20.5));

    let (status, account) =
        send(&app, "GET", &format!("/accounts/{account_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["recordIds"], json!([id]));

    let (status, _) = send(&app, "DELETE", &format!("/records/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, "GET", &format!("/records/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Record of id: {id} not found."));
}

#[tokio::test]
async fn record_listing_filters_and_pages() {
    let app = test_app().await;
    let (token, _) = register(&app, "alice@example.com").await;
    let account_id = create_account(&app, &token, "Wallet").await;
    for (amount, label, date) in [
        (10.0, "January income", "2024-01-15"),
        (-20.0, "February expense", "2024-02-10"),
        (30.0, "February income", "2024-02-20T12:00:00Z"),
    ] {
        let (status, body) = send(
            &app,
            "POST",
            "/records",
            Some(&token),
            Some(json!({
                "amount": amount,
                "label": label,
                "date": date,
                "accountId": account_id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, page) = send(
        &app,
        "GET",
        "/records?amountGt=0&dateGe=2024-02-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{page}");
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["label"], "February income");
    assert_eq!(page["content"][0]["amount"], json!(30.0));

    let (status, page) = send(
        &app,
        "GET",
        "/records?size=2&page=1&sort=amount,desc",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 1);
    assert_eq!(page["size"], 2);
    assert_eq!(page["totalElements"], 3);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["content"][0]["label"], "February expense");

    let (status, body) = send(
        &app,
        "GET",
        "/records?dateGe=2024-03-01&dateLt=2024-02-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = send(&app, "GET", "/records?dateGe=yesterday", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn foreign_records_are_forbidden_and_missing_ones_not_found() {
    let app = test_app().await;
    let (alice, _) = register(&app, "alice@example.com").await;
    let (bob, _) = register(&app, "bob@example.com").await;
    let account_id = create_account(&app, &alice, "Wallet").await;

    let (status, _) = send(
        &app,
        "POST",
        "/records",
        Some(&bob),
        Some(json!({
            "amount": 1,
            "label": "Not mine",
            "date": "2024-01-01",
            "accountId": account_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/records",
        Some(&bob),
        Some(json!({
            "amount": 1,
            "label": "Nowhere",
            "date": "2024-01-01",
            "accountId": 999
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Account of id: 999 not found.");

    let (status, page) = send(&app, "GET", "/accounts", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["content"], json!([]));
}

#[tokio::test]
async fn category_writes_are_admin_only_and_validated() {
    let app = test_app().await;
    let admin = login(&app, "root@example.com", "root-password").await;
    let (token, _) = register(&app, "alice@example.com").await;
    let body = json!({ "name": "Fuel", "icon": "pump", "color": "#123" });

    let (status, _) = send(&app, "POST", "/categories", Some(&token), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, err) = send(
        &app,
        "POST",
        "/categories",
        Some(&admin),
        Some(json!({ "name": "Fuel", "icon": "pump", "color": "red" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        err["message"],
        "Invalid input: Color must be in the HEX format (#XXX or #XXXXXX)"
    );

    let (status, created) = send(&app, "POST", "/categories", Some(&admin), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, page) = send(&app, "GET", "/categories?name=fu", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["content"], json!([created]));
}

#[tokio::test]
async fn malformed_requests_are_bad_requests() {
    let app = test_app().await;
    let (token, _) = register(&app, "alice@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/accounts")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/accounts/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, "GET", "/accounts?size=0", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
