use std::time::Duration;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use notemark::api::create_router;
use notemark::auth::TokenCodec;
use notemark::config::AppConfig;
use notemark::db::Database;
use notemark::AppState;
use serde_json::{json, Value};
use uuid::Uuid;

const TEST_SECRET: &str = "auth-spec-secret";

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let state = AppState::new(db, &AppConfig::with_secret(TEST_SECRET));
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

fn field_names(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .expect("errors array missing")
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect()
}

mod register {
    use super::*;

    #[tokio::test]
    async fn creates_account_and_returns_token() {
        let server = setup();

        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "name": "Ada Lovelace",
                "email": "Ada@Example.com",
                "password": "password123"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert!(!body["token"].as_str().unwrap().is_empty());
        // Email is lowercased, and no credential material leaks out.
        assert_eq!(body["user"]["email"], "ada@example.com");
        assert_eq!(body["user"]["name"], "Ada Lovelace");
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn reports_every_field_error_at_once() {
        let server = setup();

        let response = server.post("/api/auth/register").json(&json!({})).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        let fields = field_names(&body);
        assert!(fields.contains(&"name".to_string()));
        assert!(fields.contains(&"email".to_string()));
        assert!(fields.contains(&"password".to_string()));
    }

    #[tokio::test]
    async fn rejects_short_passwords() {
        let server = setup();

        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "12345"
            }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(field_names(&response.json()), vec!["password"]);
    }

    #[tokio::test]
    async fn rejects_duplicate_emails() {
        let server = setup();
        let input = json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "password123"
        });

        server.post("/api/auth/register").json(&input).await;
        let response = server.post("/api/auth/register").json(&input).await;

        response.assert_status_bad_request();
        assert_eq!(field_names(&response.json()), vec!["email"]);
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn issues_a_working_token() {
        let server = setup();
        server
            .post("/api/auth/register")
            .json(&json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "password123"
            }))
            .await;

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "ada@example.com", "password": "password123" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let token = body["token"].as_str().unwrap().to_string();

        let me = server
            .get("/api/auth/user")
            .authorization_bearer(&token)
            .await;
        me.assert_status_ok();
        assert_eq!(me.json::<Value>()["data"]["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let server = setup();
        server
            .post("/api/auth/register")
            .json(&json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "password123"
            }))
            .await;

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "ada@example.com", "password": "wrong-password" }))
            .await;

        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn unknown_email_looks_like_wrong_password() {
        let server = setup();

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "nobody@example.com", "password": "password123" }))
            .await;

        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["error"], "Invalid credentials");
    }
}

mod auth_gate {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let server = setup();

        let response = server.get("/api/auth/user").await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Not authorized to access this route");
    }

    #[tokio::test]
    async fn non_bearer_header_is_unauthorized() {
        let server = setup();

        let response = server
            .get("/api/auth/user")
            .add_header(AUTHORIZATION, HeaderValue::from_static("Token abc123"))
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let server = setup();

        let response = server
            .get("/api/auth/user")
            .authorization_bearer("not-a-jwt")
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_unauthorized() {
        let server = setup();
        let foreign = TokenCodec::new(b"some-other-secret".to_vec(), Duration::from_secs(3600));
        let token = foreign.issue(Uuid::new_v4()).unwrap();

        let response = server
            .get("/api/auth/user")
            .authorization_bearer(&token)
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let server = setup();
        let stale = TokenCodec::new(TEST_SECRET.as_bytes(), Duration::ZERO);
        let token = stale.issue(Uuid::new_v4()).unwrap();

        let response = server
            .get("/api/auth/user")
            .authorization_bearer(&token)
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn notes_routes_are_gated() {
        let server = setup();

        server.get("/api/notes").await.assert_status_unauthorized();
        server
            .post("/api/bookmarks")
            .json(&json!({ "url": "example.com" }))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn health_is_public() {
        let server = setup();

        let response = server.get("/api/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "OK");
        assert_eq!(body["message"], "Server is running");
    }
}
