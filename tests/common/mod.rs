#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use dashboard_api::config::AppConfig;
use dashboard_api::db::{self, DbConfig};
use dashboard_api::{api_routes, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const TEST_JWT_SECRET: &str = "integration_test_secret_key_with_plenty_of_length";

/// In-process application over an in-memory SQLite database. A single pooled
/// connection keeps the database alive for the lifetime of the test.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            acquire_timeout: Duration::from_secs(5),
        };
        let pool = db::establish_connection_with_config(&db_config)
            .await
            .expect("database connection");
        db::run_migrations(&pool).await.expect("migrations");

        let state = Arc::new(AppState::new(test_config(), pool));
        let router = api_routes(Arc::clone(&state));
        Self { router, state }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("request")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(payload) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request build");
        self.send(request).await
    }

    pub async fn request_with_api_key(&self, method: Method, uri: &str, api_key: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-api-key", api_key)
            .body(Body::empty())
            .expect("request build");
        self.send(request).await
    }

    /// Creates an account and returns its session token and user id.
    pub async fn signup(&self, email: &str, password: &str) -> (String, i64) {
        let response = self
            .request(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let token = body["token"].as_str().expect("token").to_string();
        let user_id = body["user"]["id"].as_i64().expect("user id");
        (token, user_id)
    }

    /// Issues an API key and returns its id and plaintext string.
    pub async fn create_api_key(&self, token: &str, payload: Value) -> (i64, String) {
        let response = self
            .request(Method::POST, "/api/api-keys", Some(token), Some(payload))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let id = body["apiKey"]["id"].as_i64().expect("key id");
        let key = body["apiKey"]["apiKey"]
            .as_str()
            .expect("key string")
            .to_string();
        (id, key)
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiration: 3600,
        api_key_prefix: "sk_".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_level: "warn".to_string(),
        log_json: false,
        auto_migrate: false,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_idle_timeout_secs: 60,
        db_acquire_timeout_secs: 5,
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    serde_json::from_slice(&bytes).expect("json body")
}
