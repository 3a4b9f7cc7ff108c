//! Test utilities and common setup.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use biergarten::api::{self, AppState, ServerConfig};
use biergarten::auth::{AuthConfig, AuthState, TokenKind, TokenSigner};
use biergarten::db::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const ACCESS_SECRET: &str = "access-secret-for-integration-tests-minimum-32-chars";
pub const REFRESH_SECRET: &str = "refresh-secret-for-integration-tests-minimum-32-chars";
pub const CONFIRM_SECRET: &str = "confirm-secret-for-integration-tests-minimum-32-chars";

pub const PASSWORD: &str = "correct horse battery";

/// Create a test AuthConfig with fixed secrets and a cheap bcrypt cost.
pub fn test_auth_config() -> AuthConfig {
    let mut config = AuthConfig::with_secrets(ACCESS_SECRET, REFRESH_SECRET, CONFIRM_SECRET);
    config.bcrypt_cost = 4;
    config
}

pub struct TestApp {
    pub router: Router,
    pub auth: AuthState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

/// A registered user and the tokens handed out at registration.
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Build the full router over an in-memory database.
pub async fn test_app() -> TestApp {
    let config = test_auth_config();
    let auth = AuthState::new(&config).expect("valid test auth config");
    let db = Database::in_memory().await.expect("in-memory database");
    let state = AppState::new(&db, auth.clone(), config.bcrypt_cost, "http://localhost:8080");

    TestApp {
        router: api::create_router(state, &ServerConfig::default()),
        auth,
    }
}

/// An access token for `subject` that expired an hour ago.
pub fn expired_access_token(subject: &str) -> String {
    let signer = TokenSigner::new(TokenKind::Access, ACCESS_SECRET, 900);
    let now = chrono::Utc::now().timestamp();
    signer
        .issue_at(subject, now - 3600 - 900)
        .expect("sign expired token")
        .token
}

/// A refresh token for `subject` valid for seven days.
pub fn refresh_token(subject: &str) -> String {
    TokenSigner::new(TokenKind::Refresh, REFRESH_SECRET, 7 * 24 * 3600)
        .issue(subject)
        .expect("sign refresh token")
        .token
}

/// A refresh token for `subject` that expired a day ago.
pub fn expired_refresh_token(subject: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    TokenSigner::new(TokenKind::Refresh, REFRESH_SECRET, 3600)
        .issue_at(subject, now - 24 * 3600)
        .expect("sign expired refresh token")
        .token
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    /// Send a prebuilt request, for headers `request` can't express.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }

    /// Request with the user's current access token.
    pub async fn as_user(
        &self,
        user: &TestUser,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> TestResponse {
        self.request(
            method,
            uri,
            &[("x-access-token", user.access_token.as_str())],
            body,
        )
        .await
    }

    pub async fn register(&self, username: &str) -> TestUser {
        let response = self
            .request(
                Method::POST,
                "/users/register",
                &[],
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.json);

        let payload = &response.json["payload"];
        TestUser {
            id: payload["user"]["id"].as_str().unwrap().to_string(),
            username: username.to_string(),
            access_token: payload["accessToken"].as_str().unwrap().to_string(),
            refresh_token: payload["refreshToken"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_brewery(&self, user: &TestUser, name: &str) -> Value {
        let response = self
            .as_user(
                user,
                Method::POST,
                "/breweries",
                Some(json!({ "name": name, "location": "München" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.json);
        response.json["payload"].clone()
    }

    pub async fn create_beer(&self, user: &TestUser, body: Value) -> Value {
        let response = self.as_user(user, Method::POST, "/beers", Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.json);
        response.json["payload"].clone()
    }
}
