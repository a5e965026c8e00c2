//! In-process HTTP client over the axum router.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so no socket is bound
//! and the release store is the in-memory one from `TestDependencies`.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use release_core::common::{Role, UserId};
use release_core::kernel::TestDependencies;
use release_core::server::build_app;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub test: TestDependencies,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let test = TestDependencies::new();
        let router = build_app(test.deps.clone());
        Self { test, router }
    }

    pub fn token(&self, user_id: UserId, role: Role) -> String {
        self.test
            .deps
            .jwt_service
            .create_token(user_id, role)
            .expect("Failed to create test token")
    }

    pub fn artist_token(&self) -> (UserId, String) {
        let user_id = UserId::new();
        (user_id, self.token(user_id, Role::Artist))
    }

    pub fn admin_token(&self) -> String {
        self.token(UserId::new(), Role::Admin)
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    /// POST without a body, as the transition routes take.
    pub async fn post_empty(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), None).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
