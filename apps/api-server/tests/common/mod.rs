#![allow(dead_code)]

use std::sync::Arc;

use actix_web::http::header;
use actix_web::test::TestRequest;
use async_trait::async_trait;
use serde_json::json;

use api_server::config::AppConfig;
use api_server::state::AppState;
use devconnect_core::ports::{ExternalProfile, IdentityError, IdentityProvider};
use devconnect_infra::{JwtConfig, Repositories};

pub const PASSWORD: &str = "correct horse battery";

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            ..JwtConfig::default()
        },
        ..AppConfig::default()
    }
}

pub fn test_state() -> AppState {
    AppState::with_repositories(Repositories::in_memory(), &test_config())
}

/// Accepts the access token `good-token` and asserts a fixed verified profile.
pub struct FakeProvider;

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, IdentityError> {
        if access_token != "good-token" {
            return Err(IdentityError::Rejected);
        }
        Ok(ExternalProfile {
            provider: "fake".to_string(),
            email: "octo@dev.io".to_string(),
            name: Some("Octo".to_string()),
            image: Some("https://img.dev.io/octo.png".to_string()),
        })
    }
}

pub fn with_fake_provider(state: AppState) -> AppState {
    state.with_provider(Arc::new(FakeProvider))
}

pub fn register_request(email: &str, name: &str) -> TestRequest {
    TestRequest::post().uri("/api/auth/register").set_json(json!({
        "email": email,
        "password": PASSWORD,
        "name": name,
    }))
}

pub fn credentials_request(email: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/auth/callback/credentials")
        .set_json(json!({ "email": email, "password": password }))
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

pub fn post_body(title: &str, published: bool, tags: &[&str]) -> serde_json::Value {
    json!({
        "title": title,
        "description": "A short summary",
        "content": "word ".repeat(450),
        "published": published,
        "tags": tags,
    })
}

/// Build the application service around a state.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .configure(api_server::configure_app),
        )
        .await
    };
}

/// Register a user and return its access token.
macro_rules! sign_up {
    ($app:expr, $email:expr) => {{
        let resp = actix_web::test::call_service(
            &$app,
            $crate::common::register_request($email, "Dev").to_request(),
        )
        .await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        body["access_token"].as_str().unwrap().to_string()
    }};
}
