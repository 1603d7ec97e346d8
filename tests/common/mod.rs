#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::Value;
use short_url::application::services::ShortUrlSettings;
use short_url::domain::renderer::DomainConfig;
use short_url::routes::routes;
use short_url::state::AppState;

pub const DEFAULT_HOST: &str = "s.test";

pub fn test_settings() -> ShortUrlSettings {
    ShortUrlSettings {
        domain_config: DomainConfig::new("https", DEFAULT_HOST),
        ..ShortUrlSettings::default()
    }
}

/// In-memory state and a server over the full router.
pub fn test_app() -> (AppState, TestServer) {
    let state = AppState::in_memory(test_settings());
    let server = TestServer::new(routes(state.clone())).unwrap();
    (state, server)
}

pub fn test_server() -> TestServer {
    test_app().1
}

/// Creates a short URL through the API and returns the response body.
pub async fn create_short_url(server: &TestServer, body: Value) -> Value {
    let response = server.post("/rest/short-urls").json(&body).await;
    response.assert_status_ok();
    response.json::<Value>()
}
