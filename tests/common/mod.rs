#![allow(dead_code)]

use std::sync::Once;

use easemob_im::{Config, ImClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/org/app/token";

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub fn config(server: &MockServer) -> Config {
    Config::from_values(server.uri(), "org#app", "client-id", "client-secret", 0)
}

pub fn client(server: &MockServer) -> ImClient {
    ImClient::new(config(server)).expect("client")
}

pub fn token_body(token: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": token,
        "expires_in": 7200,
        "application": "app-uuid",
    })
}

/// Token endpoint answering `token`, expected to be hit `times` times.
pub async fn mount_token(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token)))
        .expect(times)
        .mount(server)
        .await;
}

/// Client that already holds `tok-1`, so resource calls go through on the first attempt.
pub async fn authed_client(server: &MockServer) -> ImClient {
    init_logging();
    mount_token(server, "tok-1", 1).await;
    let client = client(server);
    client.authenticate().await.expect("token");
    client
}

pub fn api_error(status: u16, description: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "error": "error",
        "error_description": description,
        "timestamp": 1700000000000i64,
        "duration": 0,
        "exception": "EasemobException",
    }))
}
