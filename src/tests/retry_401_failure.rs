use crate::tests::test_support::{TOKEN_PATH, base_config, capture_logs, drain_logs, token_body};
use crate::{Error, ImClient};
use reqwest::StatusCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(serde_json::json!({
        "error": "unauthorized",
        "error_description": "token invalid",
        "timestamp": 1700000000000i64,
        "duration": 0,
        "exception": "EasemobSecurityException",
    }))
}

#[tokio::test]
async fn returns_api_error_after_double_401() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/org/app/chatgroups/g1"))
        .respond_with(unauthorized())
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ImClient::new(base_config(&server.uri())).expect("client");

    let (lines, guard) = capture_logs();
    let res = client.group().get_group("g1").await;
    drop(guard);

    match res {
        Err(Error::Api(api)) => {
            assert_eq!(api.status(), Some(StatusCode::UNAUTHORIZED));
            assert_eq!(api.to_string(), "token invalid");
            assert_eq!(api.exception, "EasemobSecurityException");
        }
        Err(other) => panic!("expected Error::Api, got {}", other),
        Ok(_) => panic!("expected Error::Api, got Ok"),
    }

    let logs = drain_logs(lines);
    let warn_count = logs
        .iter()
        .filter(|line| line.contains("WARN") && line.contains("401"))
        .count();
    assert_eq!(
        warn_count, 2,
        "should log a warning for each 401, got {:?}",
        logs
    );
}

#[tokio::test]
async fn failed_refresh_is_returned_as_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/org/app/chatgroups/g1"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "client secret mismatch",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ImClient::new(base_config(&server.uri())).expect("client");

    let (lines, guard) = capture_logs();
    let res = client.group().get_group("g1").await;
    drop(guard);

    let err = res.expect_err("refresh should fail");
    assert!(matches!(err, Error::Auth(_)), "got {:?}", err);
    assert_eq!(err.to_string(), "token refresh failed: client secret mismatch");
    assert_eq!(err.api_error().map(|a| a.error.as_str()), Some("invalid_grant"));

    let logs = drain_logs(lines);
    assert!(
        logs.iter()
            .any(|line| line.contains("ERROR") && line.contains("refresh.failure")),
        "expected refresh.failure event, got: {:?}",
        logs
    );
}
