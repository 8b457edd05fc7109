use crate::ImClient;
use crate::tests::test_support::{TOKEN_PATH, base_config, capture_logs, drain_logs, token_body};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

#[tokio::test]
async fn retries_once_after_401_then_succeeds() {
    let server = MockServer::start().await;

    let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    Mock::given(method("GET"))
        .and(path("/org/app/users/alice"))
        .respond_with(move |req: &Request| {
            let auth = req
                .headers
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string());
            seen_clone.lock().unwrap().push(auth.clone());
            match auth.as_deref() {
                Some("Bearer tok-1") => ResponseTemplate::new(200).set_body_json(
                    serde_json::json!({"entities": [{"username": "alice", "activated": true}]}),
                ),
                _ => ResponseTemplate::new(401).set_body_json(serde_json::json!({
                    "error": "unauthorized",
                    "error_description": "Unable to authenticate due to expired access token",
                })),
            }
        })
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_partial_json(serde_json::json!({
            "grant_type": "client_credentials",
            "client_id": "client-id",
            "client_secret": "client-secret",
            "ttl": 7200,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ImClient::new(base_config(&server.uri())).expect("client");

    let (lines, guard) = capture_logs();
    let res = client.user().get_user("alice").await;
    drop(guard);

    let user = res.expect("call should succeed after refresh");
    assert_eq!(user.username, "alice");

    let logs = drain_logs(lines);
    assert!(
        logs.iter()
            .any(|line| line.contains("WARN") && line.contains("401")),
        "expected warning log mentioning 401, got: {:?}",
        logs
    );
    assert!(
        logs.iter().any(|line| line.contains("refresh.success")),
        "expected refresh.success event, got: {:?}",
        logs
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[None, Some("Bearer tok-1".to_string())]);
}

#[tokio::test]
async fn token_is_attached_to_later_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-xyz")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/org/app/users/bob/status"))
        .and(wiremock::matchers::header("Authorization", "Bearer tok-xyz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {"bob": "online"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ImClient::new(base_config(&server.uri())).expect("client");
    client.authenticate().await.expect("token");
    let status = client.user().get_online_status("bob").await.expect("status");
    assert_eq!(status, "online");
}
