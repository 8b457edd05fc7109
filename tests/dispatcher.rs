mod common;

use std::sync::Arc;
use std::time::Duration;

use easemob_im::{Body, CallOptions, Dispatcher, Error, StaticHeader, Transport};
use reqwest::{Method, StatusCode};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{TOKEN_PATH, api_error, authed_client, client, init_logging, mount_token};

#[tokio::test]
async fn non_401_error_passes_through_without_refresh() {
    init_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/org/app/users"))
        .respond_with(api_error(400, "bad request"))
        .expect(1)
        .mount(&server)
        .await;
    mount_token(&server, "unused", 0).await;

    let client = client(&server);
    let err = client
        .dispatcher()
        .post("/users", Body::Empty)
        .await
        .expect_err("400 must fail");

    assert_eq!(err.to_string(), "bad request");
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    let api = err.api_error().expect("platform error");
    assert_eq!(api.exception, "EasemobException");
    assert_eq!(
        api.timestamp().map(|t| t.as_millisecond()),
        Some(1_700_000_000_000)
    );
}

#[tokio::test]
async fn success_reply_is_not_decoded_until_asked() {
    let server = MockServer::start().await;
    let client = authed_client(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/org/app/chatgroups/g1/ban"))
        .respond_with(ResponseTemplate::new(200).set_body_string("definitely not json"))
        .expect(2)
        .mount(&server)
        .await;

    client.group().unmute_all("g1").await.expect("body is ignored");

    let reply = client
        .dispatcher()
        .delete("/chatgroups/g1/ban", Body::Empty)
        .await
        .expect("2xx");
    assert_eq!(reply.status(), StatusCode::OK);
    assert_eq!(reply.bytes(), b"definitely not json");
    let err = reply
        .json::<serde_json::Value>()
        .expect_err("decoding garbage fails");
    assert!(matches!(err, Error::Json(_)));
}

#[tokio::test]
async fn undecodable_error_payload_is_a_decode_error() {
    let server = MockServer::start().await;
    let client = authed_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/org/app/chatrooms"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = client
        .chatroom()
        .get_all_chatrooms()
        .await
        .expect_err("502 must fail");
    assert!(matches!(err, Error::Json(_)), "got {:?}", err);
}

#[tokio::test]
async fn without_authenticator_401_is_returned_as_is() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/org/app/users/alice"))
        .respond_with(api_error(401, "unauthorized"))
        .expect(1)
        .mount(&server)
        .await;
    mount_token(&server, "unused", 0).await;

    let transport = Transport::with_client(reqwest::Client::new(), format!("{}/org/app", server.uri()));
    let dispatcher = Dispatcher::new(Arc::new(transport), None);
    let err = dispatcher
        .get("/users/alice", Body::Empty)
        .await
        .expect_err("401 without refresh");
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.to_string(), "unauthorized");
}

#[tokio::test]
async fn deadline_bounds_the_whole_call() {
    let server = MockServer::start().await;
    let client = authed_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/org/app/metadata/user/capacity"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": 1024}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let deadline = Duration::from_millis(50);
    let err = client
        .dispatcher()
        .request_with(
            Method::GET,
            "/metadata/user/capacity",
            Body::Empty,
            &CallOptions::with_deadline(deadline),
        )
        .await
        .expect_err("deadline elapses first");
    assert!(matches!(err, Error::Timeout(d) if d == deadline), "got {:?}", err);

    let reply = client
        .dispatcher()
        .request_with(
            Method::GET,
            "/metadata/user/capacity",
            Body::Empty,
            &CallOptions::default(),
        )
        .await
        .expect("no deadline");
    assert_eq!(reply.json::<serde_json::Value>().unwrap()["data"], 1024);
}

#[tokio::test]
async fn deadline_during_first_attempt_never_refreshes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/org/app/users"))
        .respond_with(api_error(401, "no token").set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;
    mount_token(&server, "unused", 0).await;

    let client = client(&server);
    let deadline = Duration::from_millis(50);
    let err = client
        .dispatcher()
        .request_with(
            Method::GET,
            "/users",
            Body::Empty,
            &CallOptions::with_deadline(deadline),
        )
        .await
        .expect_err("deadline elapses before the 401 arrives");
    assert!(matches!(err, Error::Timeout(d) if d == deadline), "got {:?}", err);

    // Give the delayed 401 time to land; the dropped call must not act on it.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(client.dispatcher().transport().bearer_token().await.is_none());
}

#[tokio::test]
async fn transport_failure_is_not_retried() {
    let transport = Transport::with_client(reqwest::Client::new(), "http://127.0.0.1:1/org/app");
    let dispatcher = Dispatcher::new(Arc::new(transport), None);
    let err = dispatcher
        .get("/users", Body::Empty)
        .await
        .expect_err("nothing listens on port 1");
    assert!(matches!(err, Error::Http(_)), "got {:?}", err);
}

#[tokio::test]
async fn middleware_runs_on_every_request() {
    let server = MockServer::start().await;
    let client = authed_client(&server).await;

    client.use_middleware(StaticHeader::new("X-Request-Source", "backend").unwrap());
    client.use_middleware(|req: &mut reqwest::Request| -> Result<(), Error> {
        req.headers_mut()
            .insert("X-Trace", reqwest::header::HeaderValue::from_static("t-1"));
        Ok(())
    });

    Mock::given(method("GET"))
        .and(path("/org/app/users/alice/contacts/users"))
        .and(header("X-Request-Source", "backend"))
        .and(header("X-Trace", "t-1"))
        .and(header("Authorization", "Bearer tok-1"))
        .and(header("Accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": ["bob", "carol"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let friends = client.user().get_friends("alice").await.expect("friends");
    assert_eq!(friends, vec!["bob".to_string(), "carol".to_string()]);
}

#[tokio::test]
async fn token_endpoint_is_never_hit_for_successful_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/org/app/chatgroups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let groups = client(&server).group().get_all_groups().await.expect("groups");
    assert!(groups.is_empty());
}
