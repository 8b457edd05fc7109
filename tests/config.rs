mod common;

use easemob_im::{Config, ConfigLocation, Error, ImClient};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn malformed_app_key_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for key in ["onlyonepart", "a#b#c", "#app"] {
        let config = Config::from_values(server.uri(), key, "client-id", "client-secret", 0);
        match ImClient::new(config) {
            Err(Error::Config(msg)) => assert!(msg.contains(key), "message was {}", msg),
            Err(other) => panic!("expected config error for '{}', got {:?}", key, other),
            Ok(_) => panic!("expected config error for '{}'", key),
        }
    }
}

#[tokio::test]
async fn empty_host_is_rejected() {
    let config = Config::from_values("  ", "org#app", "client-id", "client-secret", 0);
    assert!(matches!(ImClient::new(config), Err(Error::Config(_))));
}

#[tokio::test]
async fn client_builds_base_url_from_host_and_key() {
    let server = MockServer::start().await;
    let client = common::client(&server);
    assert_eq!(client.base_url(), format!("{}/org/app", server.uri()));

    let config = Config::from_values("a1.easemob.com", "acme#chat", "id", "secret", 0);
    let client = ImClient::new(config).expect("client");
    assert_eq!(client.base_url(), "https://a1.easemob.com/acme/chat");
}

#[tokio::test]
async fn client_loads_from_file_location() {
    let path = std::env::temp_dir().join(format!(
        "easemob-client-config-{}.json",
        std::process::id()
    ));
    std::fs::write(
        &path,
        r#"{"host":"http://127.0.0.1:9","app_key":"acme#chat","client_id":"id","client_secret":"s"}"#,
    )
    .unwrap();

    let client = ImClient::from_location(ConfigLocation::File(path.display().to_string()))
        .await
        .expect("client");
    std::fs::remove_file(&path).ok();
    assert_eq!(client.base_url(), "http://127.0.0.1:9/acme/chat");
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let res = ImClient::from_location(ConfigLocation::File(
        "/nonexistent/easemob/config.json".to_string(),
    ))
    .await;
    assert!(matches!(res, Err(Error::Io(_))));
}
