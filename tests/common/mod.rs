use serde_json::json;
use unifi_stations::UniFiClient;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub const TEST_COOKIE: &str = "unifises=test-cookie";

/// Mount the login mock every client build hits first.
#[allow(dead_code)]
pub async fn mount_login_mock(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({
            "username": "test-user",
            "password": "test-password"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "meta": { "rc": "ok" },
                    "data": []
                }))
                .insert_header("set-cookie", TEST_COOKIE),
        )
        .mount(mock_server)
        .await;
}

/// Set up a test client with predefined credentials
#[allow(dead_code)]
pub async fn setup_test_client(server_url: &str) -> UniFiClient {
    setup_test_client_with_version(server_url, None).await
}

/// Set up a test client that believes the controller runs `version`.
#[allow(dead_code)]
pub async fn setup_test_client_with_version(
    server_url: &str,
    version: Option<&str>,
) -> UniFiClient {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut builder = UniFiClient::builder()
        .controller_url(server_url)
        .username("test-user")
        .password("test-password")
        .site("default")
        .verify_ssl(false);

    if let Some(version) = version {
        builder = builder.controller_version(version);
    }

    builder.build().await.expect("client should build against mock server")
}
