use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::{mount_login_mock, setup_test_client, setup_test_client_with_version};
use unifi_stations::{UniFiError, User};

fn user_with_id(id: &str, mac: &str) -> User {
    let mut user = User::new(mac);
    user.id = Some(id.to_string());
    user
}

#[tokio::test]
async fn test_update_on_new_controller_reads_after_write() {
    // What it tests: Against a controller at or above 6.0.43, update issues a
    // PUT to the per-record REST endpoint and then a fresh GET of the same
    // record, returning the GET result even though the PUT echoed a different
    // (stale) representation.
    //
    // Why it's valuable: Read-after-write-wins is the defining behavior of
    // the newer protocol; trusting the write echo would return stale data on
    // controllers that echo partial representations.
    let mock_server = MockServer::start().await;
    mount_login_mock(&mock_server).await;

    let mut user = user_with_id("user1", "00:11:22:33:44:55");
    user.name = Some("renamed".into());

    Mock::given(method("PUT"))
        .and(path("/api/s/default/rest/user/user1"))
        .and(body_json(json!({
            "_id": "user1",
            "mac": "00:11:22:33:44:55",
            "name": "renamed"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            // Stale echo: still carries the old name.
            "data": [{ "_id": "user1", "mac": "00:11:22:33:44:55", "name": "old-name" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/rest/user/user1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [{ "_id": "user1", "mac": "00:11:22:33:44:55", "name": "renamed" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_test_client_with_version(&mock_server.uri(), Some("6.0.43")).await;

    let updated = client.users().update(&user).await.unwrap();
    assert_eq!(updated.name.as_deref(), Some("renamed"));
}

#[tokio::test]
async fn test_update_on_new_controller_write_error_skips_read() {
    // What it tests: When the PUT's envelope reports a metadata error, the
    // follow-up read is never issued and the error surfaces as ApiError.
    //
    // Why it's valuable: The read has a strict must-happen-after relationship
    // with a successful write; reading after a failed write could mask the
    // failure with a stale record.
    let mock_server = MockServer::start().await;
    mount_login_mock(&mock_server).await;

    Mock::given(method("PUT"))
        .and(path("/api/s/default/rest/user/user1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.InvalidPayload" },
            "data": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/rest/user/user1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [{ "_id": "user1", "mac": "00:11:22:33:44:55" }]
        })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = setup_test_client_with_version(&mock_server.uri(), Some("7.3.83")).await;

    let user = user_with_id("user1", "00:11:22:33:44:55");
    match client.users().update(&user).await {
        Err(UniFiError::ApiError(msg)) => assert_eq!(msg, "api.err.InvalidPayload"),
        other => panic!("Expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_on_old_controller_uses_group_write() {
    // What it tests: Against a controller below 6.0.43, update goes through
    // the group/user batch endpoint with the same two-level envelope create
    // uses, trusts its echoed record, and never touches the per-record REST
    // endpoint.
    let mock_server = MockServer::start().await;
    mount_login_mock(&mock_server).await;

    let mut user = user_with_id("user1", "00:11:22:33:44:55");
    user.note = Some("updated note".into());

    Mock::given(method("POST"))
        .and(path("/api/s/default/group/user"))
        .and(body_json(json!({
            "objects": [{
                "data": {
                    "_id": "user1",
                    "mac": "00:11:22:33:44:55",
                    "note": "updated note"
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [{
                "meta": { "rc": "ok" },
                "data": [{
                    "_id": "user1",
                    "mac": "00:11:22:33:44:55",
                    "note": "updated note"
                }]
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/s/default/rest/user/user1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = setup_test_client_with_version(&mock_server.uri(), Some("5.14.23")).await;

    let updated = client.users().update(&user).await.unwrap();
    assert_eq!(updated.note.as_deref(), Some("updated note"));
}

#[tokio::test]
async fn test_update_with_unknown_version_falls_back_to_group_write() {
    // What it tests: Both an absent and an unparseable controller version
    // deterministically select the legacy group write, never the REST path.
    //
    // Why it's valuable: Pins the documented fallback for the version-parse
    // edge case instead of letting an unknown version pick a protocol
    // arbitrarily.
    for version in [None, Some("not-a-version")] {
        let mock_server = MockServer::start().await;
        mount_login_mock(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/api/s/default/group/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": { "rc": "ok" },
                "data": [{
                    "meta": { "rc": "ok" },
                    "data": [{ "_id": "user1", "mac": "00:11:22:33:44:55" }]
                }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/api/s/default/rest/user/user1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = setup_test_client_with_version(&mock_server.uri(), version).await;

        let user = user_with_id("user1", "00:11:22:33:44:55");
        let result = client.users().update(&user).await;
        assert!(result.is_ok(), "version {version:?}");
    }
}

#[tokio::test]
async fn test_update_requires_id() {
    // What it tests: Updating a record without a controller-assigned id fails
    // before any network traffic.
    let mock_server = MockServer::start().await;
    mount_login_mock(&mock_server).await;

    let client = setup_test_client(&mock_server.uri()).await;

    let user = User::new("00:11:22:33:44:55");
    let result = client.users().update(&user).await;
    assert!(matches!(result, Err(UniFiError::ConfigurationError(_))));
}

#[tokio::test]
async fn test_refreshed_version_switches_update_protocol() {
    // What it tests: refresh_controller_version pulls the version from
    // stat/sysinfo, and a subsequent update on the same client takes the
    // REST write-then-read path.
    //
    // Why it's valuable: Exercises the full chain from version discovery to
    // protocol selection, the way a long-lived client actually runs.
    let mock_server = MockServer::start().await;
    mount_login_mock(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sysinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [{ "version": "7.3.83", "name": "controller" }]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/s/default/rest/user/user1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/rest/user/user1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [{ "_id": "user1", "mac": "00:11:22:33:44:55" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_test_client(&mock_server.uri()).await;

    let version = client.refresh_controller_version().await.unwrap();
    assert_eq!(version, "7.3.83");
    assert_eq!(client.controller_version().as_deref(), Some("7.3.83"));

    let user = user_with_id("user1", "00:11:22:33:44:55");
    let result = client.users().update(&user).await;
    assert!(result.is_ok());
}
