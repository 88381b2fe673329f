// Integration tests for the hub client against a local mock server.
//
// Coverage:
// - verb wrappers, query encoding, JSON bodies and content type
// - bearer header presence/absence
// - success / hub error / synthesized HTTP error / undecodable body
// - unreachable hub
// - ambient construction from a config store

use agenthq_cli::config::{Config, ConfigStore};
use agenthq_cli::{Error, HubClient, Query};
use mockito::{Matcher, Server};
use serde::Deserialize;
use serde_json::json;
use tempfile::TempDir;

fn ok_body(data: serde_json::Value) -> String {
    json!({ "success": true, "data": data }).to_string()
}

#[derive(Deserialize, Debug)]
struct Item {
    id: String,
    name: String,
}

#[test]
fn get_success_decodes_payload() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/v1/items")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"data":{"id":"123","name":"test"}}"#)
        .create();

    let client = HubClient::with_token(server.url(), "test-token").unwrap();
    let env = client.get("/api/v1/items", &Query::new()).unwrap();

    mock.assert();
    assert!(env.success);
    let item: Item = env.data_as().unwrap();
    assert_eq!(item.id, "123");
    assert_eq!(item.name, "test");
}

#[test]
fn get_encodes_query_parameters() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/v1/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "deal pipeline & more".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .with_body(ok_body(json!([])))
        .create();

    let client = HubClient::with_token(server.url(), "").unwrap();
    let query = Query::from([
        ("q".to_string(), "deal pipeline & more".to_string()),
        ("limit".to_string(), "10".to_string()),
    ]);
    client.get("/api/v1/search", &query).unwrap();

    mock.assert();
}

#[test]
fn post_sends_json_body() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/v1/items")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"name": "test-item", "tags": ["a", "b"]})))
        .with_status(201)
        .with_body(ok_body(json!({"id": "new-123"})))
        .create();

    let client = HubClient::with_token(server.url(), "test-token").unwrap();
    let env = client
        .post("/api/v1/items", &json!({"name": "test-item", "tags": ["a", "b"]}))
        .unwrap();

    mock.assert();
    assert_eq!(env.data()["id"], "new-123");
}

#[test]
fn patch_sends_json_body() {
    let mut server = Server::new();
    let mock = server
        .mock("PATCH", "/api/v1/items/123")
        .match_body(Matcher::Json(json!({"name": "updated"})))
        .with_body(ok_body(json!({"id": "123", "name": "updated"})))
        .create();

    let client = HubClient::with_token(server.url(), "test-token").unwrap();
    let env = client
        .patch("/api/v1/items/123", &json!({"name": "updated"}))
        .unwrap();

    mock.assert();
    let item: Item = env.data_as().unwrap();
    assert_eq!(item.name, "updated");
}

#[test]
fn bodiless_verbs_send_no_content_type() {
    let mut server = Server::new();
    let delete = server
        .mock("DELETE", "/api/v1/items/123")
        .match_header("content-type", Matcher::Missing)
        .with_body(r#"{"success":true}"#)
        .create();
    let read_all = server
        .mock("POST", "/api/v1/notifications/read-all")
        .match_header("content-type", Matcher::Missing)
        .with_body(r#"{"success":true}"#)
        .create();

    let client = HubClient::with_token(server.url(), "test-token").unwrap();
    client.delete("/api/v1/items/123").unwrap();
    client.post_empty("/api/v1/notifications/read-all").unwrap();

    delete.assert();
    read_all.assert();
}

#[test]
fn empty_token_sends_no_authorization_header() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/v1/auth/login")
        .match_header("authorization", Matcher::Missing)
        .with_body(ok_body(json!({})))
        .create();

    let client = HubClient::with_token(server.url(), "").unwrap();
    client
        .post("/api/v1/auth/login", &json!({"email": "a@b.c", "password": "pw"}))
        .unwrap();

    mock.assert();
}

#[test]
fn token_is_sent_as_bearer() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/v1/agents")
        .match_header("authorization", "Bearer my-token")
        .with_body(ok_body(json!([])))
        .create();

    let client = HubClient::with_token(server.url(), "my-token").unwrap();
    client.get("/api/v1/agents", &Query::new()).unwrap();

    mock.assert();
}

#[test]
fn hub_error_is_surfaced_with_code_and_message() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/v1/org")
        .with_status(403)
        .with_body(r#"{"success":false,"error":{"code":"FORBIDDEN","message":"Access denied"}}"#)
        .create();

    let client = HubClient::with_token(server.url(), "t").unwrap();
    let err = client.get("/api/v1/org", &Query::new()).unwrap_err();

    let rendered = err.to_string();
    assert!(rendered.contains("FORBIDDEN"), "{rendered}");
    assert!(rendered.contains("Access denied"), "{rendered}");
    assert_eq!(err.code(), Some("FORBIDDEN"));
    assert_eq!(err.status(), Some(403));
    assert!(err.is_auth_error());
}

#[test]
fn missing_error_descriptor_is_synthesized_from_status() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/v1/feed")
        .with_status(500)
        .with_body(r#"{"success":false,"pagination":{"page":1,"limit":20,"total":0,"hasMore":false}}"#)
        .create();

    let client = HubClient::with_token(server.url(), "t").unwrap();
    let err = client.get("/api/v1/feed", &Query::new()).unwrap_err();

    match &err {
        Error::Api { code, message, .. } => {
            assert_eq!(code, "HTTP_500");
            assert_eq!(message, "request failed with status 500");
        }
        other => panic!("expected API error, got {other:?}"),
    }
    let env = err.envelope().expect("envelope kept on failure");
    assert!(!env.success);
    assert_eq!(env.pagination.as_ref().map(|p| p.limit), Some(20));
}

#[test]
fn non_envelope_body_is_a_decode_error() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/health")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create();

    let client = HubClient::with_token(server.url(), "").unwrap();
    let err = client.get("/health", &Query::new()).unwrap_err();

    assert!(matches!(err, Error::Decode(_)), "got {err:?}");
}

#[test]
fn unreachable_hub_is_a_network_error() {
    // port 1 is reserved and nothing listens on it
    let client = HubClient::with_token("http://127.0.0.1:1", "").unwrap();
    let err = client.get("/api/v1/agents", &Query::new()).unwrap_err();

    assert!(matches!(err, Error::Network(_)), "got {err:?}");
    assert!(err.to_string().starts_with("request failed"), "{err}");
    assert!(err.envelope().is_none());
}

#[test]
fn ambient_client_uses_stored_api_key() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/v1/agents")
        .match_header("authorization", "Bearer ahq_key")
        .with_body(ok_body(json!([])))
        .create();

    let dir = TempDir::new().unwrap();
    let store = ConfigStore::at(dir.path().join("agenthq").join("config.json"));
    store
        .save(&Config {
            hub_url: server.url(),
            api_key: Some("ahq_key".into()),
            jwt_token: Some("jwt".into()),
            ..Config::default()
        })
        .unwrap();

    let client = HubClient::from_store(&store).unwrap();
    assert_eq!(client.base_url(), server.url());
    client.get("/api/v1/agents", &Query::new()).unwrap();

    mock.assert();
}

#[test]
fn ambient_client_fails_on_corrupt_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{{{").unwrap();

    let err = HubClient::from_store(&ConfigStore::at(path)).err().unwrap();
    assert!(matches!(err, Error::Config(_)), "got {err:?}");
}

#[test]
fn null_pagination_counts_do_not_fail_the_call() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/v1/feed")
        .with_body(
            r#"{"success":true,"data":[],"pagination":{"page":1,"limit":20,"total":null,"hasMore":false}}"#,
        )
        .create();

    let client = HubClient::with_token(server.url(), "t").unwrap();
    let env = client.get("/api/v1/feed", &Query::new()).unwrap();

    assert_eq!(env.pagination.map(|p| p.total), Some(0));
}

// Only test in this binary that touches AGENTHQ_CONFIG.
#[test]
fn from_config_reads_the_env_selected_file() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/v1/agents")
        .match_header("authorization", "Bearer env_key")
        .with_body(ok_body(json!([])))
        .create();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");
    ConfigStore::at(&path)
        .save(&Config {
            hub_url: server.url(),
            api_key: Some("env_key".into()),
            ..Config::default()
        })
        .unwrap();

    std::env::set_var(agenthq_cli::config::CONFIG_PATH_ENV, &path);
    let client = HubClient::from_config();
    std::env::remove_var(agenthq_cli::config::CONFIG_PATH_ENV);

    let client = client.unwrap();
    assert_eq!(client.base_url(), server.url());
    client.get("/api/v1/agents", &Query::new()).unwrap();
    mock.assert();
}
