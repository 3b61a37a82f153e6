//! Probe and listing commands against a mock REST service.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn sanctum(home: &TempDir, url: &str) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sanctum");
    cmd.env("SANCTUM_HOME", home.path())
        .env("SANCTUM_URL", url)
        .env("SANCTUM_ANON_KEY", "anon-key")
        .env_remove("SANCTUM_LOG");
    cmd
}

#[tokio::test]
async fn test_probe_reports_reachable() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    sanctum(&home, &server.uri())
        .arg("probe")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sanctum reachable"));
}

#[tokio::test]
async fn test_probe_failure_shows_fixed_message() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "code": "PGRST000",
            "message": "upstream connect error"
        })))
        .mount(&server)
        .await;

    sanctum(&home, &server.uri())
        .arg("probe")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unable to reach the sanctum"))
        .stderr(predicate::str::contains("upstream connect error").not());
}

#[tokio::test]
async fn test_entities_list_prints_rows() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/entities"))
        .and(query_param("limit", "3"))
        .and(query_param("order", "created_at.desc"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "11111111-1111-4111-8111-111111111111",
            "name": "Wisp",
            "original_form": "ember",
            "current_form": "lantern",
            "status": "transformed",
            "chamber": "forge",
            "signature": 0.4,
            "stability": 0.9,
            "visibility_level": 1,
            "created_by": "7d3f9b0e-2c1a-4a57-9a43-1f0f2f5b8c11",
            "created_at": "2025-03-01T12:00:00Z"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    sanctum(&home, &server.uri())
        .args(["entities", "list", "--limit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wisp"))
        .stdout(predicate::str::contains("transformed"))
        .stdout(predicate::str::contains("ember -> lantern"));
}

#[test]
fn test_entities_mine_requires_session() {
    let home = TempDir::new().unwrap();

    sanctum(&home, "http://127.0.0.1:9")
        .args(["entities", "list", "--mine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--mine requires a signed-in session"));
}

#[tokio::test]
async fn test_events_list_empty() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/system_events"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    sanctum(&home, &server.uri())
        .args(["events", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No events found."));
}
