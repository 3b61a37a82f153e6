//! Sign-in, sign-up and session commands against a mock auth service.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{any, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_ID: &str = "7d3f9b0e-2c1a-4a57-9a43-1f0f2f5b8c11";
const ACCESS_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.e30.sig";

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn session_body() -> serde_json::Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": "refresh-1",
        "token_type": "bearer",
        "expires_in": 3600,
        "user": {
            "id": USER_ID,
            "email": "abc@x.com",
            "user_metadata": {}
        }
    })
}

fn sanctum(home: &TempDir, server: &MockServer) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sanctum");
    cmd.env("SANCTUM_HOME", home.path())
        .env("SANCTUM_URL", server.uri())
        .env("SANCTUM_ANON_KEY", "anon-key")
        .env_remove("SANCTUM_LOG");
    cmd
}

#[tokio::test]
async fn test_login_stores_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(body_partial_json(json!({"email": "abc@x.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&server)
        .await;

    sanctum(&home, &server)
        .args(["login", "--email", "abc@x.com"])
        .write_stdin("secret\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as abc <abc@x.com> [guest]"));

    assert!(home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_login_with_empty_passphrase_sends_nothing() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    sanctum(&home, &server)
        .args(["login", "--email", "user@test.com"])
        .write_stdin("\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Passphrase required"));
}

#[tokio::test]
async fn test_login_failure_is_marked() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    sanctum(&home, &server)
        .args(["login", "--email", "abc@x.com"])
        .write_stdin("wrong\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("[FAULT] Invalid login credentials"));

    assert!(!home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_signup_prints_notice_without_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_partial_json(json!({
            "email": "neo@x.com",
            "data": {"username": "Neo", "access_level": "guest"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": USER_ID,
            "email": "neo@x.com",
            "user_metadata": {"username": "Neo"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    sanctum(&home, &server)
        .args(["signup", "--email", "neo@x.com", "--username", "Neo"])
        .write_stdin("secret1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Verification transmission sent"));

    assert!(!home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_status_and_logout_when_signed_out() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    sanctum(&home, &server)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in."));

    sanctum(&home, &server)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in."));
}

#[tokio::test]
async fn test_logout_revokes_and_removes_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": USER_ID,
            "email": "abc@x.com",
            "user_metadata": {"username": "Abc", "access_level": "executor"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    sanctum(&home, &server)
        .args(["login", "--email", "abc@x.com"])
        .write_stdin("secret\n")
        .assert()
        .success();

    sanctum(&home, &server)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as Abc <abc@x.com> [executor]"))
        .stdout(predicate::str::contains("Token: eyJhbGciOiJI..."))
        .stdout(predicate::str::contains(ACCESS_TOKEN).not());

    sanctum(&home, &server)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));

    assert!(!home.path().join("session.json").exists());
}
