//! HTTP API integration tests.
//!
//! These drive the actual axum server over the wire: form submissions
//! (including the honeypot and malformed-body paths), the follow-up board,
//! allow-listed patches, and the archived purge.

use fielddesk::config::Config;
use fielddesk::migrate;
use fielddesk::server::run_server;
use serde_json::{json, Value};
use tempfile::TempDir;

// ─── Helpers ────────────────────────────────────────────────────────

fn test_config(tmp: &TempDir, port: u16) -> Config {
    let db_path = tmp.path().join("fdesk.sqlite");
    let config_content = format!(
        r#"
[db]
path = "{}"

[server]
bind = "127.0.0.1:{}"

[defaults]
state = "AR"

[sync]
enabled = false
"#,
        db_path.display(),
        port
    );
    toml::from_str(&config_content).unwrap()
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

/// Migrates a fresh database and spawns the server on a free port.
/// Returns the port; the server task runs until the test process exits.
async fn start_server(tmp: &TempDir) -> u16 {
    let port = find_free_port();
    let cfg = test_config(tmp, port);
    migrate::run_migrations(&cfg).await.unwrap();
    tokio::spawn(async move {
        run_server(&cfg).await.ok();
    });
    wait_for_server(port).await;
    port
}

fn url(port: u16, path: &str) -> String {
    format!("http://127.0.0.1:{}{}", port, path)
}

async fn submit(client: &reqwest::Client, port: u16, body: Value) -> (reqwest::StatusCode, Value) {
    let resp = client
        .post(url(port, "/intake"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_version() {
    let tmp = TempDir::new().unwrap();
    let port = start_server(&tmp).await;
    let client = reqwest::Client::new();

    let resp = client.get(url(port, "/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some_and(|v| !v.is_empty()));
}

#[tokio::test]
async fn test_submission_lands_on_board() {
    let tmp = TempDir::new().unwrap();
    let port = start_server(&tmp).await;
    let client = reqwest::Client::new();

    let (status, body) = submit(
        &client,
        port,
        json!({
            "moduleId": "event-request",
            "data": {
                "contactName": "Jane Doe",
                "contactEmail": "jane@x.com",
                "eventTitle": "Town Hall",
                "startDateTime": "2025-06-01T18:00"
            }
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["ok"], true);
    assert!(body["requestId"].as_str().is_some_and(|v| !v.is_empty()));

    let board: Value = client
        .get(url(port, "/followups"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let pending = board["pending"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["displayName"], "Jane Doe");
    assert_eq!(pending[0]["status"], "new");
    assert!(pending[0]["completedAt"].is_null());
    assert!(board["completed"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_honeypot_gets_silent_success_without_records() {
    let tmp = TempDir::new().unwrap();
    let port = start_server(&tmp).await;
    let client = reqwest::Client::new();

    let (status, body) = submit(
        &client,
        port,
        json!({
            "moduleId": "live-field",
            "data": { "name": "Totally Real", "phone": "501-555-0000" },
            "honeypot": "http://spam.example"
        }),
    )
    .await;
    // The bot sees a success and nothing is written.
    assert_eq!(status, 200);
    assert_eq!(body["ok"], true);
    assert!(body["requestId"].as_str().is_some());

    let board: Value = client
        .get(url(port, "/followups"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(board["pending"].as_array().unwrap().is_empty());
    assert!(board["completed"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_validation_failure_returns_form_shape() {
    let tmp = TempDir::new().unwrap();
    let port = start_server(&tmp).await;
    let client = reqwest::Client::new();

    let (status, body) = submit(
        &client,
        port,
        json!({ "moduleId": "event-request", "data": {} }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "validation failed");
    let details = body["details"].as_array().unwrap();
    assert!(
        details
            .iter()
            .any(|d| d.as_str().unwrap().contains("contactName")),
        "got: {:?}",
        details
    );
}

#[tokio::test]
async fn test_unparseable_body_returns_form_shape() {
    let tmp = TempDir::new().unwrap();
    let port = start_server(&tmp).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(port, "/intake"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_wrong_method_returns_form_shape() {
    let tmp = TempDir::new().unwrap();
    let port = start_server(&tmp).await;
    let client = reqwest::Client::new();

    let resp = client.get(url(port, "/intake")).send().await.unwrap();
    assert_eq!(resp.status(), 405);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn test_patch_status_stamps_and_clears_completion() {
    let tmp = TempDir::new().unwrap();
    let port = start_server(&tmp).await;
    let client = reqwest::Client::new();

    submit(
        &client,
        port,
        json!({
            "moduleId": "live-field",
            "data": { "name": "Pat Moore", "phone": "501-555-0147" }
        }),
    )
    .await;

    let board: Value = client
        .get(url(port, "/followups"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = board["pending"][0]["id"].as_str().unwrap().to_string();

    let resp = client
        .patch(url(port, &format!("/followups/{}", id)))
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["status"], "completed");
    assert!(updated["completedAt"].as_i64().is_some());

    // Re-opening is allowed and clears the stamp
    let reopened: Value = client
        .patch(url(port, &format!("/followups/{}", id)))
        .json(&json!({ "status": "new" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reopened["status"], "new");
    assert!(reopened["completedAt"].is_null());
}

#[tokio::test]
async fn test_patch_rejects_unknown_fields_and_statuses() {
    let tmp = TempDir::new().unwrap();
    let port = start_server(&tmp).await;
    let client = reqwest::Client::new();

    submit(
        &client,
        port,
        json!({
            "moduleId": "live-field",
            "data": { "name": "Edit Me", "phone": "501-555-0101" }
        }),
    )
    .await;
    let board: Value = client
        .get(url(port, "/followups"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = board["pending"][0]["id"].as_str().unwrap().to_string();

    // A key outside the allow-list is a 400, not a silent filter
    let resp = client
        .patch(url(port, &format!("/followups/{}", id)))
        .json(&json!({ "contactId": "someone-else" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client
        .patch(url(port, &format!("/followups/{}", id)))
        .json(&json!({ "status": "done" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_patch_missing_id_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let port = start_server(&tmp).await;
    let client = reqwest::Client::new();

    let resp = client
        .patch(url(port, "/followups/no-such-id"))
        .json(&json!({ "notes": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_archive_hides_and_purge_deletes() {
    let tmp = TempDir::new().unwrap();
    let port = start_server(&tmp).await;
    let client = reqwest::Client::new();

    submit(
        &client,
        port,
        json!({
            "moduleId": "live-field",
            "data": { "name": "Keep Me", "phone": "501-555-0100" }
        }),
    )
    .await;
    submit(
        &client,
        port,
        json!({
            "moduleId": "live-field",
            "data": { "name": "Archive Me", "phone": "501-555-0101" }
        }),
    )
    .await;

    let board: Value = client
        .get(url(port, "/followups"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let pending = board["pending"].as_array().unwrap();
    assert_eq!(pending.len(), 2);
    let id = pending
        .iter()
        .find(|f| f["displayName"] == "Archive Me")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = client
        .patch(url(port, &format!("/followups/{}", id)))
        .json(&json!({ "archived": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let board: Value = client
        .get(url(port, "/followups"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let pending = board["pending"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["displayName"], "Keep Me");

    let resp = client
        .post(url(port, "/followups/purge"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["removed"], 1);

    // Purging again removes nothing; the active row survives
    let body: Value = client
        .post(url(port, "/followups/purge"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["removed"], 0);
}

#[tokio::test]
async fn test_repeat_submission_merges_contact_but_adds_follow_ups() {
    let tmp = TempDir::new().unwrap();
    let port = start_server(&tmp).await;
    let client = reqwest::Client::new();

    submit(
        &client,
        port,
        json!({
            "moduleId": "team-signup",
            "data": { "fullName": "Sam Lee", "email": "sam@x.com", "consent": true }
        }),
    )
    .await;
    submit(
        &client,
        port,
        json!({
            "moduleId": "live-field",
            "data": { "name": "Sam Lee", "email": "SAM@X.COM ", "notes": "met at the fair" }
        }),
    )
    .await;

    let board: Value = client
        .get(url(port, "/followups"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let pending = board["pending"].as_array().unwrap();
    assert_eq!(pending.len(), 2, "one follow-up per intake");
    assert_eq!(
        pending[0]["contactId"], pending[1]["contactId"],
        "same email should merge into one contact"
    );
}
