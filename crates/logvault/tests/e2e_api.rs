use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use serial_test::serial;
use testkit::{csv_body, mint_token, sample_csv};

const SECRET: &str = "e2e-shared-secret";

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_logvault")
}

fn spawn_server(temp: &Path) -> (Child, u16) {
    let port = free_port();
    let db_path = temp.join("logvault.duckdb");

    let child = Command::new(bin())
        .arg("run")
        .arg("--db-path")
        .arg(&db_path)
        .arg("--http-addr")
        .arg(format!("127.0.0.1:{port}"))
        .env("LOGVAULT_AUTH_SECRET", SECRET)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    (child, port)
}

async fn wait_ready(port: u16, child: &mut Child) {
    let client = reqwest::Client::new();
    let mut ready = false;
    for _ in 0..100 {
        assert!(child.try_wait().unwrap().is_none(), "logvault exited early");
        if client
            .get(format!("http://127.0.0.1:{port}/status"))
            .send()
            .await
            .is_ok()
        {
            ready = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(ready, "api endpoint not ready");
}

async fn upload_csv(port: u16, token: &str, csv: String) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(csv.into_bytes())
        .file_name("logs.csv")
        .mime_str("text/csv")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("logfile", part);

    reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/upload"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn e2e_upload_partitions_and_round_trips() {
    let temp = tempfile::tempdir().unwrap();
    let (mut child, port) = spawn_server(temp.path());
    wait_ready(port, &mut child).await;
    let token = mint_token(SECRET, "ops");

    let resp = upload_csv(port, &token, sample_csv()).await;
    assert!(resp.status().is_success());
    let report: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(report["totalEntries"], 2);
    assert_eq!(report["invalidEntries"], 1);
    assert!(
        report["error"]["message"]
            .as_str()
            .unwrap()
            .contains("timestamp")
    );

    let page: serde_json::Value = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/logs"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "page": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["currentPage"], 1);
    let logs = page["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    // Newest timestamp first, all four fields preserved verbatim.
    assert_eq!(logs[0]["timestamp"], "2024-01-01 10:00:01.000000");
    assert_eq!(logs[0]["service"], "payments");
    assert_eq!(logs[0]["level"], "CRITICAL");
    assert_eq!(logs[0]["message"], "fail");
    assert_eq!(logs[1]["timestamp"], "2024-01-01 10:00:00.123456");
    assert_eq!(logs[1]["service"], "auth");
    assert_eq!(logs[1]["level"], "ERROR");
    assert_eq!(logs[1]["message"], "boom");

    let status: serde_json::Value = reqwest::Client::new()
        .get(format!("http://127.0.0.1:{port}/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["logs_count"], 2);

    let _ = child.kill();
    let _ = child.wait();
}

#[tokio::test]
#[serial]
async fn e2e_aggregate_by_service() {
    let temp = tempfile::tempdir().unwrap();
    let (mut child, port) = spawn_server(temp.path());
    wait_ready(port, &mut child).await;
    let token = mint_token(SECRET, "ops");

    let csv = csv_body(&[
        ("2024-01-01 10:00:00.000000", "auth", "ERROR", "boom"),
        ("2024-01-01 10:00:01.000000", "payments", "CRITICAL", "fail"),
        ("2024-01-01 10:00:02.000000", "payments", "INFO", "ok"),
    ]);
    assert!(upload_csv(port, &token, csv).await.status().is_success());

    let rows: serde_json::Value = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/logs/aggregate"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "groupBy": "service" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["service"], "payments");
    assert_eq!(rows[0]["count"], 2);
    assert_eq!(rows[0]["error_count"], 1);
    assert_eq!(rows[1]["service"], "auth");
    assert_eq!(rows[1]["count"], 1);
    assert_eq!(rows[1]["error_count"], 1);

    let _ = child.kill();
    let _ = child.wait();
}

#[tokio::test]
#[serial]
async fn e2e_rejects_unauthenticated_and_bad_tokens() {
    let temp = tempfile::tempdir().unwrap();
    let (mut child, port) = spawn_server(temp.path());
    wait_ready(port, &mut child).await;

    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/logs"))
        .json(&serde_json::json!({ "page": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/logs"))
        .bearer_auth(mint_token("wrong-secret", "ops"))
        .json(&serde_json::json!({ "page": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let _ = child.kill();
    let _ = child.wait();
}

#[tokio::test]
#[serial]
async fn e2e_rejects_unknown_dimension_before_querying() {
    let temp = tempfile::tempdir().unwrap();
    let (mut child, port) = spawn_server(temp.path());
    wait_ready(port, &mut child).await;
    let token = mint_token(SECRET, "ops");

    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/logs/aggregate"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "groupBy": "timestamp; DROP TABLE logs" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let _ = child.kill();
    let _ = child.wait();
}

#[tokio::test]
#[serial]
async fn e2e_pagination_arithmetic() {
    let temp = tempfile::tempdir().unwrap();
    let (mut child, port) = spawn_server(temp.path());
    wait_ready(port, &mut child).await;
    let token = mint_token(SECRET, "ops");

    let rows: Vec<(String, &str, &str, &str)> = (0..5)
        .map(|i| (format!("2024-01-01 10:00:0{i}.000000"), "svc", "INFO", "m"))
        .collect();
    let rows_ref: Vec<(&str, &str, &str, &str)> = rows
        .iter()
        .map(|(ts, s, l, m)| (ts.as_str(), *s, *l, *m))
        .collect();
    assert!(
        upload_csv(port, &token, csv_body(&rows_ref))
            .await
            .status()
            .is_success()
    );

    let page: serde_json::Value = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/logs"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "page": 2, "limit": 2 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["currentPage"], 2);
    assert_eq!(page["logs"].as_array().unwrap().len(), 2);
    assert_eq!(page["logs"][0]["timestamp"], "2024-01-01 10:00:02.000000");

    let _ = child.kill();
    let _ = child.wait();
}

#[tokio::test]
#[serial]
async fn e2e_all_invalid_upload_commits_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let (mut child, port) = spawn_server(temp.path());
    wait_ready(port, &mut child).await;
    let token = mint_token(SECRET, "ops");

    let csv = csv_body(&[
        ("bad", "auth", "INFO", "a"),
        ("2024-01-01 10:00:00.000000", "auth", "info", "b"),
    ]);
    let report: serde_json::Value = upload_csv(port, &token, csv).await.json().await.unwrap();
    assert_eq!(report["totalEntries"], 0);
    assert_eq!(report["invalidEntries"], 2);

    let status: serde_json::Value = reqwest::Client::new()
        .get(format!("http://127.0.0.1:{port}/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["logs_count"], 0);

    let _ = child.kill();
    let _ = child.wait();
}

#[tokio::test]
#[serial]
async fn e2e_upload_without_logfile_field_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let (mut child, port) = spawn_server(temp.path());
    wait_ready(port, &mut child).await;
    let token = mint_token(SECRET, "ops");

    let form = reqwest::multipart::Form::new().text("notes", "hello");
    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/upload"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let _ = child.kill();
    let _ = child.wait();
}
