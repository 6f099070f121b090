use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordView {
    id: String,
    title: String,
    status: String,
    resolved: Option<String>,
    duration: String,
    tags: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: String,
    message: String,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_suffix() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}_{}", std::process::id(), nanos)
}

fn unique_data_path() -> String {
    let mut path = std::env::temp_dir();
    path.push(format!("blocklog_http_{}.json", unique_suffix()));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_blocklog"))
        .env("PORT", port.to_string())
        .env("BLOCKLOG_DATA_PATH", data_path)
        .env("BLOCKLOG_REQUIRE_AUTH", "true")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn login(client: &Client, base_url: &str) -> String {
    let email = format!("user_{}@example.com", unique_suffix());
    let response = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "email": email,
            "password": "correct horse",
            "firstName": "Test",
            "lastName": "User",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": "correct horse" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["accessToken"].as_str().expect("access token").to_string()
}

fn block(title: &str, tags: &[&str]) -> Value {
    let tags: Vec<Value> = tags.iter().map(|t| json!({ "title": t, "color": "#0ea5e9" })).collect();
    json!({
        "title": title,
        "environment": "Production",
        "problem": "waiting on review",
        "createdBy": "tester",
        "tags": tags,
    })
}

#[tokio::test]
async fn http_api_requires_bearer_token() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for path in ["/api/blocks", "/api/analytics/dashboard", "/api/tags"] {
        let response = client.get(format!("{}{path}", server.base_url)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: ErrorBody = response.json().await.unwrap();
        assert_eq!(body.code, "UNAUTHORIZED");
    }

    let response = client
        .get(format!("{}/api/blocks", server.base_url))
        .bearer_auth("not-a-session")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let index = client.get(format!("{}/", server.base_url)).send().await.unwrap();
    assert!(index.status().is_success());
}

#[tokio::test]
async fn http_auth_rejects_duplicates_and_bad_passwords() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let email = format!("dup_{}@example.com", unique_suffix());
    let payload = json!({ "email": email, "password": "longenough", "firstName": "A", "lastName": "B" });

    let first = client.post(format!("{}/api/auth/register", server.base_url)).json(&payload).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = client.post(format!("{}/api/auth/register", server.base_url)).json(&payload).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let wrong = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let token = login(&client, &server.base_url).await;
    let profile = client
        .get(format!("{}/api/auth/profile", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert!(profile.status().is_success());

    let logout = client
        .post(format!("{}/api/auth/logout", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let after = client
        .get(format!("{}/api/auth/profile", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn http_block_lifecycle() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let token = login(&client, &server.base_url).await;
    let base = &server.base_url;

    let response = client
        .post(format!("{base}/api/blocks"))
        .bearer_auth(&token)
        .json(&block("Lifecycle block", &["Infra"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: RecordView = response.json().await.unwrap();
    assert_eq!(created.status, "open");
    assert!(created.resolved.is_none());
    assert_eq!(created.tags[0]["title"], "infra");
    assert!(created.duration.ends_with('s'));

    let open: Vec<RecordView> = client
        .get(format!("{base}/api/blocks?status=open&tags=infra"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(open.iter().any(|r| r.id == created.id));

    let resolved: RecordView = client
        .patch(format!("{base}/api/blocks/{}/resolve", created.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resolved.status, "resolved");
    let again: RecordView = client
        .patch(format!("{base}/api/blocks/{}/resolve", created.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again.resolved, resolved.resolved);

    let open: Vec<RecordView> = client
        .get(format!("{base}/api/blocks?status=open"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(open.iter().all(|r| r.id != created.id));

    let edited: RecordView = client
        .put(format!("{base}/api/blocks/{}", created.id))
        .bearer_auth(&token)
        .json(&block("Renamed block", &[]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(edited.title, "Renamed block");
    assert_eq!(edited.resolved, resolved.resolved);

    let deleted = client
        .delete(format!("{base}/api/blocks/{}", created.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    let gone = client
        .get(format!("{base}/api/blocks/{}", created.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_create_validates_required_fields() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let token = login(&client, &server.base_url).await;

    let mut payload = block("No author", &[]);
    payload["createdBy"] = json!("   ");
    let response = client
        .post(format!("{}/api/blocks", server.base_url))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.message.contains("createdBy"));
}

#[tokio::test]
async fn http_rejected_requests_answer_with_json_errors() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let token = login(&client, &server.base_url).await;

    let bad_query = client
        .get(format!("{}/api/blocks?status=bogus", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(bad_query.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = bad_query.json().await.unwrap();
    assert_eq!(body.code, "VALIDATION_ERROR");

    let bad_body = client
        .post(format!("{}/api/blocks", server.base_url))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{\"title\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(bad_body.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = bad_body.json().await.unwrap();
    assert_eq!(body.code, "VALIDATION_ERROR");
    assert!(!body.message.is_empty());

    let bad_login = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": "someone@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_login.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = bad_login.json().await.unwrap();
    assert_eq!(body.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn http_import_is_atomic_and_export_round_trips() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let token = login(&client, &server.base_url).await;
    let base = &server.base_url;

    let backup = json!([
        {
            "id": "a",
            "title": "Old outage",
            "environment": "Production",
            "problem": "db down",
            "createdBy": "ops",
            "created": "2024-01-03T09:00:00Z",
            "resolved": "2024-01-03T11:00:00Z",
            "tags": [{ "title": "db", "color": "#ec4899" }]
        },
        {
            "id": "b",
            "title": "Long wait",
            "environment": "Staging",
            "problem": "access request",
            "createdBy": "dev",
            "created": "2024-01-20T09:00:00Z",
            "resolved": "2024-01-20T12:00:00Z",
            "tags": []
        }
    ]);
    let imported: Value = client
        .post(format!("{base}/api/analytics/import"))
        .bearer_auth(&token)
        .json(&backup)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(imported["imported"], 2);

    let broken = client
        .post(format!("{base}/api/analytics/import"))
        .bearer_auth(&token)
        .json(&json!([{ "id": "c", "created": "2024-01-01T00:00:00Z" }]))
        .send()
        .await
        .unwrap();
    assert_eq!(broken.status(), StatusCode::BAD_REQUEST);
    let not_json = client
        .post(format!("{base}/api/analytics/import"))
        .bearer_auth(&token)
        .body("[{")
        .send()
        .await
        .unwrap();
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);

    let export = client
        .get(format!("{base}/api/analytics/export"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let disposition = export.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("blocklog_backup_"));
    let exported: Vec<Value> = export.json().await.unwrap();
    let ids: Vec<_> = exported.iter().map(|r| r["id"].as_str().unwrap().to_string()).collect();
    assert_eq!(ids, ["a", "b"]);

    let dashboard: Value = client
        .get(format!("{base}/api/analytics/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["summary"]["totalRecords"], 2);
    assert_eq!(dashboard["summary"]["openRecords"], 0);
    assert_eq!(dashboard["summary"]["longestRecord"]["id"], "b");
    assert_eq!(dashboard["summary"]["totalBlocked"], "5h");

    let by_duration: Vec<RecordView> = client
        .get(format!("{base}/api/blocks?sort=duration&direction=desc"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order: Vec<_> = by_duration.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(order, ["b", "a"]);

    let monthly: Vec<Value> = client
        .get(format!("{base}/api/analytics/monthly?year=2024"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0]["key"], "2024-01");
    assert_eq!(monthly[0]["totalHours"], 5.0);

    let calendar: Value = client
        .get(format!("{base}/api/analytics/calendar"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(calendar["years"], json!([2024]));
    assert_eq!(calendar["year"], 2024);
    assert!(calendar["days"].as_object().is_some_and(|days| !days.is_empty()));
}
