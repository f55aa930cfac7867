//! Stub render service for integration tests.
//!
//! Every route answers from [`StubState`], which tests mutate between
//! requests. The server binds `127.0.0.1:0` and runs until the test's
//! runtime shuts down.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use chunkycloud_client::api::RenderApi;
use chunkycloud_client::poller::PollerConfig;

/// A canned response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

/// One multipart part received by `POST /jobs`.
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ReceivedSubmission {
    pub api_key: Option<String>,
    pub parts: Vec<ReceivedPart>,
}

impl ReceivedSubmission {
    pub fn names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn part(&self, name: &str) -> Option<&ReceivedPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.part(name)
            .map(|p| String::from_utf8_lossy(&p.content).into_owned())
    }
}

#[derive(Debug)]
pub struct StubState {
    pub jobs: Mutex<HashMap<String, Reply>>,
    pub stats: Mutex<Reply>,
    pub packs: Mutex<Reply>,
    pub create: Mutex<Reply>,
    /// Delay before `POST /jobs` answers.
    pub create_delay: Mutex<Duration>,
    pub job_hits: Mutex<HashMap<String, usize>>,
    pub stats_hits: Mutex<usize>,
    pub submissions: Mutex<Vec<ReceivedSubmission>>,
}

impl Default for StubState {
    fn default() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            stats: Mutex::new(Reply::ok(STATS_JSON)),
            packs: Mutex::new(Reply::ok(PACKS_JSON)),
            create: Mutex::new(Reply::new(StatusCode::CREATED, r#"{"_id": "new-job"}"#)),
            create_delay: Mutex::new(Duration::ZERO),
            job_hits: Mutex::new(HashMap::new()),
            stats_hits: Mutex::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }
}

impl StubState {
    pub fn set_job(&self, id: &str, reply: Reply) {
        self.jobs.lock().unwrap().insert(id.to_string(), reply);
    }

    pub fn set_stats(&self, reply: Reply) {
        *self.stats.lock().unwrap() = reply;
    }

    pub fn set_create(&self, reply: Reply) {
        *self.create.lock().unwrap() = reply;
    }

    pub fn job_hits(&self, id: &str) -> usize {
        self.job_hits.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn stats_hits(&self) -> usize {
        *self.stats_hits.lock().unwrap()
    }

    pub fn submissions(&self) -> Vec<ReceivedSubmission> {
        self.submissions.lock().unwrap().clone()
    }
}

pub const STATS_JSON: &str = r#"{
    "tasks": {"preparePending": 1, "prepareRunning": 0, "pending": 4, "running": 2, "mergePending": 0, "mergeRunning": 1},
    "today": {"jobsCreated": 12, "jobsFinished": 9, "dumpsMerged": 140},
    "renderNodes": [
        {"name": "node-a", "threads": 16, "status": "working"},
        {"name": "node-b", "threads": 8, "status": "idle"}
    ],
    "prepareNodes": [{"name": "prep-1", "status": "idle"}]
}"#;

pub const PACKS_JSON: &str = r#"[
    {"name": "faithful-1.16.4", "displayName": "Faithful 32x"},
    {"name": "sphax-1.16", "displayName": "Sphax PureBDcraft"}
]"#;

/// JSON for a running job with a 100x100 scene.
pub fn job_json(id: &str, spp: u64) -> String {
    format!(
        r#"{{
            "_id": "{id}",
            "created": "2021-01-01T00:00:00Z",
            "finishedAt": null,
            "cancelled": false,
            "spp": {spp},
            "targetSpp": 100,
            "sceneDescription": {{"width": 100, "height": 100}},
            "pictureOnly": false
        }}"#
    )
}

async fn get_job(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> (StatusCode, String) {
    *state.job_hits.lock().unwrap().entry(id.clone()).or_default() += 1;
    let reply = state.jobs.lock().unwrap().get(&id).cloned();
    match reply {
        Some(reply) => (reply.status, reply.body),
        None => (StatusCode::NOT_FOUND, "Not found".to_string()),
    }
}

async fn get_stats(State(state): State<Arc<StubState>>) -> (StatusCode, String) {
    *state.stats_hits.lock().unwrap() += 1;
    let reply = state.stats.lock().unwrap().clone();
    (reply.status, reply.body)
}

async fn get_packs(State(state): State<Arc<StubState>>) -> (StatusCode, String) {
    let reply = state.packs.lock().unwrap().clone();
    (reply.status, reply.body)
}

async fn create_job(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content = field.bytes().await.unwrap().to_vec();
        parts.push(ReceivedPart {
            name,
            file_name,
            content,
        });
    }
    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .submissions
        .lock()
        .unwrap()
        .push(ReceivedSubmission { api_key, parts });

    let delay = *state.create_delay.lock().unwrap();
    tokio::time::sleep(delay).await;

    let reply = state.create.lock().unwrap().clone();
    (reply.status, reply.body)
}

/// Start the stub server and return its state and a client pointed at it.
pub async fn spawn_stub() -> (Arc<StubState>, Arc<RenderApi>) {
    let state = Arc::new(StubState::default());
    let app = Router::new()
        .route("/jobs/{id}", get(get_job))
        .route("/jobs", axum::routing::post(create_job))
        .route("/stats", get(get_stats))
        .route("/resourcepacks", get(get_packs))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api = RenderApi::with_client(reqwest::Client::new(), &format!("http://{addr}"));
    (state, Arc::new(api))
}

/// A client pointed at a port nobody listens on.
pub async fn unreachable_api() -> Arc<RenderApi> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Arc::new(RenderApi::with_client(
        reqwest::Client::new(),
        &format!("http://{addr}"),
    ))
}

pub fn fast_polling(interval_ms: u64) -> PollerConfig {
    PollerConfig {
        interval: Duration::from_millis(interval_ms),
        immediate_first_fetch: true,
    }
}

/// Poll `condition` until it holds, failing the test after two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within two seconds"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
