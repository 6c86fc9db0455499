//! 통합 테스트용 모킹 Forge 서버
//!
//! GitHub 호환 REST API와 raw 콘텐츠(`/raw/*path`)를 127.0.0.1:0에서 제공하고,
//! 들어온 모든 요청을 순서대로 기록합니다. 파일은 (소유자, 브랜치, 경로) 단위로 보관합니다.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use translations_publisher::PublisherConfig;

pub const UPSTREAM: &str = "mspaint-cc";
pub const REPO: &str = "translations";
pub const BASE_BRANCH: &str = "main";
pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub struct MockOptions {
    pub username: String,
    pub can_write: bool,
    pub has_fork: bool,
    pub sync_fails: bool,
    /// 이 이름의 엔드포인트가 422를 반환
    /// (`user`, `repo`, `forks`, `create_fork`, `ref`, `create_branch`, `get_file`, `put_file`, `pulls`)
    pub fail_at: Option<&'static str>,
    /// 이 이름의 엔드포인트가 200과 함께 JSON이 아닌 본문을 반환
    pub malformed_at: Option<&'static str>,
    /// 파일 조회가 실제와 다른 (오래된) sha를 알려줌
    pub stale_sha: bool,
    /// 정식 저장소 기본 브랜치의 파일 (경로, 본문)
    pub upstream_files: Vec<(String, String)>,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            username: "octo".to_string(),
            can_write: false,
            has_fork: false,
            sync_fails: false,
            fail_at: None,
            malformed_at: None,
            stale_sha: false,
            upstream_files: Vec::new(),
        }
    }
}

impl MockOptions {
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.upstream_files.push((path.to_string(), content.to_string()));
        self
    }
}

/// 기록된 요청 한 건
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
}

impl Call {
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Debug, Clone)]
struct StoredFile {
    sha: String,
    content: String,
}

type FileKey = (String, String, String);

pub struct MockState {
    options: MockOptions,
    calls: Mutex<Vec<Call>>,
    files: Mutex<HashMap<FileKey, StoredFile>>,
    forks: Mutex<Vec<String>>,
    ref_bodies: Mutex<Vec<Value>>,
    put_bodies: Mutex<Vec<(String, Value)>>,
    pr_bodies: Mutex<Vec<Value>>,
    counter: AtomicU64,
}

impl MockState {
    fn next_sha(&self) -> String {
        format!("sha-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }

    fn fails(&self, endpoint: &str) -> Option<Response> {
        if self.options.malformed_at == Some(endpoint) {
            return Some((StatusCode::OK, "<html>upstream proxy error</html>").into_response());
        }
        (self.options.fail_at == Some(endpoint)).then(|| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "message": format!("{} rejected by mock", endpoint) })),
            )
                .into_response()
        })
    }

    /// 한 브랜치의 파일을 다른 (소유자, 브랜치)로 복사
    fn copy_branch(&self, from: (&str, &str), to: (&str, &str)) {
        let mut files = self.files.lock().unwrap();
        let copied: Vec<(FileKey, StoredFile)> = files
            .iter()
            .filter(|((owner, branch, _), _)| owner == from.0 && branch == from.1)
            .map(|((_, _, path), file)| {
                ((to.0.to_string(), to.1.to_string(), path.clone()), file.clone())
            })
            .collect();
        files.extend(copied);
    }
}

pub struct MockForge {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for MockForge {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl MockForge {
    pub async fn start(options: MockOptions) -> Self {
        let state = Arc::new(MockState {
            calls: Mutex::new(Vec::new()),
            files: Mutex::new(HashMap::new()),
            forks: Mutex::new(Vec::new()),
            ref_bodies: Mutex::new(Vec::new()),
            put_bodies: Mutex::new(Vec::new()),
            pr_bodies: Mutex::new(Vec::new()),
            counter: AtomicU64::new(1),
            options: options.clone(),
        });

        for (path, content) in &options.upstream_files {
            let sha = state.next_sha();
            state.files.lock().unwrap().insert(
                (UPSTREAM.to_string(), BASE_BRANCH.to_string(), path.clone()),
                StoredFile {
                    sha,
                    content: content.clone(),
                },
            );
        }
        if options.has_fork {
            state.forks.lock().unwrap().push(options.username.clone());
            state.copy_branch((UPSTREAM, BASE_BRANCH), (&options.username, BASE_BRANCH));
        }

        let app = Router::new()
            .route("/user", get(get_user))
            .route("/repos/:owner/:repo", get(get_repo))
            .route("/repos/:owner/:repo/forks", get(list_forks).post(create_fork))
            .route("/repos/:owner/:repo/merge-upstream", post(merge_upstream))
            .route("/repos/:owner/:repo/git/refs", post(create_ref))
            .route("/repos/:owner/:repo/git/refs/heads/*branch", get(get_ref))
            .route(
                "/repos/:owner/:repo/contents/*path",
                get(get_contents).put(put_contents),
            )
            .route("/repos/:owner/:repo/pulls", post(create_pull))
            .route("/raw/*path", get(get_raw))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn raw_base_url(&self) -> String {
        format!("http://{}/raw", self.addr)
    }

    pub fn publisher_config(&self) -> PublisherConfig {
        PublisherConfig {
            api_base_url: Some(self.base_url()),
            fork_settle_delay_ms: 10,
            request_timeout_secs: 5,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    /// `/raw` 요청을 뺀 API 호출 ("METHOD /path")
    pub fn api_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.path.starts_with("/raw/"))
            .map(|c| c.describe())
            .collect()
    }

    pub fn file(&self, owner: &str, branch: &str, path: &str) -> Option<String> {
        self.state
            .files
            .lock()
            .unwrap()
            .get(&(owner.to_string(), branch.to_string(), path.to_string()))
            .map(|f| f.content.clone())
    }

    pub fn created_refs(&self) -> Vec<Value> {
        self.state.ref_bodies.lock().unwrap().clone()
    }

    pub fn put_bodies(&self) -> Vec<(String, Value)> {
        self.state.put_bodies.lock().unwrap().clone()
    }

    pub fn pull_requests(&self) -> Vec<Value> {
        self.state.pr_bodies.lock().unwrap().clone()
    }
}

async fn record(State(state): State<Arc<MockState>>, req: Request, next: Next) -> Response {
    state.calls.lock().unwrap().push(Call {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(|q| q.to_string()),
    });
    next.run(req).await
}

async fn get_user(State(state): State<Arc<MockState>>) -> Response {
    if let Some(resp) = state.fails("user") {
        return resp;
    }
    Json(json!({ "login": state.options.username, "id": 1 })).into_response()
}

async fn get_repo(State(state): State<Arc<MockState>>) -> Response {
    if let Some(resp) = state.fails("repo") {
        return resp;
    }
    Json(json!({
        "full_name": format!("{}/{}", UPSTREAM, REPO),
        "permissions": { "admin": false, "push": state.options.can_write, "pull": true }
    }))
    .into_response()
}

async fn list_forks(State(state): State<Arc<MockState>>) -> Response {
    if let Some(resp) = state.fails("forks") {
        return resp;
    }
    let forks: Vec<Value> = state
        .forks
        .lock()
        .unwrap()
        .iter()
        .map(|login| json!({ "full_name": format!("{}/{}", login, REPO), "owner": { "login": login } }))
        .collect();
    Json(forks).into_response()
}

async fn create_fork(State(state): State<Arc<MockState>>) -> Response {
    if let Some(resp) = state.fails("create_fork") {
        return resp;
    }
    let username = state.options.username.clone();
    state.forks.lock().unwrap().push(username.clone());
    state.copy_branch((UPSTREAM, BASE_BRANCH), (&username, BASE_BRANCH));
    (StatusCode::ACCEPTED, Json(json!({ "owner": { "login": username } }))).into_response()
}

async fn merge_upstream(State(state): State<Arc<MockState>>) -> Response {
    if state.options.sync_fails {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "There are merge conflicts" })),
        )
            .into_response();
    }
    Json(json!({ "merge_type": "fast-forward" })).into_response()
}

async fn get_ref(
    State(state): State<Arc<MockState>>,
    Path((owner, _repo, branch)): Path<(String, String, String)>,
) -> Response {
    if let Some(resp) = state.fails("ref") {
        return resp;
    }
    let known = owner == UPSTREAM || state.forks.lock().unwrap().contains(&owner);
    if !known || branch != BASE_BRANCH {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response();
    }
    Json(json!({
        "ref": format!("refs/heads/{}", branch),
        "object": { "sha": "base-commit-sha", "type": "commit" }
    }))
    .into_response()
}

async fn create_ref(
    State(state): State<Arc<MockState>>,
    Path((owner, _repo)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(resp) = state.fails("create_branch") {
        return resp;
    }
    state.ref_bodies.lock().unwrap().push(body.clone());
    let branch = body["ref"]
        .as_str()
        .unwrap_or_default()
        .trim_start_matches("refs/heads/")
        .to_string();
    state.copy_branch((&owner, BASE_BRANCH), (&owner, &branch));
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_contents(
    State(state): State<Arc<MockState>>,
    Path((owner, _repo, path)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(resp) = state.fails("get_file") {
        return resp;
    }
    let branch = query.get("ref").cloned().unwrap_or_else(|| BASE_BRANCH.to_string());
    let file = state
        .files
        .lock()
        .unwrap()
        .get(&(owner, branch, path.clone()))
        .cloned();
    match file {
        Some(file) => {
            // GitHub처럼 60자마다 줄바꿈
            let encoded = base64::engine::general_purpose::STANDARD.encode(&file.content);
            let wrapped: Vec<String> = encoded
                .as_bytes()
                .chunks(60)
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .collect();
            let sha = if state.options.stale_sha {
                format!("{}-stale", file.sha)
            } else {
                file.sha
            };
            Json(json!({
                "path": path,
                "sha": sha,
                "encoding": "base64",
                "content": wrapped.join("\n"),
            }))
            .into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response(),
    }
}

async fn put_contents(
    State(state): State<Arc<MockState>>,
    Path((owner, _repo, path)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(resp) = state.fails("put_file") {
        return resp;
    }
    state
        .put_bodies
        .lock()
        .unwrap()
        .push((format!("{}/{}", owner, path), body.clone()));

    let branch = body["branch"].as_str().unwrap_or(BASE_BRANCH).to_string();
    let key = (owner, branch, path);
    let current_sha = state.files.lock().unwrap().get(&key).map(|f| f.sha.clone());
    let sent_sha = body["sha"].as_str().map(|s| s.to_string());

    // 낙관적 동시성: 기존 파일이면 sha 일치 필수, 새 파일이면 sha 없어야 함
    if current_sha != sent_sha {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "sha does not match" })),
        )
            .into_response();
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(body["content"].as_str().unwrap_or_default())
        .unwrap();
    let sha = state.next_sha();
    let created = current_sha.is_none();
    state.files.lock().unwrap().insert(
        key,
        StoredFile {
            sha: sha.clone(),
            content: String::from_utf8(decoded).unwrap(),
        },
    );

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    (status, Json(json!({ "content": { "sha": sha } }))).into_response()
}

async fn create_pull(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if let Some(resp) = state.fails("pulls") {
        return resp;
    }
    let number = {
        let mut prs = state.pr_bodies.lock().unwrap();
        prs.push(body);
        prs.len()
    };
    (
        StatusCode::CREATED,
        Json(json!({
            "number": number,
            "html_url": format!("https://github.com/{}/{}/pull/{}", UPSTREAM, REPO, number),
        })),
    )
        .into_response()
}

/// 정식 저장소 기본 브랜치의 raw 파일
async fn get_raw(State(state): State<Arc<MockState>>, Path(path): Path<String>) -> Response {
    let file = state
        .files
        .lock()
        .unwrap()
        .get(&(UPSTREAM.to_string(), BASE_BRANCH.to_string(), path))
        .cloned();
    match file {
        Some(file) => file.content.into_response(),
        None => (StatusCode::NOT_FOUND, "404: Not Found").into_response(),
    }
}

// ═══════════════════════════════════════════════════════
// 공용 데이터
// ═══════════════════════════════════════════════════════

pub const TEMPLATE: &str = r#"{
  "Hello %s": "Hello %s",
  "Save": "Save",
  "greeting": "Welcome, %s"
}"#;

pub const LANGUAGES: &str = r#"{
  "en": { "EnglishName": "English", "NativeName": "English" },
  "fr": { "EnglishName": "French", "NativeName": "Français" },
  "zh": {
    "Default": "cn",
    "cn": { "EnglishName": "Chinese (Simplified)", "NativeName": "简体中文" }
  }
}"#;

pub const FRENCH: &str = r#"{
  "Hello %s": "Bonjour %s",
  "Removed key": "Clé supprimée"
}"#;

/// 템플릿 + 언어 목록 + 프랑스어 파일이 있는 정식 저장소
pub fn seeded(options: MockOptions) -> MockOptions {
    options
        .with_file("Template.json", TEMPLATE)
        .with_file("Languages.json", LANGUAGES)
        .with_file("translations/fr.json", FRENCH)
}
