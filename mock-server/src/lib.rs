//! In-memory stand-in for a DooTask server.
//!
//! Emulates the handful of endpoints the SDK's integration tests exercise,
//! including the upstream's quirks: JSON bodies on GET requests, `{ret, msg,
//! data}` envelopes at HTTP 200 for failures, a lone object where a list is
//! expected, one-element arrays where an object is expected, and raw bytes
//! from download endpoints.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Token accepted when `MOCK_TOKEN` is unset.
pub const DEFAULT_TOKEN: &str = "mock-token";

/// Key `download/confirm` answers with archive bytes.
pub const DOWNLOAD_KEY: &str = "pack-1";

/// Bytes served for [`DOWNLOAD_KEY`].
pub const DOWNLOAD_BYTES: &[u8] = b"PK\x03\x04mock-archive";

#[derive(Debug)]
pub struct Store {
    token: String,
    next_id: i64,
    projects: BTreeMap<i64, Value>,
    tags: Vec<Value>,
    dialogs: HashMap<i64, Value>,
    files: Vec<Value>,
}

impl Store {
    pub fn new(token: impl Into<String>) -> Self {
        let mut dialogs = HashMap::new();
        dialogs.insert(1, json!({"id": 1, "type": "group", "name": "General", "top_at": null}));
        let files = vec![
            json!({"id": 1, "pid": 0, "name": "Specs", "type": "folder", "userid": 1}),
            json!({"id": 2, "pid": 1, "name": "Roadmap", "type": "document", "userid": 1, "share": "1"}),
        ];
        Self {
            token: token.into(),
            next_id: 1,
            projects: BTreeMap::new(),
            tags: vec![json!({"id": 1, "userid": 1, "name": "rustacean", "recognition": 3})],
            dialogs,
            files,
        }
    }

    fn allocate(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Router whose token comes from `MOCK_TOKEN`, or [`DEFAULT_TOKEN`].
pub fn app() -> Router {
    let token = std::env::var("MOCK_TOKEN").unwrap_or_else(|_| DEFAULT_TOKEN.to_string());
    app_with_token(&token)
}

pub fn app_with_token(token: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::new(token)));

    let api = Router::new()
        .route("/api/project/lists", get(project_lists))
        .route("/api/project/one", get(project_one))
        .route("/api/project/add", get(project_add))
        .route("/api/project/remove", get(project_remove))
        .route("/api/project/invite", get(project_invite))
        .route("/api/users/tags/lists", get(tags_lists))
        .route("/api/users/tags/add", post(tags_add))
        .route("/api/dialog/detail/{id}", get(dialog_detail))
        .route("/api/file/lists", get(file_lists))
        .route("/api/file/download/confirm", get(download_confirm))
        .route("/api/report/unread", get(report_unread))
        .route_layer(middleware::from_fn_with_state(db.clone(), require_token));

    Router::new()
        .merge(api)
        .route("/api/system/crash", get(crash))
        .route("/api/system/maintenance", get(maintenance))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_token(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(token)).await
}

// ---------------------------------------------------------------------------
// Envelope helpers
// ---------------------------------------------------------------------------

fn ok(data: Value) -> Json<Value> {
    Json(json!({"ret": 1, "msg": "success", "data": data}))
}

fn fail(ret: i64, msg: &str) -> Json<Value> {
    Json(json!({"ret": ret, "msg": msg, "data": {}}))
}

/// The upstream reads arguments from a JSON body even on GET.
fn args(body: &Bytes) -> Value {
    if body.is_empty() {
        return json!({});
    }
    serde_json::from_slice(body).unwrap_or_else(|_| json!({}))
}

fn int_arg(args: &Value, key: &str) -> Option<i64> {
    args.get(key).and_then(Value::as_i64)
}

async fn require_token(State(db): State<Db>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get("Token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let expected = db.read().await.token.clone();
    if presented.as_deref() != Some(expected.as_str()) {
        tracing::debug!(path = %request.uri().path(), "rejecting request without valid token");
        return fail(-1, "Please log in first").into_response();
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

async fn project_lists(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let data: Vec<Value> = store.projects.values().cloned().collect();
    let total = data.len();
    ok(json!({
        "current_page": 1,
        "data": data,
        "per_page": 50,
        "total": total,
        "last_page": 1,
        "next_page_url": null,
    }))
}

async fn project_one(State(db): State<Db>, body: Bytes) -> Json<Value> {
    let args = args(&body);
    let Some(id) = int_arg(&args, "project_id") else {
        return fail(0, "project_id is required");
    };
    match db.read().await.projects.get(&id) {
        Some(project) => ok(project.clone()),
        None => fail(0, "Project does not exist or has been deleted"),
    }
}

async fn project_add(State(db): State<Db>, body: Bytes) -> Json<Value> {
    let args = args(&body);
    let name = args.get("name").and_then(Value::as_str).unwrap_or_default();
    if name.trim().is_empty() {
        return fail(0, "Project name cannot be empty");
    }

    let mut store = db.write().await;
    let id = store.allocate();
    let columns: Vec<Value> = args
        .get("columns")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .enumerate()
                .map(|(i, name)| json!({"id": i + 1, "project_id": id, "name": name, "sort": i}))
                .collect()
        })
        .unwrap_or_default();
    let project = json!({
        "id": id,
        "name": name,
        "desc": args.get("desc").cloned().unwrap_or(Value::from("")),
        "owner": 1,
        "userid": 1,
        "personal": 0,
        "created_at": "2024-05-01 09:00:00",
        "updated_at": "2024-05-01 09:00:00",
        "archived_at": null,
        "columns": columns,
        "project_user": [{"id": 1, "project_id": id, "userid": 1, "owner": 1}],
    });
    store.projects.insert(id, project.clone());
    tracing::debug!(id, name, "project added");
    ok(project)
}

async fn project_remove(State(db): State<Db>, body: Bytes) -> Json<Value> {
    let args = args(&body);
    let id = int_arg(&args, "project_id").unwrap_or_default();
    match db.write().await.projects.remove(&id) {
        Some(_) => ok(Value::from("Deleted successfully")),
        None => fail(0, "Project does not exist or has been deleted"),
    }
}

async fn project_invite(State(db): State<Db>, body: Bytes) -> Json<Value> {
    let args = args(&body);
    let id = int_arg(&args, "project_id").unwrap_or_default();
    if !db.read().await.projects.contains_key(&id) {
        return fail(0, "Project does not exist or has been deleted");
    }
    let code = Uuid::new_v4().simple().to_string();
    let link = format!("http://mock.dootask/manage/project/invite?code={code}");
    ok(json!({"code": code, "link": link}))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A single tag comes back as a bare object, like the upstream does.
async fn tags_lists(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    match store.tags.as_slice() {
        [only] => ok(only.clone()),
        tags => ok(Value::from(tags.to_vec())),
    }
}

/// The created tag comes back wrapped in a one-element array.
async fn tags_add(State(db): State<Db>, body: Bytes) -> Json<Value> {
    let args = args(&body);
    let name = args.get("name").and_then(Value::as_str).unwrap_or_default();
    if name.trim().is_empty() {
        return fail(0, "Tag name cannot be empty");
    }
    let mut store = db.write().await;
    let id = store.allocate() + 100;
    let tag = json!({"id": id, "userid": 1, "name": name, "recognition": 0});
    store.tags.push(tag.clone());
    ok(json!([tag]))
}

// ---------------------------------------------------------------------------
// Dialogs, files and reports
// ---------------------------------------------------------------------------

async fn dialog_detail(State(db): State<Db>, Path(id): Path<i64>) -> Json<Value> {
    match db.read().await.dialogs.get(&id) {
        Some(dialog) => ok(dialog.clone()),
        None => fail(0, "Dialog does not exist"),
    }
}

async fn file_lists(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let pid: i64 = query.get("pid").and_then(|p| p.parse().ok()).unwrap_or(0);
    let store = db.read().await;
    let files: Vec<Value> = store
        .files
        .iter()
        .filter(|f| int_arg(f, "pid") == Some(pid))
        .cloned()
        .collect();
    ok(Value::from(files))
}

async fn download_confirm(Query(query): Query<HashMap<String, String>>) -> Response {
    match query.get("key").map(String::as_str) {
        Some(DOWNLOAD_KEY) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            DOWNLOAD_BYTES,
        )
            .into_response(),
        _ => fail(0, "Download link has expired").into_response(),
    }
}

async fn report_unread() -> Json<Value> {
    ok(json!({"total": 4, "day": 3, "week": 1, "month": 0}))
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

async fn crash() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn maintenance() -> (StatusCode, Json<Value>) {
    (StatusCode::SERVICE_UNAVAILABLE, fail(-2, "Down for maintenance"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_tolerates_empty_and_invalid_bodies() {
        assert_eq!(args(&Bytes::new()), json!({}));
        assert_eq!(args(&Bytes::from_static(b"not json")), json!({}));
        assert_eq!(args(&Bytes::from_static(br#"{"a":1}"#))["a"], 1);
    }

    #[test]
    fn store_allocates_increasing_ids() {
        let mut store = Store::new("t");
        assert_eq!(store.allocate(), 1);
        assert_eq!(store.allocate(), 2);
    }

    #[test]
    fn envelopes_use_upstream_shape() {
        let Json(body) = fail(-1, "nope");
        assert_eq!(body, json!({"ret": -1, "msg": "nope", "data": {}}));
        let Json(body) = ok(json!([1]));
        assert_eq!(body["ret"], 1);
    }
}
