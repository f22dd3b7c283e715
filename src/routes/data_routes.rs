use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::state::app_state::AppState;
use snapshot_reader::{handle_ws_fetch, HeaderEntry, Snapshot, SnapshotError};

#[derive(Serialize)]
pub struct SnapshotSummary {
    pub id: String,
    pub name: String,
    pub snapshot_type: String,
    pub rows: usize,
    pub headers: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct FileReadRequest {
    #[serde(default)]
    pub mode: String, // "online" | "offline"
    pub path: String,
}

#[derive(Serialize, Debug)]
pub struct FileReadResponse {
    pub id: String,
    pub name: String,
    pub path: String,
    pub snapshot_type: String,
    pub desc: String,
    pub headers: Vec<String>,
    pub header_list: Vec<HeaderEntry>,
    pub date_time: String,
    pub engine_hours: f64,
    pub success_rate: f64,
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// =======================
/// ROUTER
/// =======================

pub fn data_routes(state: AppState) -> Router {
    Router::new()
        .route("/read-file", post(read_file))
        .route("/snapshots", get(list_snapshots))
        .route("/snapshots/{id}/pid-info", get(pid_info))
        .route("/snapshots/{id}/explode/{column}", post(explode_bits))
        .route("/fetch/{id}/{column}", get(ws_fetch))
        .with_state(state)
}

fn status_for(err: &SnapshotError) -> StatusCode {
    match err {
        SnapshotError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        SnapshotError::EmptyTable(_) | SnapshotError::HeaderNotFound { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SnapshotError::ColumnNotFound(_) => StatusCode::NOT_FOUND,
        SnapshotError::DuplicateColumn(_) | SnapshotError::ColumnLengthMismatch { .. } => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

async fn lookup(state: &AppState, id: &str) -> Option<Arc<RwLock<Snapshot>>> {
    state.snapshots.read().await.get(id).cloned()
}

/// =======================
/// HANDLERS
/// =======================

async fn read_file(State(state): State<AppState>, Json(request): Json<FileReadRequest>) -> Response {
    debug!("Reading file: mode={}, path={}", request.mode, request.path);

    let path = PathBuf::from(&request.path);
    let Some(guard) = state.begin_load(&path) else {
        warn!("Load already in progress: {}", request.path);
        return error_response(
            StatusCode::CONFLICT,
            format!("{} is already being loaded", request.path),
        );
    };

    let tables = state.tables.clone();
    let loaded = tokio::task::spawn_blocking(move || {
        let result = Snapshot::load_with(&path, &tables);
        drop(guard);
        result
    })
    .await;

    let snapshot = match loaded {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => {
            error!("Failed to load {}: {}", request.path, e);
            return error_response(status_for(&e), e.to_string());
        }
        Err(e) => {
            error!("Load task failed for {}: {}", request.path, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let id = uuid::Uuid::new_v4().to_string();
    let response = FileReadResponse {
        id: id.clone(),
        name: snapshot.file_name().to_string(),
        path: request.path.clone(),
        snapshot_type: snapshot.snapshot_type().tag().to_string(),
        desc: snapshot.snapshot_type().description().to_string(),
        headers: snapshot
            .snapshot()
            .column_names()
            .into_iter()
            .map(String::from)
            .collect(),
        header_list: snapshot.header_list().to_vec(),
        date_time: snapshot.date_time().to_string(),
        engine_hours: snapshot.hours(),
        success_rate: snapshot.mdp_success_rate(),
        warnings: snapshot.warnings().to_vec(),
    };

    info!(
        "Registered snapshot {} ({}, {} columns)",
        id,
        response.snapshot_type,
        response.headers.len()
    );
    state
        .snapshots
        .write()
        .await
        .insert(id, Arc::new(RwLock::new(snapshot)));

    Json(response).into_response()
}

async fn list_snapshots(State(state): State<AppState>) -> impl IntoResponse {
    let snapshots = state.snapshots.read().await;

    let mut out: Vec<SnapshotSummary> = Vec::with_capacity(snapshots.len());
    for (id, snapshot) in snapshots.iter() {
        let snapshot = snapshot.read().await;
        out.push(SnapshotSummary {
            id: id.clone(),
            name: snapshot.file_name().to_string(),
            snapshot_type: snapshot.snapshot_type().tag().to_string(),
            rows: snapshot.snapshot().row_count(),
            headers: snapshot
                .snapshot()
                .column_names()
                .into_iter()
                .map(String::from)
                .collect(),
        });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));

    Json(out)
}

async fn pid_info(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(snapshot) = lookup(&state, &id).await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let snapshot = snapshot.read().await;
    Json(snapshot.pid_info().clone()).into_response()
}

async fn explode_bits(
    State(state): State<AppState>,
    Path((id, column)): Path<(String, String)>,
) -> Response {
    let Some(snapshot) = lookup(&state, &id).await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let mut snapshot = snapshot.write().await;
    match snapshot.explode_bits(&column) {
        Ok(names) => Json(names).into_response(),
        Err(e) => {
            warn!("explode {} on {} failed: {}", column, id, e);
            error_response(status_for(&e), e.to_string())
        }
    }
}

async fn ws_fetch(
    State(state): State<AppState>,
    Path((id, column)): Path<(String, String)>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(snapshot) = lookup(&state, &id).await else {
        error!("Snapshot not found: {}", id);
        return StatusCode::NOT_FOUND.into_response();
    };

    if !snapshot.read().await.snapshot().contains(&column) {
        error!("Column not found: {} in {}", column, id);
        return StatusCode::NOT_FOUND.into_response();
    }

    ws.on_upgrade(move |socket| handle_ws_fetch(socket, snapshot, column))
}
