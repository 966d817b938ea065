//! Session lifecycle, module listing, transcript viewer, and the static
//! map screen.

use crate::state::{ApiError, ApiResult, AppState};
use axum::extract::{Path, State};
use axum::Json;
use medley_core::{coordinate_map, ChartSpec, GeoPoint, ModuleKind, TranscriptEntry};
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
pub struct ModuleDescriptor {
    pub id: &'static str,
    pub label: &'static str,
}

impl From<ModuleKind> for ModuleDescriptor {
    fn from(kind: ModuleKind) -> Self {
        Self {
            id: kind.id(),
            label: kind.label(),
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "medley-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.config.model,
        "live_sessions": state.sessions.live_sessions(),
    }))
}

/// Sidebar contents: the closed set of seven screens, in order.
pub async fn modules_list() -> Json<Vec<ModuleDescriptor>> {
    Json(ModuleKind::ALL.into_iter().map(Into::into).collect())
}

/// Descriptor for one module id. Unknown ids are a configuration error,
/// never a silent default screen.
pub async fn module_descriptor(Path(id): Path<String>) -> ApiResult<Json<ModuleDescriptor>> {
    let kind = ModuleKind::parse(&id)?;
    Ok(Json(kind.into()))
}

#[derive(Serialize)]
pub struct SessionOpened {
    pub session_id: Uuid,
}

pub async fn open_session(State(state): State<AppState>) -> Json<SessionOpened> {
    let session_id = state.sessions.open();
    tracing::info!(%session_id, "session opened");
    Json(SessionOpened { session_id })
}

pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.sessions.close(&id) {
        return Err(ApiError::SessionNotFound);
    }
    tracing::info!(session_id = %id, "session closed");
    Ok(Json(serde_json::json!({ "closed": true })))
}

#[derive(Serialize)]
pub struct TranscriptView {
    pub entries: Vec<TranscriptEntry>,
}

/// Chat-history screen: every (query, response) pair appended so far in
/// this session, oldest first.
pub async fn transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TranscriptView>> {
    let session = state.sessions.get(&id).ok_or(ApiError::SessionNotFound)?;
    Ok(Json(TranscriptView {
        entries: session.transcript.entries(),
    }))
}

/// Fixed demo coordinates for the map screen.
fn map_points() -> Vec<GeoPoint> {
    vec![
        GeoPoint {
            label: "Beijing".to_string(),
            lat: 39.9042,
            lon: 116.4074,
        },
        GeoPoint {
            label: "Shanghai".to_string(),
            lat: 31.2304,
            lon: 121.4737,
        },
    ]
}

pub async fn map_view() -> Json<ChartSpec> {
    Json(coordinate_map(&map_points()))
}
