//! Travel-planner screen: city in, three-day itinerary out.
//!
//! The handler goes through the memoized generator, so asking for the
//! same city twice costs one remote call. Each successful generation
//! appends one (city, plan) pair to the session transcript; the markdown
//! download re-resolves through the cache and appends nothing.

use crate::state::{ApiError, ApiResult, AppState};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medley_core::{travel_prompt, trip_filename, trip_markdown, ToolError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct PlanRequest {
    pub session_id: Uuid,
    pub city: String,
}

#[derive(Serialize)]
pub struct PlanResponse {
    pub city: String,
    pub plan: String,
    pub markdown: String,
    pub filename: String,
}

fn clean_city(city: &str) -> Result<&str, ToolError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(ToolError::Validation("enter a city name first".to_string()));
    }
    Ok(city)
}

pub async fn plan(
    State(state): State<AppState>,
    Json(req): Json<PlanRequest>,
) -> ApiResult<Json<PlanResponse>> {
    let city = clean_city(&req.city)?;
    let session = state
        .sessions
        .get(&req.session_id)
        .ok_or(ApiError::SessionNotFound)?;

    tracing::info!(%city, "generating travel plan");
    let plan = state.generator.complete(&travel_prompt(city)).await?;
    session.transcript.append(city, plan.clone());

    Ok(Json(PlanResponse {
        city: city.to_string(),
        markdown: trip_markdown(city, &plan),
        filename: trip_filename(city),
        plan,
    }))
}

#[derive(Deserialize)]
pub struct DownloadRequest {
    pub city: String,
}

/// Markdown download for an already-generated plan. A cache hit for any
/// city that went through `plan`; a fresh (uncached) city generates and
/// downloads without touching the transcript.
pub async fn download(
    State(state): State<AppState>,
    Json(req): Json<DownloadRequest>,
) -> ApiResult<Response> {
    let city = clean_city(&req.city)?;
    let plan = state.generator.complete(&travel_prompt(city)).await?;
    let body = trip_markdown(city, &plan);
    let disposition = format!("attachment; filename=\"{}\"", trip_filename(city));
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
