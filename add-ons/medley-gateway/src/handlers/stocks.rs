//! Stock screens: the synthetic random-walk demo and the live
//! multi-ticker closes chart.

use crate::state::{ApiResult, AppState};
use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use medley_core::{close_series_chart, simulated_series, ChartSpec, ClosePoint, DEFAULT_SYMBOLS};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_POINTS: usize = 30;
const MAX_POINTS: usize = 365;

#[derive(Deserialize)]
pub struct SimulatedQuery {
    pub points: Option<usize>,
    pub seed: Option<u64>,
}

/// Simulated-stocks screen. Synthetic and illustrative only; without an
/// explicit seed each refresh draws a new walk, with one it is
/// reproducible.
pub async fn simulated(Query(q): Query<SimulatedQuery>) -> Json<ChartSpec> {
    let points = q.points.unwrap_or(DEFAULT_POINTS).clamp(1, MAX_POINTS);
    let seed = q.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() as u64)
            .unwrap_or(0)
    });
    Json(simulated_series(points, seed))
}

/// Ticker universe and default range offered by the live-stocks screen.
pub async fn symbols() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "symbols": DEFAULT_SYMBOLS,
        "default_start": "2023-01-01",
        "default_end": chrono::Utc::now().date_naive(),
    }))
}

#[derive(Deserialize)]
pub struct ClosesRequest {
    pub symbols: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Serialize)]
pub struct ClosesResponse {
    pub points: Vec<ClosePoint>,
    pub chart: ChartSpec,
}

/// Live-stocks screen: daily closes per selected symbol over the chosen
/// range. Date validation happens in the client before any network call;
/// an empty selection is an empty chart, not an error.
pub async fn closes(
    State(state): State<AppState>,
    Json(req): Json<ClosesRequest>,
) -> ApiResult<Json<ClosesResponse>> {
    let points = state
        .market
        .fetch_closes(&req.symbols, req.start, req.end)
        .await?;
    let chart = close_series_chart(&points);
    Ok(Json(ClosesResponse { points, chart }))
}
