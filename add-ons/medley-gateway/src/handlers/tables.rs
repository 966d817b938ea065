//! CSV screens: upload summary and the generic charting tool.
//!
//! The table is parsed fresh on every request and owned by that handler
//! invocation; nothing tabular is cached between requests. Axis
//! selections come from the column list the summary returned, so a
//! missing column only occurs if the client fabricates one.

use crate::state::{ApiResult, AppState};
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use medley_core::{
    bar_chart, interactive_line, line_chart, pie_chart, ChartSpec, ColumnSummary, ColumnType,
    Table, ToolError,
};
use serde::{Deserialize, Serialize};

const PREVIEW_ROWS: usize = 10;

#[derive(Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub dtype: ColumnType,
}

#[derive(Serialize)]
pub struct TableSummary {
    pub columns: Vec<ColumnDescriptor>,
    pub row_count: usize,
    pub preview: Vec<Vec<String>>,
    pub describe: Vec<ColumnSummary>,
}

/// CSV-summary screen: parse the upload, echo the shape, preview the
/// first rows, and attach per-numeric-column statistics.
pub async fn summary(State(_state): State<AppState>, body: Bytes) -> ApiResult<Json<TableSummary>> {
    let table = Table::from_csv(&body)?;
    tracing::info!(
        rows = table.row_count(),
        cols = table.columns().len(),
        "csv upload parsed"
    );
    Ok(Json(TableSummary {
        columns: table
            .columns()
            .iter()
            .zip(table.column_types())
            .map(|(name, ty)| ColumnDescriptor {
                name: name.clone(),
                dtype: *ty,
            })
            .collect(),
        row_count: table.row_count(),
        preview: table.head(PREVIEW_ROWS).to_vec(),
        describe: table.describe(),
    }))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Line,
    InteractiveLine,
    Pie,
}

#[derive(Deserialize)]
pub struct ChartRequest {
    pub csv: String,
    pub chart_type: ChartType,
    pub x: String,
    pub y: String,
}

/// CSV-charts screen: re-parse the uploaded text and render the selected
/// chart type over the chosen columns.
pub async fn chart(
    State(_state): State<AppState>,
    Json(req): Json<ChartRequest>,
) -> ApiResult<Json<ChartSpec>> {
    if req.x.trim().is_empty() || req.y.trim().is_empty() {
        return Err(ToolError::Validation("select both axis columns".to_string()).into());
    }
    let table = Table::from_csv(req.csv.as_bytes())?;
    let spec = match req.chart_type {
        ChartType::Bar => bar_chart(&table, &req.x, &req.y)?,
        ChartType::Line => line_chart(&table, &req.x, &req.y)?,
        ChartType::InteractiveLine => interactive_line(&table, &req.x, &req.y)?,
        ChartType::Pie => pie_chart(&table, &req.x, &req.y)?,
    };
    Ok(Json(spec))
}
