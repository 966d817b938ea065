//! Chart renderers: pure functions from a table (or synthetic series)
//! plus axis selections to a serializable `ChartSpec` artifact.
//!
//! No renderer holds state or touches the network; the gateway hands the
//! artifact to the frontend for drawing. Structural problems (missing
//! column, non-numeric axis, negative pie slice) fail with a render
//! error instead of producing a silently blank chart.

use crate::error::ToolError;
use crate::table::Table;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// One point on the static map screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

/// One named line on a multi-series chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub xs: Vec<String>,
    pub ys: Vec<f64>,
}

/// Renderable artifact handed to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Bar {
        x_label: String,
        y_label: String,
        categories: Vec<String>,
        values: Vec<f64>,
    },
    Line {
        x_label: String,
        y_label: String,
        xs: Vec<String>,
        ys: Vec<f64>,
        /// Marker-per-point flag for the interactive variant.
        markers: bool,
    },
    Pie {
        labels: Vec<String>,
        values: Vec<f64>,
        /// Precomputed slice percentages; always sums to ~100.
        percents: Vec<f64>,
    },
    MultiLine {
        x_label: String,
        y_label: String,
        series: Vec<LineSeries>,
    },
    Map {
        points: Vec<GeoPoint>,
    },
    /// Random-walk demo series. Synthetic and illustrative only; this is
    /// not a forecast of anything.
    Simulated {
        xs: Vec<u32>,
        ys: Vec<f64>,
    },
}

fn axes(table: &Table, x: &str, y: &str) -> Result<(Vec<String>, Vec<f64>), ToolError> {
    let categories = table
        .column_values(x)?
        .into_iter()
        .map(str::to_string)
        .collect();
    let values = table.numeric_column(y)?;
    Ok((categories, values))
}

/// Bar chart over an X category column and a numeric Y column.
pub fn bar_chart(table: &Table, x: &str, y: &str) -> Result<ChartSpec, ToolError> {
    let (categories, values) = axes(table, x, y)?;
    Ok(ChartSpec::Bar {
        x_label: x.to_string(),
        y_label: y.to_string(),
        categories,
        values,
    })
}

/// Plain line chart; `interactive_line` is the marker-per-point variant.
pub fn line_chart(table: &Table, x: &str, y: &str) -> Result<ChartSpec, ToolError> {
    line_with_markers(table, x, y, false)
}

pub fn interactive_line(table: &Table, x: &str, y: &str) -> Result<ChartSpec, ToolError> {
    line_with_markers(table, x, y, true)
}

fn line_with_markers(
    table: &Table,
    x: &str,
    y: &str,
    markers: bool,
) -> Result<ChartSpec, ToolError> {
    let (xs, ys) = axes(table, x, y)?;
    Ok(ChartSpec::Line {
        x_label: x.to_string(),
        y_label: y.to_string(),
        xs,
        ys,
        markers,
    })
}

/// Pie chart. The values column must be finite and non-negative with a
/// positive sum, or the slice percentages are meaningless. NaN and
/// infinity parse as `f64`, so they pass type inference and must be
/// caught here.
pub fn pie_chart(table: &Table, labels: &str, values: &str) -> Result<ChartSpec, ToolError> {
    let label_cells: Vec<String> = table
        .column_values(labels)?
        .into_iter()
        .map(str::to_string)
        .collect();
    let value_cells = table.numeric_column(values)?;

    if let Some((i, v)) = value_cells
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(ToolError::Render(format!(
            "pie values must be finite and non-negative: column {:?} has {} at row {}",
            values,
            v,
            i + 1
        )));
    }
    let total: f64 = value_cells.iter().sum();
    if total <= 0.0 {
        return Err(ToolError::Render(format!(
            "pie values in column {:?} sum to zero",
            values
        )));
    }

    let percents = value_cells.iter().map(|v| v / total * 100.0).collect();
    Ok(ChartSpec::Pie {
        labels: label_cells,
        values: value_cells,
        percents,
    })
}

/// Static coordinate map artifact.
pub fn coordinate_map(points: &[GeoPoint]) -> ChartSpec {
    ChartSpec::Map {
        points: points.to_vec(),
    }
}

/// Cumulative sum of standard-normal steps: the "stock prediction"
/// demo screen. Deterministic for a given seed.
pub fn simulated_series(points: usize, seed: u64) -> ChartSpec {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut level = 0.0;
    let mut ys = Vec::with_capacity(points);
    for _ in 0..points {
        let step: f64 = rng.sample(StandardNormal);
        level += step;
        ys.push(level);
    }
    ChartSpec::Simulated {
        xs: (0..points as u32).collect(),
        ys,
    }
}

/// Multi-ticker closes as one line per symbol, for the live stock screen.
pub fn close_series_chart(points: &[crate::market::ClosePoint]) -> ChartSpec {
    let mut series: Vec<LineSeries> = Vec::new();
    for p in points {
        match series.iter_mut().find(|s| s.name == p.symbol) {
            Some(s) => {
                s.xs.push(p.date.to_string());
                s.ys.push(p.close);
            }
            None => series.push(LineSeries {
                name: p.symbol.clone(),
                xs: vec![p.date.to_string()],
                ys: vec![p.close],
            }),
        }
    }
    ChartSpec::MultiLine {
        x_label: "Date".to_string(),
        y_label: "Price".to_string(),
        series,
    }
}
