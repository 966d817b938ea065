//! Module router: the closed set of sidebar screens.
//!
//! The selector only ever emits these seven ids; anything else reaching
//! `parse` is a configuration error, surfaced as a validation failure
//! rather than silently defaulting to some screen.

use crate::error::ToolError;
use serde::{Deserialize, Serialize};

/// One sidebar entry. Exactly one is active at a time; switching
/// discards handler-local widget state and keeps only the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    TravelPlanner,
    CsvSummary,
    MapView,
    SimulatedStocks,
    Transcript,
    LiveStocks,
    CsvCharts,
}

impl ModuleKind {
    /// Every screen, in sidebar order.
    pub const ALL: [ModuleKind; 7] = [
        ModuleKind::TravelPlanner,
        ModuleKind::CsvSummary,
        ModuleKind::MapView,
        ModuleKind::SimulatedStocks,
        ModuleKind::Transcript,
        ModuleKind::LiveStocks,
        ModuleKind::CsvCharts,
    ];

    /// Stable id used in URLs and by the UI selector.
    pub fn id(&self) -> &'static str {
        match self {
            ModuleKind::TravelPlanner => "travel_planner",
            ModuleKind::CsvSummary => "csv_summary",
            ModuleKind::MapView => "map_view",
            ModuleKind::SimulatedStocks => "simulated_stocks",
            ModuleKind::Transcript => "transcript",
            ModuleKind::LiveStocks => "live_stocks",
            ModuleKind::CsvCharts => "csv_charts",
        }
    }

    /// Human label shown in the sidebar.
    pub fn label(&self) -> &'static str {
        match self {
            ModuleKind::TravelPlanner => "Travel Planner",
            ModuleKind::CsvSummary => "CSV Summary",
            ModuleKind::MapView => "Map View",
            ModuleKind::SimulatedStocks => "Simulated Stocks",
            ModuleKind::Transcript => "Chat Transcript",
            ModuleKind::LiveStocks => "Live Stocks",
            ModuleKind::CsvCharts => "CSV Charts",
        }
    }

    /// Parse a selector id. Unknown ids are a configuration error.
    pub fn parse(id: &str) -> Result<Self, ToolError> {
        Self::ALL
            .into_iter()
            .find(|m| m.id() == id)
            .ok_or_else(|| ToolError::Validation(format!("unknown module id: {:?}", id)))
    }
}
