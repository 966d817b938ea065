//! medley-core: shared machinery for the Medley multi-tool assistant.
//!
//! Module router, session/transcript state, the memoized travel-plan
//! generator, the tabular data loader, chart renderers, and the
//! market-data client. The gateway add-on composes these into the seven
//! sidebar screens; nothing here touches HTTP routing or widgets.

mod chart;
mod config;
mod error;
mod market;
mod memo;
mod planner;
mod router;
mod session;
mod table;

// Error taxonomy
pub use error::ToolError;

// Configuration
pub use config::{
    MedleyConfig, DEFAULT_COMPLETION_BASE, DEFAULT_MARKET_BASE, DEFAULT_MODEL,
};

// Travel planner (remote text generation) + memoization
pub use memo::MemoizedGenerator;
pub use planner::{
    travel_prompt, trip_filename, trip_markdown, CompletionBridge, TextGenerator,
    UnconfiguredGenerator, COMPLETION_TEMPERATURE, TRAVEL_SYSTEM_PROMPT,
};

// Tabular data
pub use table::{ColumnSummary, ColumnType, Table};

// Chart renderers
pub use chart::{
    bar_chart, close_series_chart, coordinate_map, interactive_line, line_chart, pie_chart,
    simulated_series, ChartSpec, GeoPoint, LineSeries,
};

// Session state
pub use session::{SessionRegistry, SessionState, TranscriptEntry, TranscriptLog};

// Module router
pub use router::ModuleKind;

// Market data
pub use market::{parse_daily_closes, ClosePoint, MarketDataClient, DEFAULT_SYMBOLS};
