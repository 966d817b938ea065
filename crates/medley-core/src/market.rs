//! Market-data client: daily closing prices for a set of tickers.
//!
//! Thin wrapper over a Stooq-style daily-history CSV endpoint. No retry,
//! no backoff, no caching: every screen refresh fetches fresh data.
//! Date-range validation happens before any network I/O.

use crate::error::ToolError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::DEFAULT_MARKET_BASE;

/// Ticker universe offered by the live-stocks screen.
pub const DEFAULT_SYMBOLS: [&str; 5] = ["AAPL", "GOOG", "TSLA", "MSFT", "META"];

/// Closing price of one symbol on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosePoint {
    pub date: NaiveDate,
    pub symbol: String,
    pub close: f64,
}

/// Reqwest-backed daily-closes client. Base URL is injectable so tests
/// never touch the network.
pub struct MarketDataClient {
    base_url: String,
    client: reqwest::Client,
}

impl MarketDataClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_default_provider() -> Self {
        Self::new(DEFAULT_MARKET_BASE)
    }

    /// Override the client timeout (MEDLEY_REQUEST_TIMEOUT_SECS).
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(Duration::from_secs(secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        self
    }

    /// Fetch daily closes for every symbol in `start..end`.
    ///
    /// `start >= end` short-circuits with a validation error before any
    /// request is issued. An empty symbol set is an empty result, not an
    /// error. Provider failure for any symbol fails the whole fetch.
    pub async fn fetch_closes(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ClosePoint>, ToolError> {
        if start >= end {
            return Err(ToolError::Validation(
                "start date must be before end date".to_string(),
            ));
        }

        let mut points = Vec::new();
        for symbol in symbols {
            let url = format!(
                "{}/q/d/l/?s={}.us&d1={}&d2={}&i=d",
                self.base_url,
                symbol.to_lowercase(),
                start.format("%Y%m%d"),
                end.format("%Y%m%d"),
            );
            tracing::info!(symbol = %symbol, "fetching daily closes");
            let res = self.client.get(&url).send().await.map_err(|e| {
                ToolError::Remote(format!("market data request for {} failed: {}", symbol, e))
            })?;
            if !res.status().is_success() {
                return Err(ToolError::Remote(format!(
                    "market data provider error for {}: {}",
                    symbol,
                    res.status()
                )));
            }
            let body = res.text().await.map_err(|e| {
                ToolError::Remote(format!("market data body for {} unreadable: {}", symbol, e))
            })?;
            points.extend(parse_daily_closes(&body, symbol)?);
        }
        Ok(points)
    }
}

/// Parse one symbol's daily-history CSV (`Date,Open,High,Low,Close,Volume`).
/// A body without that header is a malformed upstream response.
pub fn parse_daily_closes(body: &str, symbol: &str) -> Result<Vec<ClosePoint>, ToolError> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| ToolError::Remote(format!("provider response for {}: {}", symbol, e)))?;

    let date_idx = headers.iter().position(|h| h == "Date");
    let close_idx = headers.iter().position(|h| h == "Close");
    let (date_idx, close_idx) = match (date_idx, close_idx) {
        (Some(d), Some(c)) => (d, c),
        _ => {
            return Err(ToolError::Remote(format!(
                "provider response for {} missing Date/Close columns",
                symbol
            )))
        }
    };

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| ToolError::Remote(format!("provider row for {}: {}", symbol, e)))?;
        let date_cell = record.get(date_idx).unwrap_or_default();
        let close_cell = record.get(close_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_cell, "%Y-%m-%d").map_err(|_| {
            ToolError::Remote(format!("provider date {:?} for {} unparsable", date_cell, symbol))
        })?;
        let close: f64 = close_cell.parse().map_err(|_| {
            ToolError::Remote(format!(
                "provider close {:?} for {} unparsable",
                close_cell, symbol
            ))
        })?;
        points.push(ClosePoint {
            date,
            symbol: symbol.to_string(),
            close,
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn inverted_range_short_circuits() {
        // Unroutable base URL: if validation did not short-circuit, this
        // test would fail with a remote error instead.
        let client = MarketDataClient::new("http://127.0.0.1:1");
        let err = client
            .fetch_closes(
                &["AAPL".to_string()],
                date("2023-06-01"),
                date("2023-01-01"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }

    #[tokio::test]
    async fn equal_dates_are_invalid_too() {
        let client = MarketDataClient::new("http://127.0.0.1:1");
        let err = client
            .fetch_closes(&["AAPL".to_string()], date("2023-01-01"), date("2023-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }

    #[tokio::test]
    async fn empty_symbol_set_is_empty_result() {
        let client = MarketDataClient::new("http://127.0.0.1:1");
        let points = client
            .fetch_closes(&[], date("2023-01-01"), date("2023-06-01"))
            .await
            .unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn parses_provider_csv() {
        let body = "Date,Open,High,Low,Close,Volume\n\
                    2023-01-03,130.28,130.90,124.17,125.07,112117500\n\
                    2023-01-04,126.89,128.66,125.08,126.36,89113600\n";
        let points = parse_daily_closes(body, "AAPL").unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, date("2023-01-03"));
        assert_eq!(points[0].close, 125.07);
        assert_eq!(points[1].symbol, "AAPL");
    }

    #[test]
    fn missing_close_column_is_remote_error() {
        let err = parse_daily_closes("Date,Open\n2023-01-03,130.28\n", "AAPL").unwrap_err();
        assert!(matches!(err, ToolError::Remote(_)));
    }

    #[test]
    fn no_data_body_is_remote_error() {
        let err = parse_daily_closes("No data", "ZZZZ").unwrap_err();
        assert!(matches!(err, ToolError::Remote(_)));
    }
}
