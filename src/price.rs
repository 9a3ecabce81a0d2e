//! Price sources
//!
//! `YahooPriceSource` asks the Yahoo Finance chart endpoint for the latest
//! trading day; `StaticPriceSource` serves prices from a table, either built
//! in memory or read from a `Ticker,Price` CSV file.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};
use polars::prelude::*;
use reqwest::blocking::Client;
use reqwest::header;
use serde::Deserialize;

use crate::error::{AnalysisError, Result};
use crate::imputer::PriceSource;

pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Yahoo chart response
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// First available close in a chart response body.
fn first_close(ticker: &str, body: &str) -> Result<f64> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::lookup(ticker, format!("unreadable response: {}", e)))?;

    if let Some(err) = response.chart.error {
        return Err(AnalysisError::lookup(ticker, format!("{}: {}", err.code, err.description)));
    }

    response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .flat_map(|r| r.indicators.quote)
        .flat_map(|q| q.close)
        .flatten()
        .find(|c| c.is_finite())
        .ok_or_else(|| AnalysisError::lookup(ticker, "no closing price returned"))
}

// ============================================================================
// Yahoo Provider
// ============================================================================

pub struct YahooPriceSource {
    client: Client,
    base_url: String,
}

impl YahooPriceSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(YAHOO_CHART_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl PriceSource for YahooPriceSource {
    fn latest_close(&self, ticker: &str) -> Result<f64> {
        let url = format!("{}/{}", self.base_url, ticker);
        debug!("Requesting latest close for {} from {}", ticker, url);

        let response = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .header(header::ACCEPT, "application/json")
            .send()
            .map_err(|e| AnalysisError::lookup(ticker, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| AnalysisError::lookup(ticker, e.to_string()))?;
        if !status.is_success() && !body.contains("\"chart\"") {
            return Err(AnalysisError::lookup(ticker, format!("HTTP {}", status)));
        }

        first_close(ticker, &body)
    }
}

// ============================================================================
// Static prices
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    prices: HashMap<String, f64>,
}

impl StaticPriceSource {
    pub fn new(prices: HashMap<String, f64>) -> Self {
        Self { prices }
    }

    /// Load a price table with `Ticker` and `Price` columns.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()?;
        Self::from_dataframe(&df)
    }

    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let tickers = df.column("Ticker")?.str()?;
        let prices = df.column("Price")?.cast(&DataType::Float64)?;
        let prices = prices.f64()?;

        let table: HashMap<String, f64> = tickers
            .into_iter()
            .zip(prices.into_iter())
            .filter_map(|(t, p)| Some((t?.trim().to_string(), p?)))
            .collect();

        info!("Loaded {} static prices", table.len());
        Ok(Self::new(table))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceSource for StaticPriceSource {
    fn latest_close(&self, ticker: &str) -> Result<f64> {
        self.prices
            .get(ticker)
            .copied()
            .ok_or_else(|| AnalysisError::lookup(ticker, "ticker not in price table"))
    }
}
