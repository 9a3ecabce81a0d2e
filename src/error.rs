//! Error taxonomy for the cleaning and reporting pipeline.
//!
//! Nothing in the core recovers locally: every variant aborts the enclosing
//! operation and, during construction, leaves the session unbuilt.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A text cell that still is not a number after quotes and `+` signs are stripped.
    #[error("Cannot parse {field} '{value}' in sheet {sheet}, row {row}")]
    Parse {
        sheet: String,
        row: usize,
        field: &'static str,
        value: String,
    },

    /// The price source returned no data or failed.
    #[error("Price lookup failed for {ticker}: {message}")]
    PriceLookup { ticker: String, message: String },

    /// Input outside the supported domain: bad quantity, malformed sheet shape.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Workbook read error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook write error: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chart rendering error: {0}")]
    Chart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn lookup(ticker: &str, msg: impl Into<String>) -> Self {
        Self::PriceLookup {
            ticker: ticker.to_string(),
            message: msg.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
