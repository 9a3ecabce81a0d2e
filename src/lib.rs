//! Portfolio Analysis
//!
//! Cleans a multi-sheet brokerage holdings workbook (one sheet per month end),
//! fills missing prices and costs, and derives monthly market value and
//! unrealized P&L tables plus portfolio value and liquidity ratio charts.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod display;
pub mod error;
pub mod holdings;
pub mod imputer;
pub mod normalizer;
pub mod price;
pub mod reporting;
pub mod tables;
pub mod workbook;

pub use analysis::PortfolioAnalysis;
pub use charts::{ChartRenderer, PngChartRenderer};
pub use config::{AnalysisConfig, OutputPaths};
pub use error::{AnalysisError, Result};
pub use holdings::{CashRow, CleanedDataset, Holding, HoldingSheet, RawCell, RawSheet, RawWorkbook};
pub use imputer::{clean, PriceSource};
pub use price::{StaticPriceSource, YahooPriceSource};
pub use reporting::{LineChart, SeriesPoint};
pub use tables::{MonthlyTable, NAV_ROW};

#[cfg(test)]
mod tests;
