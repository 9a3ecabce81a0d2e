// Configuration module for portfolio analysis
// Output locations and the synthetic starting period

use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_INITIAL_PERIOD: &str = "2023-06-30";
pub const DEFAULT_INITIAL_VALUE: f64 = 200_000.0;

pub const CLEANED_WORKBOOK: &str = "cleaned_data.xlsx";
pub const PORTFOLIO_CHART: &str = "portfolio_value_over_time.png";
pub const LIQUIDITY_CHART: &str = "liquidity_ratio_over_time.png";

/// Path configuration for consistent file access
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub base: PathBuf,
}

impl OutputPaths {
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self { base: base.as_ref().to_path_buf() }
    }

    /// Base directory from `PORTFOLIO_OUTPUT_DIR`, or the working directory
    pub fn from_env() -> Self {
        let base = env::var("PORTFOLIO_OUTPUT_DIR").unwrap_or_else(|_| String::from("."));
        Self::new(base)
    }

    pub fn cleaned_workbook(&self) -> PathBuf {
        self.base.join(CLEANED_WORKBOOK)
    }

    pub fn portfolio_chart(&self) -> PathBuf {
        self.base.join(PORTFOLIO_CHART)
    }

    pub fn liquidity_chart(&self) -> PathBuf {
        self.base.join(LIQUIDITY_CHART)
    }

    pub fn ensure_base(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base)
    }
}

/// Main configuration for an analysis session
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub paths: OutputPaths,
    /// Label of the synthetic first column, before any sheet
    pub initial_period: String,
    /// Portfolio value at `initial_period` (the starting cash balance)
    pub initial_value: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            paths: OutputPaths::from_env(),
            initial_period: DEFAULT_INITIAL_PERIOD.to_string(),
            initial_value: DEFAULT_INITIAL_VALUE,
        }
    }
}

impl AnalysisConfig {
    pub fn new(output_dir: Option<PathBuf>, initial_period: Option<String>, initial_value: Option<f64>) -> Self {
        let defaults = Self::default();
        Self {
            paths: output_dir.map(OutputPaths::new).unwrap_or(defaults.paths),
            initial_period: initial_period.unwrap_or(defaults.initial_period),
            initial_value: initial_value.unwrap_or(defaults.initial_value),
        }
    }

    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.paths = OutputPaths::new(dir);
        self
    }
}
