//! Analysis session
//!
//! Construction runs the whole pipeline: clean the workbook, persist the
//! cleaned copy, then derive the asset value and unrealized P&L tables. A
//! failure anywhere leaves no session behind.

use std::path::{Path, PathBuf};

use log::info;

use crate::charts::{ChartRenderer, PngChartRenderer};
use crate::config::AnalysisConfig;
use crate::display;
use crate::error::Result;
use crate::holdings::{CleanedDataset, RawWorkbook};
use crate::imputer::{clean, PriceSource};
use crate::reporting::{liquidity_ratio_series, portfolio_value_series, LineChart, SeriesPoint};
use crate::tables::{build_asset_values, build_unrealized_pnl, MonthlyTable};
use crate::workbook::{read_workbook, write_workbook};

#[derive(Debug, Clone)]
pub struct PortfolioAnalysis {
    config: AnalysisConfig,
    data: CleanedDataset,
    asset_values: MonthlyTable,
    unrealized_pnl: MonthlyTable,
}

impl PortfolioAnalysis {
    /// Load a holdings workbook and run the full pipeline.
    pub fn new<P: AsRef<Path>>(input: P, config: AnalysisConfig, prices: &dyn PriceSource) -> Result<Self> {
        let raw = read_workbook(input.as_ref())?;
        info!("{}", display::format_workbook_loaded(&input.as_ref().display().to_string(), raw.sheets.len()));
        Self::from_workbook(&raw, config, prices)
    }

    pub fn from_workbook(raw: &RawWorkbook, config: AnalysisConfig, prices: &dyn PriceSource) -> Result<Self> {
        let data = clean(raw, prices)?;

        config.paths.ensure_base()?;
        let cleaned_path = config.paths.cleaned_workbook();
        write_workbook(&data.to_workbook(), &cleaned_path)?;
        info!("{}", display::format_cleaned_saved(&cleaned_path.display().to_string()));

        let asset_values = build_asset_values(&data, &config.initial_period)?;
        let unrealized_pnl = build_unrealized_pnl(&data);

        Ok(Self { config, data, asset_values, unrealized_pnl })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The cleaned dataset, as persisted to `cleaned_data.xlsx`
    pub fn data(&self) -> &CleanedDataset {
        &self.data
    }

    pub fn asset_values(&self) -> &MonthlyTable {
        &self.asset_values
    }

    pub fn unrealized_pnl(&self) -> &MonthlyTable {
        &self.unrealized_pnl
    }

    pub fn portfolio_value_series(&self) -> Result<Vec<SeriesPoint>> {
        portfolio_value_series(&self.asset_values, &self.data, self.config.initial_value)
    }

    pub fn liquidity_ratio_series(&self) -> Result<Vec<SeriesPoint>> {
        liquidity_ratio_series(&self.asset_values, &self.data)
    }

    /// Render `portfolio_value_over_time.png`
    pub fn plot_portfolio(&self) -> Result<PathBuf> {
        self.plot_portfolio_with(&PngChartRenderer)
    }

    /// Render `liquidity_ratio_over_time.png`
    pub fn plot_liquidity(&self) -> Result<PathBuf> {
        self.plot_liquidity_with(&PngChartRenderer)
    }

    pub fn plot_portfolio_with(&self, renderer: &dyn ChartRenderer) -> Result<PathBuf> {
        let chart = LineChart::portfolio_value(self.portfolio_value_series()?);
        self.render(renderer, &chart, self.config.paths.portfolio_chart())
    }

    pub fn plot_liquidity_with(&self, renderer: &dyn ChartRenderer) -> Result<PathBuf> {
        let chart = LineChart::liquidity_ratio(self.liquidity_ratio_series()?);
        self.render(renderer, &chart, self.config.paths.liquidity_chart())
    }

    fn render(&self, renderer: &dyn ChartRenderer, chart: &LineChart, path: PathBuf) -> Result<PathBuf> {
        self.config.paths.ensure_base()?;
        renderer.render(chart, &path)?;
        info!("{}", display::format_chart_saved(&chart.title, &path.display().to_string()));
        Ok(path)
    }
}
