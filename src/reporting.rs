//! Portfolio value and liquidity ratio series derived from the asset value table.

use crate::error::{AnalysisError, Result};
use crate::holdings::CleanedDataset;
use crate::tables::{MonthlyTable, NAV_ROW};

/// One chart point: month-end label and value
pub type SeriesPoint = (String, f64);

/// A line chart ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<SeriesPoint>,
    /// Decimal places for per-point value labels; `None` draws no labels.
    pub annotate: Option<usize>,
    pub width: u32,
    pub height: u32,
}

impl LineChart {
    pub fn portfolio_value(points: Vec<SeriesPoint>) -> Self {
        Self {
            title: "Portfolio Value Over Time".to_string(),
            x_label: "Date".to_string(),
            y_label: "Portfolio Value".to_string(),
            points,
            annotate: None,
            width: 1500,
            height: 1000,
        }
    }

    pub fn liquidity_ratio(points: Vec<SeriesPoint>) -> Self {
        Self {
            title: "Liquidity Ratio Over Time".to_string(),
            x_label: "Date".to_string(),
            y_label: "Liquidity Ratio".to_string(),
            points,
            annotate: Some(3),
            width: 1000,
            height: 500,
        }
    }
}

/// Holdings value and cash on hand for every month after the initial column.
fn month_totals(asset_values: &MonthlyTable, dataset: &CleanedDataset) -> Result<Vec<(String, f64, f64)>> {
    asset_values
        .months()
        .iter()
        .skip(1)
        .map(|month| {
            let sheet = dataset.sheet(month).ok_or_else(|| {
                AnalysisError::invalid(format!("no cleaned sheet for month {}", month))
            })?;
            let holdings = asset_values.column_sum_excluding(month, NAV_ROW).unwrap_or(0.0);
            Ok((month.clone(), holdings, sheet.cash.amount))
        })
        .collect()
}

/// Starts at `initial_value`; each later month is holdings value plus cash.
pub fn portfolio_value_series(
    asset_values: &MonthlyTable,
    dataset: &CleanedDataset,
    initial_value: f64,
) -> Result<Vec<SeriesPoint>> {
    let Some(initial_period) = asset_values.months().first() else {
        return Ok(Vec::new());
    };
    let mut series = vec![(initial_period.clone(), initial_value)];
    for (month, holdings, cash) in month_totals(asset_values, dataset)? {
        series.push((month, holdings + cash));
    }
    Ok(series)
}

/// Starts at 1 (all cash); each later month is (holdings + cash) / cash.
pub fn liquidity_ratio_series(
    asset_values: &MonthlyTable,
    dataset: &CleanedDataset,
) -> Result<Vec<SeriesPoint>> {
    let Some(initial_period) = asset_values.months().first() else {
        return Ok(Vec::new());
    };
    let mut series = vec![(initial_period.clone(), 1.0)];
    for (month, holdings, cash) in month_totals(asset_values, dataset)? {
        if cash == 0.0 {
            return Err(AnalysisError::invalid(format!(
                "month {} has no cash on hand, liquidity ratio is undefined",
                month
            )));
        }
        series.push((month, (holdings + cash) / cash));
    }
    Ok(series)
}
