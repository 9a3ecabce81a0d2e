//! Cross-month tables
//!
//! Tickers down the side, month-end dates across the top. Any (ticker, month)
//! that was never assigned reads 0.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use log::{info, warn};
use polars::prelude::*;

use crate::error::{AnalysisError, Result};
use crate::holdings::{round2, CleanedDataset, DATE_FORMAT};

/// Label of the NAV row in the asset value table
pub const NAV_ROW: &str = "Net Asset Value";

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub label: String,
    pub values: Vec<f64>,
}

/// Labelled rows by month columns, rows kept in first-assignment order.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTable {
    months: Vec<String>,
    rows: Vec<TableRow>,
    index: HashMap<String, usize>,
}

impl MonthlyTable {
    pub fn new(months: Vec<String>) -> Self {
        Self {
            months,
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn months(&self) -> &[String] {
        &self.months
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }

    fn month_index(&self, month: &str) -> Option<usize> {
        self.months.iter().position(|m| m == month)
    }

    /// Assign a cell. A new row starts out as all zeros.
    pub fn set(&mut self, label: &str, col: usize, value: f64) {
        let idx = match self.index.get(label) {
            Some(&idx) => idx,
            None => {
                self.rows.push(TableRow {
                    label: label.to_string(),
                    values: vec![0.0; self.months.len()],
                });
                self.index.insert(label.to_string(), self.rows.len() - 1);
                self.rows.len() - 1
            }
        };
        self.rows[idx].values[col] = value;
    }

    /// Cell value; `None` only when the row or month is unknown to the table.
    pub fn get(&self, label: &str, month: &str) -> Option<f64> {
        let col = self.month_index(month)?;
        self.row(label).map(|values| values[col])
    }

    pub fn row(&self, label: &str) -> Option<&[f64]> {
        self.index.get(label).map(|&idx| self.rows[idx].values.as_slice())
    }

    /// Sum of a month's column over every row except `excluded`.
    pub fn column_sum_excluding(&self, month: &str, excluded: &str) -> Option<f64> {
        let col = self.month_index(month)?;
        Some(
            self.rows
                .iter()
                .filter(|r| r.label != excluded)
                .map(|r| r.values[col])
                .sum(),
        )
    }

    /// `Ticker` column followed by one `f64` column per month.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.months.len() + 1);
        columns.push(Column::new("Ticker".into(), self.labels()));
        for (col, month) in self.months.iter().enumerate() {
            let values: Vec<f64> = self.rows.iter().map(|r| r.values[col]).collect();
            columns.push(Column::new(month.as_str().into(), values));
        }
        DataFrame::new(columns)
    }
}

/// Market value per ticker per month plus the NAV row, preceded by a
/// zero-valued `initial_period` column.
pub fn build_asset_values(dataset: &CleanedDataset, initial_period: &str) -> Result<MonthlyTable> {
    let initial = NaiveDate::parse_from_str(initial_period, DATE_FORMAT).map_err(|_| {
        AnalysisError::invalid(format!("initial period '{}' is not a YYYY-MM-DD date", initial_period))
    })?;
    if let Some(first) = dataset.sheets().first() {
        if initial >= first.date {
            return Err(AnalysisError::invalid(format!(
                "initial period {} must precede the first sheet {}",
                initial_period, first.name
            )));
        }
    }

    let mut months = vec![initial_period.to_string()];
    months.extend(dataset.months());
    let mut table = MonthlyTable::new(months);

    for (i, sheet) in dataset.sheets().iter().enumerate() {
        let col = i + 1;
        let mut seen: HashSet<&str> = HashSet::new();
        for holding in &sheet.holdings {
            if !seen.insert(holding.ticker.as_str()) {
                warn!("{}: duplicate ticker {}, keeping the later row", sheet.name, holding.ticker);
            }
            table.set(&holding.ticker, col, holding.market_value());
        }

        let total_quantity = sheet.total_quantity();
        if total_quantity == 0.0 {
            return Err(AnalysisError::invalid(format!(
                "sheet {} has zero total quantity, NAV is undefined",
                sheet.name
            )));
        }
        // NAV is not assigned yet for this column, so the sum covers positions only.
        let market_total = table.column_sum_excluding(&sheet.name, NAV_ROW).unwrap_or(0.0);
        let nav = round2((market_total + sheet.cash.amount) / total_quantity);
        table.set(NAV_ROW, col, nav);
    }

    info!("Asset value table: {} rows x {} months", table.rows().len(), table.months().len());
    Ok(table)
}

/// MarketPrice minus UnitCost per ticker per month.
pub fn build_unrealized_pnl(dataset: &CleanedDataset) -> MonthlyTable {
    let mut table = MonthlyTable::new(dataset.months());
    for (col, sheet) in dataset.sheets().iter().enumerate() {
        for holding in &sheet.holdings {
            table.set(&holding.ticker, col, holding.unrealized_pnl());
        }
    }
    info!("Unrealized P&L table: {} rows x {} months", table.rows().len(), table.months().len());
    table
}
