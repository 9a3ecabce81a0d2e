//! Holdings data model
//!
//! Raw workbook shapes as they come off (and go back onto) disk, and the
//! typed, cleaned records the rest of the pipeline reads by field name.

use chrono::NaiveDate;

/// Column titles of every holding sheet, in positional order.
pub const HEADER: [&str; 4] = ["Ticker", "Quantity", "UnitCost", "MarketPrice"];

/// Date format used for sheet names and table columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Round to 2 decimal places, the precision of every cleaned price field.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A single spreadsheet cell before any repair
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Missing,
}

impl RawCell {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    /// Cell rendered as a label (tickers, header titles). Missing cells are blank.
    pub fn label(&self) -> String {
        match self {
            Self::Number(v) => v.to_string(),
            Self::Text(s) => s.trim().to_string(),
            Self::Missing => String::new(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// One worksheet: header row plus positional data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawSheet {
    pub fn new(name: &str, rows: Vec<Vec<RawCell>>) -> Self {
        Self {
            name: name.to_string(),
            header: HEADER.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }
}

/// Named sheets, in workbook order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWorkbook {
    pub sheets: Vec<RawSheet>,
}

impl RawWorkbook {
    pub fn new(sheets: Vec<RawSheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet(&self, name: &str) -> Option<&RawSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// An equity position with both price fields resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub ticker: String,
    pub quantity: f64,
    /// Cost per 100 units
    pub unit_cost: f64,
    pub market_price: f64,
}

impl Holding {
    pub fn market_value(&self) -> f64 {
        self.quantity * self.market_price
    }

    pub fn unrealized_pnl(&self) -> f64 {
        self.market_price - self.unit_cost
    }
}

/// Sentinel last row of a sheet. Its UnitCost and MarketPrice are always 1.
#[derive(Debug, Clone, PartialEq)]
pub struct CashRow {
    pub label: String,
    pub amount: f64,
}

/// A cleaned month-end sheet
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingSheet {
    pub name: String,
    pub date: NaiveDate,
    pub holdings: Vec<Holding>,
    pub cash: CashRow,
}

impl HoldingSheet {
    /// Sum of the Quantity column, cash row included.
    pub fn total_quantity(&self) -> f64 {
        self.holdings.iter().map(|h| h.quantity).sum::<f64>() + self.cash.amount
    }

    pub fn to_raw(&self) -> RawSheet {
        let mut rows: Vec<Vec<RawCell>> = self
            .holdings
            .iter()
            .map(|h| {
                vec![
                    RawCell::Text(h.ticker.clone()),
                    RawCell::Number(h.quantity),
                    RawCell::Number(h.unit_cost),
                    RawCell::Number(h.market_price),
                ]
            })
            .collect();

        let label = if self.cash.label.is_empty() {
            RawCell::Missing
        } else {
            RawCell::Text(self.cash.label.clone())
        };
        rows.push(vec![
            label,
            RawCell::Number(self.cash.amount),
            RawCell::Number(1.0),
            RawCell::Number(1.0),
        ]);

        RawSheet::new(&self.name, rows)
    }
}

/// Every month's cleaned sheet, in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedDataset {
    sheets: Vec<HoldingSheet>,
}

impl CleanedDataset {
    pub fn new(mut sheets: Vec<HoldingSheet>) -> Self {
        sheets.sort_by_key(|s| s.date);
        Self { sheets }
    }

    pub fn sheets(&self) -> &[HoldingSheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&HoldingSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Sheet names, chronologically
    pub fn months(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Same layout as the input workbook, ready to be written back out.
    pub fn to_workbook(&self) -> RawWorkbook {
        RawWorkbook::new(self.sheets.iter().map(HoldingSheet::to_raw).collect())
    }
}
