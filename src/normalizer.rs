//! Record normalizer
//!
//! Per-cell repair of the UnitCost and MarketPrice columns. Values that are
//! still missing afterwards come out as `None` and are left to the imputer.

use chrono::NaiveDate;

use crate::error::{AnalysisError, Result};
use crate::holdings::{round2, CashRow, RawCell, RawSheet, RawWorkbook, DATE_FORMAT};

/// Cell texts read as a missing value (the usual spreadsheet/CSV NA spellings)
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing_marker(text: &str) -> bool {
    MISSING_MARKERS.contains(&text.trim())
}

/// Position row after normalization; `None` means "impute later".
#[derive(Debug, Clone, PartialEq)]
pub struct PendingHolding {
    pub ticker: String,
    pub quantity: f64,
    pub unit_cost: Option<f64>,
    pub market_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingSheet {
    pub name: String,
    pub date: NaiveDate,
    pub holdings: Vec<PendingHolding>,
    pub cash: CashRow,
}

/// Strip surrounding quote characters and `+` signs, then parse.
pub fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned = text.trim().trim_matches('"').trim_matches('+').trim();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Repair one UnitCost/MarketPrice cell. Present values are rounded to 2 places.
pub fn normalize_cell(
    cell: &RawCell,
    sheet: &str,
    row: usize,
    field: &'static str,
) -> Result<Option<f64>> {
    let value = match cell {
        RawCell::Missing => None,
        RawCell::Number(v) if v.is_nan() => None,
        RawCell::Number(v) => Some(*v),
        RawCell::Text(s) if is_missing_marker(s) => None,
        RawCell::Text(s) => Some(parse_price_text(s).ok_or_else(|| AnalysisError::Parse {
            sheet: sheet.to_string(),
            row,
            field,
            value: s.clone(),
        })?),
    };
    Ok(value.map(round2))
}

/// Quantity is taken as-is; anything but a non-negative number is unsupported.
pub fn normalize_quantity(cell: &RawCell, sheet: &str, row: usize) -> Result<f64> {
    match cell {
        RawCell::Number(v) if v.is_finite() && *v >= 0.0 => Ok(*v),
        other => Err(AnalysisError::invalid(format!(
            "sheet {} row {}: Quantity must be a non-negative number, got {:?}",
            sheet, row, other
        ))),
    }
}

fn cell(cells: &[RawCell], idx: usize) -> RawCell {
    cells.get(idx).cloned().unwrap_or(RawCell::Missing)
}

fn check_header(sheet: &RawSheet) -> Result<()> {
    if sheet.header.len() < 4 {
        return Err(AnalysisError::invalid(format!(
            "sheet {} has {} columns, expected Ticker, Quantity, UnitCost, MarketPrice",
            sheet.name,
            sheet.header.len()
        )));
    }
    if sheet.header[1].trim() != "Quantity" {
        return Err(AnalysisError::invalid(format!(
            "sheet {}: second column must be 'Quantity', found '{}'",
            sheet.name, sheet.header[1]
        )));
    }
    Ok(())
}

/// Normalize one sheet into pending rows, splitting off the trailing cash row.
pub fn normalize_sheet(sheet: &RawSheet) -> Result<PendingSheet> {
    let date = NaiveDate::parse_from_str(sheet.name.trim(), DATE_FORMAT).map_err(|_| {
        AnalysisError::invalid(format!("sheet name '{}' is not a YYYY-MM-DD date", sheet.name))
    })?;
    check_header(sheet)?;

    // Row numbers are 1-based spreadsheet rows; the header is row 1.
    let rows: Vec<(usize, &Vec<RawCell>)> = sheet
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| (i + 2, r))
        .filter(|(_, r)| !r.iter().all(RawCell::is_missing))
        .collect();

    let Some(((cash_row_no, cash_cells), positions)) = rows.split_last() else {
        return Err(AnalysisError::invalid(format!("sheet {} has no rows", sheet.name)));
    };

    let mut holdings = Vec::with_capacity(positions.len());
    for (row_no, cells) in positions {
        let ticker = cell(cells, 0).label();
        if ticker.is_empty() {
            return Err(AnalysisError::invalid(format!(
                "sheet {} row {}: position has no ticker",
                sheet.name, row_no
            )));
        }
        holdings.push(PendingHolding {
            ticker,
            quantity: normalize_quantity(&cell(cells, 1), &sheet.name, *row_no)?,
            unit_cost: normalize_cell(&cell(cells, 2), &sheet.name, *row_no, "UnitCost")?,
            market_price: normalize_cell(&cell(cells, 3), &sheet.name, *row_no, "MarketPrice")?,
        });
    }

    let amount = normalize_quantity(&cell(cash_cells, 1), &sheet.name, *cash_row_no)?;
    let unit_cost = normalize_cell(&cell(cash_cells, 2), &sheet.name, *cash_row_no, "UnitCost")?;
    let market_price =
        normalize_cell(&cell(cash_cells, 3), &sheet.name, *cash_row_no, "MarketPrice")?;
    if unit_cost != Some(1.0) || market_price != Some(1.0) {
        return Err(AnalysisError::invalid(format!(
            "sheet {}: last row is not a cash row (UnitCost and MarketPrice must be 1)",
            sheet.name
        )));
    }

    Ok(PendingSheet {
        name: sheet.name.trim().to_string(),
        date,
        holdings,
        cash: CashRow { label: cell(cash_cells, 0).label(), amount },
    })
}

/// Normalize every sheet, returning them in chronological order.
pub fn normalize_workbook(workbook: &RawWorkbook) -> Result<Vec<PendingSheet>> {
    if workbook.sheets.is_empty() {
        return Err(AnalysisError::invalid("workbook has no sheets"));
    }
    let mut sheets = workbook
        .sheets
        .iter()
        .map(normalize_sheet)
        .collect::<Result<Vec<_>>>()?;
    sheets.sort_by_key(|s| s.date);
    if let Some(pair) = sheets.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(AnalysisError::invalid(format!(
            "sheets {} and {} are the same month end",
            pair[0].name, pair[1].name
        )));
    }
    Ok(sheets)
}
