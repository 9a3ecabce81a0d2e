//! Missing-value imputer
//!
//! Resolves whatever the normalizer left as `None`: MarketPrice from a
//! [`PriceSource`], UnitCost from the row's own MarketPrice and Quantity.

use log::{debug, info};

use crate::display;
use crate::error::{AnalysisError, Result};
use crate::holdings::{round2, CleanedDataset, Holding, HoldingSheet, RawWorkbook};
use crate::normalizer::{normalize_workbook, PendingHolding, PendingSheet};

/// Latest closing price for a ticker. Implementations may block.
pub trait PriceSource {
    fn latest_close(&self, ticker: &str) -> Result<f64>;
}

/// Resolve one row. A row missing both price fields is rejected rather than
/// deriving UnitCost from a price that does not exist yet.
pub fn impute_holding(
    sheet: &str,
    row: PendingHolding,
    prices: &dyn PriceSource,
) -> Result<Holding> {
    let PendingHolding { ticker, quantity, unit_cost, market_price } = row;

    let (unit_cost, market_price) = match (unit_cost, market_price) {
        (Some(uc), Some(mp)) => (uc, mp),
        (Some(uc), None) => {
            let mp = round2(prices.latest_close(&ticker)?);
            info!("{}: imputed MarketPrice for {} = {:.2}", sheet, ticker, mp);
            (uc, mp)
        }
        (None, Some(mp)) => {
            if quantity == 0.0 {
                return Err(AnalysisError::invalid(format!(
                    "sheet {}: cannot derive UnitCost for {} with zero Quantity",
                    sheet, ticker
                )));
            }
            let uc = round2(mp / quantity * 100.0);
            info!("{}: imputed UnitCost for {} = {:.2}", sheet, ticker, uc);
            (uc, mp)
        }
        (None, None) => {
            return Err(AnalysisError::invalid(format!(
                "sheet {}: both UnitCost and MarketPrice are missing for {}",
                sheet, ticker
            )));
        }
    };

    Ok(Holding { ticker, quantity, unit_cost, market_price })
}

pub fn impute_sheet(sheet: PendingSheet, prices: &dyn PriceSource) -> Result<HoldingSheet> {
    let PendingSheet { name, date, holdings, cash } = sheet;
    let holdings = holdings
        .into_iter()
        .map(|h| impute_holding(&name, h, prices))
        .collect::<Result<Vec<_>>>()?;
    debug!("{}: {} positions resolved", name, holdings.len());
    Ok(HoldingSheet { name, date, holdings, cash })
}

/// Impute every sheet in order, logging progress after each one.
pub fn impute(sheets: Vec<PendingSheet>, prices: &dyn PriceSource) -> Result<CleanedDataset> {
    let total = sheets.len();
    let mut cleaned = Vec::with_capacity(total);
    for (i, sheet) in sheets.into_iter().enumerate() {
        let sheet = impute_sheet(sheet, prices)?;
        info!("{}", display::format_sheet_progress(&sheet.name, sheet.holdings.len(), i + 1, total));
        cleaned.push(sheet);
    }
    Ok(CleanedDataset::new(cleaned))
}

/// Normalize then impute: raw workbook in, cleaned dataset out.
pub fn clean(workbook: &RawWorkbook, prices: &dyn PriceSource) -> Result<CleanedDataset> {
    impute(normalize_workbook(workbook)?, prices)
}
