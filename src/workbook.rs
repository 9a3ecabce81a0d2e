//! Workbook import (xlsx, xls, ods via calamine) and export (xlsx via rust_xlsxwriter).
//!
//! Both directions speak [`RawWorkbook`]: the first row of each sheet is the
//! header, everything below it is data.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use log::{debug, info};
use rust_xlsxwriter::{Format, FormatBorder, Workbook as XlsxWorkbook};

use crate::error::Result;
use crate::holdings::{RawCell, RawSheet, RawWorkbook};

fn raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::String(s) if s.trim().is_empty() => RawCell::Missing,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Empty | Data::Error(_) => RawCell::Missing,
        other => RawCell::Text(other.to_string()),
    }
}

/// Load every sheet of a workbook, in workbook order.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<RawWorkbook> {
    let path = path.as_ref();
    let mut workbook: Sheets<_> = open_workbook_auto(path)?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = workbook.worksheet_range(&name)?;
        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .map(|r| r.iter().map(|c| raw_cell(c).label()).collect())
            .unwrap_or_default();
        let rows: Vec<Vec<RawCell>> = rows.map(|r| r.iter().map(raw_cell).collect()).collect();

        debug!("Read sheet {} ({} rows)", name, rows.len());
        sheets.push(RawSheet { name, header, rows });
    }

    info!("Loaded {} sheets from {}", sheets.len(), path.display());
    Ok(RawWorkbook::new(sheets))
}

/// Write one worksheet per sheet, header row in bold, missing cells left blank.
pub fn write_workbook<P: AsRef<Path>>(workbook: &RawWorkbook, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut xlsx_workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);

    for sheet in &workbook.sheets {
        let worksheet = xlsx_workbook.add_worksheet().set_name(&sheet.name)?;

        for (col, title) in sheet.header.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, title, &header_format)?;
        }

        for (idx, row) in sheet.rows.iter().enumerate() {
            // rust_xlsxwriter uses 0-based row/col as u32/u16
            let r = (idx + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    RawCell::Number(v) => {
                        worksheet.write_number(r, col as u16, *v)?;
                    }
                    RawCell::Text(s) => {
                        worksheet.write_string(r, col as u16, s)?;
                    }
                    RawCell::Missing => {}
                }
            }
        }
    }

    xlsx_workbook.save(path)?;
    info!("Wrote {} sheets to {}", workbook.sheets.len(), path.display());
    Ok(())
}
