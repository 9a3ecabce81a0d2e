/// Display and formatting utilities for analysis output
use chrono::Utc;
use polars::prelude::DataFrame;

/// Format progress message for a cleaned sheet
pub fn format_sheet_progress(sheet: &str, positions: usize, completed: usize, total: usize) -> String {
    format!(
        "[{}] Cleaned sheet {} ({} positions): {} of {}",
        Utc::now().format("%H:%M:%S"),
        sheet,
        positions,
        completed,
        total
    )
}

/// Format message for workbook loading
pub fn format_workbook_loaded(path: &str, sheets: usize) -> String {
    format!("Workbook loaded from {} - {} sheets", path, sheets)
}

/// Format message for the persisted cleaned workbook
pub fn format_cleaned_saved(path: &str) -> String {
    format!("Cleaned data saved to {}", path)
}

/// Format message for a rendered chart
pub fn format_chart_saved(title: &str, path: &str) -> String {
    format!("{} chart saved to {}", title, path)
}

/// Format error message for pipeline failure
pub fn format_pipeline_error(error: &dyn std::error::Error) -> String {
    format!("Portfolio analysis failed: {}", error)
}

/// Titled table block for console output
pub fn format_table(title: &str, df: &DataFrame) -> String {
    format!("{}\n{}", title, df)
}
