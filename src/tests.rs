// Pipeline test suite for portfolio analysis
// Run with: cargo test
// Run specific test: cargo test test_name -- --nocapture

use super::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

// ============================================================================
// TEST DATA FIXTURES
// ============================================================================

fn num(v: f64) -> RawCell {
    RawCell::Number(v)
}

fn txt(s: &str) -> RawCell {
    RawCell::text(s)
}

fn cash(amount: f64) -> Vec<RawCell> {
    vec![txt("Cash"), num(amount), num(1.0), num(1.0)]
}

/// Three month-end sheets with the usual defects: quoted/prefixed numbers,
/// NA markers, a ticker that comes and goes.
fn create_test_workbook() -> RawWorkbook {
    RawWorkbook::new(vec![
        RawSheet::new(
            "2023-07-31",
            vec![
                vec![txt("AAPL"), num(100.0), num(15000.0), num(196.45)],
                vec![txt("MSFT"), num(50.0), txt("\"+16500.25\""), txt("\"+335.92\"")],
                vec![txt("NVDA"), num(20.0), txt("NA"), num(467.29)],
                cash(150_000.0),
            ],
        ),
        RawSheet::new(
            "2023-08-31",
            vec![
                vec![txt("AAPL"), num(100.0), num(15000.0), txt("NA")],
                vec![txt("NVDA"), num(20.0), num(2336.45), num(493.55)],
                cash(155_000.0),
            ],
        ),
        RawSheet::new(
            "2023-09-30",
            vec![
                vec![txt("AAPL"), num(100.0), num(15000.0), num(171.21)],
                vec![txt("MSFT"), num(40.0), num(16500.25), num(315.75)],
                vec![txt("TSLA"), num(30.0), num(7500.0), num(250.22)],
                cash(140_000.0),
            ],
        ),
    ])
}

fn test_prices() -> StaticPriceSource {
    StaticPriceSource::new(HashMap::from([("AAPL".to_string(), 187.874)]))
}

/// Scenario workbook: one AAPL row with a missing UnitCost
fn create_scenario_workbook() -> RawWorkbook {
    RawWorkbook::new(vec![RawSheet::new(
        "2023-07-31",
        vec![
            vec![txt("AAPL"), num(10.0), txt("NA"), num(150.00)],
            vec![txt("_"), num(5000.0), num(1.0), num(1.0)],
        ],
    )])
}

#[derive(Default)]
struct RecordingRenderer {
    charts: RefCell<Vec<(LineChart, String)>>,
}

impl ChartRenderer for RecordingRenderer {
    fn render(&self, chart: &LineChart, path: &Path) -> Result<()> {
        self.charts
            .borrow_mut()
            .push((chart.clone(), path.file_name().unwrap().to_string_lossy().to_string()));
        Ok(())
    }
}

// ============================================================================
// CLEANING TESTS
// ============================================================================

#[cfg(test)]
mod cleaning_tests {
    use super::*;

    #[test]
    fn test_cash_quantity_survives_cleaning() {
        let raw = create_test_workbook();
        let cleaned = clean(&raw, &test_prices()).unwrap();

        let amounts: Vec<f64> = cleaned.sheets().iter().map(|s| s.cash.amount).collect();
        assert_eq!(amounts, vec![150_000.0, 155_000.0, 140_000.0]);
        println!("✓ Cash row quantity untouched");
    }

    #[test]
    fn test_string_cells_are_repaired() {
        let cleaned = clean(&create_test_workbook(), &test_prices()).unwrap();
        let msft = &cleaned.sheet("2023-07-31").unwrap().holdings[1];
        assert_eq!(msft.unit_cost, 16500.25);
        assert_eq!(msft.market_price, 335.92);
    }

    #[test]
    fn test_missing_values_are_imputed() {
        let cleaned = clean(&create_test_workbook(), &test_prices()).unwrap();

        let nvda = &cleaned.sheet("2023-07-31").unwrap().holdings[2];
        assert_eq!(nvda.unit_cost, holdings::round2(467.29 / 20.0 * 100.0));

        let aapl = &cleaned.sheet("2023-08-31").unwrap().holdings[0];
        assert_eq!(aapl.market_price, 187.87);
    }

    #[test]
    fn test_clean_without_defects_only_rounds() {
        let raw = RawWorkbook::new(vec![RawSheet::new(
            "2023-07-31",
            vec![
                vec![txt("AAPL"), num(100.0), num(15000.123), num(196.456)],
                vec![txt("MSFT"), num(50.0), num(16500.0), num(335.92)],
                cash(1000.0),
            ],
        )]);
        let cleaned = clean(&raw, &StaticPriceSource::default()).unwrap();
        let sheet = cleaned.sheet("2023-07-31").unwrap();

        assert_eq!(sheet.holdings[0].unit_cost, 15000.12);
        assert_eq!(sheet.holdings[0].market_price, 196.46);
        assert_eq!(sheet.holdings[1].unit_cost, 16500.0);
        assert_eq!(sheet.holdings[1].market_price, 335.92);
        assert_eq!(sheet.holdings[0].quantity, 100.0);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let once = clean(&create_test_workbook(), &test_prices()).unwrap();
        // No price source entries: a second pass must not need any lookups.
        let twice = clean(&once.to_workbook(), &StaticPriceSource::default()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_lookup_failure_aborts_cleaning() {
        let err = clean(&create_test_workbook(), &StaticPriceSource::default()).unwrap_err();
        match err {
            AnalysisError::PriceLookup { ticker, .. } => assert_eq!(ticker, "AAPL"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_malformed_number_is_parse_error() {
        let mut raw = create_test_workbook();
        raw.sheets[0].rows[0][3] = txt("\"12O.5\"");
        let err = clean(&raw, &test_prices()).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { row: 2, field: "MarketPrice", .. }));
    }

    #[test]
    fn test_na_spellings_are_imputed() {
        let mut raw = create_test_workbook();
        raw.sheets[0].rows[2][2] = txt("#N/A");
        raw.sheets[1].rows[0][3] = txt("null");
        let cleaned = clean(&raw, &test_prices()).unwrap();

        let nvda = &cleaned.sheet("2023-07-31").unwrap().holdings[2];
        assert_eq!(nvda.unit_cost, holdings::round2(467.29 / 20.0 * 100.0));
        let aapl = &cleaned.sheet("2023-08-31").unwrap().holdings[0];
        assert_eq!(aapl.market_price, 187.87);
    }

    #[test]
    fn test_same_month_end_twice_is_invalid() {
        let mut raw = create_test_workbook();
        raw.sheets[2].name = "2023-7-31".to_string();
        assert!(matches!(clean(&raw, &test_prices()), Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_non_numeric_quantity_is_invalid() {
        let mut raw = create_test_workbook();
        raw.sheets[1].rows[1][1] = txt("twenty");
        assert!(matches!(clean(&raw, &test_prices()), Err(AnalysisError::InvalidInput(_))));
    }
}

// ============================================================================
// TABLE TESTS
// ============================================================================

#[cfg(test)]
mod table_tests {
    use super::*;
    use crate::tables::{build_asset_values, build_unrealized_pnl};

    #[test]
    fn test_scenario_single_position() {
        let cleaned = clean(&create_scenario_workbook(), &StaticPriceSource::default()).unwrap();
        let sheet = cleaned.sheet("2023-07-31").unwrap();
        assert_eq!(sheet.holdings[0].unit_cost, 1500.00);

        let av = build_asset_values(&cleaned, "2023-06-30").unwrap();
        assert_eq!(av.get("AAPL", "2023-07-31"), Some(1500.00));
        assert_eq!(
            av.get(NAV_ROW, "2023-07-31"),
            Some(holdings::round2((1500.00 + 5000.0) / (10.0 + 5000.0)))
        );
        println!("✓ Single position scenario matches");
    }

    #[test]
    fn test_absent_tickers_read_zero() {
        let cleaned = clean(&create_test_workbook(), &test_prices()).unwrap();
        let av = build_asset_values(&cleaned, "2023-06-30").unwrap();
        let pnl = build_unrealized_pnl(&cleaned);

        assert_eq!(av.get("MSFT", "2023-08-31"), Some(0.0));
        assert_eq!(av.get("TSLA", "2023-07-31"), Some(0.0));
        assert_eq!(av.get("TSLA", "2023-08-31"), Some(0.0));
        assert_eq!(pnl.get("MSFT", "2023-08-31"), Some(0.0));
        assert_eq!(pnl.get("TSLA", "2023-07-31"), Some(0.0));

        // every ticker row is zero in the synthetic initial column
        for row in av.rows() {
            assert_eq!(row.values[0], 0.0, "{} not zero at initial period", row.label);
        }
    }

    #[test]
    fn test_nav_invariant_holds_every_month() {
        let cleaned = clean(&create_test_workbook(), &test_prices()).unwrap();
        let av = build_asset_values(&cleaned, "2023-06-30").unwrap();

        for sheet in cleaned.sheets() {
            let nav = av.get(NAV_ROW, &sheet.name).unwrap();
            let market: f64 = sheet.holdings.iter().map(|h| h.market_value()).sum();
            let total_quantity = sheet.total_quantity();
            let diff = (nav * total_quantity - (market + sheet.cash.amount)).abs();
            assert!(diff <= 0.005 * total_quantity, "NAV invariant broken for {}", sheet.name);
        }
    }

    #[test]
    fn test_unrealized_pnl_values() {
        let cleaned = clean(&create_test_workbook(), &test_prices()).unwrap();
        let pnl = build_unrealized_pnl(&cleaned);

        assert_eq!(pnl.months(), ["2023-07-31", "2023-08-31", "2023-09-30"]);
        assert_eq!(pnl.get("AAPL", "2023-07-31"), Some(196.45 - 15000.0));
        assert_eq!(pnl.get("TSLA", "2023-09-30"), Some(250.22 - 7500.0));
    }

    #[test]
    fn test_tables_follow_chronological_order() {
        let mut raw = create_test_workbook();
        raw.sheets.reverse();
        let cleaned = clean(&raw, &test_prices()).unwrap();
        let av = build_asset_values(&cleaned, "2023-06-30").unwrap();
        assert_eq!(av.months(), ["2023-06-30", "2023-07-31", "2023-08-31", "2023-09-30"]);
        assert_eq!(av.labels(), vec!["AAPL", "MSFT", "NVDA", NAV_ROW, "TSLA"]);
    }
}

// ============================================================================
// SESSION TESTS
// ============================================================================

#[cfg(test)]
mod session_tests {
    use super::*;
    use crate::workbook::read_workbook;

    fn session(dir: &Path) -> PortfolioAnalysis {
        let config = AnalysisConfig::default().with_output_dir(dir);
        PortfolioAnalysis::from_workbook(&create_test_workbook(), config, &test_prices()).unwrap()
    }

    #[test]
    fn test_construction_persists_cleaned_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = session(dir.path());

        let path = dir.path().join("cleaned_data.xlsx");
        assert!(path.exists());

        let persisted = read_workbook(&path).unwrap();
        assert_eq!(persisted.sheets.len(), 3);
        assert_eq!(persisted, analysis.data().to_workbook());

        let july = persisted.sheet("2023-07-31").unwrap();
        assert_eq!(july.header, vec!["Ticker", "Quantity", "UnitCost", "MarketPrice"]);
        assert_eq!(july.rows.last().unwrap()[1], num(150_000.0));
    }

    #[test]
    fn test_construction_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("holdings.xlsx");
        workbook::write_workbook(&create_test_workbook(), &input).unwrap();

        let out = dir.path().join("out");
        let config = AnalysisConfig::default().with_output_dir(&out);
        let analysis = PortfolioAnalysis::new(&input, config, &test_prices()).unwrap();

        assert!(out.join("cleaned_data.xlsx").exists());
        assert_eq!(analysis.asset_values().months().len(), 4);
        assert_eq!(analysis.unrealized_pnl().months().len(), 3);
    }

    #[test]
    fn test_session_data_matches_clean() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = session(dir.path());
        let expected = clean(&create_test_workbook(), &test_prices()).unwrap();
        assert_eq!(analysis.data(), &expected);
    }

    #[test]
    fn test_failed_construction_yields_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::default().with_output_dir(dir.path());
        let result =
            PortfolioAnalysis::from_workbook(&create_test_workbook(), config, &StaticPriceSource::default());
        assert!(result.is_err());
        assert!(!dir.path().join("cleaned_data.xlsx").exists());
    }

    #[test]
    fn test_portfolio_value_series() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = session(dir.path());
        let series = analysis.portfolio_value_series().unwrap();

        assert_eq!(series.len(), 4);
        assert_eq!(series[0], ("2023-06-30".to_string(), 200_000.0));

        let sept = analysis.data().sheet("2023-09-30").unwrap();
        let expected: f64 = sept.holdings.iter().map(|h| h.market_value()).sum::<f64>() + sept.cash.amount;
        assert!((series[3].1 - expected).abs() < 1e-6);
    }

    #[test]
    fn test_liquidity_ratio_starts_at_one() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = session(dir.path());
        let series = analysis.liquidity_ratio_series().unwrap();

        assert_eq!(series[0].1, 1.0);
        for (month, ratio) in &series[1..] {
            assert!(*ratio > 1.0, "{} ratio should exceed 1 with open positions", month);
        }
    }

    #[test]
    fn test_configurable_initial_value() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::new(Some(dir.path().to_path_buf()), None, Some(250_000.0));
        let analysis = PortfolioAnalysis::from_workbook(&create_test_workbook(), config, &test_prices()).unwrap();
        assert_eq!(analysis.portfolio_value_series().unwrap()[0].1, 250_000.0);
        assert_eq!(analysis.liquidity_ratio_series().unwrap()[0].1, 1.0);
    }

    #[test]
    fn test_plot_operations_render_both_charts() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = session(dir.path());
        let renderer = RecordingRenderer::default();

        let portfolio = analysis.plot_portfolio_with(&renderer).unwrap();
        let liquidity = analysis.plot_liquidity_with(&renderer).unwrap();
        assert_eq!(portfolio, dir.path().join("portfolio_value_over_time.png"));
        assert_eq!(liquidity, dir.path().join("liquidity_ratio_over_time.png"));

        let charts = renderer.charts.borrow();
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].1, "portfolio_value_over_time.png");
        assert_eq!(charts[0].0.points, analysis.portfolio_value_series().unwrap());
        assert_eq!(charts[1].0.annotate, Some(3));
        let labels: Vec<&str> = charts[1].0.points.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["2023-06-30", "2023-07-31", "2023-08-31", "2023-09-30"]);
    }

    #[test]
    fn test_plot_operations_write_png_files() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = session(dir.path());

        let portfolio = analysis.plot_portfolio().unwrap();
        let liquidity = analysis.plot_liquidity().unwrap();

        for (path, name) in [
            (&portfolio, "portfolio_value_over_time.png"),
            (&liquidity, "liquidity_ratio_over_time.png"),
        ] {
            assert_eq!(path, &dir.path().join(name));
            let size = std::fs::metadata(path).unwrap().len();
            assert!(size > 0, "{} is empty", name);
        }
        println!("✓ Both charts written");
    }
}
