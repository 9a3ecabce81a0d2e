use std::error::Error as StdError;
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use portfolio_analysis::display;
use portfolio_analysis::*;

/// Portfolio analysis - cleans a holdings workbook and reports value over time
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Holdings workbook, one sheet per month end
    #[arg(short, long, default_value = "dummy_data.xlsx")]
    input: PathBuf,

    /// Output folder for cleaned_data.xlsx and charts (default: $PORTFOLIO_OUTPUT_DIR or .)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Label of the synthetic first period
    #[arg(long)]
    initial_period: Option<String>,

    /// Portfolio value at the first period
    #[arg(long)]
    initial_value: Option<f64>,

    /// CSV with Ticker,Price columns used instead of live quotes
    #[arg(short, long)]
    prices: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long)]
    skip_charts: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: Args) -> Result<()> {
    let config = AnalysisConfig::new(args.output_dir, args.initial_period, args.initial_value);

    let prices: Box<dyn PriceSource> = match args.prices {
        Some(ref path) => {
            info!("Using static prices from {}", path.display());
            Box::new(StaticPriceSource::from_csv(path)?)
        }
        None => Box::new(YahooPriceSource::new()?),
    };

    let analysis = PortfolioAnalysis::new(&args.input, config, prices.as_ref())?;

    println!("{}", display::format_table("Asset Values", &analysis.asset_values().to_dataframe()?));
    println!("{}", display::format_table("Unrealized P&L", &analysis.unrealized_pnl().to_dataframe()?));

    if args.skip_charts {
        warn!("Chart rendering skipped");
        return Ok(());
    }
    analysis.plot_portfolio()?;
    analysis.plot_liquidity()?;
    Ok(())
}

fn main() -> std::result::Result<(), Box<dyn StdError>> {
    let args = Args::parse();

    // Setup logging based on verbosity
    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .init();

    info!("Starting portfolio analysis for {}", args.input.display());
    if let Err(e) = run(args) {
        eprintln!("{}", display::format_pipeline_error(&e));
        return Err(Box::new(e));
    }

    info!("Portfolio analysis complete!");
    Ok(())
}
