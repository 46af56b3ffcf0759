use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use weekly_baskets::{run_to_directory, PipelineConfig};

/// Build weekly per-customer purchase reports from transaction baskets
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Customer reference CSV (customer_id, loyalty_score)
    #[arg(long)]
    customers_location: Option<PathBuf>,

    /// Product reference CSV (product_id, product_category)
    #[arg(long)]
    products_location: Option<PathBuf>,

    /// Directory of source folders, each holding a transactions.json
    #[arg(long)]
    transactions_location: Option<PathBuf>,

    /// Directory receiving the Week_<date>.json reports
    #[arg(long)]
    output_location: Option<PathBuf>,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(args.verbose >= 2)
        .init();

    let config = PipelineConfig::default().with_overrides(
        args.customers_location,
        args.products_location,
        args.transactions_location,
        args.output_location,
    );
    debug!("Using configuration {:?}", config);

    match run_to_directory(config) {
        Ok(summary) => {
            debug!("{:?}", summary);
            Ok(())
        }
        Err(e) => {
            error!("Fatal error: {}", e);
            Err(e.into())
        }
    }
}
