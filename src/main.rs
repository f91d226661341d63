mod config;
mod models;
mod pipeline;
mod scraper;
mod utils;
mod writer;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "laptops-etl", about = "webscraper.io laptop catalogue scraper", version)]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "laptops_etl=info,warn",
        1 => "laptops_etl=debug,info",
        _ => "trace",
    };

    let config = AppConfig::load()?;

    // Progress lines go to stdout and, without ANSI escapes, to the log file.
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.output.log_path)
        .with_context(|| format!("Could not open log file {:?}", config.output.log_path))?;

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(fmt::layer().compact().with_target(false))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();

    let csv_path = config.output.csv_path.clone();

    let _t = utils::Timer::start("Catalogue scrape");
    let stats = Pipeline::new(config).run().await?;

    info!(
        "Done: {} products, {} variant prices → {:?}",
        stats.products_written, stats.variant_prices, csv_path,
    );

    Ok(())
}
