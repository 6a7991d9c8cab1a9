use billfinder_lib::{config, logger, report};
use billfinder_lib::{Config, HttpFetcher, Pipeline, RunOptions};

use std::collections::BTreeSet;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use clap::Parser;
use log::info;

/// Search Washington State House bills for climate-related text.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Output CSV filename
    #[arg(long, default_value = "wa_house_climate_bills_2023_2025.csv")]
    out: PathBuf,

    /// Comma-separated years to include
    #[arg(long, default_value = "2023,2024,2025", value_parser = parse_years)]
    years: BTreeSet<u32>,

    /// Max concurrent fetches
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u16).range(1..))]
    workers: u16,

    /// Optional delay (seconds) between successful matches
    #[arg(long, default_value_t = 0.0, value_parser = parse_delay)]
    delay: f64,
}

fn parse_years(value: &str) -> Result<BTreeSet<u32>, String> {
    config::parse_years(value).map_err(|e| e.to_string())
}

fn parse_delay(value: &str) -> Result<f64, String> {
    let secs: f64 = value.parse().map_err(|_| format!("'{}' is not a number", value))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err("delay must be a non-negative number of seconds".to_string());
    }
    Ok(secs)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logger::init();

    let config = Config::default();
    let options = RunOptions {
        years: cli.years,
        workers: usize::from(cli.workers),
        delay: Duration::from_secs_f64(cli.delay),
    };

    let fetcher = HttpFetcher::new(&config)?;
    let pipeline = Pipeline::new(&fetcher, &config)?;
    let rows = pipeline.run(&options);

    report::write_report(&rows, &cli.out)?;
    info!("Wrote {} results to {}", rows.len(), cli.out.display());
    Ok(())
}
