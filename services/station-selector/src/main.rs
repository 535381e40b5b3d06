//! Target weather station selector.
//!
//! Picks the weather stations whose climate-zone-bounded catchments cover
//! the bulk of a country's planted area for one crop.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use coverage_engine::CancellationToken;
use tracing::{error, info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use station_selector::config::LoggingConfig;
use station_selector::{error_code, load_config, run, Overrides};

#[derive(Parser, Debug)]
#[command(name = "station-selector")]
#[command(about = "Select target weather stations for yield-gap analysis")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "SELECTOR_CONFIG", default_value = "config/station-selector.yaml")]
    config: PathBuf,

    /// Target country (value of the country field)
    #[arg(long, env = "TARGET_COUNTRY")]
    country: Option<String>,

    /// Crop column in the planted-area layer
    #[arg(long, env = "CROP_FIELD")]
    crop_field: Option<String>,

    /// Share of total crop value to cover, in (0, 100]
    #[arg(short, long)]
    percentage: Option<f64>,

    /// Output directory
    #[arg(short, long, env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (json or pretty)
    #[arg(long)]
    log_format: Option<String>,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let level = match logging.level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // RUST_LOG, when set, wins over the configured level.
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    if logging.format == "pretty" {
        tracing::subscriber::set_global_default(builder.finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    config.apply(Overrides {
        country: args.country,
        crop_field: args.crop_field,
        percentage: args.percentage,
        output_dir: args.output_dir,
        log_level: args.log_level,
        log_format: args.log_format,
    });
    config.validate()?;

    init_tracing(&config.logging)?;

    info!(
        config = ?args.config,
        country = %config.country,
        crop = %config.fields.crop,
        percentage = config.engine.percentage,
        "Starting target weather station selection"
    );

    let summary = match run(&config, CancellationToken::new()) {
        Ok(summary) => summary,
        Err(e) => {
            error!(code = error_code(&e), error = %format!("{:#}", e), "Station selection failed");
            return Err(e);
        }
    };

    info!(
        stations = ?summary.stations,
        outputs = summary.outputs.len(),
        "Done"
    );

    Ok(())
}
