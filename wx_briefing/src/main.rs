pub(crate) mod airports;
pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod input;
pub(crate) mod report;

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::Configurable,
    error::ApplicationResult,
    input::{MemoryCache, ProductReader, ProductSources},
    report::{AirportBriefing, Products},
};

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Airport identifiers to brief, e.g. KATL
    #[clap(required = true)]
    pub airports: Vec<String>,
    #[clap(long)]
    /// Config file to use instead of the one in the platform config directory
    pub config: Option<PathBuf>,
    #[clap(long, short)]
    /// Resets the config file to the bundled default
    pub clean_config: bool,
    #[clap(long)]
    /// Print the briefing as JSON
    pub json: bool,
    #[clap(long)]
    /// Directory of `<ICAO>.taf` files
    pub taf: Option<PathBuf>,
    #[clap(long)]
    /// Winds aloft bulletin
    pub winds: Option<PathBuf>,
    #[clap(long)]
    /// JSON array of METAR observations
    pub metar: Option<PathBuf>,
    #[clap(long)]
    /// JSON array of MOS forecast hours
    pub mos: Option<PathBuf>,
}

fn stderr_subscriber(default_level: &str) -> impl tracing::Subscriber + Send + Sync + 'static {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

fn init_tracing(default_level: &str) {
    if tracing::subscriber::set_global_default(stderr_subscriber(default_level)).is_err() {
        warn!("A tracing subscriber was already installed");
    }
}

/// The log level lives in the configuration, so set-up logs at the default level.
fn load_configuration(cli: &Cli) -> ApplicationResult<(Configurable, PathBuf)> {
    let (mut configuration, config_file) =
        tracing::subscriber::with_default(stderr_subscriber("info"), || {
            config::setup_configuration(cli.config.as_deref(), cli.clean_config)
                .inspect_err(|e| error!("Could not set up configuration: {e}"))
        })?;
    configuration.apply_cli(cli);
    Ok((configuration, config_file))
}

fn main() -> ApplicationResult<()> {
    let cli = Cli::parse();
    let (configuration, config_file) = load_configuration(&cli)?;
    init_tracing(&configuration.log_level);
    info!(config_file = %config_file.display(), "Loaded configuration");

    let mut sources = ProductSources::new(
        &configuration,
        ProductReader::new(MemoryCache::default(), configuration.cache_ttl()),
    );
    let airports = airports::load_airports(configuration.airports_file.as_deref(), sources.reader())?;
    let metars = sources.metars()?;
    let mos = sources.mos_hours()?;
    let products = Products {
        metars: &metars,
        mos: &mos,
    };

    let mut briefings = Vec::new();
    for ident in &cli.airports {
        match AirportBriefing::build(ident, &airports, &products, &mut sources) {
            Ok(briefing) => briefings.push(briefing),
            Err(e) => warn!(airport = ident, "Skipping airport: {e}"),
        }
    }

    let output = if cli.json {
        report::render_json(&briefings)?
    } else {
        report::render_text(&briefings)?
    };
    println!("{output}");
    Ok(())
}
