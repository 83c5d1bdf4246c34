//! networth-terms - Chart USA net worth by wealth percentile with presidential terms
//!
//! Downloads (once) the presidential terms from Wikidata and the Federal Reserve
//! net-worth levels, then writes a stacked-area chart with one shaded band per term.

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use networth_terms::app::App;
use networth_terms::cli::{Cli, StartupConfig};

/// Environment variable holding the log filter, e.g. `debug` or `networth_terms=trace`
const LOG_ENV: &str = "NETWORTH_TERMS_LOG";

/// Sets up the global fmt subscriber, `info` unless overridden by `NETWORTH_TERMS_LOG`
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();
    let config = StartupConfig::from_cli(&cli).map_err(|e| {
        error!("{}", e);
        e
    })?;

    let app = App::new(config);
    match app.run().await {
        Ok(path) => {
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}
