//! Command-line interface parsing for networth-terms
//!
//! Every flag is optional: a bare invocation caches data in a `data` directory next
//! to the executable and writes the chart there.

use std::path::PathBuf;

use clap::Parser;
use directories::ProjectDirs;
use thiserror::Error;

/// File name of the chart when `--output` is not given
pub const DEFAULT_OUTPUT_FILE: &str = "networth-terms.png";

/// Name of the cache directory created next to the executable
const DATA_DIR_NAME: &str = "data";

/// Error types for CLI argument handling
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// Width or height of zero pixels
    #[error("Invalid chart size {width}x{height}: both dimensions must be positive")]
    InvalidSize { width: u32, height: u32 },

    /// Neither the executable location nor a platform cache directory is known
    #[error("Could not determine a data directory; pass --data-dir")]
    NoDataDir,
}

/// Chart USA net worth by wealth percentile with presidential terms
#[derive(Parser, Debug)]
#[command(name = "networth-terms")]
#[command(about = "Chart net worth by wealth percentile overlaid with presidential terms")]
#[command(version)]
pub struct Cli {
    /// Directory holding the cached datasets (default: `data` next to the executable)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Chart file to write; a `.svg` extension selects SVG, anything else PNG
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Draw term bands without the leaders' names
    #[arg(long)]
    pub no_labels: bool,

    /// Chart width in pixels
    #[arg(long, default_value_t = 1600)]
    pub width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 900)]
    pub height: u32,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Directory holding the two cache files
    pub data_dir: PathBuf,
    /// Chart output path
    pub output: PathBuf,
    /// Whether to label terms with the leader's name
    pub label_terms: bool,
    /// Chart width in pixels
    pub width: u32,
    /// Chart height in pixels
    pub height: u32,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with every default resolved
    /// * `Err(CliError)` if the size is invalid or no data directory can be found
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        match &cli.data_dir {
            Some(dir) => Self::resolve(cli, dir.clone()),
            None => Self::resolve(cli, default_data_dir()?),
        }
    }

    fn resolve(cli: &Cli, data_dir: PathBuf) -> Result<Self, CliError> {
        if cli.width == 0 || cli.height == 0 {
            return Err(CliError::InvalidSize {
                width: cli.width,
                height: cli.height,
            });
        }

        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| data_dir.join(DEFAULT_OUTPUT_FILE));

        Ok(StartupConfig {
            data_dir,
            output,
            label_terms: !cli.no_labels,
            width: cli.width,
            height: cli.height,
        })
    }
}

/// `data` next to the executable, or the platform cache directory as a fallback
pub fn default_data_dir() -> Result<PathBuf, CliError> {
    let beside_executable = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DATA_DIR_NAME)));

    beside_executable
        .or_else(|| {
            ProjectDirs::from("", "", "networth-terms").map(|dirs| dirs.cache_dir().to_path_buf())
        })
        .ok_or(CliError::NoDataDir)
}
