//! Application pipeline: fetch both datasets, reshape, lay out and render
//!
//! Data flows one way. The only state kept between runs is the pair of cache files
//! in the data directory.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::cache::CachedFetcher;
use crate::chart::{ChartError, ChartLayout, ChartRenderer};
use crate::cli::StartupConfig;
use crate::data::{LeadersClient, LeadersError, NetWorthClient, NetWorthError};
use crate::reshape::{reshape, ReshapeError};

/// Cache file for the presidential terms query response
pub const PRESIDENTS_CACHE_FILE: &str = "usa-presidents.csv";

/// Cache file for the net-worth levels CSV
pub const NET_WORTH_CACHE_FILE: &str = "dfa-networth-levels.csv";

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum AppError {
    /// The data directory could not be created
    #[error("Could not create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load presidential terms: {0}")]
    Leaders(#[from] LeadersError),

    #[error("Failed to load net worth levels: {0}")]
    NetWorth(#[from] NetWorthError),

    #[error(transparent)]
    Reshape(#[from] ReshapeError),

    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// One run of the pipeline for a given configuration
#[derive(Debug, Clone)]
pub struct App {
    config: StartupConfig,
    leaders_client: LeadersClient,
    net_worth_client: NetWorthClient,
}

impl App {
    /// Creates an App whose clients share one HTTP client
    pub fn new(config: StartupConfig) -> Self {
        let fetcher = CachedFetcher::new();
        Self {
            config,
            leaders_client: LeadersClient::with_fetcher(fetcher.clone()),
            net_worth_client: NetWorthClient::with_fetcher(fetcher),
        }
    }

    /// Creates an App with custom clients
    pub fn with_clients(config: StartupConfig, leaders_client: LeadersClient, net_worth_client: NetWorthClient) -> Self {
        Self {
            config,
            leaders_client,
            net_worth_client,
        }
    }

    pub fn config(&self) -> &StartupConfig {
        &self.config
    }

    /// Loads both datasets and computes the chart layout
    ///
    /// Creates the data directory if needed. Datasets already cached there are read
    /// without any network access.
    pub async fn build_layout(&self) -> Result<ChartLayout, AppError> {
        let data_dir = &self.config.data_dir;
        fs::create_dir_all(data_dir).map_err(|source| AppError::DataDir {
            path: data_dir.clone(),
            source,
        })?;

        let terms = self
            .leaders_client
            .fetch_leader_terms(&data_dir.join(PRESIDENTS_CACHE_FILE))
            .await?;
        let points = self
            .net_worth_client
            .fetch_net_worth(&data_dir.join(NET_WORTH_CACHE_FILE))
            .await?;
        info!(terms = terms.len(), rows = points.len(), "datasets loaded");

        let matrix = reshape(&points)?;
        Ok(ChartLayout::build(&matrix, &terms, self.config.label_terms)?)
    }

    /// Runs the whole pipeline and returns the path of the written chart
    pub async fn run(&self) -> Result<PathBuf, AppError> {
        let layout = self.build_layout().await?;

        let renderer = ChartRenderer::new(&self.config.output, self.config.width, self.config.height);
        renderer.render(&layout)?;

        Ok(renderer.output().to_path_buf())
    }
}
