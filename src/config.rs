use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::PredictorConfig;

/// Football match outcome predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "matchday-predictor", version, about)]
pub struct Config {
    /// JSON file overriding predictor weights, thresholds and clamps
    #[arg(long, env = "PREDICTOR_CONFIG", global = true)]
    pub predictor_config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Predict a single fixture from a JSON file ({home, away, h2h})
    Predict {
        /// Fixture file
        #[arg(long, short)]
        input: PathBuf,

        /// Print the full prediction as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Predict a JSON array of fixtures in parallel
    Batch {
        /// Fixtures file
        #[arg(long, short)]
        input: PathBuf,
    },

    /// Run the HTTP prediction API
    Serve {
        /// Listen address
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5000")]
        addr: String,

        /// SQLite database path for the bet ledger
        #[arg(long, env = "DATABASE_PATH", default_value = "predictions.db")]
        database_path: String,

        /// Team stats snapshot served to /api/analyze
        #[arg(long, env = "SNAPSHOT_PATH", default_value = "snapshot.json")]
        snapshot: PathBuf,
    },
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.predictor_config {
            if !path.is_file() {
                anyhow::bail!("predictor config {} does not exist", path.display());
            }
        }
        match &self.command {
            Command::Predict { input, .. } | Command::Batch { input } => {
                if !input.is_file() {
                    anyhow::bail!("input file {} does not exist", input.display());
                }
            }
            Command::Serve {
                addr,
                database_path,
                ..
            } => {
                if addr.parse::<std::net::SocketAddr>().is_err() {
                    anyhow::bail!("invalid listen address: {addr}");
                }
                if database_path.trim().is_empty() {
                    anyhow::bail!("database_path must not be empty");
                }
            }
        }
        Ok(())
    }

    /// Predictor settings: the override file when given, otherwise defaults.
    pub fn load_predictor_config(&self) -> anyhow::Result<PredictorConfig> {
        match &self.predictor_config {
            Some(path) => PredictorConfig::from_file(path),
            None => Ok(PredictorConfig::default()),
        }
    }
}
