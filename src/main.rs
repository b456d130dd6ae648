use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use matchday_predictor::api::{self, AppState};
use matchday_predictor::config::{Command, Config};
use matchday_predictor::db::Database;
use matchday_predictor::engine::classifier::recommendation_summary;
use matchday_predictor::models::{Fixture, MatchPrediction};
use matchday_predictor::source::{SnapshotProvider, StatsProvider};
use matchday_predictor::{predict_batch, Predictor};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let predictor = Predictor::new(config.load_predictor_config()?)?;
    if config.predictor_config.is_some() {
        info!("Using predictor weights {:?}", predictor.config().weights);
    }

    match config.command {
        Command::Predict { input, json } => {
            let raw = read_json(&input)?;
            let fixture = Fixture::from_value(&raw, "")?;
            let prediction = predictor.predict_fixture(&fixture);
            if json {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            } else {
                print_summary(&fixture, &prediction);
            }
        }
        Command::Batch { input } => {
            let raw = read_json(&input)?;
            let fixtures = Fixture::list_from_value(&raw)?;
            let predictions = predict_batch(&predictor, &fixtures);
            println!("{}", serde_json::to_string_pretty(&predictions)?);
        }
        Command::Serve {
            addr,
            database_path,
            snapshot,
        } => {
            let db = Database::open(&database_path)?;
            info!("Database opened: {}", database_path);

            let provider = SnapshotProvider::open(&snapshot)?;
            info!("Stats provider: {}", provider.name());

            let state = AppState {
                db,
                predictor: Arc::new(predictor),
                provider: Arc::new(provider),
            };
            let app = api::router(state);
            let addr: SocketAddr = addr.parse()?;
            info!("Prediction API listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;

            // Run API server (blocks until shutdown)
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_summary(fixture: &Fixture, p: &MatchPrediction) {
    let pct = p.percentages();
    println!("{} vs {}", fixture.home.name, fixture.away.name);
    println!(
        "  1X2          {:>5.1}% / {:>5.1}% / {:>5.1}%",
        pct.home_win, pct.draw, pct.away_win
    );
    println!(
        "  Over/Under   {:>5.1}% / {:>5.1}%  (2.5 goals, xG {:.2} + {:.2})",
        pct.over_2_5, pct.under_2_5, p.expected_home_goals, p.expected_away_goals
    );
    println!("  BTTS         {:>5.1}%", pct.both_teams_score);
    println!("  Risk         {}", p.risk_level);
    println!("  Tip          {}", recommendation_summary(&p.recommendation));
}
