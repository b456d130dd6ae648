//! Football match outcome prediction.
//!
//! The core is [`engine::predict`]: team form, head-to-head record and goal
//! statistics in, calibrated outcome and goal-market probabilities plus a risk
//! rating out. Around it sit the HTTP API, the bet ledger and the stats
//! provider contract used by the `matchday-predictor` binary.

pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod source;

pub use engine::{predict, predict_batch, Predictor, PredictorConfig};
pub use error::ValidationError;
pub use models::{Fixture, HeadToHead, MatchPrediction, MatchResult, TeamForm};
