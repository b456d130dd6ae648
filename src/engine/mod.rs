//! Match outcome predictor.
//!
//! `(home form, away form, head-to-head) -> MatchPrediction`, as a pure
//! computation. A [`Predictor`] holds only immutable configuration, so one
//! instance can be shared freely across threads.

pub mod classifier;
pub mod combiner;
pub mod features;
pub mod goals;

use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::models::{Fixture, HeadToHead, MatchPrediction, TeamForm};

use classifier::{assess_risk, build_findings, FindingThresholds, RiskBands};
use combiner::{combine, HomeAdvantage, Weights};
use features::{FeatureBreakdown, StreakTable, TeamTiers};
use goals::{LineClamp, DEFAULT_LINES, MAX_GOAL_LINE};

/// Every tunable constant of the predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub weights: Weights,
    pub home_advantage: HomeAdvantage,
    pub streaks: StreakTable,
    pub line_clamp: LineClamp,
    pub goal_lines: Vec<f64>,
    pub risk: RiskBands,
    pub findings: FindingThresholds,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        PredictorConfig {
            weights: Weights::default(),
            home_advantage: HomeAdvantage::default(),
            streaks: StreakTable::default(),
            line_clamp: LineClamp::default(),
            goal_lines: DEFAULT_LINES.to_vec(),
            risk: RiskBands::default(),
            findings: FindingThresholds::default(),
        }
    }
}

impl PredictorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.weights.validate()?;
        self.line_clamp.validate()?;
        for (i, line) in self.goal_lines.iter().enumerate() {
            if !line.is_finite() || *line < 0.0 || *line > MAX_GOAL_LINE {
                return Err(ValidationError::OutOfRange {
                    field: format!("goal_lines[{i}]"),
                    reason: format!("line must be between 0 and {MAX_GOAL_LINE}, got {line}"),
                });
            }
        }
        Ok(())
    }

    /// Load a JSON config file; omitted sections keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading predictor config {}", path.display()))?;
        let config: PredictorConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing predictor config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Predictor {
    config: PredictorConfig,
}

impl Predictor {
    pub fn new(config: PredictorConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Predictor { config })
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn predict(&self, home: &TeamForm, away: &TeamForm, h2h: &HeadToHead) -> MatchPrediction {
        let cfg = &self.config;

        let breakdown = FeatureBreakdown::extract(home, away, h2h, &cfg.streaks);
        let outcome = combine(&breakdown, &cfg.weights, &cfg.home_advantage);
        let goals = goals::estimate(
            breakdown.goals_for_avg_home,
            breakdown.goals_for_avg_away,
            &cfg.line_clamp,
            &cfg.goal_lines,
        );

        let risk_level = assess_risk(outcome.max(), breakdown.form_gap(), &cfg.risk);
        let recommendation = build_findings(
            &outcome,
            goals.over_2_5,
            goals.under_2_5,
            goals.both_teams_score,
            &cfg.findings,
        );

        debug!(
            home = %home.name,
            away = %away.name,
            lambda = goals.expected_total_goals,
            p_home = outcome.home,
            p_draw = outcome.draw,
            p_away = outcome.away,
            risk = %risk_level,
            "prediction computed"
        );

        MatchPrediction {
            home_win_prob: outcome.home,
            draw_prob: outcome.draw,
            away_win_prob: outcome.away,
            over_2_5_prob: goals.over_2_5,
            under_2_5_prob: goals.under_2_5,
            both_teams_score_prob: goals.both_teams_score,
            expected_home_goals: goals.expected_home_goals,
            expected_away_goals: goals.expected_away_goals,
            risk_level,
            confidence: risk_level.into(),
            recommendation,
            goal_lines: goals.lines,
            feature_breakdown: breakdown,
            home_tiers: TeamTiers::of(home),
            away_tiers: TeamTiers::of(away),
        }
    }

    pub fn predict_fixture(&self, fixture: &Fixture) -> MatchPrediction {
        self.predict(&fixture.home, &fixture.away, &fixture.h2h)
    }
}

/// Predict with the default configuration.
pub fn predict(home: &TeamForm, away: &TeamForm, h2h: &HeadToHead) -> MatchPrediction {
    Predictor::default().predict(home, away, h2h)
}

/// Predict many fixtures in parallel. Output order matches input order.
pub fn predict_batch(predictor: &Predictor, fixtures: &[Fixture]) -> Vec<MatchPrediction> {
    info!("Predicting batch of {} fixture(s)", fixtures.len());
    fixtures
        .par_iter()
        .map(|f| predictor.predict_fixture(f))
        .collect()
}
