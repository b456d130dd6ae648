//! Weighted combination of feature scores into home/draw/away probabilities.
//!
//! Each side gets a strength in [0, 1] from a fixed weight vector. The draw
//! absorbs whatever strength is left after both sides, and the three values
//! are normalized to sum to exactly 1.

use serde::{Deserialize, Serialize};

use super::features::FeatureBreakdown;
use crate::error::ValidationError;

/// Tolerance for the weight vector summing to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Relative importance of each signal. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub form: f64,
    pub h2h: f64,
    pub home_advantage: f64,
    pub goals: f64,
    pub defense: f64,
    pub streak: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            form: 0.25,
            h2h: 0.15,
            home_advantage: 0.10,
            goals: 0.25,
            defense: 0.15,
            streak: 0.10,
        }
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.form + self.h2h + self.home_advantage + self.goals + self.defense + self.streak
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("weights.form", self.form),
            ("weights.h2h", self.h2h),
            ("weights.home_advantage", self.home_advantage),
            ("weights.goals", self.goals),
            ("weights.defense", self.defense),
            ("weights.streak", self.streak),
        ];
        for (field, w) in fields {
            if !w.is_finite() || w < 0.0 {
                return Err(ValidationError::OutOfRange {
                    field: field.into(),
                    reason: format!("weight must be a non-negative number, got {w}"),
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidationError::WeightSum { sum });
        }
        Ok(())
    }
}

/// Structural home-advantage prior, split between the two sides.
///
/// This is a constant bias, independent of the team data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeAdvantage {
    pub home_share: f64,
    pub away_share: f64,
}

impl Default for HomeAdvantage {
    fn default() -> Self {
        HomeAdvantage {
            home_share: 0.55,
            away_share: 0.45,
        }
    }
}

/// Un-normalized side strengths, after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawScores {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeProbabilities {
    pub fn uniform() -> Self {
        OutcomeProbabilities {
            home: 1.0 / 3.0,
            draw: 1.0 / 3.0,
            away: 1.0 / 3.0,
        }
    }

    pub fn max(&self) -> f64 {
        self.home.max(self.draw).max(self.away)
    }
}

/// Side strengths before normalization.
///
/// The defense term uses the opponent's leakiness inverted, per the
/// "1 - defense" convention in [`super::features`].
pub fn raw_scores(f: &FeatureBreakdown, w: &Weights, adv: &HomeAdvantage) -> RawScores {
    let home = f.form_home * w.form
        + f.h2h_home * w.h2h
        + adv.home_share * w.home_advantage
        + f.scoring_home * w.goals
        + (1.0 - f.defense_away) * w.defense
        + f.streak_home * w.streak;

    let away = f.form_away * w.form
        + f.h2h_away * w.h2h
        + adv.away_share * w.home_advantage
        + f.scoring_away * w.goals
        + (1.0 - f.defense_home) * w.defense
        + f.streak_away * w.streak;

    let draw = 1.0 - home - away;

    RawScores {
        home: home.clamp(0.0, 1.0),
        draw: draw.clamp(0.0, 1.0),
        away: away.clamp(0.0, 1.0),
    }
}

/// Scale raw scores to sum to one; all-zero input falls back to uniform.
pub fn normalize(raw: RawScores) -> OutcomeProbabilities {
    let sum = raw.home + raw.draw + raw.away;
    if !sum.is_finite() || sum <= 0.0 {
        return OutcomeProbabilities::uniform();
    }
    OutcomeProbabilities {
        home: raw.home / sum,
        draw: raw.draw / sum,
        away: raw.away / sum,
    }
}

pub fn combine(f: &FeatureBreakdown, w: &Weights, adv: &HomeAdvantage) -> OutcomeProbabilities {
    normalize(raw_scores(f, w, adv))
}
