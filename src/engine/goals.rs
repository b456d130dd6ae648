//! Goal-count distribution from a Poisson approximation.
//!
//! The match total is modelled as Poisson with rate λ = home goals-for average
//! plus away goals-for average. That additive rate is a simplification, not a
//! bivariate model. Over/under lines subtract the truncated CDF from one and
//! are clamped to a calibration band so the model never claims certainty.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lines reported alongside the headline 2.5 market.
pub const DEFAULT_LINES: [f64; 5] = [0.5, 1.5, 2.5, 3.5, 4.5];

/// Highest goal line a configuration may ask for.
pub const MAX_GOAL_LINE: f64 = 20.5;

/// Floor and ceiling applied to every over/under probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineClamp {
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for LineClamp {
    fn default() -> Self {
        LineClamp {
            floor: 0.10,
            ceiling: 0.90,
        }
    }
}

impl LineClamp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let ok = (0.0..=1.0).contains(&self.floor)
            && (0.0..=1.0).contains(&self.ceiling)
            && self.floor <= self.ceiling;
        if ok {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field: "line_clamp".into(),
                reason: format!(
                    "need 0 <= floor <= ceiling <= 1, got [{}, {}]",
                    self.floor, self.ceiling
                ),
            })
        }
    }

    fn apply(&self, p: f64) -> f64 {
        p.clamp(self.floor, self.ceiling)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalLine {
    pub line: f64,
    pub over: f64,
    pub under: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalMarkets {
    pub expected_home_goals: f64,
    pub expected_away_goals: f64,
    pub expected_total_goals: f64,
    pub over_2_5: f64,
    pub under_2_5: f64,
    pub both_teams_score: f64,
    pub lines: Vec<GoalLine>,
}

/// P(X <= k), summed term by term without materializing the pmf.
pub fn poisson_cdf(lambda: f64, k: u32) -> f64 {
    let lambda = lambda.max(0.0);
    let mut term = (-lambda).exp();
    let mut sum = term;
    for i in 1..=k {
        term *= lambda / i as f64;
        // past the mode the remaining tail can no longer move the sum
        if term == 0.0 || (i as f64 > lambda && term < f64::EPSILON * sum) {
            break;
        }
        sum += term;
    }
    sum.min(1.0)
}

/// Unclamped probability that more than `line` goals are scored.
///
/// For a half-integer line `X.5` this is `1 - (P(0) + ... + P(X))`.
pub fn over_probability(lambda: f64, line: f64) -> f64 {
    if line < 0.0 {
        return 1.0;
    }
    let k = line.floor().min(u32::MAX as f64) as u32;
    (1.0 - poisson_cdf(lambda, k)).clamp(0.0, 1.0)
}

/// P(team scores at least once).
fn scores_at_least_once(lambda: f64) -> f64 {
    1.0 - (-lambda.max(0.0)).exp()
}

/// Build an over/under pair; `under` is the exact complement of the clamped `over`.
pub fn goal_line(lambda: f64, line: f64, clamp: &LineClamp) -> GoalLine {
    let over = clamp.apply(over_probability(lambda, line));
    GoalLine {
        line,
        over,
        under: 1.0 - over,
    }
}

/// Goal markets from each side's goals-for average.
///
/// Both-teams-to-score treats the two scoring processes as independent and
/// uses the raw averages, without any home-advantage adjustment.
pub fn estimate(
    home_goals_for_avg: f64,
    away_goals_for_avg: f64,
    clamp: &LineClamp,
    lines: &[f64],
) -> GoalMarkets {
    let lambda_home = home_goals_for_avg.max(0.0);
    let lambda_away = away_goals_for_avg.max(0.0);
    let lambda = lambda_home + lambda_away;

    let headline = goal_line(lambda, 2.5, clamp);
    let both_teams_score =
        (scores_at_least_once(lambda_home) * scores_at_least_once(lambda_away)).clamp(0.0, 1.0);

    GoalMarkets {
        expected_home_goals: lambda_home,
        expected_away_goals: lambda_away,
        expected_total_goals: lambda,
        over_2_5: headline.over,
        under_2_5: headline.under,
        both_teams_score,
        lines: lines.iter().map(|&l| goal_line(lambda, l, clamp)).collect(),
    }
}
