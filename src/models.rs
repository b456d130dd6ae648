//! Data contract between the predictor and its callers.
//!
//! Inputs arrive as loosely-typed JSON from the data-acquisition side, so every
//! record has a `from_value` constructor that validates structure and names the
//! offending field on failure. Negative counts are not structural errors: they
//! are clamped to zero and logged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::engine::classifier::{Confidence, Finding, RiskLevel};
use crate::engine::features::{FeatureBreakdown, TeamTiers};
use crate::engine::goals::GoalLine;
use crate::error::ValidationError;

/// Outcome of a single past match, from the team's own perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl MatchResult {
    pub fn code(self) -> char {
        match self {
            MatchResult::Win => 'W',
            MatchResult::Draw => 'D',
            MatchResult::Loss => 'L',
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "W" => Some(MatchResult::Win),
            "D" => Some(MatchResult::Draw),
            "L" => Some(MatchResult::Loss),
            _ => None,
        }
    }
}

/// Aggregate form of one team over the caller's lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamForm {
    pub name: String,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    /// Most recent first.
    #[serde(default)]
    pub recent_results: Vec<MatchResult>,
}

impl TeamForm {
    pub fn games_played(&self) -> u32 {
        self.wins
            .saturating_add(self.draws)
            .saturating_add(self.losses)
    }

    /// Recent results as a compact string, e.g. `"WWDWL"`.
    pub fn form_string(&self) -> String {
        self.recent_results.iter().map(|r| r.code()).collect()
    }

    /// Validate a raw team record. `path` prefixes field names in errors.
    pub fn from_value(value: &Value, path: &str) -> Result<Self, ValidationError> {
        let obj = as_object(value, path)?;

        let name_field = join(path, "name");
        let name = match obj.get("name") {
            None | Some(Value::Null) => {
                return Err(ValidationError::MissingField { field: name_field })
            }
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => {
                return Err(ValidationError::WrongType {
                    field: name_field,
                    expected: "a string",
                    found: json_kind(other).to_string(),
                })
            }
        };

        let recent_results = match obj.get("recent_results") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let field = format!("{}[{}]", join(path, "recent_results"), i);
                    match item {
                        Value::String(s) => MatchResult::parse(s).ok_or_else(|| {
                            ValidationError::UnknownResult {
                                field,
                                found: format!("{s:?}"),
                            }
                        }),
                        other => Err(ValidationError::UnknownResult {
                            field,
                            found: json_kind(other).to_string(),
                        }),
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(ValidationError::WrongType {
                    field: join(path, "recent_results"),
                    expected: "an array",
                    found: json_kind(other).to_string(),
                })
            }
        };

        Ok(TeamForm {
            name,
            wins: read_count(obj, "wins", path)?,
            draws: read_count(obj, "draws", path)?,
            losses: read_count(obj, "losses", path)?,
            goals_for: read_count(obj, "goals_for", path)?,
            goals_against: read_count(obj, "goals_against", path)?,
            recent_results,
        })
    }
}

/// Prior meetings, oriented to the current home/away assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub home_wins: u32,
    pub away_wins: u32,
    pub draws: u32,
}

impl HeadToHead {
    pub fn total(&self) -> u32 {
        self.home_wins
            .saturating_add(self.away_wins)
            .saturating_add(self.draws)
    }

    /// Same meetings seen from the other side.
    pub fn reversed(&self) -> Self {
        HeadToHead {
            home_wins: self.away_wins,
            away_wins: self.home_wins,
            draws: self.draws,
        }
    }

    pub fn from_value(value: &Value, path: &str) -> Result<Self, ValidationError> {
        let obj = as_object(value, path)?;
        Ok(HeadToHead {
            home_wins: read_count(obj, "home_wins", path)?,
            away_wins: read_count(obj, "away_wins", path)?,
            draws: read_count(obj, "draws", path)?,
        })
    }
}

/// One match to predict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub home: TeamForm,
    pub away: TeamForm,
    #[serde(default)]
    pub h2h: HeadToHead,
}

impl Fixture {
    /// Validate `{home, away, h2h}`. A missing or null `h2h` means no prior
    /// meetings.
    pub fn from_value(value: &Value, path: &str) -> Result<Self, ValidationError> {
        let obj = as_object(value, path)?;
        let side = |key: &str| match obj.get(key) {
            None | Some(Value::Null) => Err(ValidationError::MissingField {
                field: join(path, key),
            }),
            Some(v) => Ok(v),
        };
        let home = side("home")?;
        let away = side("away")?;
        let h2h = match obj.get("h2h") {
            None | Some(Value::Null) => HeadToHead::default(),
            Some(v) => HeadToHead::from_value(v, &join(path, "h2h"))?,
        };
        Ok(Fixture {
            home: TeamForm::from_value(home, &join(path, "home"))?,
            away: TeamForm::from_value(away, &join(path, "away"))?,
            h2h,
        })
    }

    /// Validate a JSON array of fixtures; errors are indexed, e.g. `fixtures[2].home.wins`.
    pub fn list_from_value(value: &Value) -> Result<Vec<Self>, ValidationError> {
        let items = value.as_array().ok_or_else(|| ValidationError::WrongType {
            field: "fixtures".into(),
            expected: "an array",
            found: json_kind(value).to_string(),
        })?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Fixture::from_value(item, &format!("fixtures[{i}]")))
            .collect()
    }
}

/// Everything the predictor says about one fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPrediction {
    pub home_win_prob: f64,
    pub draw_prob: f64,
    pub away_win_prob: f64,
    pub over_2_5_prob: f64,
    pub under_2_5_prob: f64,
    pub both_teams_score_prob: f64,
    pub expected_home_goals: f64,
    pub expected_away_goals: f64,
    pub risk_level: RiskLevel,
    pub confidence: Confidence,
    pub recommendation: Vec<Finding>,
    pub goal_lines: Vec<GoalLine>,
    pub feature_breakdown: FeatureBreakdown,
    pub home_tiers: TeamTiers,
    pub away_tiers: TeamTiers,
}

impl MatchPrediction {
    pub fn percentages(&self) -> PercentView {
        PercentView {
            home_win: self.home_win_prob * 100.0,
            draw: self.draw_prob * 100.0,
            away_win: self.away_win_prob * 100.0,
            over_2_5: self.over_2_5_prob * 100.0,
            under_2_5: self.under_2_5_prob * 100.0,
            both_teams_score: self.both_teams_score_prob * 100.0,
        }
    }

    /// The most likely of the three match outcomes and its probability.
    pub fn favourite(&self) -> (Outcome, f64) {
        let mut best = (Outcome::Home, self.home_win_prob);
        if self.draw_prob > best.1 {
            best = (Outcome::Draw, self.draw_prob);
        }
        if self.away_win_prob > best.1 {
            best = (Outcome::Away, self.away_win_prob);
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

/// Probabilities scaled to 0–100 for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentView {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub over_2_5: f64,
    pub under_2_5: f64,
    pub both_teams_score: f64,
}

// ── JSON helpers ─────────────────────────────────────────────────────────────

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::WrongType {
        field: if path.is_empty() { "<root>".into() } else { path.to_string() },
        expected: "an object",
        found: json_kind(value).to_string(),
    })
}

fn read_count(obj: &Map<String, Value>, key: &str, path: &str) -> Result<u32, ValidationError> {
    let field = join(path, key);
    let value = match obj.get(key) {
        None | Some(Value::Null) => return Err(ValidationError::MissingField { field }),
        Some(v) => v,
    };
    let n = value.as_f64().ok_or_else(|| ValidationError::NotNumeric {
        field: field.clone(),
        found: json_kind(value).to_string(),
    })?;
    if n < 0.0 {
        warn!(field = %field, value = n, "negative count clamped to zero");
        return Ok(0);
    }
    Ok(n.min(u32::MAX as f64) as u32)
}
