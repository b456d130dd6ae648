use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::MatchPrediction;

/// Settlement state of a recorded bet. `Pending` is stored as NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    Win,
    Loss,
    Pending,
}

impl BetResult {
    pub fn as_db(self) -> Option<&'static str> {
        match self {
            BetResult::Win => Some("win"),
            BetResult::Loss => Some("loss"),
            BetResult::Pending => None,
        }
    }

    pub fn from_db(raw: Option<&str>) -> Self {
        match raw {
            Some("win") => BetResult::Win,
            Some("loss") => BetResult::Loss,
            _ => BetResult::Pending,
        }
    }
}

/// A bet to record, with the prediction that motivated it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBet {
    pub home_team: String,
    pub away_team: String,
    pub prediction: MatchPrediction,
    /// Kick-off date as supplied by the caller, e.g. "2025-03-14".
    pub match_date: String,
}

/// A recorded bet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub id: i64,
    pub home_team: String,
    pub away_team: String,
    pub prediction: MatchPrediction,
    pub match_date: String,
    pub result: BetResult,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetStats {
    pub total_bets: i64,
    pub wins: i64,
    pub losses: i64,
    pub pending: i64,
    /// Wins as a percentage of all recorded bets, settled or not.
    pub win_rate: f64,
}
