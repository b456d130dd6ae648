//! Per-team and per-fixture feature extractors.
//!
//! Every extractor is a pure function returning a score in [0, 1] and falls
//! back to a neutral value when there is no history to divide by.
//!
//! Convention: the defense score measures *leakiness* (goals conceded per game
//! scaled to 2.5), so lower is stronger. Anything combining it as a goodness
//! signal must use `1 - defense`.

use serde::{Deserialize, Serialize};

use crate::models::{HeadToHead, MatchResult, TeamForm};

/// Score returned whenever there is nothing to measure.
pub const NEUTRAL: f64 = 0.5;

/// Goals per game at which scoring power saturates.
const SCORING_SATURATION: f64 = 3.0;
/// Goals conceded per game at which a defense is rated as fully leaky.
const DEFENSE_SATURATION: f64 = 2.5;
/// Only this many of the most recent results feed the streak score.
pub const STREAK_WINDOW: usize = 3;

// ── Form ─────────────────────────────────────────────────────────────────────

/// Points-per-game rate on the 3-1-0 scale.
pub fn form_score(wins: u32, draws: u32, losses: u32) -> f64 {
    let games = wins as f64 + draws as f64 + losses as f64;
    if games == 0.0 {
        return NEUTRAL;
    }
    let points = 3.0 * wins as f64 + draws as f64;
    (points / (3.0 * games)).clamp(0.0, 1.0)
}

// ── Streak ───────────────────────────────────────────────────────────────────

/// Lookup table mapping the last few results to a momentum score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreakTable {
    /// Every result in the window is a win.
    pub all_wins: f64,
    /// Two wins, no losses.
    pub two_wins_unbeaten: f64,
    /// One win, no losses.
    pub one_win_unbeaten: f64,
    /// At least one win, but losses too.
    pub mixed: f64,
    /// No wins, indexed by the number of losses in the window.
    pub winless: [f64; STREAK_WINDOW + 1],
}

impl Default for StreakTable {
    fn default() -> Self {
        StreakTable {
            all_wins: 0.9,
            two_wins_unbeaten: 0.75,
            one_win_unbeaten: 0.6,
            mixed: 0.5,
            winless: [0.3, 0.25, 0.2, 0.1],
        }
    }
}

/// Momentum from the most recent results (most recent first).
///
/// Windows shorter than three games are scored by the same counts, so a lone
/// win reads as "one win, unbeaten".
pub fn streak_score(recent: &[MatchResult], table: &StreakTable) -> f64 {
    let window = &recent[..recent.len().min(STREAK_WINDOW)];
    if window.is_empty() {
        return NEUTRAL;
    }
    let wins = window.iter().filter(|r| **r == MatchResult::Win).count();
    let losses = window.iter().filter(|r| **r == MatchResult::Loss).count();

    match (wins, losses) {
        (w, _) if w == STREAK_WINDOW => table.all_wins,
        (2, 0) => table.two_wins_unbeaten,
        (1, 0) => table.one_win_unbeaten,
        (w, _) if w > 0 => table.mixed,
        (_, l) => table.winless[l.min(STREAK_WINDOW)],
    }
}

// ── Goals & defense ──────────────────────────────────────────────────────────

/// Per-game goal averages for one team.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalRates {
    pub goals_for_avg: f64,
    pub goals_against_avg: f64,
}

impl GoalRates {
    pub fn of(team: &TeamForm) -> Self {
        let games = team.games_played().max(1) as f64;
        GoalRates {
            goals_for_avg: team.goals_for as f64 / games,
            goals_against_avg: team.goals_against as f64 / games,
        }
    }
}

/// Attacking output in [0, 1]; three goals a game saturates.
pub fn scoring_power(goals_for_avg: f64) -> f64 {
    (goals_for_avg / SCORING_SATURATION).clamp(0.0, 1.0)
}

/// Defensive leakiness in [0, 1]; lower is a stronger defense.
pub fn defense_strength(goals_against_avg: f64) -> f64 {
    (goals_against_avg / DEFENSE_SATURATION).clamp(0.0, 1.0)
}

// ── Head-to-head ─────────────────────────────────────────────────────────────

/// Head-to-head credit for each side.
///
/// Draws count toward both numerators, so `home + away` is not 1 in general.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct H2hScores {
    pub home: f64,
    pub away: f64,
    pub draw_rate: f64,
}

pub fn h2h_scores(h2h: &HeadToHead) -> H2hScores {
    let total = h2h.total() as f64;
    if total == 0.0 {
        return H2hScores {
            home: NEUTRAL,
            away: NEUTRAL,
            draw_rate: 0.0,
        };
    }
    let draws = h2h.draws as f64;
    H2hScores {
        home: ((3.0 * h2h.home_wins as f64 + draws) / (3.0 * total)).clamp(0.0, 1.0),
        away: ((3.0 * h2h.away_wins as f64 + draws) / (3.0 * total)).clamp(0.0, 1.0),
        draw_rate: draws / total,
    }
}

// ── Breakdown ────────────────────────────────────────────────────────────────

/// All intermediate sub-scores of one prediction, kept for auditing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureBreakdown {
    pub form_home: f64,
    pub form_away: f64,
    pub h2h_home: f64,
    pub h2h_away: f64,
    pub h2h_draw_rate: f64,
    pub scoring_home: f64,
    pub scoring_away: f64,
    pub defense_home: f64,
    pub defense_away: f64,
    pub streak_home: f64,
    pub streak_away: f64,
    pub goals_for_avg_home: f64,
    pub goals_for_avg_away: f64,
    pub goals_against_avg_home: f64,
    pub goals_against_avg_away: f64,
}

impl FeatureBreakdown {
    pub fn extract(
        home: &TeamForm,
        away: &TeamForm,
        h2h: &HeadToHead,
        streaks: &StreakTable,
    ) -> Self {
        let home_rates = GoalRates::of(home);
        let away_rates = GoalRates::of(away);
        let h2h = h2h_scores(h2h);
        FeatureBreakdown {
            form_home: form_score(home.wins, home.draws, home.losses),
            form_away: form_score(away.wins, away.draws, away.losses),
            h2h_home: h2h.home,
            h2h_away: h2h.away,
            h2h_draw_rate: h2h.draw_rate,
            scoring_home: scoring_power(home_rates.goals_for_avg),
            scoring_away: scoring_power(away_rates.goals_for_avg),
            defense_home: defense_strength(home_rates.goals_against_avg),
            defense_away: defense_strength(away_rates.goals_against_avg),
            streak_home: streak_score(&home.recent_results, streaks),
            streak_away: streak_score(&away.recent_results, streaks),
            goals_for_avg_home: home_rates.goals_for_avg,
            goals_for_avg_away: away_rates.goals_for_avg,
            goals_against_avg_home: home_rates.goals_against_avg,
            goals_against_avg_away: away_rates.goals_against_avg,
        }
    }

    pub fn form_gap(&self) -> f64 {
        (self.form_home - self.form_away).abs()
    }
}

// ── Qualitative tiers ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringTier {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl ScoringTier {
    pub fn from_avg(goals_for_avg: f64) -> Self {
        match goals_for_avg {
            g if g >= 2.5 => ScoringTier::VeryHigh,
            g if g >= 1.8 => ScoringTier::High,
            g if g >= 1.2 => ScoringTier::Medium,
            g if g >= 0.8 => ScoringTier::Low,
            _ => ScoringTier::VeryLow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseTier {
    Fortress,
    Strong,
    Average,
    Weak,
    VeryWeak,
}

impl DefenseTier {
    pub fn from_avg(goals_against_avg: f64) -> Self {
        match goals_against_avg {
            g if g <= 0.8 => DefenseTier::Fortress,
            g if g <= 1.2 => DefenseTier::Strong,
            g if g <= 1.6 => DefenseTier::Average,
            g if g <= 2.0 => DefenseTier::Weak,
            _ => DefenseTier::VeryWeak,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTiers {
    pub scoring: ScoringTier,
    pub defense: DefenseTier,
}

impl TeamTiers {
    pub fn of(team: &TeamForm) -> Self {
        let rates = GoalRates::of(team);
        TeamTiers {
            scoring: ScoringTier::from_avg(rates.goals_for_avg),
            defense: DefenseTier::from_avg(rates.goals_against_avg),
        }
    }
}
