use approx::assert_relative_eq;

use matchday_predictor::engine::classifier::{FindingCategory, FindingKind, RiskLevel};
use matchday_predictor::engine::features::{form_score, h2h_scores};
use matchday_predictor::{predict, HeadToHead, MatchResult, TeamForm};

use MatchResult::{Draw as D, Loss as L, Win as W};

fn team(
    wins: u32,
    draws: u32,
    losses: u32,
    goals_for: u32,
    goals_against: u32,
    recent: &[MatchResult],
) -> TeamForm {
    TeamForm {
        name: "Team".to_string(),
        wins,
        draws,
        losses,
        goals_for,
        goals_against,
        recent_results: recent.to_vec(),
    }
}

fn h2h(home_wins: u32, away_wins: u32, draws: u32) -> HeadToHead {
    HeadToHead {
        home_wins,
        away_wins,
        draws,
    }
}

/// A spread of teams from empty history to dominant.
fn sample_teams() -> Vec<TeamForm> {
    vec![
        team(0, 0, 0, 0, 0, &[]),
        team(4, 1, 1, 15, 6, &[W, W, D, W, L]),
        team(2, 1, 2, 8, 10, &[W, D, L, W, L]),
        team(0, 2, 3, 2, 9, &[L, D, L]),
        team(10, 0, 0, 40, 2, &[W, W, W]),
        team(0, 0, 10, 1, 35, &[L, L, L, L]),
        team(0, 0, 0, 7, 3, &[D]),
    ]
}

fn sample_h2h() -> Vec<HeadToHead> {
    vec![h2h(0, 0, 0), h2h(3, 1, 1), h2h(0, 6, 0), h2h(2, 2, 8)]
}

#[test]
fn outcome_probabilities_always_sum_to_one() {
    for home in sample_teams() {
        for away in sample_teams() {
            for record in sample_h2h() {
                let p = predict(&home, &away, &record);
                let sum = p.home_win_prob + p.draw_prob + p.away_win_prob;
                assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
            }
        }
    }
}

#[test]
fn over_and_under_are_exact_complements() {
    for home in sample_teams() {
        for away in sample_teams() {
            let p = predict(&home, &away, &HeadToHead::default());
            assert_relative_eq!(p.over_2_5_prob + p.under_2_5_prob, 1.0, epsilon = 1e-12);
            for line in &p.goal_lines {
                assert_relative_eq!(line.over + line.under, 1.0, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn every_probability_is_bounded() {
    for home in sample_teams() {
        for away in sample_teams() {
            for record in sample_h2h() {
                let p = predict(&home, &away, &record);
                for v in [
                    p.home_win_prob,
                    p.draw_prob,
                    p.away_win_prob,
                    p.both_teams_score_prob,
                ] {
                    assert!((0.0..=1.0).contains(&v), "out of range: {v}");
                }
                for v in [p.over_2_5_prob, p.under_2_5_prob] {
                    assert!(v >= 0.1 - 1e-12 && v <= 0.9 + 1e-12, "outside clamp: {v}");
                }
                assert!(p.expected_home_goals >= 0.0);
                assert!(p.expected_away_goals >= 0.0);
            }
        }
    }
}

#[test]
fn neutral_defaults_without_history() {
    assert_relative_eq!(form_score(0, 0, 0), 0.5);
    let s = h2h_scores(&HeadToHead::default());
    assert_relative_eq!(s.home, 0.5);
    assert_relative_eq!(s.away, 0.5);
}

#[test]
fn extra_home_wins_at_fixed_goal_rates_never_lower_home_probability() {
    let away = team(2, 1, 2, 8, 10, &[W, D, L]);
    let record = h2h(1, 1, 1);

    // no goals recorded: only form moves
    let mut prev = 0.0;
    for wins in 0..30 {
        let home = team(wins, 1, 1, 0, 0, &[W, D, L]);
        let p = predict(&home, &away, &record).home_win_prob;
        assert!(p >= prev - 1e-12, "wins={wins}: {p} < {prev}");
        prev = p;
    }

    // goals scaled with games so per-game averages stay fixed
    let mut prev = 0.0;
    for wins in 0..30 {
        let games = wins + 2;
        let home = team(wins, 1, 1, 2 * games, games, &[W, D, L]);
        let p = predict(&home, &away, &record).home_win_prob;
        assert!(p >= prev - 1e-12, "wins={wins}: {p} < {prev}");
        prev = p;
    }
}

#[test]
fn scenario_stronger_home_side() {
    let home = team(4, 1, 1, 15, 6, &[W, W, D, W, L]);
    let away = team(2, 1, 2, 8, 10, &[W, D, L, W, L]);
    let p = predict(&home, &away, &h2h(3, 1, 1));

    assert!(p.home_win_prob > p.away_win_prob);
    assert!(matches!(p.risk_level, RiskLevel::Low | RiskLevel::Medium));

    // strengths 0.648889 / 0.475 overflow, so the draw gets nothing
    assert_relative_eq!(p.home_win_prob, 0.648889 / 1.123889, epsilon = 1e-5);
    assert_relative_eq!(p.draw_prob, 0.0);
    assert_eq!(p.recommendation[0].kind, FindingKind::HomeWin);
}

#[test]
fn scenario_symmetric_weak_sides_favour_the_draw() {
    let side = team(0, 2, 3, 2, 9, &[L, D, L]);
    let p = predict(&side, &side, &HeadToHead::default());

    assert!(p.draw_prob > p.home_win_prob);
    assert!(p.draw_prob > p.away_win_prob);
    // the only asymmetry left is the home-advantage prior
    assert_relative_eq!(p.home_win_prob - p.away_win_prob, 0.01, epsilon = 1e-9);
    assert_eq!(p.favourite().0, matchday_predictor::models::Outcome::Draw);
}

#[test]
fn scenario_symmetric_strong_sides_are_too_close_to_call() {
    let side = team(4, 1, 1, 15, 6, &[W, W, D]);
    let p = predict(&side, &side, &HeadToHead::default());

    assert!(p.home_win_prob > p.away_win_prob);
    assert!(p.home_win_prob - p.away_win_prob < 0.05);
    assert!(p
        .recommendation
        .iter()
        .any(|f| f.kind == FindingKind::TooCloseToCall && f.category == FindingCategory::Warning));
}

#[test]
fn scenario_no_history_at_all() {
    let empty = team(0, 0, 0, 0, 0, &[]);
    let p = predict(&empty, &empty, &HeadToHead::default());

    assert_relative_eq!(p.home_win_prob, 0.455, epsilon = 1e-9);
    assert_relative_eq!(p.draw_prob, 0.10, epsilon = 1e-9);
    assert_relative_eq!(p.away_win_prob, 0.445, epsilon = 1e-9);
    assert_eq!(p.risk_level, RiskLevel::High);

    // no goals recorded: the 2.5 line sits on its floor
    assert_relative_eq!(p.over_2_5_prob, 0.1);
    assert_relative_eq!(p.both_teams_score_prob, 0.0);
    assert_relative_eq!(p.feature_breakdown.form_home, 0.5);
    assert_relative_eq!(p.feature_breakdown.streak_away, 0.5);
}

#[test]
fn prediction_serializes_to_json() {
    let home = team(4, 1, 1, 15, 6, &[W, W, D, W, L]);
    let away = team(2, 1, 2, 8, 10, &[W, D, L, W, L]);
    let p = predict(&home, &away, &h2h(3, 1, 1));
    let json = serde_json::to_value(&p).unwrap();

    assert!(json["home_win_prob"].is_f64());
    assert_eq!(json["risk_level"], "MEDIUM");
    assert_eq!(json["recommendation"][0]["category"], "outcome");
    assert!(json["feature_breakdown"]["form_home"].is_f64());
}
