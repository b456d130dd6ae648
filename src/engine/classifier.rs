//! Risk rating and tagged findings.
//!
//! Both are stateless decision tables over the final probabilities. Findings
//! are structured so a presentation layer can format or localize them;
//! [`recommendation_summary`] is a plain English rendering for logs and the CLI.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::combiner::OutcomeProbabilities;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        };
        f.write_str(s)
    }
}

/// Confidence in the favourite; the mirror image of the risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl From<RiskLevel> for Confidence {
    fn from(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::Low => Confidence::High,
            RiskLevel::Medium => Confidence::Medium,
            RiskLevel::High => Confidence::Low,
        }
    }
}

/// Cut-offs for the risk table, on (max outcome probability, form gap).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBands {
    pub low_min_prob: f64,
    pub low_min_form_gap: f64,
    pub medium_min_prob: f64,
    pub medium_min_form_gap: f64,
    /// Any favourite at least this likely is medium risk regardless of form.
    pub medium_floor_prob: f64,
}

impl Default for RiskBands {
    fn default() -> Self {
        RiskBands {
            low_min_prob: 0.65,
            low_min_form_gap: 0.20,
            medium_min_prob: 0.55,
            medium_min_form_gap: 0.15,
            medium_floor_prob: 0.50,
        }
    }
}

pub fn assess_risk(max_prob: f64, form_gap: f64, bands: &RiskBands) -> RiskLevel {
    if max_prob >= bands.low_min_prob && form_gap >= bands.low_min_form_gap {
        RiskLevel::Low
    } else if (max_prob >= bands.medium_min_prob && form_gap >= bands.medium_min_form_gap)
        || max_prob >= bands.medium_floor_prob
    {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    Outcome,
    Goals,
    Btts,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    HomeWin,
    AwayWin,
    Draw,
    Over,
    Under,
    BothTeamsScore,
    TooCloseToCall,
}

impl FindingKind {
    pub fn category(self) -> FindingCategory {
        match self {
            FindingKind::HomeWin | FindingKind::AwayWin | FindingKind::Draw => {
                FindingCategory::Outcome
            }
            FindingKind::Over | FindingKind::Under => FindingCategory::Goals,
            FindingKind::BothTeamsScore => FindingCategory::Btts,
            FindingKind::TooCloseToCall => FindingCategory::Warning,
        }
    }
}

/// One signal that crossed its threshold.
///
/// `probability` is the probability of the named outcome; for the
/// too-close-to-call warning it is the gap between home and away.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub category: FindingCategory,
    pub kind: FindingKind,
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<f64>,
}

impl Finding {
    fn new(kind: FindingKind, probability: f64) -> Self {
        Finding {
            category: kind.category(),
            kind,
            probability,
            line: None,
        }
    }

    fn at_line(kind: FindingKind, probability: f64, line: f64) -> Self {
        Finding {
            line: Some(line),
            ..Finding::new(kind, probability)
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = (self.probability * 100.0).round();
        let line = self.line.unwrap_or(2.5);
        match self.kind {
            FindingKind::HomeWin => write!(f, "Home win {pct}%"),
            FindingKind::AwayWin => write!(f, "Away win {pct}%"),
            FindingKind::Draw => write!(f, "Draw {pct}%"),
            FindingKind::Over => write!(f, "Over {line} goals {pct}%"),
            FindingKind::Under => write!(f, "Under {line} goals {pct}%"),
            FindingKind::BothTeamsScore => write!(f, "Both teams to score {pct}%"),
            FindingKind::TooCloseToCall => write!(f, "Too close to call (gap {pct}%)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FindingThresholds {
    pub favourite: f64,
    pub draw_favourite: f64,
    pub over: f64,
    pub under: f64,
    pub both_teams_score: f64,
    pub too_close: f64,
}

impl Default for FindingThresholds {
    fn default() -> Self {
        FindingThresholds {
            favourite: 0.55,
            draw_favourite: 0.35,
            over: 0.60,
            under: 0.40,
            both_teams_score: 0.60,
            too_close: 0.05,
        }
    }
}

/// Evaluate every finding independently, in outcome/goals/btts/warning order.
pub fn build_findings(
    outcome: &OutcomeProbabilities,
    over_2_5: f64,
    under_2_5: f64,
    both_teams_score: f64,
    t: &FindingThresholds,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    if outcome.home > t.favourite {
        findings.push(Finding::new(FindingKind::HomeWin, outcome.home));
    } else if outcome.away > t.favourite {
        findings.push(Finding::new(FindingKind::AwayWin, outcome.away));
    } else if outcome.draw > t.draw_favourite {
        findings.push(Finding::new(FindingKind::Draw, outcome.draw));
    }

    if over_2_5 > t.over {
        findings.push(Finding::at_line(FindingKind::Over, over_2_5, 2.5));
    } else if over_2_5 < t.under {
        findings.push(Finding::at_line(FindingKind::Under, under_2_5, 2.5));
    }

    if both_teams_score > t.both_teams_score {
        findings.push(Finding::new(FindingKind::BothTeamsScore, both_teams_score));
    }

    let gap = (outcome.home - outcome.away).abs();
    if gap < t.too_close {
        findings.push(Finding::new(FindingKind::TooCloseToCall, gap));
    }

    findings
}

pub fn recommendation_summary(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "Mixed match".to_string();
    }
    findings
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(home: f64, draw: f64, away: f64) -> OutcomeProbabilities {
        OutcomeProbabilities { home, draw, away }
    }

    #[test]
    fn risk_table() {
        let b = RiskBands::default();
        assert_eq!(assess_risk(0.70, 0.25, &b), RiskLevel::Low);
        // strong favourite without a form gap is only medium
        assert_eq!(assess_risk(0.70, 0.05, &b), RiskLevel::Medium);
        assert_eq!(assess_risk(0.56, 0.16, &b), RiskLevel::Medium);
        assert_eq!(assess_risk(0.52, 0.0, &b), RiskLevel::Medium);
        assert_eq!(assess_risk(0.49, 0.30, &b), RiskLevel::High);
    }

    #[test]
    fn risk_bands_are_inclusive() {
        let b = RiskBands::default();
        assert_eq!(assess_risk(0.65, 0.20, &b), RiskLevel::Low);
        assert_eq!(assess_risk(0.50, 0.0, &b), RiskLevel::Medium);
    }

    #[test]
    fn confidence_mirrors_risk() {
        assert_eq!(Confidence::from(RiskLevel::Low), Confidence::High);
        assert_eq!(Confidence::from(RiskLevel::High), Confidence::Low);
    }

    #[test]
    fn home_favourite_and_goal_signals() {
        let f = build_findings(
            &outcome(0.6, 0.0, 0.4),
            0.75,
            0.25,
            0.7,
            &FindingThresholds::default(),
        );
        let kinds: Vec<_> = f.iter().map(|x| x.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FindingKind::HomeWin,
                FindingKind::Over,
                FindingKind::BothTeamsScore
            ]
        );
        assert_eq!(f[1].category, FindingCategory::Goals);
        assert_eq!(f[1].line, Some(2.5));
    }

    #[test]
    fn under_signal_carries_under_probability() {
        let f = build_findings(
            &outcome(0.3, 0.4, 0.3),
            0.2,
            0.8,
            0.1,
            &FindingThresholds::default(),
        );
        let under = f.iter().find(|x| x.kind == FindingKind::Under).unwrap();
        assert_eq!(under.probability, 0.8);
        // draw favourite and a dead-even split
        assert!(f.iter().any(|x| x.kind == FindingKind::Draw));
        assert!(f.iter().any(|x| x.kind == FindingKind::TooCloseToCall));
    }

    #[test]
    fn nothing_fires_for_a_middling_match() {
        let f = build_findings(
            &outcome(0.45, 0.2, 0.35),
            0.5,
            0.5,
            0.5,
            &FindingThresholds::default(),
        );
        assert!(f.is_empty());
        assert_eq!(recommendation_summary(&f), "Mixed match");
    }

    #[test]
    fn summary_joins_findings() {
        let f = build_findings(
            &outcome(0.6, 0.0, 0.4),
            0.75,
            0.25,
            0.2,
            &FindingThresholds::default(),
        );
        assert_eq!(recommendation_summary(&f), "Home win 60% | Over 2.5 goals 75%");
    }

    #[test]
    fn findings_serialize_with_tags() {
        let f = Finding::new(FindingKind::BothTeamsScore, 0.64);
        let json = serde_json::to_value(f).unwrap();
        assert_eq!(json["category"], "btts");
        assert_eq!(json["kind"], "both_teams_score");
        assert!(json.get("line").is_none());
    }
}
