//! Scoring and feedback derivation.
//!
//! Everything here is deterministic and rule-based: the summary is derived
//! from the session's histories alone, never generated. The formatted report
//! doubles as the fallback ending text when a scenario's score-range table
//! has no interval containing the raw total.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::session::SessionState;

// Feedback rule thresholds.
const STRONG_STANCE_MIN: usize = 2;
const TACTIC_STRENGTH_MIN: usize = 2;
const COMPLIANCE_CONCERN_MIN: usize = 2;
const PASSIVE_CONCERN_MIN: usize = 2;

/// Normalize a raw additive score to `[0,10]`, rounded to one decimal.
///
/// The best case earns one point per choice, so the scale runs from 0 to
/// `choices`. With no choices there is nothing to scale and the result is
/// the neutral midpoint 5.0.
pub fn normalized_score(raw: i32, choices: usize) -> f64 {
    if choices == 0 {
        return 5.0;
    }
    let scaled = (raw as f64 / choices as f64) * 10.0;
    (scaled.clamp(0.0, 10.0) * 10.0).round() / 10.0
}

/// Count of each distinct tactic label, in deterministic (sorted) order.
pub fn tactic_histogram(tactics: &[String]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for tactic in tactics {
        *counts.entry(tactic.clone()).or_insert(0) += 1;
    }
    counts
}

/// Performance tier over the normalized score. Inclusive on the lower
/// bound, contiguous, exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl PerformanceTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            Self::Excellent
        } else if score >= 6.0 {
            Self::Good
        } else if score >= 4.0 {
            Self::Fair
        } else {
            Self::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }

    fn encouragement(&self) -> &'static str {
        match self {
            Self::Excellent => {
                "Outstanding ethical judgment. You voiced your values clearly and held your ground."
            }
            Self::Good => {
                "Solid performance. You spoke up more often than not; keep building that habit."
            }
            Self::Fair => {
                "A mixed session. You saw the issues but hesitated to press them; practice will help."
            }
            Self::NeedsImprovement => {
                "This session leaned toward silence or compliance. Revisit the scenario and try voicing your concerns earlier."
            }
        }
    }
}

impl std::fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-choice classification of a value score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionKind {
    /// Took a firm ethical stance (`value >= 1`).
    Strong,
    /// Neutral or deferred (`value == 0`).
    Passive,
    /// Went along against the ethical position (`value < 0`).
    Compliance,
}

impl DecisionKind {
    pub fn classify(value: i32) -> Self {
        if value >= 1 {
            Self::Strong
        } else if value < 0 {
            Self::Compliance
        } else {
            Self::Passive
        }
    }
}

/// Derived analytical summary of a completed (or in-flight) session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Normalized score in `[0,10]`, one decimal place.
    pub final_score: f64,
    /// Unrounded raw sum of the value-score history.
    pub raw_score: i32,
    /// Best-case raw total (one point per choice).
    pub max_score: i32,
    /// Raw score divided by choice count, two decimal places. 0 when no
    /// choices were made.
    pub average_score: f64,
    pub tier: PerformanceTier,
    pub choices_made: usize,
    pub tactic_counts: BTreeMap<String, usize>,
    pub most_used_tactic: Option<String>,
    pub strong_decisions: usize,
    pub passive_decisions: usize,
    pub compliance_decisions: usize,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub tactic_analysis: String,
    pub choice_history: Vec<String>,
    pub score_history: Vec<i32>,
    pub tactic_history: Vec<String>,
    /// Resolved ending text, filled in by the engine once known.
    pub ending_message: Option<String>,
}

impl SessionSummary {
    pub fn from_session(session: &SessionState) -> Self {
        let raw_score = session.raw_score();
        let choices_made = session.choices_made();
        let final_score = normalized_score(raw_score, choices_made);
        let tier = PerformanceTier::from_score(final_score);
        let tactic_counts = tactic_histogram(&session.tactic_history);

        let most_used_tactic = tactic_counts
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(tactic, _)| tactic.clone());

        let mut strong_decisions = 0;
        let mut passive_decisions = 0;
        let mut compliance_decisions = 0;
        for value in &session.score_history {
            match DecisionKind::classify(*value) {
                DecisionKind::Strong => strong_decisions += 1,
                DecisionKind::Passive => passive_decisions += 1,
                DecisionKind::Compliance => compliance_decisions += 1,
            }
        }

        let average_score = if choices_made == 0 {
            0.0
        } else {
            ((raw_score as f64 / choices_made as f64) * 100.0).round() / 100.0
        };

        let strengths = derive_strengths(strong_decisions, &tactic_counts);
        let improvement_areas =
            derive_improvement_areas(passive_decisions, compliance_decisions, &tactic_counts);
        let tactic_analysis = derive_tactic_analysis(
            most_used_tactic.as_deref(),
            &tactic_counts,
            choices_made,
        );

        Self {
            final_score,
            raw_score,
            max_score: choices_made as i32,
            average_score,
            tier,
            choices_made,
            tactic_counts,
            most_used_tactic,
            strong_decisions,
            passive_decisions,
            compliance_decisions,
            strengths,
            improvement_areas,
            tactic_analysis,
            choice_history: session.choice_history.clone(),
            score_history: session.score_history.clone(),
            tactic_history: session.tactic_history.clone(),
            ending_message: None,
        }
    }

    pub fn with_ending_message(mut self, message: impl Into<String>) -> Self {
        self.ending_message = Some(message.into());
        self
    }

    /// Multi-section human-readable debrief. Used directly as the ending
    /// text when no score range matches the raw total.
    pub fn formatted_report(&self) -> String {
        let mut report = String::new();
        report.push_str("=== Session Debrief ===\n");
        report.push_str(&format!(
            "Final score: {:.1}/10 ({})\n",
            self.final_score,
            self.tier.label()
        ));
        report.push_str(&format!(
            "Points earned: {} of {} possible across {} decisions.\n\n",
            self.raw_score, self.max_score, self.choices_made
        ));
        report.push_str(&format!(
            "Decision profile: {} strong, {} passive, {} compliance.\n",
            self.strong_decisions, self.passive_decisions, self.compliance_decisions
        ));
        report.push_str(&self.tactic_analysis);
        report.push('\n');

        if !self.strengths.is_empty() {
            report.push_str("\nStrengths:\n");
            for strength in &self.strengths {
                report.push_str(&format!("- {strength}\n"));
            }
        }
        if !self.improvement_areas.is_empty() {
            report.push_str("\nAreas to work on:\n");
            for area in &self.improvement_areas {
                report.push_str(&format!("- {area}\n"));
            }
        }

        report.push('\n');
        report.push_str(self.tier.encouragement());
        report
    }
}

fn tactic_count_matching(counts: &BTreeMap<String, usize>, needle: &str) -> usize {
    counts
        .iter()
        .filter(|(tactic, _)| tactic.to_lowercase().contains(needle))
        .map(|(_, count)| *count)
        .sum()
}

fn derive_strengths(
    strong_decisions: usize,
    tactic_counts: &BTreeMap<String, usize>,
) -> Vec<String> {
    let mut strengths = Vec::new();
    if strong_decisions >= STRONG_STANCE_MIN {
        strengths.push("Consistently took a firm ethical stance under pressure.".to_string());
    }
    if tactic_count_matching(tactic_counts, "evidence") >= TACTIC_STRENGTH_MIN {
        strengths.push("Backed concerns with evidence rather than opinion.".to_string());
    }
    if tactic_count_matching(tactic_counts, "question") >= TACTIC_STRENGTH_MIN {
        strengths.push("Used probing questions to surface the ethical issue.".to_string());
    }
    if tactic_count_matching(tactic_counts, "empath") >= TACTIC_STRENGTH_MIN {
        strengths.push("Framed objections around their impact on people.".to_string());
    }
    strengths
}

fn derive_improvement_areas(
    passive_decisions: usize,
    compliance_decisions: usize,
    tactic_counts: &BTreeMap<String, usize>,
) -> Vec<String> {
    let mut areas = Vec::new();
    if compliance_decisions >= COMPLIANCE_CONCERN_MIN {
        areas.push(
            "Several choices deferred to authority against the ethical position; practice holding your ground."
                .to_string(),
        );
    }
    if passive_decisions >= PASSIVE_CONCERN_MIN {
        areas.push("Often stayed neutral when a firmer stance was available.".to_string());
    }
    if tactic_count_matching(tactic_counts, "evidence") == 0 {
        areas.push("Try grounding your position in concrete evidence.".to_string());
    }
    if tactic_count_matching(tactic_counts, "question") == 0 {
        areas.push("Asking questions is a low-risk way to open a difficult conversation.".to_string());
    }
    areas
}

fn derive_tactic_analysis(
    most_used: Option<&str>,
    tactic_counts: &BTreeMap<String, usize>,
    choices_made: usize,
) -> String {
    match most_used {
        Some(tactic) => {
            let uses = tactic_counts.get(tactic).copied().unwrap_or(0);
            format!(
                "Most used tactic: {} ({} of {} decisions, {} distinct tactics).",
                tactic,
                uses,
                choices_made,
                tactic_counts.len()
            )
        }
        None => "No tactics recorded for this session.".to_string(),
    }
}
