//! Scenario document model.
//!
//! A scenario is an immutable branching-narrative document: a graph of
//! statements connected by scored choices, terminating in endings. Documents
//! arrive as JSON from an external source; parsing happens here, at the
//! boundary, so the rest of the engine only ever sees strongly typed values.
//!
//! Legacy documents are inconsistent about two field names, so each is
//! resolved through an explicit two-candidate fallback at parse time:
//! `tactic` preferred over `category`, and `EVS` preferred over `evs_score`
//! (defaulting to 0 when both are absent).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::ScenarioId;

/// Statement ids beginning with this prefix denote endings.
pub const TERMINAL_PREFIX: &str = "end_";

/// Reserved statement id whose ending is chosen dynamically from the
/// scenario's score-range table (or a derived report when no range matches).
pub const FINAL_SCORE_ID: &str = "final_score";

/// Category label reported when a choice carries neither `tactic` nor
/// `category`.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// True when a statement id marks session completion.
pub fn is_terminal(statement_id: &str) -> bool {
    statement_id.starts_with(TERMINAL_PREFIX) || statement_id == FINAL_SCORE_ID
}

/// One node in the branching narrative graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub text: String,
    pub choices: Vec<Choice>,
}

impl Statement {
    /// Fetch an offered choice by positional index.
    pub fn choice(&self, statement_id: &str, index: usize) -> Result<&Choice, DomainError> {
        self.choices.get(index).ok_or_else(|| {
            DomainError::choice_out_of_range(statement_id, index, self.choices.len())
        })
    }
}

/// An edge from a statement to another statement or ending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub text: String,
    /// Resolved tactic label, `None` when the document carried neither
    /// candidate field.
    pub tactic: Option<String>,
    /// Signed per-choice value score (EVS).
    pub value: i32,
    pub leads_to: String,
}

impl Choice {
    /// Display label for the tactic, with the documented fallback.
    pub fn category_label(&self) -> &str {
        self.tactic.as_deref().unwrap_or(UNKNOWN_CATEGORY)
    }
}

/// Fixed display text for a terminal statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ending {
    pub text: String,
}

/// A closed integer interval mapped to an ending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreRange {
    pub min: i32,
    pub max: i32,
}

impl ScoreRange {
    pub fn contains(&self, total: i32) -> bool {
        total >= self.min && total <= self.max
    }

    fn overlaps(&self, other: &ScoreRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// Immutable, parsed scenario definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDefinition {
    pub id: ScenarioId,
    pub title: String,
    pub description: String,
    pub issue: String,
    pub manager_type: String,
    pub starting_statement_id: String,
    pub statements: HashMap<String, Statement>,
    pub endings: HashMap<String, Ending>,
    /// Score ranges for the `final_score` statement, sorted ascending by
    /// range start. Scan order is the documented tie-break when ranges
    /// overlap.
    pub score_ranges: Vec<(ScoreRange, String)>,
}

impl ScenarioDefinition {
    /// Parse a raw scenario document as fetched from the document store.
    pub fn from_document(
        id: ScenarioId,
        document: serde_json::Value,
    ) -> Result<Self, DomainError> {
        let doc: ScenarioDoc = serde_json::from_value(document)
            .map_err(|e| DomainError::malformed(e.to_string()))?;

        let starting_statement_id = doc
            .starting_statement_id
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| DomainError::malformed("missing starting_statement_id"))?;

        if doc.statements.is_empty() {
            return Err(DomainError::malformed("statements map is empty"));
        }

        let mut score_ranges = Vec::new();
        if let Some(final_stmt) = doc.statements.get(FINAL_SCORE_ID) {
            for (key, ending_id) in &final_stmt.score_ranges {
                score_ranges.push((parse_range_key(key)?, ending_id.clone()));
            }
        }
        // Hash-map iteration order is not a contract; fix the scan order.
        score_ranges.sort_by_key(|(range, _)| (range.min, range.max));

        let statements = doc
            .statements
            .into_iter()
            .map(|(stmt_id, stmt)| {
                let choices = stmt.user_choices.into_iter().map(Choice::from).collect();
                (
                    stmt_id,
                    Statement {
                        text: stmt.text,
                        choices,
                    },
                )
            })
            .collect();

        let endings = doc
            .endings
            .into_iter()
            .map(|(ending_id, ending)| (ending_id, Ending { text: ending.into_text() }))
            .collect();

        Ok(Self {
            id,
            title: doc.title,
            description: doc.description,
            issue: doc.issue,
            manager_type: doc.manager_type,
            starting_statement_id,
            statements,
            endings,
            score_ranges,
        })
    }

    pub fn statement(&self, statement_id: &str) -> Result<&Statement, DomainError> {
        self.statements
            .get(statement_id)
            .ok_or_else(|| DomainError::missing_statement(statement_id))
    }

    pub fn ending(&self, ending_id: &str) -> Result<&Ending, DomainError> {
        self.endings
            .get(ending_id)
            .ok_or_else(|| DomainError::missing_ending(ending_id))
    }

    /// Resolve a raw score total against the score-range table, scanning in
    /// the fixed ascending order. `None` when no range contains the total
    /// (or the table is empty).
    pub fn ending_for_score(&self, total: i32) -> Option<&str> {
        self.score_ranges
            .iter()
            .find(|(range, _)| range.contains(total))
            .map(|(_, ending_id)| ending_id.as_str())
    }

    /// Human-readable descriptions of overlapping score-range pairs. The
    /// source format does not forbid overlaps; the catalog logs these at
    /// load time so authors can fix the document.
    pub fn overlapping_ranges(&self) -> Vec<String> {
        let mut overlaps = Vec::new();
        for (i, (a, a_ending)) in self.score_ranges.iter().enumerate() {
            for (b, b_ending) in &self.score_ranges[i + 1..] {
                if a.overlaps(b) {
                    overlaps.push(format!(
                        "[{},{}] -> {} overlaps [{},{}] -> {}",
                        a.min, a.max, a_ending, b.min, b.max, b_ending
                    ));
                }
            }
        }
        overlaps
    }
}

fn parse_range_key(key: &str) -> Result<ScoreRange, DomainError> {
    let (min, max) = key
        .split_once("_to_")
        .ok_or_else(|| DomainError::malformed(format!("bad score range key: {key}")))?;
    let min = min
        .parse::<i32>()
        .map_err(|_| DomainError::malformed(format!("bad score range key: {key}")))?;
    let max = max
        .parse::<i32>()
        .map_err(|_| DomainError::malformed(format!("bad score range key: {key}")))?;
    if min > max {
        return Err(DomainError::malformed(format!(
            "inverted score range key: {key}"
        )));
    }
    Ok(ScoreRange { min, max })
}

// ----------------------------------------------------------------------------
// Raw document shapes (serde boundary only)
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ScenarioDoc {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    issue: String,
    #[serde(default)]
    manager_type: String,
    starting_statement_id: Option<String>,
    #[serde(default)]
    statements: HashMap<String, StatementDoc>,
    #[serde(default)]
    endings: HashMap<String, EndingDoc>,
}

#[derive(Debug, Deserialize)]
struct StatementDoc {
    #[serde(default)]
    text: String,
    #[serde(default)]
    user_choices: Vec<ChoiceDoc>,
    #[serde(default)]
    score_ranges: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceDoc {
    choice: String,
    tactic: Option<String>,
    category: Option<String>,
    #[serde(rename = "EVS")]
    evs: Option<i32>,
    evs_score: Option<i32>,
    leads_to: String,
}

impl From<ChoiceDoc> for Choice {
    fn from(doc: ChoiceDoc) -> Self {
        Self {
            text: doc.choice,
            tactic: doc.tactic.or(doc.category),
            value: doc.evs.or(doc.evs_score).unwrap_or(0),
            leads_to: doc.leads_to,
        }
    }
}

// Legacy documents store endings either as bare strings or as objects with
// a `text` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EndingDoc {
    Text(String),
    Object { text: String },
}

impl EndingDoc {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) | Self::Object { text } => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(document: serde_json::Value) -> Result<ScenarioDefinition, DomainError> {
        ScenarioDefinition::from_document(ScenarioId::new("sc_test"), document)
    }

    fn minimal_doc() -> serde_json::Value {
        json!({
            "title": "Shortcut under pressure",
            "description": "A manager asks you to skip a safety review.",
            "issue": "safety",
            "manager_type": "authoritarian",
            "starting_statement_id": "stmt_1",
            "statements": {
                "stmt_1": {
                    "text": "Your manager wants the review skipped.",
                    "user_choices": [
                        {"choice": "Push back with data", "tactic": "Evidence", "EVS": 1, "leads_to": "end_good"},
                        {"choice": "Go along with it", "category": "Compliance", "evs_score": -1, "leads_to": "end_bad"}
                    ]
                }
            },
            "endings": {
                "end_good": {"text": "You held the line."},
                "end_bad": "You caved."
            }
        })
    }

    #[test]
    fn parses_minimal_document() {
        let scenario = parse(minimal_doc()).expect("parse");
        assert_eq!(scenario.title, "Shortcut under pressure");
        assert_eq!(scenario.starting_statement_id, "stmt_1");
        assert_eq!(scenario.statements.len(), 1);
        assert_eq!(scenario.endings.len(), 2);
        // Bare-string and object endings both parse.
        assert_eq!(scenario.ending("end_bad").expect("ending").text, "You caved.");
    }

    #[test]
    fn tactic_preferred_over_category() {
        let scenario = parse(minimal_doc()).expect("parse");
        let stmt = scenario.statement("stmt_1").expect("statement");
        assert_eq!(stmt.choices[0].tactic.as_deref(), Some("Evidence"));
        // category is the fallback candidate
        assert_eq!(stmt.choices[1].tactic.as_deref(), Some("Compliance"));
    }

    #[test]
    fn evs_preferred_with_evs_score_fallback() {
        let scenario = parse(minimal_doc()).expect("parse");
        let stmt = scenario.statement("stmt_1").expect("statement");
        assert_eq!(stmt.choices[0].value, 1);
        assert_eq!(stmt.choices[1].value, -1);
    }

    #[test]
    fn missing_score_fields_default_to_zero() {
        let mut doc = minimal_doc();
        doc["statements"]["stmt_1"]["user_choices"][0] =
            json!({"choice": "Shrug", "leads_to": "end_bad"});
        let scenario = parse(doc).expect("parse");
        let choice = &scenario.statement("stmt_1").expect("statement").choices[0];
        assert_eq!(choice.value, 0);
        assert_eq!(choice.tactic, None);
        assert_eq!(choice.category_label(), UNKNOWN_CATEGORY);
    }

    #[test]
    fn missing_entry_statement_is_malformed() {
        let mut doc = minimal_doc();
        doc.as_object_mut()
            .expect("object")
            .remove("starting_statement_id");
        assert!(matches!(parse(doc), Err(DomainError::Malformed(_))));
    }

    #[test]
    fn empty_statements_map_is_malformed() {
        let mut doc = minimal_doc();
        doc["statements"] = json!({});
        assert!(matches!(parse(doc), Err(DomainError::Malformed(_))));
    }

    #[test]
    fn score_ranges_parse_sorted_and_resolve_first_match() {
        let mut doc = minimal_doc();
        doc["statements"]["final_score"] = json!({
            "text": "",
            "score_ranges": {"4_to_10": "end_good", "0_to_3": "end_bad"}
        });
        let scenario = parse(doc).expect("parse");
        assert_eq!(scenario.score_ranges[0].0, ScoreRange { min: 0, max: 3 });
        assert_eq!(scenario.ending_for_score(4), Some("end_good"));
        assert_eq!(scenario.ending_for_score(3), Some("end_bad"));
        assert_eq!(scenario.ending_for_score(11), None);
        assert!(scenario.overlapping_ranges().is_empty());
    }

    #[test]
    fn overlapping_ranges_are_reported() {
        let mut doc = minimal_doc();
        doc["statements"]["final_score"] = json!({
            "score_ranges": {"0_to_5": "end_bad", "4_to_10": "end_good"}
        });
        let scenario = parse(doc).expect("parse");
        assert_eq!(scenario.overlapping_ranges().len(), 1);
        // Ascending scan order keeps resolution deterministic regardless.
        assert_eq!(scenario.ending_for_score(4), Some("end_bad"));
    }

    #[test]
    fn malformed_range_key_is_rejected() {
        let mut doc = minimal_doc();
        doc["statements"]["final_score"] = json!({
            "score_ranges": {"0-3": "end_bad"}
        });
        assert!(matches!(parse(doc), Err(DomainError::Malformed(_))));
    }

    #[test]
    fn terminal_marker_detection() {
        assert!(is_terminal("end_good"));
        assert!(is_terminal(FINAL_SCORE_ID));
        assert!(!is_terminal("stmt_1"));
        assert!(!is_terminal("ending_typo"));
    }
}
