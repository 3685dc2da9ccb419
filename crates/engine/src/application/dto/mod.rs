//! Serializable views of roll results for UI and logging collaborators.
//!
//! These carry everything a client needs to render a roll (annotated
//! display string plus per-die metadata) as an opaque record.

use serde::Serialize;

use rollwright_domain::{
    Character, DieCategory, FormulaEvaluation, RollOutcome, RolledDie,
};

/// One fully evaluated formula, ready to broadcast or log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollReportDto {
    pub character_id: Option<String>,
    pub character_name: Option<String>,
    pub formula: String,
    pub substituted_formula: Option<String>,
    pub display_string: String,
    pub total: i64,
    pub outcomes: Vec<RollOutcomeDto>,
}

impl RollReportDto {
    pub fn new(character: Option<&Character>, evaluation: FormulaEvaluation) -> Self {
        Self {
            character_id: character.map(|c| c.id.to_string()),
            character_name: character.map(|c| c.name.clone()),
            formula: evaluation.result.formula,
            substituted_formula: evaluation.result.substituted_formula,
            display_string: evaluation.result.display_string,
            total: evaluation.result.total,
            outcomes: evaluation.outcomes.iter().map(RollOutcomeDto::from).collect(),
        }
    }
}

/// One dice term's structured result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOutcomeDto {
    pub dice: Vec<RolledDieDto>,
    pub kept_sum: i64,
    pub critical_hits: u32,
    pub is_fumble: bool,
    pub is_double_digit: bool,
}

impl From<&RollOutcome> for RollOutcomeDto {
    fn from(outcome: &RollOutcome) -> Self {
        Self {
            dice: outcome.dice.iter().map(RolledDieDto::from).collect(),
            kept_sum: outcome.kept_sum,
            critical_hits: outcome.critical_hits,
            is_fumble: outcome.is_fumble,
            is_double_digit: outcome.is_double_digit,
        }
    }
}

/// One die as rolled, category flattened to a string tag for clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolledDieDto {
    pub value: u32,
    pub face_size: u32,
    pub kept: bool,
    pub category: &'static str,
    pub sequence_index: usize,
}

impl From<&RolledDie> for RolledDieDto {
    fn from(die: &RolledDie) -> Self {
        Self {
            value: die.value,
            face_size: die.face_size,
            kept: die.kept,
            category: category_tag(die.category),
            sequence_index: die.sequence_index,
        }
    }
}

fn category_tag(category: DieCategory) -> &'static str {
    match category {
        DieCategory::Normal => "normal",
        DieCategory::Dropped => "dropped",
        DieCategory::Critical => "critical",
        DieCategory::Vicious => "vicious",
        DieCategory::Fumble => "fumble",
    }
}
