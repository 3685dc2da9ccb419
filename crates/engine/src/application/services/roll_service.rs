//! Roll service - resolves formulas against stored characters.
//!
//! Loads the character through the `CharacterRepo` port, builds its
//! formula context, and hands the pure domain engine a thread-local RNG.
//! The transport/UI layer only ever sees DTOs and typed errors.

use std::sync::Arc;

use tracing::{debug, info};

use rollwright_domain::{
    evaluate_formula, CharacterId, FormulaContext, FormulaError, FormulaOptions,
};

use crate::application::dto::RollReportDto;
use crate::application::ports::{CharacterRepo, RepoError};
use crate::infrastructure::rng::thread_roller;

/// Error surfaced to callers of the roll service. Formula failures echo
/// the original formula so the message can be shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum RollError {
    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("Formula '{formula}' failed: {source}")]
    Formula {
        formula: String,
        source: FormulaError,
    },
}

pub struct RollService<R: CharacterRepo> {
    characters: Arc<R>,
}

impl<R: CharacterRepo> RollService<R> {
    pub fn new(characters: Arc<R>) -> Self {
        Self { characters }
    }

    /// Evaluate a formula against a stored character's sheet.
    pub async fn roll_for_character(
        &self,
        character_id: CharacterId,
        formula: &str,
        options: &FormulaOptions,
    ) -> Result<RollReportDto, RollError> {
        let character = self
            .characters
            .get(character_id)
            .await?
            .ok_or(RollError::CharacterNotFound(character_id))?;

        let context = character.formula_context();
        debug!(
            character = %character.name,
            formula,
            advantage = options.advantage_level,
            "Evaluating formula for character"
        );

        let mut rng = thread_roller();
        let evaluation = evaluate_formula(formula, &context, options, &mut rng).map_err(
            |source| RollError::Formula {
                formula: formula.to_string(),
                source,
            },
        )?;

        info!(
            character = %character.name,
            formula,
            total = evaluation.result.total,
            terms = evaluation.outcomes.len(),
            "Formula evaluated"
        );

        Ok(RollReportDto::new(Some(&character), evaluation))
    }

    /// Evaluate a formula with no character context (pure dice and math;
    /// variable tokens will fail as unknown).
    pub async fn roll_raw(
        &self,
        formula: &str,
        options: &FormulaOptions,
    ) -> Result<RollReportDto, RollError> {
        let context = FormulaContext::default();
        let mut rng = thread_roller();
        let evaluation = evaluate_formula(formula, &context, options, &mut rng).map_err(
            |source| RollError::Formula {
                formula: formula.to_string(),
                source,
            },
        )?;

        debug!(formula, total = evaluation.result.total, "Raw formula evaluated");
        Ok(RollReportDto::new(None, evaluation))
    }
}
