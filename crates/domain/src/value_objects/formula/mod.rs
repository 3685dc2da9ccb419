//! Dice formula engine
//!
//! Turns strings like `"2d6! + STRd8v + KEY"` into a verifiable numeric
//! result, a human-readable annotated trace, and structured per-die
//! metadata for rendering and replay.
//!
//! Pipeline: sanitize → substitute variables → split into literal/dice
//! segments → roll each term → fold the segments into both the evaluable
//! expression and the display trace in lockstep → evaluate the arithmetic.
//! Because display and expression come from the same fold, they cannot
//! drift apart.
//!
//! The engine is a pure computation: no I/O, no shared state, and
//! randomness injected as a closure (see [`DieRng`]).

mod eval;
mod notation;
mod roller;
mod sanitize;
mod substitute;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use eval::evaluate;
pub use notation::{
    find_dice_terms, split_segments, DiceNotation, Segment, DOUBLE_DIGIT_DICE, SINGLE_DICE,
};
pub use roller::{
    roll_term, DieCategory, DieRng, FormulaOptions, RollOutcome, RolledDie, MAX_DICE_PER_TERM,
    MAX_EXPLOSIONS,
};
pub use sanitize::sanitize;
pub use substitute::substitute;

use crate::value_objects::attributes::{Attribute, AttributeSet};

/// Error when evaluating a dice formula. Every failure aborts the whole
/// evaluation; the engine never retries and never partially returns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Disallowed pattern in the raw text (function-call shape, brackets,
    /// braces, statement separators, assignment, member access).
    #[error("Unsafe pattern in formula: '{pattern}'")]
    UnsafeInput { pattern: String },

    /// Die size outside the accepted single/double-digit sets.
    #[error("Invalid dice type: {0}")]
    InvalidDiceType(String),

    /// Dice count outside `1..=MAX_DICE_PER_TERM`, including after
    /// variable substitution.
    #[error("Dice count must be between 1 and 100, got {0}")]
    InvalidDiceCount(i64),

    /// Double-digit dice roll one at a time.
    #[error("Cannot roll {count}d{sides}: double-digit dice roll one at a time")]
    DoubleDigitMultiRoll { count: i64, sides: u32 },

    /// Post-substitution text contains characters outside the arithmetic
    /// whitelist, typically an unresolved variable token.
    #[error("Expression contains invalid characters: '{0}'")]
    InvalidExpressionCharacters(String),

    /// Whitelisted characters that do not form a valid expression.
    #[error("Malformed arithmetic expression: '{0}'")]
    MalformedExpression(String),

    /// Arithmetic produced NaN or infinity (e.g. division by zero).
    #[error("Expression did not evaluate to a finite number: '{0}'")]
    NonFiniteResult(String),
}

/// Caller-supplied character context consumed by variable substitution.
///
/// The engine never fetches this itself; whoever owns character storage
/// passes it in, keeping the engine decoupled from persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaContext {
    pub attributes: AttributeSet,
    pub level: i32,
    /// Attributes designated "key" by the character's class; `KEY`
    /// resolves to the maximum of their values.
    pub key_attributes: Vec<Attribute>,
}

impl FormulaContext {
    pub fn new(attributes: AttributeSet, level: i32, key_attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            level,
            key_attributes,
        }
    }

    /// Maximum value across the key attributes, if any are configured.
    pub fn key_value(&self) -> Option<i32> {
        self.key_attributes
            .iter()
            .map(|a| self.attributes.get(*a))
            .max()
    }
}

/// The outward-facing result of a formula evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaResult {
    /// Annotated trace: kept dice as `[v]`, dropped dice struck through,
    /// double-digit terms as `<dice> = <value>`, pure math as
    /// `<expression> = <total>`.
    pub display_string: String,
    /// Final value. Forced to 0 when the roll fumbled, regardless of the
    /// arithmetic (the display keeps the unforced trace).
    pub total: i64,
    /// The formula as the caller supplied it.
    pub formula: String,
    /// The sanitized text after variable substitution, when any variable
    /// was substituted.
    pub substituted_formula: Option<String>,
}

/// A [`FormulaResult`] plus the structured per-term roll data consumed by
/// UI and logging collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaEvaluation {
    pub result: FormulaResult,
    pub outcomes: Vec<RollOutcome>,
}

/// Evaluate a dice formula end to end.
///
/// `rng` must return a uniform integer in `[1, sides]`; tests script exact
/// sequences through it, and concurrent callers bring their own instance.
pub fn evaluate_formula(
    formula: &str,
    context: &FormulaContext,
    options: &FormulaOptions,
    rng: DieRng,
) -> Result<FormulaEvaluation, FormulaError> {
    let sanitized = sanitize(formula)?;
    let (substituted, has_variables) = substitute(
        &sanitized,
        &context.attributes,
        context.level,
        &context.key_attributes,
    );

    let mut expression = String::with_capacity(substituted.len());
    let mut display = String::with_capacity(substituted.len() * 2);
    let mut outcomes = Vec::new();

    for segment in split_segments(&substituted)? {
        match segment {
            Segment::Literal(text) => {
                expression.push_str(&text);
                display.push_str(&text);
            }
            Segment::Dice(term) => {
                let outcome = roll_term(&term, options, rng)?;
                expression.push_str(&outcome.kept_sum.to_string());
                display.push_str(&render_term(&outcome));
                outcomes.push(outcome);
            }
        }
    }

    let evaluated = evaluate(&expression)?;
    let display_string = if outcomes.is_empty() {
        format!("{} = {}", display.trim(), evaluated)
    } else {
        display
    };

    let is_fumble = outcomes.iter().any(|o| o.is_fumble);
    let total = if is_fumble { 0 } else { evaluated };

    Ok(FormulaEvaluation {
        result: FormulaResult {
            display_string,
            total,
            formula: formula.to_string(),
            substituted_formula: has_variables.then_some(substituted),
        },
        outcomes,
    })
}

/// Render one term's dice for the display trace.
///
/// Standard terms join dice with ` + `, wrapping dropped dice in `~~`
/// strikethrough markers; exploded and vicious dice appear inline in roll
/// order. Double-digit terms space-join their dice and append `= value`.
fn render_term(outcome: &RollOutcome) -> String {
    let rendered: Vec<String> = outcome.dice.iter().map(render_die).collect();
    if outcome.is_double_digit {
        format!("{} = {}", rendered.join(" "), outcome.kept_sum)
    } else {
        rendered.join(" + ")
    }
}

fn render_die(die: &RolledDie) -> String {
    if die.kept {
        format!("[{}]", die.value)
    } else {
        format!("~~[{}]~~", die.value)
    }
}
