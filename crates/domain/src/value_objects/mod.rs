//! Value objects - Immutable objects defined by their attributes

pub mod attributes;
pub mod formula;

pub use attributes::{Attribute, AttributeSet};
pub use formula::{
    evaluate_formula, DiceNotation, DieCategory, FormulaContext, FormulaError, FormulaEvaluation,
    FormulaOptions, FormulaResult, RollOutcome, RolledDie,
};
