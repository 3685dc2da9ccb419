//! Rollwright Domain - characters, attributes, and the dice formula engine
//!
//! Everything in this crate is pure computation: no I/O, no clocks beyond
//! entity timestamps, and no random number generator. Randomness reaches
//! the formula engine as an injected closure so callers (and tests) own
//! their own source.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::Character;
pub use error::DomainError;
pub use ids::CharacterId;
pub use value_objects::{
    evaluate_formula, Attribute, AttributeSet, DiceNotation, DieCategory, FormulaContext,
    FormulaError, FormulaEvaluation, FormulaOptions, FormulaResult, RollOutcome, RolledDie,
};
