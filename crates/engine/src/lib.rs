//! Rollwright Engine - application services around the dice formula engine
//!
//! The domain crate does all the computing; this crate wires it to
//! character storage (behind the `CharacterRepo` port), produces
//! serializable roll reports, and hosts the demo binary.

pub mod application;
pub mod infrastructure;

pub use application::dto::{RollOutcomeDto, RollReportDto, RolledDieDto};
pub use application::ports::{CharacterRepo, RepoError};
pub use application::services::{RollError, RollService};
pub use infrastructure::memory::InMemoryCharacterRepo;
