//! Domain entities - objects with identity and a lifecycle

mod character;

pub use character::Character;
