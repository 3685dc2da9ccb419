pub mod memory;
pub mod rng;
