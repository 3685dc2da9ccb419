//! Application services - business flows over the port traits

mod roll_service;

pub use roll_service::{RollError, RollService};
