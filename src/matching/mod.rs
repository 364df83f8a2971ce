//! Label-to-segment matching.

mod assign;
mod matcher;

pub use assign::apply_assignments;
pub use matcher::{MatchParams, assign_labels};
