//! Milestone rules and the awards children earn from them.

mod award;
mod rule;

pub use award::MilestoneAward;
pub use rule::{ChildProgress, MilestoneCondition, MilestoneRule};
