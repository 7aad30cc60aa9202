pub mod checksum;
pub mod names;
pub mod outcome;
pub mod plan;

pub use checksum::policy_checksum;
pub use outcome::{Outcome, OutcomeTally, OutcomeWeights};
pub use plan::{Counts, PlanError, SeedPlan};
