//! Tri-state membership result and its weighted draw.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::plan::PlanError;

/// Result of evaluating one policy on one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Pass,
    Fail,
    /// Not evaluated yet; stored as NULL.
    Unknown,
}

impl Outcome {
    /// Value of the nullable `passes` column.
    pub fn passes(self) -> Option<bool> {
        match self {
            Self::Pass => Some(true),
            Self::Fail => Some(false),
            Self::Unknown => None,
        }
    }

    pub fn from_passes(passes: Option<bool>) -> Self {
        match passes {
            Some(true) => Self::Pass,
            Some(false) => Self::Fail,
            None => Self::Unknown,
        }
    }
}

/// Relative weights of the three outcomes (percent by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeWeights {
    #[serde(default = "default_unknown")]
    pub unknown: u32,
    #[serde(default = "default_pass")]
    pub pass: u32,
    #[serde(default = "default_fail")]
    pub fail: u32,
}

impl Default for OutcomeWeights {
    fn default() -> Self {
        Self {
            unknown: default_unknown(),
            pass: default_pass(),
            fail: default_fail(),
        }
    }
}

impl OutcomeWeights {
    /// Sum of the three weights; wider than `u32` so it cannot wrap.
    pub fn total(self) -> u64 {
        u64::from(self.unknown) + u64::from(self.pass) + u64::from(self.fail)
    }

    pub fn validate(self) -> Result<(), PlanError> {
        if self.total() == 0 {
            return Err(PlanError::EmptyWeights);
        }
        Ok(())
    }

    /// Draw one outcome. Buckets are laid out unknown, pass, fail.
    pub fn draw<R: Rng + ?Sized>(self, rng: &mut R) -> Outcome {
        let total = self.total().max(1);
        let x = rng.gen_range(0..total);
        let unknown = u64::from(self.unknown);
        if x < unknown {
            return Outcome::Unknown;
        }
        if x - unknown < u64::from(self.pass) {
            return Outcome::Pass;
        }
        Outcome::Fail
    }
}

fn default_unknown() -> u32 {
    10
}
fn default_pass() -> u32 {
    45
}
fn default_fail() -> u32 {
    45
}

/// Running count of drawn outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub pass: u64,
    pub fail: u64,
    pub unknown: u64,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Pass => self.pass += 1,
            Outcome::Fail => self.fail += 1,
            Outcome::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.pass + self.fail + self.unknown
    }

    /// Fraction of the tally taken by `outcome`; 0.0 when empty.
    pub fn share(&self, outcome: Outcome) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let count = match outcome {
            Outcome::Pass => self.pass,
            Outcome::Fail => self.fail,
            Outcome::Unknown => self.unknown,
        };
        count as f64 / total as f64
    }
}
