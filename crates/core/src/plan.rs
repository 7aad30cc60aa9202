//! Id-block arithmetic for one seeding run.
//!
//! Policies and hosts each have their own id space starting at 1. The global
//! block comes first; team blocks follow in team order:
//!
//! ```text
//! policies: | 1 ..= N (global) | team 1: P ids | team 2: P ids | ...
//! hosts:    | 1 ..= M (global) | team 1: H ids | team 2: H ids | ...
//! ```

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlanError {
    #[error("{what} ids overflow the 32-bit id space ({count} ids requested)")]
    IdOverflow { what: &'static str, count: u64 },
    #[error("outcome weights must not all be zero")]
    EmptyWeights,
    #[error(
        "{policies} {what} policies need {params} bind parameters per membership insert \
         (SQLite allows 32766)"
    )]
    BatchTooWide {
        what: &'static str,
        policies: u32,
        params: u64,
    },
}

/// Upper bound on bind parameters in one SQLite statement.
pub const MAX_BIND_PARAMS: u64 = 32_766;

/// Bind parameters per membership row: policy id, host id, passes.
pub const MEMBERSHIP_BIND_PARAMS: u64 = 3;

/// Row counts for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    #[serde(default = "default_teams")]
    pub teams: u32,
    #[serde(default = "default_global_policies")]
    pub global_policies: u32,
    /// Policies owned by each team.
    #[serde(default = "default_team_policies")]
    pub team_policies: u32,
    #[serde(default = "default_global_hosts")]
    pub global_hosts: u32,
    /// Hosts owned by each team.
    #[serde(default = "default_team_hosts")]
    pub team_hosts: u32,
}

impl Default for Counts {
    fn default() -> Self {
        Self {
            teams: default_teams(),
            global_policies: default_global_policies(),
            team_policies: default_team_policies(),
            global_hosts: default_global_hosts(),
            team_hosts: default_team_hosts(),
        }
    }
}

fn default_teams() -> u32 {
    10
}
fn default_global_policies() -> u32 {
    50
}
fn default_team_policies() -> u32 {
    20
}
fn default_global_hosts() -> u32 {
    10_000
}
fn default_team_hosts() -> u32 {
    10_000
}

/// Validated counts with the id ranges they imply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlan {
    counts: Counts,
}

impl SeedPlan {
    pub fn new(counts: Counts) -> Result<Self, PlanError> {
        let policies = block_total(counts.global_policies, counts.teams, counts.team_policies);
        if policies > u64::from(u32::MAX) {
            return Err(PlanError::IdOverflow {
                what: "policy",
                count: policies,
            });
        }
        let hosts = block_total(counts.global_hosts, counts.teams, counts.team_hosts);
        if hosts > u64::from(u32::MAX) {
            return Err(PlanError::IdOverflow {
                what: "host",
                count: hosts,
            });
        }
        for (what, policies) in [
            ("global", counts.global_policies),
            ("team", counts.team_policies),
        ] {
            let params = u64::from(policies) * MEMBERSHIP_BIND_PARAMS;
            if params > MAX_BIND_PARAMS {
                return Err(PlanError::BatchTooWide {
                    what,
                    policies,
                    params,
                });
            }
        }
        Ok(Self { counts })
    }

    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    pub fn team_ids(&self) -> RangeInclusive<u32> {
        1..=self.counts.teams
    }

    pub fn global_policy_ids(&self) -> RangeInclusive<u32> {
        1..=self.counts.global_policies
    }

    pub fn global_host_ids(&self) -> RangeInclusive<u32> {
        1..=self.counts.global_hosts
    }

    /// Policy ids owned by `team`. Empty for a team outside the plan.
    pub fn team_policy_ids(&self, team: u32) -> RangeInclusive<u32> {
        self.team_block(self.counts.global_policies, self.counts.team_policies, team)
    }

    /// Host ids owned by `team`. Empty for a team outside the plan.
    pub fn team_host_ids(&self, team: u32) -> RangeInclusive<u32> {
        self.team_block(self.counts.global_hosts, self.counts.team_hosts, team)
    }

    pub fn total_policies(&self) -> u64 {
        block_total(
            self.counts.global_policies,
            self.counts.teams,
            self.counts.team_policies,
        )
    }

    pub fn total_hosts(&self) -> u64 {
        block_total(
            self.counts.global_hosts,
            self.counts.teams,
            self.counts.team_hosts,
        )
    }

    /// Memberships per team host: every global policy plus the team's own.
    pub fn memberships_per_team_host(&self) -> u64 {
        u64::from(self.counts.global_policies) + u64::from(self.counts.team_policies)
    }

    pub fn total_memberships(&self) -> u64 {
        let c = &self.counts;
        let global = u64::from(c.global_hosts) * u64::from(c.global_policies);
        let team_hosts = u64::from(c.teams) * u64::from(c.team_hosts);
        global + team_hosts * self.memberships_per_team_host()
    }

    fn team_block(&self, base: u32, size: u32, team: u32) -> RangeInclusive<u32> {
        if team == 0 || team > self.counts.teams {
            return empty_block();
        }
        let start = u64::from(base) + u64::from(team - 1) * u64::from(size) + 1;
        let end = u64::from(base) + u64::from(team) * u64::from(size);
        if start > end {
            return empty_block();
        }
        // `new` bounds base + teams * size by u32::MAX.
        (start as u32)..=(end as u32)
    }
}

#[allow(clippy::reversed_empty_ranges)]
fn empty_block() -> RangeInclusive<u32> {
    1..=0
}

fn block_total(global: u32, teams: u32, per_team: u32) -> u64 {
    u64::from(global) + u64::from(teams) * u64::from(per_team)
}
