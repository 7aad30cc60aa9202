//! The seeding run: purge, global policies, global hosts, then teams.
//!
//! Every step issues plain INSERTs over one connection. The first failing
//! statement aborts the run; rows already written stay in place.

use anyhow::Result;
use policyseed_core::names::{policy_name, team_description, team_name};
use policyseed_core::{Outcome, OutcomeTally, OutcomeWeights, SeedPlan};
use policyseed_db::SeedDb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

/// Progress is logged whenever a host id is a multiple of this.
pub const DEFAULT_PROGRESS_EVERY: u32 = 100;

/// Build the run's randomness source: seeded when `seed` is set.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// What one run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub teams: u64,
    pub policies: u64,
    pub hosts: u64,
    pub memberships: u64,
    pub outcomes: OutcomeTally,
    pub elapsed: Duration,
}

pub struct Seeder<'a> {
    db: &'a SeedDb,
    plan: SeedPlan,
    weights: OutcomeWeights,
    progress_every: u32,
}

impl<'a> Seeder<'a> {
    pub fn new(db: &'a SeedDb, plan: SeedPlan) -> Self {
        Self {
            db,
            plan,
            weights: OutcomeWeights::default(),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    pub fn with_weights(mut self, weights: OutcomeWeights) -> Self {
        self.weights = weights;
        self
    }

    /// `0` disables progress lines.
    pub fn with_progress_every(mut self, every: u32) -> Self {
        self.progress_every = every;
        self
    }

    /// Purge the tables and write the full dataset.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SeedReport> {
        let start = Instant::now();
        let mut report = SeedReport::default();

        self.db.purge()?;
        tracing::info!("purged existing rows");

        self.seed_global_policies(&mut report)?;
        tracing::info!("created global policies");

        self.seed_global_hosts(rng, &mut report)?;

        for team in self.plan.team_ids() {
            self.seed_team(team, rng, &mut report)?;
        }

        report.elapsed = start.elapsed();
        Ok(report)
    }

    fn seed_global_policies(&self, report: &mut SeedReport) -> Result<()> {
        for policy_id in self.plan.global_policy_ids() {
            self.db.insert_policy(policy_id, None, &policy_name(None, policy_id))?;
            report.policies += 1;
        }
        Ok(())
    }

    fn seed_global_hosts<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        report: &mut SeedReport,
    ) -> Result<()> {
        for host_id in self.plan.global_host_ids() {
            self.db.insert_host(host_id, None)?;
            report.hosts += 1;

            let rows = self.draw_memberships(rng, self.plan.global_policy_ids(), report);
            self.db.insert_memberships(host_id, &rows)?;

            if self.is_progress_point(host_id) {
                tracing::info!("created {host_id} global hosts");
            }
        }
        Ok(())
    }

    fn seed_team<R: Rng + ?Sized>(
        &self,
        team: u32,
        rng: &mut R,
        report: &mut SeedReport,
    ) -> Result<()> {
        self.db.insert_team(team, &team_name(team), &team_description(team))?;
        report.teams += 1;

        let team_policies = self.plan.team_policy_ids(team);
        for policy_id in team_policies.clone() {
            self.db.insert_policy(policy_id, Some(team), &policy_name(Some(team), policy_id))?;
            report.policies += 1;
        }

        for host_id in self.plan.team_host_ids(team) {
            self.db.insert_host(host_id, Some(team))?;
            report.hosts += 1;

            // Global policies and the team's own, as two statements.
            let rows = self.draw_memberships(rng, self.plan.global_policy_ids(), report);
            self.db.insert_memberships(host_id, &rows)?;
            let rows = self.draw_memberships(rng, team_policies.clone(), report);
            self.db.insert_memberships(host_id, &rows)?;

            if self.is_progress_point(host_id) {
                tracing::info!("created {host_id} hosts");
            }
        }
        tracing::debug!("seeded team {team}");
        Ok(())
    }

    fn draw_memberships<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        policy_ids: RangeInclusive<u32>,
        report: &mut SeedReport,
    ) -> Vec<(u32, Outcome)> {
        policy_ids
            .map(|policy_id| {
                let outcome = self.weights.draw(&mut *rng);
                report.outcomes.record(outcome);
                report.memberships += 1;
                (policy_id, outcome)
            })
            .collect()
    }

    fn is_progress_point(&self, host_id: u32) -> bool {
        self.progress_every != 0 && host_id % self.progress_every == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policyseed_core::Counts;

    fn tiny_plan() -> SeedPlan {
        SeedPlan::new(Counts {
            teams: 1,
            global_policies: 3,
            team_policies: 2,
            global_hosts: 2,
            team_hosts: 2,
        })
        .unwrap()
    }

    #[test]
    fn draw_memberships_covers_every_policy_once() {
        let db = SeedDb::open_in_memory().unwrap();
        let seeder = Seeder::new(&db, tiny_plan());
        let mut rng = rng_from_seed(Some(5));
        let mut report = SeedReport::default();

        let rows = seeder.draw_memberships(&mut rng, 4..=9, &mut report);
        let ids: Vec<u32> = rows.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![4, 5, 6, 7, 8, 9]);
        assert_eq!(report.memberships, 6);
        assert_eq!(report.outcomes.total(), 6);
    }

    #[test]
    fn progress_points_follow_interval() {
        let db = SeedDb::open_in_memory().unwrap();
        let seeder = Seeder::new(&db, tiny_plan());
        assert!(seeder.is_progress_point(100));
        assert!(seeder.is_progress_point(10_200));
        assert!(!seeder.is_progress_point(101));

        let silent = Seeder::new(&db, tiny_plan()).with_progress_every(0);
        assert!(!silent.is_progress_point(100));
    }

    #[test]
    fn seeded_rngs_repeat() {
        let mut a = rng_from_seed(Some(11));
        let mut b = rng_from_seed(Some(11));
        assert_eq!(a.gen_range(0..u64::MAX), b.gen_range(0..u64::MAX));
    }
}
