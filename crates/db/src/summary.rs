//! Post-run dataset summary, read back from the store.

use anyhow::{Context, Result};
use policyseed_core::{policy_checksum, Outcome, OutcomeTally, SeedPlan};
use rusqlite::Connection;
use std::collections::BTreeMap;

use crate::{queries, sq_query_map, sq_query_row};

/// Row counts and integrity checks over the seeded tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub teams: u64,
    pub global_policies: u64,
    pub team_policies: u64,
    pub global_hosts: u64,
    pub team_hosts: u64,
    pub policies_per_team: BTreeMap<u32, u64>,
    pub hosts_per_team: BTreeMap<u32, u64>,
    /// memberships-per-host → number of global hosts with that many.
    pub global_host_memberships: BTreeMap<u64, u64>,
    /// memberships-per-host → number of team hosts with that many.
    pub team_host_memberships: BTreeMap<u64, u64>,
    /// Team hosts joined to another team's policy, or global hosts joined
    /// to any team policy.
    pub cross_team_memberships: u64,
    pub outcomes: OutcomeTally,
    pub duplicate_checksums: u64,
    /// Policies whose stored checksum differs from a recomputation.
    pub checksum_mismatches: u64,
}

impl DatasetSummary {
    pub fn memberships(&self) -> u64 {
        self.outcomes.total()
    }

    /// Every way the dataset departs from `plan`; empty when it matches.
    pub fn check_against(&self, plan: &SeedPlan) -> Vec<String> {
        let c = plan.counts();
        let teams = u64::from(c.teams);
        let mut problems = Vec::new();
        let mut expect = |what: &str, actual: u64, expected: u64| {
            if actual != expected {
                problems.push(format!("{what}: expected {expected}, found {actual}"));
            }
        };

        expect("teams", self.teams, teams);
        expect(
            "global policies",
            self.global_policies,
            u64::from(c.global_policies),
        );
        expect(
            "team policies",
            self.team_policies,
            teams * u64::from(c.team_policies),
        );
        expect("global hosts", self.global_hosts, u64::from(c.global_hosts));
        expect("team hosts", self.team_hosts, teams * u64::from(c.team_hosts));
        expect("memberships", self.memberships(), plan.total_memberships());
        expect("cross-team memberships", self.cross_team_memberships, 0);
        expect("duplicate checksums", self.duplicate_checksums, 0);
        expect("checksum mismatches", self.checksum_mismatches, 0);

        let per_team = |size: u32| -> BTreeMap<u32, u64> {
            if size == 0 {
                return BTreeMap::new();
            }
            plan.team_ids().map(|t| (t, u64::from(size))).collect()
        };
        if self.policies_per_team != per_team(c.team_policies) {
            problems.push("policies are not partitioned evenly by team".to_string());
        }
        if self.hosts_per_team != per_team(c.team_hosts) {
            problems.push("hosts are not partitioned evenly by team".to_string());
        }

        let uniform = |hosts: u64, per_host: u64| -> BTreeMap<u64, u64> {
            if hosts == 0 {
                return BTreeMap::new();
            }
            BTreeMap::from([(per_host, hosts)])
        };
        if self.global_host_memberships
            != uniform(u64::from(c.global_hosts), u64::from(c.global_policies))
        {
            problems.push(format!(
                "global hosts should each have {} memberships, found {:?}",
                c.global_policies, self.global_host_memberships
            ));
        }
        if self.team_host_memberships
            != uniform(
                teams * u64::from(c.team_hosts),
                plan.memberships_per_team_host(),
            )
        {
            problems.push(format!(
                "team hosts should each have {} memberships, found {:?}",
                plan.memberships_per_team_host(),
                self.team_host_memberships
            ));
        }

        problems
    }
}

pub(crate) fn collect(conn: &Connection) -> Result<DatasetSummary> {
    let count = |built: queries::Built, what: &str| -> Result<u64> {
        let n: i64 = sq_query_row(conn, built, |row| row.get(0))
            .with_context(|| format!("count {what}"))?;
        Ok(n as u64)
    };

    let mut summary = DatasetSummary {
        teams: count(queries::count_teams(), "teams")?,
        global_policies: count(queries::count_policies(true), "global policies")?,
        team_policies: count(queries::count_policies(false), "team policies")?,
        global_hosts: count(queries::count_hosts(true), "global hosts")?,
        team_hosts: count(queries::count_hosts(false), "team hosts")?,
        ..Default::default()
    };

    summary.policies_per_team = per_team(conn, queries::policies_per_team())
        .context("count policies per team")?;
    summary.hosts_per_team =
        per_team(conn, queries::hosts_per_team()).context("count hosts per team")?;
    summary.global_host_memberships =
        memberships_per_host(conn, true).context("count global host memberships")?;
    summary.team_host_memberships =
        memberships_per_host(conn, false).context("count team host memberships")?;
    summary.cross_team_memberships = count(
        queries::count_cross_team_memberships(),
        "cross-team memberships",
    )?;

    let outcomes = sq_query_map(conn, queries::outcome_counts(), |row| {
        Ok((row.get::<_, Option<bool>>(0)?, row.get::<_, i64>(1)? as u64))
    })
    .context("count outcomes")?;
    for (passes, n) in outcomes {
        match Outcome::from_passes(passes) {
            Outcome::Pass => summary.outcomes.pass += n,
            Outcome::Fail => summary.outcomes.fail += n,
            Outcome::Unknown => summary.outcomes.unknown += n,
        }
    }

    summary.duplicate_checksums =
        count(queries::count_duplicate_checksums(), "duplicate checksums")?;

    let checksums = sq_query_map(conn, queries::policy_checksums(), |row| {
        Ok((
            row.get::<_, Option<u32>>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Vec<u8>>(2)?,
        ))
    })
    .context("read policy checksums")?;
    summary.checksum_mismatches = checksums
        .iter()
        .filter(|(team_id, name, stored)| policy_checksum(*team_id, name).as_slice() != stored)
        .count() as u64;

    Ok(summary)
}

fn per_team(conn: &Connection, built: queries::Built) -> rusqlite::Result<BTreeMap<u32, u64>> {
    let rows = sq_query_map(conn, built, |row| {
        Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)? as u64))
    })?;
    Ok(rows.into_iter().collect())
}

fn memberships_per_host(conn: &Connection, global: bool) -> rusqlite::Result<BTreeMap<u64, u64>> {
    let rows = sq_query_map(conn, queries::memberships_per_host(global), |row| {
        Ok((row.get::<_, i64>(0)? as u64, row.get::<_, i64>(1)? as u64))
    })?;
    Ok(rows.into_iter().collect())
}
