use policyseed_core::{Counts, Outcome, OutcomeWeights, SeedPlan};
use policyseed_db::SeedDb;
use policyseed_seeder::{rng_from_seed, Seeder};

fn small_counts() -> Counts {
    Counts {
        teams: 3,
        global_policies: 5,
        team_policies: 4,
        global_hosts: 20,
        team_hosts: 10,
    }
}

fn fresh_db() -> SeedDb {
    let db = SeedDb::open_in_memory().expect("open db");
    db.init_schema().expect("init schema");
    db
}

fn seed(db: &SeedDb, counts: Counts, seed: u64) -> policyseed_seeder::SeedReport {
    let plan = SeedPlan::new(counts).expect("plan");
    let mut rng = rng_from_seed(Some(seed));
    Seeder::new(db, plan).run(&mut rng).expect("seed run")
}

fn membership_rows(db: &SeedDb) -> Vec<(u32, u32, Option<bool>)> {
    let mut stmt = db
        .conn()
        .prepare("SELECT policy_id, host_id, passes FROM policy_membership ORDER BY host_id, policy_id")
        .expect("prepare");
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .expect("query");
    rows.collect::<rusqlite::Result<_>>().expect("rows")
}

#[test]
fn dataset_matches_plan() {
    let db = fresh_db();
    seed(&db, small_counts(), 1);

    let plan = SeedPlan::new(small_counts()).unwrap();
    let summary = db.summary().expect("summary");
    assert_eq!(summary.check_against(&plan), Vec::<String>::new());

    assert_eq!(summary.global_policies, 5);
    assert_eq!(summary.team_policies, 3 * 4);
    assert_eq!(summary.global_hosts, 20);
    assert_eq!(summary.team_hosts, 3 * 10);
    for team in 1..=3 {
        assert_eq!(summary.hosts_per_team.get(&team), Some(&10));
        assert_eq!(summary.policies_per_team.get(&team), Some(&4));
    }
}

#[test]
fn every_host_has_expected_membership_count() {
    let db = fresh_db();
    seed(&db, small_counts(), 2);

    let summary = db.summary().unwrap();
    // 20 global hosts x 5 global policies
    assert_eq!(summary.global_host_memberships.len(), 1);
    assert_eq!(summary.global_host_memberships.get(&5), Some(&20));
    // 30 team hosts x (5 global + 4 team) policies
    assert_eq!(summary.team_host_memberships.len(), 1);
    assert_eq!(summary.team_host_memberships.get(&9), Some(&30));
}

#[test]
fn team_hosts_only_join_their_own_team_policies() {
    let db = fresh_db();
    seed(&db, small_counts(), 3);

    assert_eq!(db.summary().unwrap().cross_team_memberships, 0);

    let plan = SeedPlan::new(small_counts()).unwrap();
    let owners: Vec<(u32, u32)> = db
        .conn()
        .prepare(
            "SELECT h.team_id, pm.policy_id FROM policy_membership pm \
             JOIN hosts h ON h.id = pm.host_id WHERE h.team_id IS NOT NULL",
        )
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    assert!(!owners.is_empty());
    for (team, policy_id) in owners {
        assert!(
            plan.global_policy_ids().contains(&policy_id)
                || plan.team_policy_ids(team).contains(&policy_id),
            "team {team} host joined policy {policy_id}"
        );
    }
}

#[test]
fn checksums_are_reproducible_and_unique() {
    let db = fresh_db();
    seed(&db, small_counts(), 4);

    let summary = db.summary().unwrap();
    assert_eq!(summary.checksum_mismatches, 0);
    assert_eq!(summary.duplicate_checksums, 0);
}

#[test]
fn report_matches_written_rows() {
    let db = fresh_db();
    let report = seed(&db, small_counts(), 5);
    let plan = SeedPlan::new(small_counts()).unwrap();

    assert_eq!(report.teams, 3);
    assert_eq!(report.policies, plan.total_policies());
    assert_eq!(report.hosts, plan.total_hosts());
    assert_eq!(report.memberships, plan.total_memberships());

    let summary = db.summary().unwrap();
    assert_eq!(report.outcomes, summary.outcomes);
}

#[test]
fn rerun_purges_and_recreates_same_cardinality() {
    let db = fresh_db();
    seed(&db, small_counts(), 6);
    let first = db.summary().unwrap();

    seed(&db, small_counts(), 7);
    let second = db.summary().unwrap();

    assert_eq!(first.teams, second.teams);
    assert_eq!(first.global_policies, second.global_policies);
    assert_eq!(first.team_policies, second.team_policies);
    assert_eq!(first.global_hosts, second.global_hosts);
    assert_eq!(first.team_hosts, second.team_hosts);
    assert_eq!(first.memberships(), second.memberships());
    assert_eq!(first.global_host_memberships, second.global_host_memberships);
    assert_eq!(first.team_host_memberships, second.team_host_memberships);
}

#[test]
fn same_seed_reproduces_outcomes() {
    let a = fresh_db();
    let b = fresh_db();
    seed(&a, small_counts(), 42);
    seed(&b, small_counts(), 42);
    assert_eq!(membership_rows(&a), membership_rows(&b));

    let c = fresh_db();
    seed(&c, small_counts(), 43);
    assert_ne!(membership_rows(&a), membership_rows(&c));
}

#[test]
fn outcome_distribution_approximates_weights() {
    let db = fresh_db();
    let counts = Counts {
        teams: 2,
        global_policies: 50,
        team_policies: 20,
        global_hosts: 200,
        team_hosts: 100,
    };
    seed(&db, counts, 8);

    let outcomes = db.summary().unwrap().outcomes;
    // 200 x 50 + 200 x 70
    assert_eq!(outcomes.total(), 24_000);
    assert!((outcomes.share(Outcome::Unknown) - 0.10).abs() < 0.02);
    assert!((outcomes.share(Outcome::Pass) - 0.45).abs() < 0.02);
    assert!((outcomes.share(Outcome::Fail) - 0.45).abs() < 0.02);
}

#[test]
fn custom_weights_are_honoured() {
    let db = fresh_db();
    let plan = SeedPlan::new(small_counts()).unwrap();
    let mut rng = rng_from_seed(Some(9));
    Seeder::new(&db, plan)
        .with_weights(OutcomeWeights {
            unknown: 1,
            pass: 0,
            fail: 0,
        })
        .run(&mut rng)
        .unwrap();

    let outcomes = db.summary().unwrap().outcomes;
    assert_eq!(outcomes.unknown, outcomes.total());
}

#[test]
fn stale_rows_are_purged_before_seeding() {
    let db = fresh_db();
    db.insert_team(99, "stale", "stale team").unwrap();
    db.insert_policy(999, Some(99), "stale-policy").unwrap();
    db.insert_host(999, Some(99)).unwrap();
    db.insert_memberships(999, &[(999, Outcome::Pass)]).unwrap();

    seed(&db, small_counts(), 10);

    let summary = db.summary().unwrap();
    let plan = SeedPlan::new(small_counts()).unwrap();
    assert!(summary.check_against(&plan).is_empty());
    assert!(!summary.hosts_per_team.contains_key(&99));
}

#[test]
fn empty_counts_produce_empty_dataset() {
    let db = fresh_db();
    let counts = Counts {
        teams: 0,
        global_policies: 0,
        team_policies: 0,
        global_hosts: 0,
        team_hosts: 0,
    };
    let report = seed(&db, counts, 11);
    assert_eq!(report.memberships, 0);

    let summary = db.summary().unwrap();
    assert!(summary.check_against(&SeedPlan::new(counts).unwrap()).is_empty());
    assert_eq!(summary.memberships(), 0);
}

#[test]
fn hosts_without_policies_get_no_memberships() {
    let db = fresh_db();
    let counts = Counts {
        teams: 1,
        global_policies: 0,
        team_policies: 0,
        global_hosts: 3,
        team_hosts: 2,
    };
    seed(&db, counts, 12);

    let summary = db.summary().unwrap();
    assert_eq!(summary.memberships(), 0);
    assert_eq!(summary.global_host_memberships.get(&0), Some(&3));
    assert!(summary.check_against(&SeedPlan::new(counts).unwrap()).is_empty());
}

#[test]
fn missing_schema_aborts_the_run() {
    let db = SeedDb::open_in_memory().unwrap();
    let plan = SeedPlan::new(small_counts()).unwrap();
    let mut rng = rng_from_seed(Some(13));
    let err = Seeder::new(&db, plan).run(&mut rng).unwrap_err();
    assert!(format!("{err:#}").contains("purge policy_stats"));
}

#[test]
fn seeding_a_file_database_persists_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.db");
    {
        let db = SeedDb::open_path(&path).unwrap();
        db.init_schema().unwrap();
        seed(&db, small_counts(), 14);
    }
    let reopened = SeedDb::open_path(&path).unwrap();
    let plan = SeedPlan::new(small_counts()).unwrap();
    assert!(reopened.summary().unwrap().check_against(&plan).is_empty());
}
