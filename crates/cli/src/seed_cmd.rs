use anyhow::{bail, Context, Result};
use policyseed_db::SeedDb;
use policyseed_runtime_config::resolve_config;
use policyseed_seeder::{rng_from_seed, Seeder};
use std::path::Path;

/// Purge the configured database and seed it from scratch.
pub fn run_seed(config_path: Option<&Path>, seed: Option<u64>, verify: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Could not determine working directory")?;
    let mut config = resolve_config(config_path, &cwd)?;
    if let Some(seed) = seed {
        config.rng.seed = Some(seed);
    }
    let plan = config.plan()?;

    let db = SeedDb::open_path(&config.database.path)?;
    if config.database.init_schema {
        db.init_schema()?;
    }

    tracing::info!(
        "seeding {} ({} teams, {} policies, {} hosts, {} memberships)",
        config.database.path.display(),
        plan.counts().teams,
        plan.total_policies(),
        plan.total_hosts(),
        plan.total_memberships(),
    );

    let mut rng = rng_from_seed(config.rng.seed);
    let report = Seeder::new(&db, plan)
        .with_weights(config.outcomes)
        .with_progress_every(config.progress.every_hosts)
        .run(&mut rng)?;

    tracing::info!(
        "wrote {} teams, {} policies, {} hosts, {} memberships \
         (pass {}, fail {}, unknown {}) in {:.1}s",
        report.teams,
        report.policies,
        report.hosts,
        report.memberships,
        report.outcomes.pass,
        report.outcomes.fail,
        report.outcomes.unknown,
        report.elapsed.as_secs_f64(),
    );

    if verify {
        let summary = db.summary()?;
        let problems = summary.check_against(&plan);
        if !problems.is_empty() {
            bail!("dataset verification failed: {}", problems.join("; "));
        }
        tracing::info!(
            "verified {} memberships across {} hosts",
            summary.memberships(),
            summary.global_hosts + summary.team_hosts
        );
    }

    println!("Success!");
    Ok(())
}
