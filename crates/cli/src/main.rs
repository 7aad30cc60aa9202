mod seed_cmd;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "policyseed",
    version,
    about = "Purge and re-seed teams, policies, hosts and policy memberships"
)]
struct Cli {
    /// Path to a policyseed.toml (default: ./policyseed.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for membership outcomes, overriding [rng] seed
    #[arg(long)]
    seed: Option<u64>,

    /// Read the dataset back and check it against the configured counts
    #[arg(long)]
    verify: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "policyseed=info,policyseed_seeder=info,policyseed_db=info".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    let result = seed_cmd::run_seed(cli.config.as_deref(), cli.seed, cli.verify);

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
