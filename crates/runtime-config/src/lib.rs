//! Seeder configuration types.
//!
//! `policyseed.toml` replaces the connection string and counts that used to
//! be compiled in. Every field has a default, so an empty file (or no file at
//! all) reproduces the standard benchmark dataset.

use anyhow::{Context, Result};
use policyseed_core::{Counts, OutcomeWeights, SeedPlan};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Canonical config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "policyseed.toml";

/// Top-level seeder configuration (persisted as `policyseed.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeederConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub counts: Counts,
    #[serde(default)]
    pub outcomes: OutcomeWeights,
    #[serde(default)]
    pub rng: RngSettings,
    #[serde(default)]
    pub progress: ProgressSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Create missing tables before seeding. The schema is normally owned
    /// by the application under test.
    #[serde(default = "default_false")]
    pub init_schema: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            init_schema: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RngSettings {
    /// Fixed seed for reproducible outcomes; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSettings {
    /// Log a progress line whenever a host id is a multiple of this value.
    #[serde(default = "default_every_hosts")]
    pub every_hosts: u32,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            every_hosts: default_every_hosts(),
        }
    }
}

impl SeederConfig {
    /// Validate counts and weights, returning the id plan they imply.
    pub fn plan(&self) -> Result<SeedPlan> {
        self.outcomes.validate().context("invalid [outcomes]")?;
        SeedPlan::new(self.counts).context("invalid [counts]")
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_false() -> bool {
    false
}
fn default_every_hosts() -> u32 {
    100
}
fn default_db_path() -> PathBuf {
    PathBuf::from("policyseed.db")
}

/// Read and parse a config file.
pub fn load_config(path: &Path) -> Result<SeederConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let config = toml::from_str::<SeederConfig>(&content)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    Ok(config)
}

/// Load `explicit` when given; otherwise `policyseed.toml` in `cwd` if it
/// exists, else the defaults.
pub fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<SeederConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let fallback = cwd.join(CONFIG_FILE_NAME);
    if fallback.exists() {
        return load_config(&fallback);
    }
    Ok(SeederConfig::default())
}
