//! Run configuration assembled from command-line flags and an optional TOML file.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use ecosystem_core::Species;
use ecosystem_system_seeding::Config as SeedingConfig;
use ecosystem_world::DEFAULT_SEED;
use serde::Deserialize;

const DEFAULT_WIDTH: u32 = 10;
const DEFAULT_HEIGHT: u32 = 10;
const DEFAULT_INTERVAL_MS: u64 = 800;

/// Command-line arguments for the ecosystem simulation.
#[derive(Debug, Parser)]
#[command(
    name = "ecosystem",
    version,
    about = "Run a predator/prey ecosystem on a fixed grid"
)]
pub(crate) struct CliArgs {
    /// TOML file whose keys mirror the flags below. Flags take precedence.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of grid rows (x extent).
    #[arg(long)]
    width: Option<u32>,
    /// Number of grid columns (y extent).
    #[arg(long)]
    height: Option<u32>,
    /// Plants placed before the first tick.
    #[arg(long)]
    plants: Option<u32>,
    /// Herbivores placed before the first tick.
    #[arg(long)]
    herbivores: Option<u32>,
    /// Carnivores placed before the first tick.
    #[arg(long)]
    carnivores: Option<u32>,
    /// Seed for every random decision in the run.
    #[arg(long)]
    seed: Option<u64>,
    /// Delay between frames in milliseconds.
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,
    /// Stop after this many ticks instead of running until collapse.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Print frames one after another instead of clearing the terminal.
    #[arg(long)]
    no_clear: bool,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
struct FileConfig {
    width: Option<u32>,
    height: Option<u32>,
    plants: Option<u32>,
    herbivores: Option<u32>,
    carnivores: Option<u32>,
    seed: Option<u64>,
    interval_ms: Option<u64>,
    max_ticks: Option<u64>,
    no_clear: Option<bool>,
}

/// Fully resolved settings for one simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) population: SeedingConfig,
    pub(crate) seed: u64,
    pub(crate) interval: Duration,
    pub(crate) max_ticks: Option<u64>,
    pub(crate) clear_screen: bool,
}

impl CliArgs {
    /// Loads the referenced config file, if any, and layers the flags on top.
    pub(crate) fn resolve(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                parse_file_config(&text)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
            None => FileConfig::default(),
        };
        Ok(self.merge(file))
    }

    fn merge(&self, file: FileConfig) -> Settings {
        let defaults = SeedingConfig::default();
        let count = |flag: Option<u32>, from_file: Option<u32>, species| {
            flag.or(from_file).unwrap_or(defaults.count(species))
        };

        Settings {
            width: self.width.or(file.width).unwrap_or(DEFAULT_WIDTH),
            height: self.height.or(file.height).unwrap_or(DEFAULT_HEIGHT),
            population: SeedingConfig::new(
                count(self.plants, file.plants, Species::Plant),
                count(self.herbivores, file.herbivores, Species::Herbivore),
                count(self.carnivores, file.carnivores, Species::Carnivore),
            ),
            seed: self.seed.or(file.seed).unwrap_or(DEFAULT_SEED),
            interval: Duration::from_millis(
                self.interval_ms
                    .or(file.interval_ms)
                    .unwrap_or(DEFAULT_INTERVAL_MS),
            ),
            max_ticks: self.max_ticks.or(file.max_ticks),
            clear_screen: !(self.no_clear || file.no_clear.unwrap_or(false)),
        }
    }
}

fn parse_file_config(text: &str) -> Result<FileConfig> {
    toml::from_str(text).context("invalid ecosystem configuration")
}
