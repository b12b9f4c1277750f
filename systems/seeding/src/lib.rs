#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeding system that places the initial population at random empty cells.

use ecosystem_core::{Command, Event, PopulationCounts, Species};
use ecosystem_world::{self as world, World, WorldError};
use tracing::{debug, warn};

/// Number of entities of each species to place before the first tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    plants: u32,
    herbivores: u32,
    carnivores: u32,
}

impl Config {
    /// Creates a configuration with explicit per-species counts.
    #[must_use]
    pub const fn new(plants: u32, herbivores: u32, carnivores: u32) -> Self {
        Self {
            plants,
            herbivores,
            carnivores,
        }
    }

    /// Requested number of entities of the species.
    #[must_use]
    pub const fn count(&self, species: Species) -> u32 {
        match species {
            Species::Plant => self.plants,
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }

    /// Spawn commands in placement order: plants, then herbivores, then carnivores.
    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        Species::ALL.into_iter().flat_map(move |species| {
            (0..self.count(species)).map(move |_| Command::SpawnSpecies { species })
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(5, 3, 2)
    }
}

/// Places the configured population into the world.
///
/// Spawning stops at the first full-world failure and the partial population
/// is kept. Contract violations are propagated unchanged.
pub fn seed(
    config: &Config,
    world: &mut World,
    out_events: &mut Vec<Event>,
) -> Result<PopulationCounts, WorldError> {
    let mut placed = PopulationCounts::default();
    for command in config.commands() {
        let Command::SpawnSpecies { species } = command else {
            continue;
        };
        match world::apply(world, command, out_events) {
            Ok(()) => placed.record(species),
            Err(WorldError::WorldFull) => {
                warn!(
                    species = species.name(),
                    placed = placed.total(),
                    "world is full, seeding stopped early"
                );
                return Ok(placed);
            }
            Err(error) => return Err(error),
        }
    }

    debug!(%placed, "seeding complete");
    Ok(placed)
}
