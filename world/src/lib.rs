#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the ecosystem simulation.
//!
//! The world owns a fixed-size grid of entity slots. An entity exists exactly
//! while its slot is occupied; there is no separate entity lifetime to track.
//! A set of occupied cell identifiers mirrors the grid so occupancy and
//! "world is full" tests stay O(1).

mod entity;

use std::collections::HashSet;

use ecosystem_core::{CellCoord, Command, Event, GridSize, Species, EMPTY_CELL_SYMBOL};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, trace};

pub use entity::{Entity, FLEE_COMMIT_PROBABILITY};

/// Seed used by [`World::new`] when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Errors raised by world operations.
///
/// Everything except [`WorldError::WorldFull`] is a contract violation: it
/// signals that a caller broke an invariant and must be propagated rather
/// than absorbed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The requested world extent has a zero side or too many cells.
    #[error("world dimensions {width}x{height} are invalid")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A cell outside the world was addressed.
    #[error("cell {cell} lies outside the world")]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
    },
    /// An entity was registered into a cell that already holds one.
    #[error("cell {cell} is already occupied")]
    CellOccupied {
        /// Offending cell.
        cell: CellCoord,
    },
    /// An entity removal addressed an empty cell.
    #[error("cell {cell} holds no entity")]
    VacantCell {
        /// Offending cell.
        cell: CellCoord,
    },
    /// Predator and prey resolved to the identical cell while feeding.
    #[error("two entities at the same position {cell}")]
    SamePosition {
        /// Cell claimed by both entities.
        cell: CellCoord,
    },
    /// No empty cell remains for a new entity.
    #[error("world is full")]
    WorldFull,
}

impl WorldError {
    /// Reports whether the error stems from caller misuse rather than resource exhaustion.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        !matches!(self, Self::WorldFull)
    }
}

/// Represents the authoritative ecosystem world state.
#[derive(Clone, Debug)]
pub struct World {
    size: GridSize,
    grid: OccupancyGrid,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl World {
    /// Creates an empty world seeded with [`DEFAULT_SEED`].
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        Self::with_seed(width, height, DEFAULT_SEED)
    }

    /// Creates an empty world whose random decisions derive from `seed`.
    pub fn with_seed(width: u32, height: u32, seed: u64) -> Result<Self, WorldError> {
        let size = GridSize::new(width, height);
        let capacity = match size.capacity() {
            Some(capacity) if width > 0 && height > 0 => capacity,
            _ => return Err(WorldError::InvalidDimensions { width, height }),
        };

        Ok(Self {
            size,
            grid: OccupancyGrid::new(size, capacity),
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick_index: 0,
        })
    }

    /// Fixed extent of the world.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Number of ticks resolved so far.
    #[must_use]
    pub const fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Advances the simulation by one tick.
    ///
    /// Every `updated` flag is cleared first. The grid is then swept once per
    /// species in ascending rank order (plants, herbivores, carnivores), each
    /// sweep row-major. An unvisited occupant of the swept species is removed
    /// when its energy is exhausted and otherwise takes its turn. The flag
    /// keeps an entity that moved into a later cell from acting twice.
    pub fn tick(&mut self, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
        self.grid.clear_updated_flags();

        let size = self.size;
        for species in Species::ALL {
            for cell in size.cells() {
                let pending = self
                    .grid
                    .get(cell)
                    .is_some_and(|entity| entity.species() == species && !entity.is_updated());
                if !pending {
                    continue;
                }

                let Some(mut entity) = self.grid.remove(cell) else {
                    continue;
                };

                if entity.energy() == 0 {
                    trace!(species = species.name(), %cell, "entity starved");
                    out_events.push(Event::EntityStarved { species, cell });
                    continue;
                }

                entity.mark_updated();
                entity.update(self, out_events)?;
            }
        }

        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });
        debug!(
            tick = self.tick_index,
            occupied = self.occupied_cells_count(),
            "tick resolved"
        );
        Ok(())
    }

    /// Registers an entity at its current position.
    ///
    /// Fails when the position lies outside the world or is already occupied;
    /// existing occupants are never overwritten.
    pub fn add_entity(&mut self, entity: Entity) -> Result<(), WorldError> {
        self.grid.insert(entity)
    }

    /// Spawns one fresh entity of the species at a uniformly random empty cell.
    pub fn add_entity_type(&mut self, species: Species) -> Result<CellCoord, WorldError> {
        let cell = self.get_new_empty_cell()?;
        self.add_entity(Entity::new(species, cell))?;
        Ok(cell)
    }

    /// Picks a uniformly random unoccupied cell.
    ///
    /// Returns [`WorldError::WorldFull`] when every cell is occupied, so
    /// callers can stop spawning instead of retrying.
    pub fn get_new_empty_cell(&mut self) -> Result<CellCoord, WorldError> {
        let free = self.grid.free_cells();
        if free == 0 {
            return Err(WorldError::WorldFull);
        }

        let pick = self.rng.gen_range(0..free);
        let grid = &self.grid;
        self.size
            .cells()
            .filter(|cell| !grid.is_occupied(*cell))
            .nth(pick as usize)
            .ok_or(WorldError::WorldFull)
    }

    /// Destroys the entity occupying the cell and releases its slot.
    ///
    /// Returns the species of the destroyed entity.
    pub fn kill_entity(&mut self, cell: CellCoord) -> Result<Species, WorldError> {
        if !self.size.contains(cell) {
            return Err(WorldError::OutOfBounds { cell });
        }
        self.grid
            .remove(cell)
            .map(|entity| entity.species())
            .ok_or(WorldError::VacantCell { cell })
    }

    /// Lifts the entity out of its cell without destroying it.
    ///
    /// The cell becomes empty until the entity is registered again with
    /// [`World::add_entity`].
    pub fn detach(&mut self, cell: CellCoord) -> Option<Entity> {
        self.grid.remove(cell)
    }

    /// Symbol of the occupant, or [`EMPTY_CELL_SYMBOL`] for empty and
    /// out-of-bounds cells.
    #[must_use]
    pub fn cell_symbol(&self, cell: CellCoord) -> char {
        self.grid
            .get(cell)
            .map_or(EMPTY_CELL_SYMBOL, Entity::symbol)
    }

    /// Entity occupying the cell, if any.
    #[must_use]
    pub fn entity_at(&self, cell: CellCoord) -> Option<&Entity> {
        self.grid.get(cell)
    }

    /// Reports whether the cell holds an entity.
    #[must_use]
    pub fn is_cell_occupied(&self, cell: CellCoord) -> bool {
        self.grid.is_occupied(cell)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_cells_count(&self) -> usize {
        self.grid.occupied_count()
    }

    /// Reports whether every cell is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.grid.free_cells() == 0
    }

    /// Unique identifier `x * height + y` of an in-bounds cell.
    #[must_use]
    pub fn cell_id(&self, cell: CellCoord) -> Option<u32> {
        self.size.cell_id(cell)
    }

    /// Inverse of [`World::cell_id`].
    #[must_use]
    pub fn cell_coordinates(&self, cell_id: u32) -> Option<CellCoord> {
        self.size.cell_coordinates(cell_id)
    }

    /// Verifies the occupancy and energy invariants for every cell.
    ///
    /// A cell id is in the occupied set exactly when its slot holds an
    /// entity, every occupant's recorded position matches its slot, and every
    /// occupant's energy lies within its species bounds.
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        let mut seen = 0;
        for cell in self.size.cells() {
            let in_set = self
                .size
                .cell_id(cell)
                .is_some_and(|id| self.grid.occupied.contains(&id));
            match self.grid.get(cell) {
                Some(entity) => {
                    seen += 1;
                    if !in_set
                        || entity.position() != cell
                        || entity.energy() > entity.config().max_energy
                    {
                        return false;
                    }
                }
                None if in_set => return false,
                None => {}
            }
        }
        seen == self.grid.occupied_count()
    }

    pub(crate) fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    match command {
        Command::Tick => world.tick(out_events),
        Command::SpawnSpecies { species } => {
            let cell = world.add_entity_type(species)?;
            out_events.push(Event::EntitySpawned { species, cell });
            Ok(())
        }
        Command::PlaceEntity { species, cell } => {
            world.add_entity(Entity::new(species, cell))?;
            out_events.push(Event::EntitySpawned { species, cell });
            Ok(())
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use ecosystem_core::{CellCoord, EntitySnapshot, GridSize, PopulationCounts};

    use super::World;

    /// Provides the fixed extent of the world.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.size()
    }

    /// Number of ticks resolved so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index()
    }

    /// Symbol shown for the cell.
    #[must_use]
    pub fn cell_symbol(world: &World, cell: CellCoord) -> char {
        world.cell_symbol(cell)
    }

    /// Captures the state of the entity occupying the cell, if any.
    #[must_use]
    pub fn entity_at(world: &World, cell: CellCoord) -> Option<EntitySnapshot> {
        world.entity_at(cell).map(|entity| entity.snapshot())
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_cells_count(world: &World) -> usize {
        world.occupied_cells_count()
    }

    /// Counts live entities per species.
    #[must_use]
    pub fn population(world: &World) -> PopulationCounts {
        let mut counts = PopulationCounts::default();
        for snapshot in entity_view(world) {
            counts.record(snapshot.species);
        }
        counts
    }

    /// Captures every live entity in row-major order.
    #[must_use]
    pub fn entity_view(world: &World) -> Vec<EntitySnapshot> {
        world
            .size()
            .cells()
            .filter_map(|cell| entity_at(world, cell))
            .collect()
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    size: GridSize,
    capacity: u32,
    slots: Vec<Option<Entity>>,
    occupied: HashSet<u32>,
}

impl OccupancyGrid {
    fn new(size: GridSize, capacity: u32) -> Self {
        Self {
            size,
            capacity,
            slots: vec![None; capacity as usize],
            occupied: HashSet::with_capacity(capacity as usize),
        }
    }

    fn get(&self, cell: CellCoord) -> Option<&Entity> {
        self.index(cell)
            .and_then(|index| self.slots.get(index))
            .and_then(Option::as_ref)
    }

    fn is_occupied(&self, cell: CellCoord) -> bool {
        self.size
            .cell_id(cell)
            .is_some_and(|id| self.occupied.contains(&id))
    }

    fn insert(&mut self, entity: Entity) -> Result<(), WorldError> {
        let cell = entity.position();
        let Some(id) = self.size.cell_id(cell) else {
            return Err(WorldError::OutOfBounds { cell });
        };
        let Some(slot) = self.slots.get_mut(id as usize) else {
            return Err(WorldError::OutOfBounds { cell });
        };
        if slot.is_some() {
            return Err(WorldError::CellOccupied { cell });
        }

        *slot = Some(entity);
        let _ = self.occupied.insert(id);
        Ok(())
    }

    fn remove(&mut self, cell: CellCoord) -> Option<Entity> {
        let id = self.size.cell_id(cell)?;
        let removed = self.slots.get_mut(id as usize)?.take();
        if removed.is_some() {
            let _ = self.occupied.remove(&id);
        }
        removed
    }

    fn clear_updated_flags(&mut self) {
        for entity in self.slots.iter_mut().flatten() {
            entity.clear_updated();
        }
    }

    fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    fn free_cells(&self) -> u32 {
        let occupied = u32::try_from(self.occupied.len()).unwrap_or(u32::MAX);
        self.capacity.saturating_sub(occupied)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        self.size.cell_id(cell).map(|id| id as usize)
    }
}
