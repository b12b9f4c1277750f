#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the ecosystem simulation.
//!
//! This crate defines the value types and message surface that connect the
//! tick driver, the authoritative world, and the pure systems. Drivers submit
//! [`Command`] values describing desired mutations, the world executes them
//! via its `apply` entry point or its direct operations, and then broadcasts
//! [`Event`] values that systems consume deterministically.

mod species;

use std::{
    fmt,
    ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

pub use species::{
    config_for, rank, Species, SpeciesConfig, CARNIVORE_CONFIG, HERBIVORE_CONFIG, PLANT_CONFIG,
};

/// Symbol reported for a cell that holds no entity.
pub const EMPTY_CELL_SYMBOL: char = '.';

/// Integer two-dimensional vector used for displacements and velocities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector2 {
    /// Displacement along the x axis.
    pub x: i32,
    /// Displacement along the y axis.
    pub y: i32,
}

impl Vector2 {
    /// The zero vector, used as the "stay in place" velocity.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new vector from its components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Reports whether both components are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<i32> for Vector2 {
    type Output = Self;

    fn mul(self, scalar: i32) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl MulAssign<i32> for Vector2 {
    fn mul_assign(&mut self, scalar: i32) {
        self.x *= scalar;
        self.y *= scalar;
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector2({}, {})", self.x, self.y)
    }
}

/// Orthogonal single-step movement directions.
///
/// The grid is indexed as `grid[x][y]` and rendered one line per `x`, so
/// north and south move along the x axis while west and east move along y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing x.
    North,
    /// Movement toward increasing x.
    South,
    /// Movement toward decreasing y.
    West,
    /// Movement toward increasing y.
    East,
}

impl Direction {
    /// Order in which greedy movement and wandering examine neighbours.
    pub const SCAN_ORDER: [Self; 4] = [Self::North, Self::West, Self::East, Self::South];

    /// Order in which reproduction examines neighbours for a spawn cell.
    pub const REPRODUCTION_ORDER: [Self; 4] = [Self::North, Self::South, Self::West, Self::East];

    /// Unit displacement associated with the direction.
    #[must_use]
    pub const fn offset(self) -> Vector2 {
        match self {
            Self::North => Vector2::new(-1, 0),
            Self::South => Vector2::new(1, 0),
            Self::West => Vector2::new(0, -1),
            Self::East => Vector2::new(0, 1),
        }
    }
}

/// Location of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based x index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based y index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Applies a displacement, returning `None` when either axis would leave
    /// the non-negative quadrant. Upper bounds are checked by [`GridSize`].
    #[must_use]
    pub fn offset(self, displacement: Vector2) -> Option<CellCoord> {
        let x = self.x.checked_add_signed(displacement.x)?;
        let y = self.y.checked_add_signed(displacement.y)?;
        Some(Self::new(x, y))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed extent of the simulation grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new grid extent.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of cells along the x axis.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cells along the y axis.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells, or `None` when the product overflows a cell id.
    #[must_use]
    pub const fn capacity(&self) -> Option<u32> {
        self.width.checked_mul(self.height)
    }

    /// Reports whether the cell lies within the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() < self.width && cell.y() < self.height
    }

    /// Maps an in-bounds cell to its unique identifier `x * height + y`.
    #[must_use]
    pub fn cell_id(&self, cell: CellCoord) -> Option<u32> {
        if !self.contains(cell) {
            return None;
        }
        cell.x()
            .checked_mul(self.height)
            .and_then(|base| base.checked_add(cell.y()))
    }

    /// Inverse of [`GridSize::cell_id`].
    #[must_use]
    pub fn cell_coordinates(&self, cell_id: u32) -> Option<CellCoord> {
        if self.height == 0 {
            return None;
        }
        let cell = CellCoord::new(cell_id / self.height, cell_id % self.height);
        self.contains(cell).then_some(cell)
    }

    /// Neighbouring cell one step in the given direction, if in bounds.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.offset(direction.offset())
            .filter(|candidate| self.contains(*candidate))
    }

    /// Iterates every cell in row-major order (x outer, y inner).
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let height = self.height;
        (0..self.width).flat_map(move |x| (0..height).map(move |y| CellCoord::new(x, y)))
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation by one tick.
    Tick,
    /// Spawns an entity of the species at a uniformly random empty cell.
    SpawnSpecies {
        /// Species of the entity to create.
        species: Species,
    },
    /// Places a fresh entity of the species at an explicit cell.
    PlaceEntity {
        /// Species of the entity to create.
        species: Species,
        /// Cell the entity should occupy.
        cell: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation advanced to a new tick.
    TimeAdvanced {
        /// Index of the tick that just completed.
        tick: u64,
    },
    /// Confirms that an entity was created by seeding or placement.
    EntitySpawned {
        /// Species of the created entity.
        species: Species,
        /// Cell the entity occupies.
        cell: CellCoord,
    },
    /// Confirms that an entity reproduced.
    EntityBorn {
        /// Species shared by parent and child.
        species: Species,
        /// Cell occupied by the parent while reproducing.
        parent: CellCoord,
        /// Cell occupied by the child.
        cell: CellCoord,
    },
    /// Confirms that an entity changed cells.
    EntityMoved {
        /// Species of the moving entity.
        species: Species,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Reports that a predator ate an adjacent prey.
    EntityEaten {
        /// Species of the predator.
        predator: Species,
        /// Species of the prey.
        prey: Species,
        /// Cell the prey occupied.
        cell: CellCoord,
    },
    /// Reports that a lower-ranked entity was destroyed by a mover entering its cell.
    EntityTrampled {
        /// Species of the destroyed entity.
        species: Species,
        /// Species of the entity that entered the cell.
        by: Species,
        /// Cell the destroyed entity occupied.
        cell: CellCoord,
    },
    /// Reports that an entity with no energy left was removed.
    EntityStarved {
        /// Species of the removed entity.
        species: Species,
        /// Cell the entity occupied.
        cell: CellCoord,
    },
}

/// Immutable representation of a single entity's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntitySnapshot {
    /// Species of the entity.
    pub species: Species,
    /// Cell currently occupied by the entity.
    pub cell: CellCoord,
    /// Velocity resolved during the entity's most recent turn.
    pub velocity: Vector2,
    /// Remaining energy.
    pub energy: u32,
}

/// Number of live entities per species.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PopulationCounts {
    /// Live plants.
    pub plants: u32,
    /// Live herbivores.
    pub herbivores: u32,
    /// Live carnivores.
    pub carnivores: u32,
}

impl PopulationCounts {
    /// Counts one more entity of the species.
    pub fn record(&mut self, species: Species) {
        let slot = match species {
            Species::Plant => &mut self.plants,
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        };
        *slot = slot.saturating_add(1);
    }

    /// Number of live entities of the species.
    #[must_use]
    pub const fn get(&self, species: Species) -> u32 {
        match species {
            Species::Plant => self.plants,
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }

    /// Total number of live entities.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.plants
            .saturating_add(self.herbivores)
            .saturating_add(self.carnivores)
    }
}

impl fmt::Display for PopulationCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Plants: {}, Herbivores: {}, Carnivores: {}",
            self.plants, self.herbivores, self.carnivores
        )
    }
}
