//! Static species table and dominance ranks.

use serde::{Deserialize, Serialize};

/// Kinds of organisms that inhabit the grid, in ascending dominance order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    /// Stationary food source.
    Plant,
    /// Grazer that eats plants and flees carnivores.
    Herbivore,
    /// Hunter that eats herbivores.
    Carnivore,
}

impl Species {
    /// Every species in ascending rank order.
    pub const ALL: [Self; 3] = [Self::Plant, Self::Herbivore, Self::Carnivore];

    /// Single-character tag used on the grid.
    #[must_use]
    pub const fn symbol(self) -> char {
        self.config().symbol
    }

    /// Resolves a grid tag back into a species.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '*' => Some(Self::Plant),
            'H' => Some(Self::Herbivore),
            'C' => Some(Self::Carnivore),
            _ => None,
        }
    }

    /// Dominance rank of the species.
    #[must_use]
    pub const fn rank(self) -> u8 {
        rank(self.symbol())
    }

    /// Static configuration of the species.
    #[must_use]
    pub const fn config(self) -> &'static SpeciesConfig {
        match self {
            Self::Plant => &PLANT_CONFIG,
            Self::Herbivore => &HERBIVORE_CONFIG,
            Self::Carnivore => &CARNIVORE_CONFIG,
        }
    }

    /// Lower-case display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plant => "plant",
            Self::Herbivore => "herbivore",
            Self::Carnivore => "carnivore",
        }
    }
}

/// Immutable energy, vision, and reproduction parameters of a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpeciesConfig {
    /// Species described by this configuration.
    pub species: Species,
    /// Grid tag of the species.
    pub symbol: char,
    /// Species this one hunts, if it hunts at all.
    pub prey: Option<Species>,
    /// Energy a freshly created entity starts with.
    pub energy: u32,
    /// Upper bound on energy.
    pub max_energy: u32,
    /// Radius of the square neighbourhood searched for prey and threats.
    pub vision_range: u32,
    /// Energy deducted from the parent when reproducing.
    pub reproduction_cost: u32,
    /// Energy required before reproduction is attempted.
    pub reproduction_threshold: u32,
    /// Energy gained per successful feeding.
    pub energy_gain_from_eating: u32,
    /// Energy spent per step taken.
    pub energy_cost_per_tick: u32,
}

impl SpeciesConfig {
    /// Reports whether the entity acts on its turn. Only species with prey move.
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        self.prey.is_some()
    }

    /// Checks the table invariants that the decision logic relies on.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.reproduction_threshold >= self.reproduction_cost
            && self.energy_gain_from_eating <= self.max_energy
            && self.energy <= self.max_energy
    }
}

/// Herbivore parameters.
pub const HERBIVORE_CONFIG: SpeciesConfig = SpeciesConfig {
    species: Species::Herbivore,
    symbol: 'H',
    prey: Some(Species::Plant),
    energy: 100,
    max_energy: 200,
    vision_range: 2,
    reproduction_cost: 100,
    reproduction_threshold: 150,
    energy_gain_from_eating: 20,
    energy_cost_per_tick: 1,
};

/// Carnivore parameters.
pub const CARNIVORE_CONFIG: SpeciesConfig = SpeciesConfig {
    species: Species::Carnivore,
    symbol: 'C',
    prey: Some(Species::Herbivore),
    energy: 120,
    max_energy: 220,
    vision_range: 5,
    reproduction_cost: 120,
    reproduction_threshold: 180,
    energy_gain_from_eating: 30,
    energy_cost_per_tick: 2,
};

/// Plant parameters. Plants never spend energy, so a single unit keeps them alive.
pub const PLANT_CONFIG: SpeciesConfig = SpeciesConfig {
    species: Species::Plant,
    symbol: '*',
    prey: None,
    energy: 1,
    max_energy: 1,
    vision_range: 0,
    reproduction_cost: 0,
    reproduction_threshold: 0,
    energy_gain_from_eating: 0,
    energy_cost_per_tick: 0,
};

/// Dominance rank of a grid tag: 1 plant, 2 herbivore, 3 carnivore, 0 otherwise.
///
/// The empty-cell marker ranks 0, so an empty cell never blocks movement.
#[must_use]
pub const fn rank(symbol: char) -> u8 {
    match symbol {
        '*' => 1,
        'H' => 2,
        'C' => 3,
        _ => 0,
    }
}

/// Looks up the configuration for a grid tag, falling back to plants for
/// unrecognised tags.
#[must_use]
pub const fn config_for(symbol: char) -> &'static SpeciesConfig {
    match Species::from_symbol(symbol) {
        Some(species) => species.config(),
        None => &PLANT_CONFIG,
    }
}
