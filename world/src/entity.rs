//! Per-entity perception and decision logic.

use ecosystem_core::{
    rank, CellCoord, Direction, EntitySnapshot, Event, Species, SpeciesConfig, Vector2,
};
use rand::{seq::SliceRandom, Rng};
use tracing::trace;

use crate::{World, WorldError};

/// Probability that a fleeing entity actually commits its escape step.
pub const FLEE_COMMIT_PROBABILITY: f64 = 0.7;

/// One simulated organism.
///
/// Entities live inside the world's grid slots. During its own turn an
/// entity is lifted out of its slot, decides on a velocity, and registers
/// itself again at its new position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    position: CellCoord,
    velocity: Vector2,
    config: &'static SpeciesConfig,
    energy: u32,
    updated: bool,
}

impl Entity {
    /// Creates a stationary entity with the species' starting energy.
    #[must_use]
    pub fn new(species: Species, position: CellCoord) -> Self {
        let config = species.config();
        Self {
            position,
            velocity: Vector2::ZERO,
            config,
            energy: config.energy,
            updated: false,
        }
    }

    /// Cell the entity occupies.
    #[must_use]
    pub const fn position(&self) -> CellCoord {
        self.position
    }

    /// Displacement resolved for the current turn.
    #[must_use]
    pub const fn velocity(&self) -> Vector2 {
        self.velocity
    }

    /// Static configuration of the entity's species.
    #[must_use]
    pub const fn config(&self) -> &'static SpeciesConfig {
        self.config
    }

    /// Species of the entity.
    #[must_use]
    pub const fn species(&self) -> Species {
        self.config.species
    }

    /// Grid tag of the entity.
    #[must_use]
    pub const fn symbol(&self) -> char {
        self.config.symbol
    }

    /// Remaining energy.
    #[must_use]
    pub const fn energy(&self) -> u32 {
        self.energy
    }

    /// Reports whether the entity already acted during the current tick.
    #[must_use]
    pub const fn is_updated(&self) -> bool {
        self.updated
    }

    /// Overrides the energy, clamped to the species maximum.
    pub fn set_energy(&mut self, energy: u32) {
        self.energy = energy.min(self.config.max_energy);
    }

    /// Overrides the velocity.
    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity;
    }

    /// Moves the entity by its velocity. Displacements that would leave the
    /// non-negative quadrant are ignored.
    pub fn apply_velocity(&mut self) {
        if let Some(next) = self.position.offset(self.velocity) {
            self.position = next;
        }
    }

    /// Spends the species' per-step energy cost, never dropping below zero.
    pub fn tick_energy(&mut self) {
        self.energy = self.energy.saturating_sub(self.config.energy_cost_per_tick);
    }

    /// Captures an immutable snapshot of the entity.
    #[must_use]
    pub const fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            species: self.config.species,
            cell: self.position,
            velocity: self.velocity,
            energy: self.energy,
        }
    }

    /// Nearest cell within vision holding this entity's prey.
    #[must_use]
    pub fn find_nearest_prey(&self, world: &World) -> Option<CellCoord> {
        let prey = self.config.prey?.symbol();
        self.find_nearest(world, |symbol| symbol == prey)
    }

    /// Nearest cell within vision holding an entity that outranks this one.
    #[must_use]
    pub fn find_nearest_predator(&self, world: &World) -> Option<CellCoord> {
        if self.energy == 0 {
            return None;
        }
        let own_rank = self.rank();
        self.find_nearest(world, |symbol| rank(symbol) > own_rank)
    }

    /// Sets the velocity to the first step in scan order that strictly
    /// increases the distance to `threat`. Energy is not charged here; the
    /// caller charges it once the step is committed.
    pub fn move_away_from(&mut self, world: &World, threat: CellCoord) -> bool {
        if self.energy == 0 {
            self.velocity = Vector2::ZERO;
            return false;
        }
        let current = self.position.manhattan_distance(threat);
        let step = self.greedy_step(world, |next| next.manhattan_distance(threat) > current);
        self.resolve_step(step)
    }

    /// Sets the velocity to the first step in scan order that strictly
    /// decreases the distance to `target`, charging energy for the step.
    pub fn move_towards(&mut self, world: &World, target: CellCoord) -> bool {
        if self.energy == 0 {
            self.velocity = Vector2::ZERO;
            return false;
        }
        let current = self.position.manhattan_distance(target);
        let step = self.greedy_step(world, |next| next.manhattan_distance(target) < current);
        let moved = self.resolve_step(step);
        if moved {
            self.tick_energy();
        }
        moved
    }

    /// Sets the velocity toward a uniformly chosen empty neighbour, charging
    /// energy for the step. Stays put when no neighbour is free.
    pub fn move_random(&mut self, world: &mut World) -> bool {
        if self.energy == 0 || world.is_full() {
            self.velocity = Vector2::ZERO;
            return false;
        }

        let size = world.size();
        let candidates: Vec<Direction> = Direction::SCAN_ORDER
            .into_iter()
            .filter(|direction| {
                size.neighbor(self.position, *direction)
                    .is_some_and(|next| !world.is_cell_occupied(next))
            })
            .collect();

        let step = candidates.choose(world.rng_mut()).copied();
        let moved = self.resolve_step(step);
        if moved {
            self.tick_energy();
        }
        moved
    }

    /// Eats the entity at `prey_cell` when it is adjacent and edible.
    ///
    /// Returns `Ok(false)` when the cell is empty, too far away, or holds an
    /// inedible occupant. Carnivores do not eat plants and no species eats
    /// its own kind. A prey cell equal to the predator's own position is a
    /// broken invariant and yields [`WorldError::SamePosition`].
    pub fn feed(
        &mut self,
        world: &mut World,
        prey_cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<bool, WorldError> {
        let Some(prey) = world.entity_at(prey_cell).map(Entity::species) else {
            return Ok(false);
        };
        if prey_cell == self.position {
            return Err(WorldError::SamePosition { cell: prey_cell });
        }
        if self.position.manhattan_distance(prey_cell) > 1 {
            return Ok(false);
        }

        let predator = self.species();
        if (predator == Species::Carnivore && prey == Species::Plant) || predator == prey {
            return Ok(false);
        }

        self.energy = self
            .energy
            .saturating_add(self.config.energy_gain_from_eating)
            .min(self.config.max_energy);
        let _ = world.kill_entity(prey_cell)?;

        trace!(
            predator = predator.name(),
            prey = prey.name(),
            cell = %prey_cell,
            "entity eaten"
        );
        out_events.push(Event::EntityEaten {
            predator,
            prey,
            cell: prey_cell,
        });
        Ok(true)
    }

    /// Spawns a same-species child in the first free neighbour when energy
    /// has reached the reproduction threshold.
    ///
    /// Neighbours are examined in the order −x, +x, −y, +y. Occupied
    /// neighbours are skipped so a child never overwrites another entity.
    /// The child starts already flagged as updated and first acts next tick.
    pub fn reproduce(
        &mut self,
        world: &mut World,
        out_events: &mut Vec<Event>,
    ) -> Result<bool, WorldError> {
        if !self.config.is_mobile() || self.energy < self.config.reproduction_threshold {
            return Ok(false);
        }

        let size = world.size();
        let Some(cell) = Direction::REPRODUCTION_ORDER
            .into_iter()
            .filter_map(|direction| size.neighbor(self.position, direction))
            .find(|candidate| !world.is_cell_occupied(*candidate))
        else {
            return Ok(false);
        };

        self.energy = self.energy.saturating_sub(self.config.reproduction_cost);
        let mut child = Entity::new(self.species(), cell);
        child.mark_updated();
        world.add_entity(child)?;

        trace!(species = self.species().name(), %cell, "entity born");
        out_events.push(Event::EntityBorn {
            species: self.species(),
            parent: self.position,
            cell,
        });
        Ok(true)
    }

    /// Runs one turn: flee, else reproduce, else hunt, else wander, then
    /// re-register at the resulting position.
    ///
    /// The entity must already be detached from the world; it is always
    /// registered again before this returns successfully.
    pub fn update(
        mut self,
        world: &mut World,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        let origin = self.position;
        if !self.config.is_mobile() || self.energy == 0 {
            return world.add_entity(self);
        }
        self.velocity = Vector2::ZERO;

        if let Some(threat) = self.find_nearest_predator(world) {
            let _ = self.move_away_from(world, threat);
            if !world.rng_mut().gen_bool(FLEE_COMMIT_PROBABILITY) {
                self.velocity = Vector2::ZERO;
            }
            if !self.velocity.is_zero() {
                self.tick_energy();
            }
            return self.settle(world, origin, out_events);
        }

        if self.reproduce(world, out_events)? {
            return self.settle(world, origin, out_events);
        }

        if let Some(prey) = self.find_nearest_prey(world) {
            if self.position.manhattan_distance(prey) == 1 {
                let _ = self.feed(world, prey, out_events)?;
            }
            let _ = self.move_towards(world, prey);
            return self.settle(world, origin, out_events);
        }

        let _ = self.move_random(world);
        self.settle(world, origin, out_events)
    }

    pub(crate) fn mark_updated(&mut self) {
        self.updated = true;
    }

    pub(crate) fn clear_updated(&mut self) {
        self.updated = false;
    }

    const fn rank(&self) -> u8 {
        self.config.species.rank()
    }

    fn settle(
        mut self,
        world: &mut World,
        origin: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        self.apply_velocity();
        let destination = self.position;
        let species = self.species();

        if let Some(occupant) = world.entity_at(destination).map(Entity::species) {
            if occupant.rank() < self.rank() {
                let _ = world.kill_entity(destination)?;
                trace!(
                    species = occupant.name(),
                    by = species.name(),
                    cell = %destination,
                    "entity trampled"
                );
                out_events.push(Event::EntityTrampled {
                    species: occupant,
                    by: species,
                    cell: destination,
                });
            }
        }

        world.add_entity(self)?;
        if destination != origin {
            out_events.push(Event::EntityMoved {
                species,
                from: origin,
                to: destination,
            });
        }
        Ok(())
    }

    fn find_nearest<F>(&self, world: &World, qualifies: F) -> Option<CellCoord>
    where
        F: Fn(char) -> bool,
    {
        let size = world.size();
        let range = self.config.vision_range;
        let min_x = self.position.x().saturating_sub(range);
        let max_x = self
            .position
            .x()
            .saturating_add(range)
            .min(size.width().saturating_sub(1));
        let min_y = self.position.y().saturating_sub(range);
        let max_y = self
            .position
            .y()
            .saturating_add(range)
            .min(size.height().saturating_sub(1));

        let mut nearest: Option<(u32, CellCoord)> = None;
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                let cell = CellCoord::new(x, y);
                if !qualifies(world.cell_symbol(cell)) {
                    continue;
                }
                let distance = self.position.manhattan_distance(cell);
                if nearest.map_or(true, |(best, _)| distance < best) {
                    nearest = Some((distance, cell));
                }
            }
        }
        nearest.map(|(_, cell)| cell)
    }

    fn greedy_step<F>(&self, world: &World, improves: F) -> Option<Direction>
    where
        F: Fn(CellCoord) -> bool,
    {
        let size = world.size();
        let own_rank = self.rank();
        Direction::SCAN_ORDER.into_iter().find(|direction| {
            size.neighbor(self.position, *direction).is_some_and(|next| {
                rank(world.cell_symbol(next)) < own_rank && improves(next)
            })
        })
    }

    fn resolve_step(&mut self, step: Option<Direction>) -> bool {
        match step {
            Some(direction) => {
                self.velocity = direction.offset();
                true
            }
            None => {
                self.velocity = Vector2::ZERO;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::with_seed(10, 10, 7).expect("valid dimensions")
    }

    #[test]
    fn new_entity_starts_with_species_energy() {
        let entity = Entity::new(Species::Herbivore, CellCoord::new(0, 0));
        assert_eq!(entity.symbol(), 'H');
        assert_eq!(entity.energy(), 100);
        assert_eq!(entity.velocity(), Vector2::ZERO);
        assert!(!entity.is_updated());
    }

    #[test]
    fn set_energy_clamps_to_maximum() {
        let mut entity = Entity::new(Species::Herbivore, CellCoord::new(0, 0));
        entity.set_energy(10_000);
        assert_eq!(entity.energy(), 200);
    }

    #[test]
    fn tick_energy_saturates_at_zero() {
        let mut entity = Entity::new(Species::Carnivore, CellCoord::new(0, 0));
        entity.set_energy(1);
        entity.tick_energy();
        assert_eq!(entity.energy(), 0);
        entity.tick_energy();
        assert_eq!(entity.energy(), 0);
    }

    #[test]
    fn apply_velocity_translates_position() {
        let mut entity = Entity::new(Species::Herbivore, CellCoord::new(1, 1));
        entity.set_velocity(Vector2::new(1, 0));
        entity.apply_velocity();
        assert_eq!(entity.position(), CellCoord::new(2, 1));
    }

    #[test]
    fn nearest_search_prefers_first_cell_in_scan_order_on_ties() {
        let mut world = world();
        let hunter = Entity::new(Species::Carnivore, CellCoord::new(5, 5));
        world
            .add_entity(Entity::new(Species::Herbivore, CellCoord::new(5, 7)))
            .expect("empty");
        world
            .add_entity(Entity::new(Species::Herbivore, CellCoord::new(4, 6)))
            .expect("empty");
        world
            .add_entity(Entity::new(Species::Herbivore, CellCoord::new(6, 4)))
            .expect("empty");

        assert_eq!(hunter.find_nearest_prey(&world), Some(CellCoord::new(4, 6)));
    }

    #[test]
    fn plants_neither_hunt_nor_flee() {
        let mut world = world();
        world
            .add_entity(Entity::new(Species::Carnivore, CellCoord::new(0, 1)))
            .expect("empty");
        let plant = Entity::new(Species::Plant, CellCoord::new(0, 0));
        assert_eq!(plant.find_nearest_prey(&world), None);
        assert_eq!(plant.find_nearest_predator(&world), None);
    }

    #[test]
    fn greedy_step_cannot_enter_equal_rank_cell() {
        let mut world = world();
        let mut hunter = Entity::new(Species::Herbivore, CellCoord::new(0, 0));
        world
            .add_entity(Entity::new(Species::Herbivore, CellCoord::new(1, 0)))
            .expect("empty");
        world
            .add_entity(Entity::new(Species::Herbivore, CellCoord::new(0, 1)))
            .expect("empty");

        assert!(!hunter.move_towards(&world, CellCoord::new(5, 5)));
        assert_eq!(hunter.velocity(), Vector2::ZERO);
        assert_eq!(hunter.energy(), 100);
    }

    #[test]
    fn reproduction_skips_occupied_neighbours() {
        let mut world = world();
        let mut events = Vec::new();
        world
            .add_entity(Entity::new(Species::Plant, CellCoord::new(4, 5)))
            .expect("empty");
        world
            .add_entity(Entity::new(Species::Plant, CellCoord::new(6, 5)))
            .expect("empty");

        let mut parent = Entity::new(Species::Herbivore, CellCoord::new(5, 5));
        parent.set_energy(150);
        assert_eq!(parent.reproduce(&mut world, &mut events), Ok(true));
        assert_eq!(world.cell_symbol(CellCoord::new(5, 4)), 'H');
        assert_eq!(world.cell_symbol(CellCoord::new(4, 5)), '*');
        assert!(world
            .entity_at(CellCoord::new(5, 4))
            .is_some_and(Entity::is_updated));
    }

    #[test]
    fn reproduction_below_threshold_does_nothing() {
        let mut world = world();
        let mut events = Vec::new();
        let mut parent = Entity::new(Species::Herbivore, CellCoord::new(5, 5));
        parent.set_energy(149);
        assert_eq!(parent.reproduce(&mut world, &mut events), Ok(false));
        assert_eq!(parent.energy(), 149);
        assert!(events.is_empty());
    }

    #[test]
    fn herbivore_does_not_eat_herbivore() {
        let mut world = world();
        let mut events = Vec::new();
        world
            .add_entity(Entity::new(Species::Herbivore, CellCoord::new(0, 1)))
            .expect("empty");
        let mut grazer = Entity::new(Species::Herbivore, CellCoord::new(0, 0));
        assert_eq!(
            grazer.feed(&mut world, CellCoord::new(0, 1), &mut events),
            Ok(false)
        );
        assert!(world.is_cell_occupied(CellCoord::new(0, 1)));
    }

    #[test]
    fn carnivore_does_not_eat_plants() {
        let mut world = world();
        let mut events = Vec::new();
        world
            .add_entity(Entity::new(Species::Plant, CellCoord::new(0, 1)))
            .expect("empty");
        let mut hunter = Entity::new(Species::Carnivore, CellCoord::new(0, 0));
        assert_eq!(
            hunter.feed(&mut world, CellCoord::new(0, 1), &mut events),
            Ok(false)
        );
        assert_eq!(hunter.energy(), 120);
    }

    #[test]
    fn feeding_on_empty_cell_is_a_no_op() {
        let mut world = world();
        let mut events = Vec::new();
        let mut hunter = Entity::new(Species::Carnivore, CellCoord::new(0, 0));
        assert_eq!(
            hunter.feed(&mut world, CellCoord::new(0, 1), &mut events),
            Ok(false)
        );
    }

    #[test]
    fn feeding_energy_is_clamped_to_maximum() {
        let mut world = world();
        let mut events = Vec::new();
        world
            .add_entity(Entity::new(Species::Plant, CellCoord::new(1, 0)))
            .expect("empty");
        let mut grazer = Entity::new(Species::Herbivore, CellCoord::new(0, 0));
        grazer.set_energy(195);
        assert_eq!(
            grazer.feed(&mut world, CellCoord::new(1, 0), &mut events),
            Ok(true)
        );
        assert_eq!(grazer.energy(), 200);
        assert_eq!(
            events,
            vec![Event::EntityEaten {
                predator: Species::Herbivore,
                prey: Species::Plant,
                cell: CellCoord::new(1, 0),
            }]
        );
    }

    #[test]
    fn exhausted_entity_does_not_move() {
        let mut world = world();
        let mut events = Vec::new();
        let mut entity = Entity::new(Species::Herbivore, CellCoord::new(3, 3));
        entity.set_energy(0);
        entity.set_velocity(Vector2::new(1, 0));
        entity.update(&mut world, &mut events).expect("update succeeds");

        let settled = world.entity_at(CellCoord::new(3, 3)).expect("registered");
        assert_eq!(settled.energy(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn stationary_entity_update_re_registers_in_place() {
        let mut world = world();
        let mut events = Vec::new();
        Entity::new(Species::Plant, CellCoord::new(2, 2))
            .update(&mut world, &mut events)
            .expect("update succeeds");
        assert_eq!(world.cell_symbol(CellCoord::new(2, 2)), '*');
        assert!(events.is_empty());
    }

    #[test]
    fn hunting_carnivore_tramples_plant_in_its_path() {
        let mut world = world();
        let mut events = Vec::new();
        world
            .add_entity(Entity::new(Species::Plant, CellCoord::new(0, 1)))
            .expect("empty");
        world
            .add_entity(Entity::new(Species::Plant, CellCoord::new(1, 0)))
            .expect("empty");
        world
            .add_entity(Entity::new(Species::Herbivore, CellCoord::new(0, 3)))
            .expect("empty");

        Entity::new(Species::Carnivore, CellCoord::new(0, 0))
            .update(&mut world, &mut events)
            .expect("update succeeds");

        assert_eq!(world.cell_symbol(CellCoord::new(0, 1)), 'C');
        assert!(events.contains(&Event::EntityTrampled {
            species: Species::Plant,
            by: Species::Carnivore,
            cell: CellCoord::new(0, 1),
        }));
        assert_eq!(
            world.entity_at(CellCoord::new(0, 1)).map(Entity::energy),
            Some(118)
        );
        assert!(world.check_invariants());
    }
}
