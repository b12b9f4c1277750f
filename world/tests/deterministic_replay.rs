use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use ecosystem_core::{Command, EntitySnapshot, Event, Species};
use ecosystem_world::{self as world, query, World};

#[test]
fn equal_seeds_replay_identically() {
    let first = replay(0x5eed);
    let second = replay(0x5eed);

    assert_eq!(first, second, "replay diverged");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn seeds_change_the_initial_layout() {
    let first = replay(1);
    let second = replay(2);
    assert_ne!(first.initial, second.initial);
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut world = World::with_seed(10, 10, seed).expect("valid dimensions");
    let mut events = Vec::new();

    for (species, count) in [
        (Species::Plant, 5),
        (Species::Herbivore, 3),
        (Species::Carnivore, 2),
    ] {
        for _ in 0..count {
            world::apply(&mut world, Command::SpawnSpecies { species }, &mut events)
                .expect("world has room");
        }
    }
    let initial = query::entity_view(&world);

    for _ in 0..100 {
        world::apply(&mut world, Command::Tick, &mut events).expect("tick succeeds");
    }

    ReplayOutcome {
        initial,
        events,
        final_state: query::entity_view(&world),
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    initial: Vec<EntitySnapshot>,
    events: Vec<Event>,
    final_state: Vec<EntitySnapshot>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
