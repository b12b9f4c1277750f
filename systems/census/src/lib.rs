#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Census system that summarises each tick's births, deaths, and population.

use std::fmt;

use ecosystem_core::{Event, PopulationCounts};
use ecosystem_world::{query, World};

/// Population summary published after a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CensusReport {
    /// Tick the report describes.
    pub tick: u64,
    /// Live entities per species after the tick.
    pub population: PopulationCounts,
    /// Entities born during the tick.
    pub births: u32,
    /// Entities eaten during the tick.
    pub eaten: u32,
    /// Entities crushed by a higher-rank mover during the tick.
    pub trampled: u32,
    /// Entities removed for exhausted energy during the tick.
    pub starved: u32,
    /// Number of occupied cells after the tick.
    pub occupied_cells: usize,
}

impl CensusReport {
    /// Reports whether the world has emptied out entirely.
    #[must_use]
    pub const fn is_collapsed(&self) -> bool {
        self.occupied_cells == 0
    }

    /// Total deaths of any cause during the tick.
    #[must_use]
    pub const fn deaths(&self) -> u32 {
        self.eaten
            .saturating_add(self.trampled)
            .saturating_add(self.starved)
    }
}

impl fmt::Display for CensusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {}: {} (born {}, eaten {}, trampled {}, starved {})",
            self.tick, self.population, self.births, self.eaten, self.trampled, self.starved
        )
    }
}

/// Pure census system that tallies world events between reports.
#[derive(Debug, Default)]
pub struct Census {
    pending: CensusReport,
    last_report: Option<CensusReport>,
}

impl Census {
    /// Creates a census with no observations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recent report, if any tick has been observed.
    #[must_use]
    pub fn last_report(&self) -> Option<&CensusReport> {
        self.last_report.as_ref()
    }

    /// Consumes world events and returns the report for the latest tick.
    ///
    /// Counters accumulate across calls until a `TimeAdvanced` event closes
    /// the tick. Population, occupancy, and the tick index are always read
    /// from the world.
    pub fn handle(&mut self, events: &[Event], world: &World) -> CensusReport {
        let mut closed = false;
        for event in events {
            match event {
                Event::EntityBorn { .. } => {
                    self.pending.births = self.pending.births.saturating_add(1);
                }
                Event::EntityEaten { .. } => {
                    self.pending.eaten = self.pending.eaten.saturating_add(1);
                }
                Event::EntityTrampled { .. } => {
                    self.pending.trampled = self.pending.trampled.saturating_add(1);
                }
                Event::EntityStarved { .. } => {
                    self.pending.starved = self.pending.starved.saturating_add(1);
                }
                Event::TimeAdvanced { .. } => closed = true,
                Event::EntitySpawned { .. } | Event::EntityMoved { .. } => {}
            }
        }

        let report = CensusReport {
            population: query::population(world),
            occupied_cells: query::occupied_cells_count(world),
            tick: query::tick_index(world),
            ..self.pending
        };

        if closed {
            self.pending = CensusReport::default();
            self.last_report = Some(report);
        }
        report
    }
}
