#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Waypoint Defence.
//!
//! The [`World`] owns every live entity through its [`EntityStore`] together
//! with the economy counters. Adapters mutate it exclusively through
//! [`apply`] (or the [`step`] and [`place_emplacement`] shorthands) and observe
//! it through the read-only [`query`] functions.

use glam::DVec2;
use log::debug;
use waypoint_defence_core::{
    Command, Emplacement, Event, Path, RandomSource, SeededRandom, SimulationState, PLACEMENT_COST,
};
use waypoint_defence_system_spatial_index::CellSize;
use waypoint_defence_system_tower_targeting::TowerTargeting;

mod stepper;
mod store;

pub use store::{compact, EntityStore};

/// Parameters a world is created from.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    path: Path,
    starting_state: SimulationState,
}

impl Config {
    /// Creates a configuration for `path` using the stock starting resources.
    #[must_use]
    pub fn new(path: Path) -> Self {
        Self {
            path,
            starting_state: SimulationState::default(),
        }
    }

    /// Overrides the resources the simulation starts with.
    #[must_use]
    pub fn with_starting_resources(mut self, currency: u32, lives: i32, difficulty: u32) -> Self {
        self.starting_state = SimulationState::new(currency, lives, difficulty);
        self
    }

    /// Route the hostiles follow.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Path::standard())
    }
}

/// Represents the authoritative Waypoint Defence world state.
#[derive(Debug)]
pub struct World<R = SeededRandom> {
    path: Path,
    store: EntityStore,
    state: SimulationState,
    targeting: TowerTargeting,
    cell_size: CellSize,
    rng: R,
}

impl World {
    /// Creates a world with the stock configuration and the default seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_random(Config::default(), SeededRandom::default())
    }

    /// Creates a world from `config` whose randomness is derived from `seed`.
    #[must_use]
    pub fn seeded(config: Config, seed: u64) -> Self {
        Self::with_random(config, SeededRandom::from_seed(seed))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandomSource> World<R> {
    /// Creates a world from `config` that draws all randomness from `rng`.
    #[must_use]
    pub fn with_random(config: Config, rng: R) -> Self {
        Self {
            path: config.path,
            store: EntityStore::new(),
            state: config.starting_state,
            targeting: TowerTargeting::default(),
            cell_size: CellSize::STANDARD,
            rng,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply<R: RandomSource>(world: &mut World<R>, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Step => step(world, out_events),
        Command::PlaceEmplacement { position } => {
            let _ = place_emplacement(world, position, out_events);
        }
    }
}

/// Advances the simulation by a single tick.
pub fn step<R: RandomSource>(world: &mut World<R>, out_events: &mut Vec<Event>) {
    stepper::advance(world, out_events);
}

/// Places an emplacement at `position` if the player can afford it.
///
/// Placement is accepted anywhere, including on top of the path. Returns
/// whether the emplacement was placed; a rejection leaves the world untouched.
pub fn place_emplacement<R: RandomSource>(
    world: &mut World<R>,
    position: DVec2,
    out_events: &mut Vec<Event>,
) -> bool {
    match world.state.try_spend(PLACEMENT_COST) {
        Ok(()) => {
            world.store.emplacements.push(Emplacement::new(position));
            debug!(
                "emplacement placed at ({:.1}, {:.1}), {} currency left",
                position.x,
                position.y,
                world.state.currency()
            );
            out_events.push(Event::EmplacementPlaced { position });
            true
        }
        Err(reason) => {
            debug!(
                "emplacement at ({:.1}, {:.1}) rejected: {reason}",
                position.x, position.y
            );
            out_events.push(Event::EmplacementRejected { position, reason });
            false
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use waypoint_defence_core::{Path, SimulationState, Snapshot};

    /// Captures a read-only view of every entity and the economy counters.
    #[must_use]
    pub fn snapshot<R>(world: &World<R>) -> Snapshot<'_> {
        Snapshot {
            hostiles: world.store.hostiles(),
            emplacements: world.store.emplacements(),
            projectiles: world.store.projectiles(),
            path: &world.path,
            state: world.state,
        }
    }

    /// Copy of the economy and progression counters.
    #[must_use]
    pub fn simulation_state<R>(world: &World<R>) -> SimulationState {
        world.state
    }

    /// Route the hostiles follow.
    #[must_use]
    pub fn path<R>(world: &World<R>) -> &Path {
        &world.path
    }
}
