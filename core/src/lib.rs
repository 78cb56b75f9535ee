#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waypoint Defence engine.
//!
//! This crate defines the data model and message surface that connects
//! adapters, the authoritative world, and pure systems. Adapters submit
//! [`Command`] values, the world executes them via its `apply` entry point and
//! broadcasts [`Event`] values describing what happened during the tick.
//! Systems are pure functions over borrowed entity slices and a
//! [`RandomSource`], so every run can be replayed exactly.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency available when a new simulation starts.
pub const STARTING_CURRENCY: u32 = 200;
/// Lives available when a new simulation starts.
pub const STARTING_LIVES: i32 = 50;
/// Difficulty level used for the very first wave.
pub const STARTING_DIFFICULTY: u32 = 1;
/// Currency deducted when an emplacement is placed.
pub const PLACEMENT_COST: u32 = 100;

/// Drawing radius of a projectile in world units.
pub const PROJECTILE_RADIUS: f64 = 2.0;
/// Distance a projectile covers per tick.
pub const PROJECTILE_SPEED: f64 = 1.6;
/// Maximum distance between a projectile and a hostile that still counts as a hit.
pub const HIT_RADIUS: f64 = 6.0;
/// Number of ticks a projectile survives without hitting anything.
pub const PROJECTILE_MAX_LIFE: u32 = 100;
/// Health removed from a hostile by a single projectile hit.
pub const PROJECTILE_DAMAGE: i32 = 1;

/// Drawing radius of an emplacement in world units.
pub const EMPLACEMENT_RADIUS: f64 = 7.0;
/// Ticks an emplacement waits after firing before it may fire again.
pub const EMPLACEMENT_RELOAD_TICKS: u32 = 10;

/// Distance a hostile covers per tick.
pub const HOSTILE_SPEED: f64 = 0.6;
/// Drawing radius of a normal hostile in world units.
pub const HOSTILE_RADIUS: f64 = 4.0;
/// Health of a normal hostile before variant multipliers apply.
pub const BASE_HOSTILE_HEALTH: i32 = 10;
/// Bounty of a normal hostile before variant multipliers apply.
pub const BASE_HOSTILE_BOUNTY: u32 = 10;
/// Distance at which a hostile counts as having reached its waypoint.
pub const WAYPOINT_ARRIVAL_THRESHOLD: f64 = 10.0;

/// Edge length of a spatial index cell in world units.
pub const SPATIAL_CELL_SIZE: f64 = 20.0;
/// Number of simulation steps an external scheduler runs per interval.
pub const TICKS_PER_INTERVAL: u32 = 3;

/// Seed used by [`SeededRandom::default`].
pub const DEFAULT_SEED: u64 = 0x5eed_0fd3_f34c_e5a1;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by exactly one tick.
    Step,
    /// Requests placement of an emplacement at the provided world position.
    PlaceEmplacement {
        /// Centre of the new emplacement in world units.
        position: DVec2,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A fresh wave was appended because no hostiles remained.
    WaveSpawned {
        /// Difficulty level the wave was generated with.
        difficulty: u32,
        /// Number of hostiles in the wave.
        count: usize,
    },
    /// A hostile walked past the final waypoint and cost a life.
    HostileFinished {
        /// Tier of the hostile that escaped.
        variant: Variant,
    },
    /// A hostile's health crossed to non-positive and its bounty was paid.
    HostileDestroyed {
        /// Tier of the destroyed hostile.
        variant: Variant,
        /// Currency credited for the kill.
        bounty: u32,
    },
    /// An emplacement launched a projectile.
    ProjectileFired {
        /// Position the projectile was launched from.
        origin: DVec2,
        /// Per-tick velocity assigned to the projectile.
        velocity: DVec2,
    },
    /// Confirms that an emplacement was placed.
    EmplacementPlaced {
        /// Centre of the new emplacement.
        position: DVec2,
    },
    /// Reports that a placement request was rejected.
    EmplacementRejected {
        /// Position provided in the placement request.
        position: DVec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Marks the end of a simulation tick.
    TickCompleted {
        /// Number of ticks completed so far, including this one.
        tick: u64,
    },
}

/// Reasons an emplacement placement request may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The player cannot afford the placement cost.
    #[error("insufficient funds: {available} available, {cost} required")]
    InsufficientFunds {
        /// Currency held when the request was made.
        available: u32,
        /// Currency the placement would have cost.
        cost: u32,
    },
}

/// Reasons a path definition may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Hostiles spawn around the first waypoint, so at least one is required.
    #[error("a path requires at least one waypoint")]
    Empty,
}

/// Fixed point that hostiles travel through in order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    x: f64,
    y: f64,
}

impl Waypoint {
    /// Creates a waypoint at the provided world coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Waypoint location as a vector.
    #[must_use]
    pub const fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Ordered, non-empty sequence of waypoints shared by every hostile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Waypoint>", into = "Vec<Waypoint>")]
pub struct Path {
    waypoints: Vec<Waypoint>,
}

impl Path {
    /// Creates a path from the provided waypoints.
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, PathError> {
        if waypoints.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self { waypoints })
    }

    /// The serpentine route used by the stock encounter.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            waypoints: vec![
                Waypoint::new(30.0, 0.0),
                Waypoint::new(30.0, 450.0),
                Waypoint::new(200.0, 450.0),
                Waypoint::new(200.0, 50.0),
                Waypoint::new(450.0, 50.0),
                Waypoint::new(450.0, 500.0),
            ],
        }
    }

    /// Waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Waypoint at `index`, or `None` once the path is exhausted.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Waypoint> {
        self.waypoints.get(index).copied()
    }

    /// First waypoint, around which waves spawn.
    #[must_use]
    pub fn first(&self) -> Waypoint {
        self.waypoints[0]
    }

    /// Sum of the segment lengths between consecutive waypoints.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].position().distance(pair[1].position()))
            .sum()
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<Waypoint>> for Path {
    type Error = PathError;

    fn try_from(waypoints: Vec<Waypoint>) -> Result<Self, Self::Error> {
        Self::new(waypoints)
    }
}

impl From<Path> for Vec<Waypoint> {
    fn from(path: Path) -> Self {
        path.waypoints
    }
}

/// Hostile tier. Affects health, bounty and drawing size at spawn only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Regular hostile.
    Normal,
    /// Tougher hostile worth a larger bounty.
    Miniboss,
    /// Rare, very tough hostile.
    Boss,
}

impl Variant {
    /// Every variant in ascending order of toughness.
    pub const ALL: [Variant; 3] = [Variant::Normal, Variant::Miniboss, Variant::Boss];

    /// Factor applied to [`BASE_HOSTILE_HEALTH`].
    #[must_use]
    pub const fn health_multiplier(self) -> i32 {
        match self {
            Self::Normal => 1,
            Self::Miniboss => 10,
            Self::Boss => 50,
        }
    }

    /// Factor applied to [`BASE_HOSTILE_BOUNTY`].
    #[must_use]
    pub const fn bounty_multiplier(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::Miniboss => 3,
            Self::Boss => 10,
        }
    }

    /// Factor applied to [`HOSTILE_RADIUS`] when drawing.
    #[must_use]
    pub const fn radius_multiplier(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Miniboss => 2.0,
            Self::Boss => 5.0,
        }
    }

    /// Short lowercase name used in logs and reports. Carries no simulation meaning.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Miniboss => "miniboss",
            Self::Boss => "boss",
        }
    }
}

/// Path-following hostile unit.
#[derive(Clone, Debug, PartialEq)]
pub struct HostileUnit {
    /// Current position in world units.
    pub position: DVec2,
    /// Displacement applied during the most recent movement.
    pub velocity: DVec2,
    /// Remaining health. The unit is destroyed once this is non-positive.
    pub health: i32,
    /// Index of the waypoint the unit is heading towards.
    pub path_index: usize,
    /// Currency awarded when the unit is destroyed.
    pub bounty: u32,
    /// Tier the unit was spawned as.
    pub variant: Variant,
    /// Set once the unit has walked past the final waypoint.
    pub finished: bool,
}

impl HostileUnit {
    /// Creates a stationary unit of the given tier at `position`.
    #[must_use]
    pub fn spawn(variant: Variant, position: DVec2) -> Self {
        Self {
            position,
            velocity: DVec2::ZERO,
            health: BASE_HOSTILE_HEALTH * variant.health_multiplier(),
            path_index: 0,
            bounty: BASE_HOSTILE_BOUNTY * variant.bounty_multiplier(),
            variant,
            finished: false,
        }
    }

    /// Drawing radius of the unit.
    #[must_use]
    pub fn radius(&self) -> f64 {
        HOSTILE_RADIUS * self.variant.radius_multiplier()
    }

    /// Reports whether the unit's health is exhausted.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Reports whether the unit should leave the store at the end of the tick.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.is_dead() || self.finished
    }
}

/// Stationary, player-placed tower.
#[derive(Clone, Debug, PartialEq)]
pub struct Emplacement {
    /// Centre of the emplacement in world units.
    pub position: DVec2,
    /// Ticks remaining before the emplacement may fire again.
    pub cooldown_ticks: u32,
}

impl Emplacement {
    /// Creates an emplacement that is ready to fire immediately.
    #[must_use]
    pub const fn new(position: DVec2) -> Self {
        Self {
            position,
            cooldown_ticks: 0,
        }
    }
}

/// Projectile launched by an emplacement.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Current position in world units.
    pub position: DVec2,
    /// Displacement applied every tick.
    pub velocity: DVec2,
    /// Ticks left before the projectile expires. Zero once it has hit.
    pub remaining_life: u32,
}

impl Projectile {
    /// Creates a projectile with a full lifetime.
    #[must_use]
    pub const fn fire(position: DVec2, velocity: DVec2) -> Self {
        Self {
            position,
            velocity,
            remaining_life: PROJECTILE_MAX_LIFE,
        }
    }

    /// Reports whether the projectile's lifetime is depleted.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.remaining_life == 0
    }
}

/// Economy and progression counters of a running simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationState {
    currency: u32,
    lives: i32,
    difficulty: u32,
    tick_count: u64,
}

impl SimulationState {
    /// Creates a state with the provided starting resources and no ticks elapsed.
    #[must_use]
    pub const fn new(currency: u32, lives: i32, difficulty: u32) -> Self {
        Self {
            currency,
            lives,
            difficulty,
            tick_count: 0,
        }
    }

    /// Currency available for placements.
    #[must_use]
    pub const fn currency(&self) -> u32 {
        self.currency
    }

    /// Lives remaining. Escaping hostiles keep decrementing this below zero.
    #[must_use]
    pub const fn lives(&self) -> i32 {
        self.lives
    }

    /// Difficulty level the next wave will be generated with.
    #[must_use]
    pub const fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Number of completed ticks.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Reports whether every life has been lost.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.lives <= 0
    }

    /// Deducts `cost` if the balance covers it, leaving the state untouched otherwise.
    pub fn try_spend(&mut self, cost: u32) -> Result<(), PlacementError> {
        if self.currency < cost {
            return Err(PlacementError::InsufficientFunds {
                available: self.currency,
                cost,
            });
        }
        self.currency -= cost;
        Ok(())
    }

    /// Adds a bounty to the balance.
    pub fn credit(&mut self, amount: u32) {
        self.currency = self.currency.saturating_add(amount);
    }

    /// Removes a single life.
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    /// Returns the current difficulty and advances it by one level.
    pub fn advance_difficulty(&mut self) -> u32 {
        let current = self.difficulty;
        self.difficulty = self.difficulty.saturating_add(1);
        current
    }

    /// Records the completion of a tick and returns the new tick count.
    pub fn complete_tick(&mut self) -> u64 {
        self.tick_count = self.tick_count.saturating_add(1);
        self.tick_count
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new(STARTING_CURRENCY, STARTING_LIVES, STARTING_DIFFICULTY)
    }
}

/// Read-only view of a world handed to presentation adapters.
///
/// Every field borrows or copies world state, so nothing reachable from a
/// snapshot can mutate the simulation.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    /// Live hostiles in insertion order.
    pub hostiles: &'a [HostileUnit],
    /// Placed emplacements in placement order.
    pub emplacements: &'a [Emplacement],
    /// Projectiles in flight in launch order.
    pub projectiles: &'a [Projectile],
    /// Route the hostiles follow.
    pub path: &'a Path,
    /// Economy and progression counters.
    pub state: SimulationState,
}

/// Source of uniformly distributed values consumed by the pure systems.
///
/// Systems take the source as a parameter instead of owning one so that tests
/// can feed an exact sequence through [`ScriptedRandom`].
pub trait RandomSource {
    /// Returns a uniformly distributed value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Returns a uniformly distributed index in `0..len`.
    ///
    /// `len` must be non-zero; the result is clamped so a source that yields
    /// values at the very top of its range still lands inside the slice.
    fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "next_index requires a non-empty range");
        let scaled = (self.next_unit() * len as f64) as usize;
        scaled.min(len.saturating_sub(1))
    }
}

/// Seeded ChaCha8 generator used by live simulations.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a generator whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::from_seed(DEFAULT_SEED)
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of values, cycling when the list is exhausted.
///
/// An empty script yields zero forever. Values outside `[0, 1)` are clamped.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Creates a source that yields `values` in order.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Creates a source that always yields `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    #[must_use]
    pub const fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
