#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Target selection and lead prediction for emplacements.
//!
//! Target selection is deliberately approximate: an emplacement samples a
//! fixed number of hostiles with replacement and keeps the closest one it saw.
//! The cost per emplacement is therefore bounded no matter how many hostiles
//! are alive, at the price of occasionally aiming at a unit that is not the
//! true nearest.

use glam::DVec2;
use thiserror::Error;
use waypoint_defence_core::{HostileUnit, RandomSource, PROJECTILE_MAX_LIFE, PROJECTILE_SPEED};

/// Number of random candidates inspected per target selection.
pub const SAMPLE_COUNT: usize = 10;
/// Number of fixed-point refinement rounds used by [`predict_intercept`].
pub const INTERCEPT_ROUNDS: usize = 5;

/// Reasons an emplacement holds its fire for a tick.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum FireError {
    /// No hostile is alive.
    #[error("no hostile available to target")]
    NoTarget,
    /// The predicted intercept lies beyond what a projectile can travel.
    #[error("intercept at distance {distance} exceeds range {range}")]
    OutOfRange {
        /// Distance from the emplacement to the predicted intercept.
        distance: f64,
        /// Maximum distance a projectile covers during its lifetime.
        range: f64,
    },
    /// The intercept coincides with the emplacement, leaving no direction to fire in.
    #[error("intercept coincides with the firing position")]
    DegenerateGeometry,
}

/// Aim computed for a single shot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FiringSolution {
    /// Index of the selected hostile in the candidate slice.
    pub target: usize,
    /// Predicted meeting point of projectile and target.
    pub intercept: DVec2,
    /// Per-tick velocity to give the projectile.
    pub velocity: DVec2,
}

/// Projectile ballistics shared by every emplacement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTargeting {
    projectile_speed: f64,
    projectile_life: u32,
}

impl TowerTargeting {
    /// Creates a targeting system for projectiles with the given speed and lifetime.
    #[must_use]
    pub const fn new(projectile_speed: f64, projectile_life: u32) -> Self {
        Self {
            projectile_speed,
            projectile_life,
        }
    }

    /// Distance a projectile covers before it expires.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.projectile_speed * f64::from(self.projectile_life)
    }

    /// Selects a target among `hostiles` and computes the shot towards it.
    pub fn aim<R: RandomSource>(
        &self,
        origin: DVec2,
        hostiles: &[HostileUnit],
        rng: &mut R,
    ) -> Result<FiringSolution, FireError> {
        let target = select_target(origin, hostiles, rng).ok_or(FireError::NoTarget)?;
        let intercept = predict_intercept(origin, &hostiles[target], self.projectile_speed);

        let distance = origin.distance(intercept);
        let range = self.range();
        if distance > range {
            return Err(FireError::OutOfRange { distance, range });
        }

        let velocity = launch_velocity(origin, intercept, self.projectile_speed)
            .ok_or(FireError::DegenerateGeometry)?;

        Ok(FiringSolution {
            target,
            intercept,
            velocity,
        })
    }
}

impl Default for TowerTargeting {
    fn default() -> Self {
        Self::new(PROJECTILE_SPEED, PROJECTILE_MAX_LIFE)
    }
}

/// Approximate nearest hostile to `origin`, chosen from [`SAMPLE_COUNT`] uniform draws.
///
/// Draws are taken with replacement and a later draw only replaces the current
/// pick when it is strictly closer. Returns `None` without consuming any
/// randomness when `candidates` is empty.
pub fn select_target<R: RandomSource>(
    origin: DVec2,
    candidates: &[HostileUnit],
    rng: &mut R,
) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for _ in 0..SAMPLE_COUNT {
        let index = rng.next_index(candidates.len());
        let distance = origin.distance(candidates[index].position);
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Predicts where a projectile fired from `origin` meets `target`.
///
/// Runs exactly [`INTERCEPT_ROUNDS`] fixed-point rounds starting from the
/// target's current position. Each round re-times the flight to the previous
/// estimate and extrapolates the target's last movement over that time. There
/// is no convergence check.
#[must_use]
pub fn predict_intercept(origin: DVec2, target: &HostileUnit, projectile_speed: f64) -> DVec2 {
    if projectile_speed <= 0.0 {
        return target.position;
    }

    let mut estimate = target.position;
    for _ in 0..INTERCEPT_ROUNDS {
        let time_to_hit = origin.distance(estimate) / projectile_speed;
        estimate = target.position + target.velocity * time_to_hit;
    }
    estimate
}

/// Velocity of magnitude `speed` pointing from `origin` towards `aim`.
///
/// Returns `None` when the direction is undefined, which happens when the two
/// points coincide or either contains a non-finite component.
#[must_use]
pub fn launch_velocity(origin: DVec2, aim: DVec2, speed: f64) -> Option<DVec2> {
    (aim - origin).try_normalize().map(|direction| direction * speed)
}
