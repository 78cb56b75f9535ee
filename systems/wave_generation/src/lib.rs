#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Difficulty-scaled wave generation.
//!
//! A wave holds `difficulty * 10` hostiles scattered around the first waypoint.
//! Each unit's tier is chosen from a single uniform roll compared against two
//! saturating probability curves, so bosses stay rarer than minibosses at every
//! difficulty while both become more common as the encounter progresses.

use glam::DVec2;
use waypoint_defence_core::{HostileUnit, RandomSource, Variant, Waypoint};

/// Growth rate of the boss probability curve.
pub const BOSS_SLOPE: f64 = 0.004;
/// Growth rate of the miniboss probability curve.
pub const MINIBOSS_SLOPE: f64 = 0.03;
/// Hostiles added to a wave per difficulty level.
pub const UNITS_PER_DIFFICULTY: usize = 10;
/// Width of the horizontal spawn band centred on the first waypoint.
pub const SPAWN_SPREAD_X: f64 = 60.0;
/// Depth of the spawn band trailing behind the first waypoint.
pub const SPAWN_SPREAD_Y: f64 = 800.0;

/// Number of hostiles in a wave generated at `difficulty`.
#[must_use]
pub fn wave_size(difficulty: u32) -> usize {
    usize::try_from(difficulty)
        .unwrap_or(usize::MAX)
        .saturating_mul(UNITS_PER_DIFFICULTY)
}

/// Probability that a single unit spawns as a boss.
#[must_use]
pub fn boss_probability(difficulty: u32) -> f64 {
    saturating_curve(f64::from(difficulty) * BOSS_SLOPE)
}

/// Probability threshold below which a unit spawns as a miniboss.
///
/// Rolls below [`boss_probability`] are claimed by the boss tier first.
#[must_use]
pub fn miniboss_probability(difficulty: u32) -> f64 {
    saturating_curve(f64::from(difficulty) * MINIBOSS_SLOPE)
}

fn saturating_curve(scaled: f64) -> f64 {
    scaled / (1.0 + scaled)
}

/// Maps a uniform roll in `[0, 1)` to a tier at the given difficulty.
#[must_use]
pub fn select_variant(roll: f64, difficulty: u32) -> Variant {
    if roll < boss_probability(difficulty) {
        Variant::Boss
    } else if roll < miniboss_probability(difficulty) {
        Variant::Miniboss
    } else {
        Variant::Normal
    }
}

/// Generates a full wave for `difficulty`.
#[must_use]
pub fn generate<R: RandomSource>(
    difficulty: u32,
    spawn: Waypoint,
    rng: &mut R,
) -> Vec<HostileUnit> {
    let mut wave = Vec::with_capacity(wave_size(difficulty));
    let _ = generate_into(difficulty, spawn, rng, &mut wave);
    wave
}

/// Appends a wave for `difficulty` to `out`, returning the number of units added.
///
/// Every unit consumes three draws in a fixed order: tier roll, horizontal
/// jitter, then vertical jitter.
pub fn generate_into<R: RandomSource>(
    difficulty: u32,
    spawn: Waypoint,
    rng: &mut R,
    out: &mut Vec<HostileUnit>,
) -> usize {
    let count = wave_size(difficulty);
    out.reserve(count);

    for _ in 0..count {
        let roll = rng.next_unit();
        let offset = DVec2::new(
            rng.next_unit() * SPAWN_SPREAD_X - SPAWN_SPREAD_X / 2.0,
            rng.next_unit() * SPAWN_SPREAD_Y - SPAWN_SPREAD_Y,
        );
        out.push(HostileUnit::spawn(
            select_variant(roll, difficulty),
            spawn.position() + offset,
        ));
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_defence_core::{ScriptedRandom, SeededRandom};

    #[test]
    fn wave_size_scales_with_difficulty() {
        let mut rng = SeededRandom::from_seed(3);
        for difficulty in 1..=12 {
            let wave = generate(difficulty, Waypoint::new(30.0, 0.0), &mut rng);
            assert_eq!(wave.len(), difficulty as usize * 10);
        }
    }

    #[test]
    fn zero_difficulty_produces_empty_wave() {
        let mut rng = ScriptedRandom::constant(0.5);
        assert!(generate(0, Waypoint::new(0.0, 0.0), &mut rng).is_empty());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn boss_probability_stays_below_miniboss_probability() {
        for difficulty in 1..=10_000 {
            let boss = boss_probability(difficulty);
            let miniboss = miniboss_probability(difficulty);
            assert!(boss > 0.0 && boss < 1.0);
            assert!(boss < miniboss, "difficulty {difficulty}: {boss} >= {miniboss}");
        }
    }

    #[test]
    fn first_wave_probabilities_match_curves() {
        assert!((boss_probability(1) - 0.004 / 1.004).abs() < 1e-15);
        assert!((miniboss_probability(1) - 0.03 / 1.03).abs() < 1e-15);
    }

    #[test]
    fn variant_thresholds_partition_the_roll() {
        let difficulty = 10;
        let boss = boss_probability(difficulty);
        let miniboss = miniboss_probability(difficulty);

        assert_eq!(select_variant(0.0, difficulty), Variant::Boss);
        assert_eq!(select_variant(boss * 0.99, difficulty), Variant::Boss);
        assert_eq!(select_variant(boss, difficulty), Variant::Miniboss);
        assert_eq!(select_variant(miniboss * 0.99, difficulty), Variant::Miniboss);
        assert_eq!(select_variant(miniboss, difficulty), Variant::Normal);
        assert_eq!(select_variant(0.999, difficulty), Variant::Normal);
    }

    #[test]
    fn spawn_positions_use_roll_then_x_then_y() {
        let mut rng = ScriptedRandom::new(vec![0.9, 0.25, 0.5, 0.0, 1.0, 0.0]);
        let wave = generate(1, Waypoint::new(30.0, 0.0), &mut rng);
        assert_eq!(rng.draws(), 30);

        let first = &wave[0];
        assert_eq!(first.variant, Variant::Normal);
        assert!((first.position.x - 15.0).abs() < 1e-12);
        assert!((first.position.y + 400.0).abs() < 1e-12);

        let second = &wave[1];
        assert_eq!(second.variant, Variant::Boss);
        assert!(second.position.x < 30.0 + SPAWN_SPREAD_X / 2.0);
        assert!((second.position.y + 800.0).abs() < 1e-12);
        assert_eq!(second.health, 500);
        assert_eq!(second.bounty, 100);
    }

    #[test]
    fn jitter_stays_within_spawn_band() {
        let spawn = Waypoint::new(30.0, 0.0);
        let mut rng = SeededRandom::from_seed(99);
        for unit in generate(20, spawn, &mut rng) {
            assert!(unit.position.x >= 0.0 && unit.position.x <= 60.0);
            assert!(unit.position.y >= -800.0 && unit.position.y <= 0.0);
            assert_eq!(unit.path_index, 0);
            assert!(!unit.finished);
        }
    }

    #[test]
    fn generate_into_appends_after_existing_units() {
        let mut rng = SeededRandom::from_seed(1);
        let mut out = vec![HostileUnit::spawn(Variant::Boss, DVec2::ZERO)];
        let added = generate_into(2, Waypoint::new(0.0, 0.0), &mut rng, &mut out);
        assert_eq!(added, 20);
        assert_eq!(out.len(), 21);
        assert_eq!(out[0].variant, Variant::Boss);
    }
}
