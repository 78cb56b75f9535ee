use log::{debug, trace};
use waypoint_defence_core::{
    Event, HostileUnit, Path, Projectile, RandomSource, SimulationState, EMPLACEMENT_RELOAD_TICKS,
    HIT_RADIUS, HOSTILE_SPEED, PROJECTILE_DAMAGE, WAYPOINT_ARRIVAL_THRESHOLD,
};
use waypoint_defence_system_spatial_index::SpatialIndex;
use waypoint_defence_system_tower_targeting::TowerTargeting;
use waypoint_defence_system_wave_generation as wave_generation;

use crate::store::{compact, EntityStore};
use crate::World;

/// Runs one tick. The phases below execute strictly in this order.
pub(crate) fn advance<R: RandomSource>(world: &mut World<R>, out_events: &mut Vec<Event>) {
    let World {
        path,
        store,
        state,
        targeting,
        cell_size,
        rng,
    } = world;

    spawn_wave_if_clear(path, store, state, rng, out_events);
    move_hostiles(path, &mut store.hostiles, state, out_events);
    fire_emplacements(targeting, store, rng, out_events);
    move_projectiles(&mut store.projectiles);
    let expired = compact(&mut store.projectiles, Projectile::is_expired);

    // Rebuilt from post-movement positions every tick.
    let index = SpatialIndex::build(&store.hostiles, *cell_size);
    let hits = resolve_hits(&index, &mut store.hostiles, &mut store.projectiles);

    credit_bounties(&store.hostiles, state, out_events);
    let removed_hostiles = compact(&mut store.hostiles, HostileUnit::is_spent);
    let _ = compact(&mut store.projectiles, Projectile::is_expired);

    let tick = state.complete_tick();
    trace!(
        "tick {tick}: {hits} hits, {expired} expired, {removed_hostiles} removed, {} alive",
        store.hostiles.len()
    );
    out_events.push(Event::TickCompleted { tick });
}

fn spawn_wave_if_clear<R: RandomSource>(
    path: &Path,
    store: &mut EntityStore,
    state: &mut SimulationState,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) {
    if !store.hostiles.is_empty() {
        return;
    }

    let difficulty = state.advance_difficulty();
    let count = wave_generation::generate_into(difficulty, path.first(), rng, &mut store.hostiles);
    debug!("wave spawned: {count} hostiles at difficulty {difficulty}");
    out_events.push(Event::WaveSpawned { difficulty, count });
}

fn move_hostiles(
    path: &Path,
    hostiles: &mut [HostileUnit],
    state: &mut SimulationState,
    out_events: &mut Vec<Event>,
) {
    for hostile in hostiles.iter_mut() {
        if hostile.finished {
            continue;
        }

        let Some(waypoint) = path.get(hostile.path_index) else {
            hostile.finished = true;
            state.lose_life();
            debug!("{} escaped, {} lives left", hostile.variant.tag(), state.lives());
            out_events.push(Event::HostileFinished {
                variant: hostile.variant,
            });
            continue;
        };

        let target = waypoint.position();
        let offset = target - hostile.position;
        let distance = offset.length();
        hostile.velocity = offset.normalize_or_zero() * distance.min(HOSTILE_SPEED);
        hostile.position += hostile.velocity;

        if hostile.position.distance(target) <= WAYPOINT_ARRIVAL_THRESHOLD {
            hostile.path_index += 1;
        }
    }
}

fn fire_emplacements<R: RandomSource>(
    targeting: &TowerTargeting,
    store: &mut EntityStore,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) {
    let EntityStore {
        hostiles,
        emplacements,
        projectiles,
    } = store;

    for emplacement in emplacements.iter_mut() {
        if emplacement.cooldown_ticks > 0 {
            emplacement.cooldown_ticks -= 1;
            continue;
        }

        match targeting.aim(emplacement.position, hostiles, rng) {
            Ok(solution) => {
                emplacement.cooldown_ticks = EMPLACEMENT_RELOAD_TICKS;
                projectiles.push(Projectile::fire(emplacement.position, solution.velocity));
                out_events.push(Event::ProjectileFired {
                    origin: emplacement.position,
                    velocity: solution.velocity,
                });
            }
            Err(reason) => trace!(
                "emplacement at ({:.1}, {:.1}) holding fire: {reason}",
                emplacement.position.x,
                emplacement.position.y
            ),
        }
    }
}

fn move_projectiles(projectiles: &mut [Projectile]) {
    for projectile in projectiles.iter_mut() {
        projectile.position += projectile.velocity;
        projectile.remaining_life = projectile.remaining_life.saturating_sub(1);
    }
}

/// Applies at most one hit per projectile, returning the number of hits.
fn resolve_hits(
    index: &SpatialIndex,
    hostiles: &mut [HostileUnit],
    projectiles: &mut [Projectile],
) -> usize {
    let mut hits = 0;
    for projectile in projectiles.iter_mut() {
        let Some(nearest) = index.nearest_in_neighborhood(&*hostiles, projectile.position) else {
            continue;
        };
        if nearest.distance > HIT_RADIUS {
            continue;
        }

        let hostile = &mut hostiles[nearest.index];
        hostile.health = hostile.health.saturating_sub(PROJECTILE_DAMAGE);
        projectile.remaining_life = 0;
        hits += 1;
    }
    hits
}

fn credit_bounties(
    hostiles: &[HostileUnit],
    state: &mut SimulationState,
    out_events: &mut Vec<Event>,
) {
    for hostile in hostiles {
        if hostile.is_dead() && !hostile.finished {
            state.credit(hostile.bounty);
            debug!(
                "{} destroyed, {} currency credited",
                hostile.variant.tag(),
                hostile.bounty
            );
            out_events.push(Event::HostileDestroyed {
                variant: hostile.variant,
                bounty: hostile.bounty,
            });
        }
    }
}
