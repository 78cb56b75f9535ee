use waypoint_defence_core::{Emplacement, HostileUnit, Projectile};

/// Owner of every live entity collection.
///
/// Collections keep insertion order. Removal only happens through [`compact`],
/// which preserves the relative order of the survivors.
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    pub(crate) hostiles: Vec<HostileUnit>,
    pub(crate) emplacements: Vec<Emplacement>,
    pub(crate) projectiles: Vec<Projectile>,
}

impl EntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live hostiles in insertion order.
    #[must_use]
    pub fn hostiles(&self) -> &[HostileUnit] {
        &self.hostiles
    }

    /// Placed emplacements in placement order.
    #[must_use]
    pub fn emplacements(&self) -> &[Emplacement] {
        &self.emplacements
    }

    /// Projectiles in flight in launch order.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }
}

/// Removes every element matching `remove`, returning how many were dropped.
///
/// Survivors are shifted towards the front in a single pass using a write
/// index, so their relative order is preserved and no scratch buffer is needed.
pub fn compact<T, F>(items: &mut Vec<T>, mut remove: F) -> usize
where
    F: FnMut(&T) -> bool,
{
    let mut write = 0;
    for read in 0..items.len() {
        if remove(&items[read]) {
            continue;
        }
        if write != read {
            items.swap(write, read);
        }
        write += 1;
    }

    let removed = items.len() - write;
    items.truncate(write);
    removed
}
