//! Counted multiset of grid coordinates, used for food and key particles.

use biotopia_core::Coord;
use std::collections::BTreeMap;

/// Each coordinate may hold several stacked particles. Membership means the
/// count is positive; entries whose count drops to zero are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiSet {
    items: BTreeMap<Coord, u32>,
    total: u64,
}

impl MultiSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one particle at `pos`
    pub fn add(&mut self, pos: Coord) {
        *self.items.entry(pos).or_insert(0) += 1;
        self.total += 1;
    }

    /// Remove one particle at `pos`. Returns false if there was none.
    pub fn remove(&mut self, pos: Coord) -> bool {
        match self.items.get_mut(&pos) {
            Some(count) => {
                *count -= 1;
                if *count == 0 {
                    self.items.remove(&pos);
                }
                self.total -= 1;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, pos: Coord) -> bool {
        self.items.contains_key(&pos)
    }

    pub fn count(&self, pos: Coord) -> u32 {
        self.items.get(&pos).copied().unwrap_or(0)
    }

    /// Total number of particles, counting repeats
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct occupied coordinates
    pub fn unique_len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct occupied coordinates
    pub fn iter_unique(&self) -> impl Iterator<Item = Coord> + '_ {
        self.items.keys().copied()
    }

    /// Every particle, repeating a coordinate once per stacked unit
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.items
            .iter()
            .flat_map(|(pos, count)| std::iter::repeat(*pos).take(*count as usize))
    }
}

impl FromIterator<Coord> for MultiSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        let mut set = MultiSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Coord> for MultiSet {
    fn extend<I: IntoIterator<Item = Coord>>(&mut self, iter: I) {
        for pos in iter {
            self.add(pos);
        }
    }
}
