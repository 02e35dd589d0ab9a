//! Structural mutation operators for creature bodies.

use crate::creature::Creature;
use biotopia_core::{Coord, EvolutionRules, MutationError};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

/// The single edit a mutation made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Grew(Coord),
    Shrank(Coord),
}

pub struct Mutator {
    config: EvolutionRules,
}

impl Mutator {
    pub fn new(config: EvolutionRules) -> Self {
        Self { config }
    }

    /// Roll whether a newborn gets mutated
    pub fn should_mutate(&self, rng: &mut ChaCha8Rng) -> bool {
        rng.gen::<f64>() < self.config.mutation_probability
    }

    /// Perform exactly one structural edit: either grow a cell, or shed a
    /// leaf and grow instead if there is none to shed.
    pub fn mutate(
        &self,
        creature: &mut Creature,
        rng: &mut ChaCha8Rng,
    ) -> Result<MutationKind, MutationError> {
        if rng.gen::<f64>() < self.config.add_cell_probability {
            return add_random_cell(creature, rng);
        }

        match remove_random_cell(creature, rng)? {
            Some(cell) => Ok(MutationKind::Shrank(cell)),
            None => add_random_cell(creature, rng),
        }
    }
}

/// Attach a new cell next to a random body cell, at an empty position whose
/// only living neighbour is that cell, so the body stays a tree.
///
/// Every finite tree has such a position, so running out of candidates means
/// the body was already broken.
pub fn add_random_cell(
    creature: &mut Creature,
    rng: &mut ChaCha8Rng,
) -> Result<MutationKind, MutationError> {
    let mut order: Vec<Coord> = creature.cells().iter().copied().collect();
    order.shuffle(rng);

    let mut tried: BTreeSet<Coord> = BTreeSet::new();
    for cell in order {
        let mut empty: Vec<Coord> = cell
            .neighbours()
            .into_iter()
            .filter(|n| !creature.cells().contains(n) && !tried.contains(n))
            .collect();
        empty.shuffle(rng);

        for &candidate in &empty {
            if creature.living_neighbours(candidate) == 1 {
                creature.reshape(|cells| {
                    cells.insert(candidate);
                })?;
                return Ok(MutationKind::Grew(candidate));
            }
        }

        tried.extend(empty);
    }

    Err(MutationError::NoGrowthFrontier)
}

/// Remove a random leaf other than the head. Returns `None` when the body
/// has no removable leaf, e.g. a lone head.
pub fn remove_random_cell(
    creature: &mut Creature,
    rng: &mut ChaCha8Rng,
) -> Result<Option<Coord>, MutationError> {
    let mut order: Vec<Coord> = creature.cells().iter().copied().collect();
    order.shuffle(rng);

    let head = creature.head();
    for cell in order {
        if cell != head && creature.living_neighbours(cell) == 1 {
            creature.reshape(|cells| {
                cells.remove(&cell);
            })?;
            return Ok(Some(cell));
        }
    }

    Ok(None)
}
