//! Factory for the default root ancestor.

use crate::creature::Creature;
use biotopia_core::{Coord, StructureError};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Body of the default ancestor, head at the origin:
///
/// ```text
/// X . X
/// X H X
/// ```
pub const ANCESTOR_CELLS: [(i32, i32); 5] = [(-1, 1), (-1, 0), (0, 0), (1, 0), (1, 1)];

/// Create a randomly oriented default ancestor.
///
/// The body is rotated right, rotated left, mirrored vertically or left as
/// is with equal odds, then its movement cycle is advanced 0 to 2 steps so
/// that ancestors do not all walk in lockstep.
pub fn ancestor(
    position: Coord,
    energy: i32,
    rng: &mut ChaCha8Rng,
) -> Result<Creature, StructureError> {
    let mut creature = Creature::new(
        position,
        ANCESTOR_CELLS.map(Coord::from),
        Coord::ORIGIN,
        energy,
    )?;

    match rng.gen_range(0..4) {
        0 => creature.rotate_right()?,
        1 => creature.rotate_left()?,
        2 => creature.mirror_vertical()?,
        _ => {}
    }

    for _ in 0..rng.gen_range(0..=2) {
        creature.next_step();
    }

    Ok(creature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    #[test]
    fn test_ancestor_is_valid() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let creature = ancestor(Coord::new(100, 50), 2000, &mut rng).unwrap();

        assert_eq!(creature.position, Coord::new(100, 50));
        assert_eq!(creature.energy, 2000);
        assert_eq!(creature.age, 0);
        assert_eq!(creature.len(), 5);
        assert_eq!(creature.head(), Coord::ORIGIN);
        assert_eq!(creature.mouths().len(), 1);
        assert_eq!(creature.movement().period().len(), 3);
        assert!(creature.movement().cursor() <= 2);
    }

    #[test]
    fn test_orientations_vary() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mouths: BTreeSet<Coord> = (0..64)
            .map(|_| {
                let creature = ancestor(Coord::ORIGIN, 0, &mut rng).unwrap();
                *creature.mouths().iter().next().unwrap()
            })
            .collect();

        // the single mouth faces one of four directions, one per orientation
        let expected: BTreeSet<Coord> = [(0, 1), (0, -1), (1, 0), (-1, 0)]
            .map(Coord::from)
            .into_iter()
            .collect();
        assert_eq!(mouths, expected);
    }
}
