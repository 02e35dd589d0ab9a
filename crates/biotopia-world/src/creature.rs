//! Creature bodies and the topology analyzer that derives their behaviour.
//!
//! A creature's body is a tree of grid cells expressed relative to its head.
//! Nothing about how it moves or feeds is stored independently: both are
//! recomputed from the cell layout by [`Creature::analyze`] after every
//! structural edit.
//!
//! - A *leaf* (a cell with exactly one living neighbour) pushes the creature
//!   along the direction of its single edge. Their sum gives the net bias.
//! - A *mouth* is an empty cell touched by three or more living cells.

use biotopia_core::{Coord, StructureError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Cyclic sequence of unit steps derived from a body's leaf bias.
///
/// The period always starts with a null step, followed by `max(|h|, |v|)`
/// unit steps whose components are `sign(h)` and `sign(v)` while the
/// corresponding axis still has steps left, and zero afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    steps: Vec<Coord>,
    cursor: usize,
}

impl Movement {
    pub fn from_bias(bias: Coord) -> Self {
        let steps_x = bias.x.unsigned_abs() as usize;
        let steps_y = bias.y.unsigned_abs() as usize;
        let unit = bias.signum();

        let mut steps = Vec::with_capacity(steps_x.max(steps_y) + 1);
        steps.push(Coord::ORIGIN);
        for i in 0..steps_x.max(steps_y) {
            let dx = if i < steps_x { unit.x } else { 0 };
            let dy = if i < steps_y { unit.y } else { 0 };
            steps.push(Coord::new(dx, dy));
        }

        Self { steps, cursor: 0 }
    }

    /// Yield the next step, wrapping around at the end of the period
    pub fn next_step(&mut self) -> Coord {
        let step = self.steps[self.cursor];
        self.cursor = (self.cursor + 1) % self.steps.len();
        step
    }

    /// The step `next_step` will yield
    pub fn peek(&self) -> Coord {
        self.steps[self.cursor]
    }

    /// One full period of the cycle
    pub fn period(&self) -> &[Coord] {
        &self.steps
    }

    /// Net displacement over one period
    pub fn bias(&self) -> Coord {
        self.steps.iter().fold(Coord::ORIGIN, |acc, step| acc + *step)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// A creature in the simulation
#[derive(Debug, Clone)]
pub struct Creature {
    pub position: Coord,
    pub energy: i32,
    pub age: u64,
    cells: BTreeSet<Coord>,
    head: Coord,
    mouths: BTreeSet<Coord>,
    movement: Movement,
}

impl Creature {
    /// Build a creature from its body layout. `head` must be one of `cells`;
    /// after analysis every cell is re-based so the head sits at the origin.
    pub fn new(
        position: Coord,
        cells: impl IntoIterator<Item = Coord>,
        head: Coord,
        energy: i32,
    ) -> Result<Self, StructureError> {
        let mut creature = Self {
            position,
            energy,
            age: 0,
            cells: cells.into_iter().collect(),
            head,
            mouths: BTreeSet::new(),
            movement: Movement::from_bias(Coord::ORIGIN),
        };
        creature.analyze()?;
        Ok(creature)
    }

    pub fn cells(&self) -> &BTreeSet<Coord> {
        &self.cells
    }

    pub fn head(&self) -> Coord {
        self.head
    }

    pub fn mouths(&self) -> &BTreeSet<Coord> {
        &self.mouths
    }

    pub fn movement(&self) -> &Movement {
        &self.movement
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_alive(&self) -> bool {
        self.energy >= 0
    }

    /// Advance the movement cycle and return the step taken
    pub fn next_step(&mut self) -> Coord {
        self.movement.next_step()
    }

    pub fn absolute_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().map(move |cell| self.position + *cell)
    }

    pub fn absolute_mouths(&self) -> impl Iterator<Item = Coord> + '_ {
        self.mouths.iter().map(move |mouth| self.position + *mouth)
    }

    /// Number of body cells orthogonally adjacent to `pos`
    pub fn living_neighbours(&self, pos: Coord) -> usize {
        pos.neighbours()
            .iter()
            .filter(|n| self.cells.contains(*n))
            .count()
    }

    pub fn mirror_horizontal(&mut self) -> Result<(), StructureError> {
        self.remap(|c| Coord::new(-c.x, c.y))
    }

    pub fn mirror_vertical(&mut self) -> Result<(), StructureError> {
        self.remap(|c| Coord::new(c.x, -c.y))
    }

    pub fn rotate_right(&mut self) -> Result<(), StructureError> {
        self.remap(|c| Coord::new(c.y, -c.x))
    }

    pub fn rotate_left(&mut self) -> Result<(), StructureError> {
        self.remap(|c| Coord::new(-c.y, c.x))
    }

    /// Apply an edit to the cell set and re-derive mouths and movement.
    /// Every structural change goes through here or `remap`.
    pub fn reshape(
        &mut self,
        edit: impl FnOnce(&mut BTreeSet<Coord>),
    ) -> Result<(), StructureError> {
        edit(&mut self.cells);
        self.analyze()
    }

    fn remap(&mut self, f: impl Fn(Coord) -> Coord) -> Result<(), StructureError> {
        self.cells = self.cells.iter().map(|c| f(*c)).collect();
        self.head = f(self.head);
        self.analyze()
    }

    /// Validate the body and recompute mouths and movement.
    ///
    /// Walks the body from the head. A cell reached while two or more of its
    /// neighbours are already visited closes a cycle; cells never reached are
    /// disconnected. The movement cycle restarts at its null step.
    pub fn analyze(&mut self) -> Result<(), StructureError> {
        if !self.cells.contains(&self.head) {
            return Err(StructureError::MissingHead);
        }

        let mut to_visit = vec![self.head];
        let mut visited = BTreeSet::new();
        let mut mouths = BTreeSet::new();
        let mut bias = Coord::ORIGIN;

        while let Some(cell) = to_visit.pop() {
            if !visited.insert(cell) {
                continue;
            }

            let possible = cell.neighbours();
            if possible.iter().filter(|n| visited.contains(*n)).count() > 1 {
                return Err(StructureError::Cycle);
            }

            let living: Vec<Coord> = possible
                .iter()
                .copied()
                .filter(|n| self.cells.contains(n))
                .collect();

            // leaf: pushed along its only edge
            if let [neighbour] = living.as_slice() {
                bias = bias + (*neighbour - cell);
            }

            to_visit.extend(living.iter().filter(|n| !visited.contains(*n)));

            for candidate in possible {
                if self.cells.contains(&candidate) || mouths.contains(&candidate) {
                    continue;
                }
                if self.living_neighbours(candidate) >= 3 {
                    mouths.insert(candidate);
                }
            }
        }

        if visited.len() < self.cells.len() {
            return Err(StructureError::Disconnected);
        }

        let offset = self.head;
        if offset != Coord::ORIGIN {
            self.cells = self.cells.iter().map(|c| *c - offset).collect();
            mouths = mouths.into_iter().map(|m| m - offset).collect();
            self.head = Coord::ORIGIN;
        }

        self.mouths = mouths;
        self.movement = Movement::from_bias(bias);
        Ok(())
    }
}

/// Serializable creature snapshot for observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureData {
    pub position: Coord,
    pub energy: i32,
    pub age: u64,
    pub cells: Vec<Coord>,
    pub mouths: Vec<Coord>,
}

impl From<&Creature> for CreatureData {
    fn from(creature: &Creature) -> Self {
        Self {
            position: creature.position,
            energy: creature.energy,
            age: creature.age,
            cells: creature.cells.iter().copied().collect(),
            mouths: creature.mouths.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(list: &[(i32, i32)]) -> Vec<Coord> {
        list.iter().map(|&c| Coord::from(c)).collect()
    }

    fn ancestor_cells() -> Vec<Coord> {
        coords(&[(-1, 1), (-1, 0), (0, 0), (1, 0), (1, 1)])
    }

    fn cell_set(list: &[(i32, i32)]) -> BTreeSet<Coord> {
        coords(list).into_iter().collect()
    }

    #[test]
    fn test_ancestor_analysis() {
        let creature = Creature::new(Coord::new(10, 10), ancestor_cells(), Coord::ORIGIN, 100)
            .unwrap();

        assert_eq!(creature.len(), 5);
        assert_eq!(creature.head(), Coord::ORIGIN);
        assert_eq!(creature.mouths(), &cell_set(&[(0, 1)]));

        // both arms are leaves pointing back towards -y
        assert_eq!(creature.movement().bias(), Coord::new(0, -2));
        assert_eq!(
            creature.movement().period(),
            coords(&[(0, 0), (0, -1), (0, -1)]).as_slice()
        );
        assert_eq!(creature.movement().peek(), Coord::ORIGIN);
    }

    #[test]
    fn test_cycle_detected() {
        let square = coords(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let result = Creature::new(Coord::ORIGIN, square, Coord::ORIGIN, 0);
        assert_eq!(result.unwrap_err(), StructureError::Cycle);
    }

    #[test]
    fn test_disconnected_detected() {
        let split = coords(&[(0, 0), (2, 0)]);
        let result = Creature::new(Coord::ORIGIN, split, Coord::ORIGIN, 0);
        assert_eq!(result.unwrap_err(), StructureError::Disconnected);
    }

    #[test]
    fn test_missing_head() {
        let result = Creature::new(Coord::ORIGIN, coords(&[(1, 0)]), Coord::ORIGIN, 0);
        assert_eq!(result.unwrap_err(), StructureError::MissingHead);

        let result = Creature::new(Coord::ORIGIN, Vec::new(), Coord::ORIGIN, 0);
        assert_eq!(result.unwrap_err(), StructureError::MissingHead);
    }

    #[test]
    fn test_single_cell_stands_still() {
        let mut creature = Creature::new(Coord::new(3, 3), [Coord::ORIGIN], Coord::ORIGIN, 0)
            .unwrap();
        assert!(creature.mouths().is_empty());
        assert_eq!(creature.movement().period(), &[Coord::ORIGIN]);
        assert_eq!(creature.next_step(), Coord::ORIGIN);
        assert_eq!(creature.next_step(), Coord::ORIGIN);
    }

    #[test]
    fn test_head_leaf_contributes_to_bias() {
        // head at the stem of a T: the head's only edge points +x, the two
        // arms cancel out vertically
        let t = coords(&[(0, 0), (1, 0), (1, 1), (1, -1)]);
        let creature = Creature::new(Coord::ORIGIN, t, Coord::ORIGIN, 0).unwrap();
        assert_eq!(creature.movement().bias(), Coord::new(1, 0));
        assert!(creature.mouths().is_empty());
    }

    #[test]
    fn test_normalizes_to_head() {
        let shifted: Vec<Coord> = ancestor_cells()
            .into_iter()
            .map(|c| c + Coord::new(7, -3))
            .collect();
        let creature = Creature::new(Coord::ORIGIN, shifted, Coord::new(7, -3), 0).unwrap();

        assert_eq!(creature.head(), Coord::ORIGIN);
        assert_eq!(creature.cells(), &ancestor_cells().into_iter().collect::<BTreeSet<_>>());
        assert_eq!(creature.mouths(), &cell_set(&[(0, 1)]));
    }

    #[test]
    fn test_movement_cycle_interleaves_axes() {
        let mut movement = Movement::from_bias(Coord::new(3, -1));
        assert_eq!(
            movement.period(),
            coords(&[(0, 0), (1, -1), (1, 0), (1, 0)]).as_slice()
        );
        assert_eq!(movement.bias(), Coord::new(3, -1));

        let first_period: Vec<_> = (0..4).map(|_| movement.next_step()).collect();
        assert_eq!(first_period, movement.period());
        assert_eq!(movement.cursor(), 0);
        assert_eq!(movement.next_step(), Coord::ORIGIN);
    }

    #[test]
    fn test_mirror_is_involution() {
        let original = Creature::new(Coord::ORIGIN, ancestor_cells(), Coord::ORIGIN, 0).unwrap();

        let mut creature = original.clone();
        creature.mirror_vertical().unwrap();
        assert_eq!(creature.mouths(), &cell_set(&[(0, -1)]));
        assert_eq!(creature.movement().bias(), Coord::new(0, 2));
        creature.mirror_vertical().unwrap();
        assert_eq!(creature.cells(), original.cells());

        creature.mirror_horizontal().unwrap();
        creature.mirror_horizontal().unwrap();
        assert_eq!(creature.cells(), original.cells());
    }

    #[test]
    fn test_rotations_are_inverse() {
        let original = Creature::new(Coord::ORIGIN, ancestor_cells(), Coord::ORIGIN, 0).unwrap();

        let mut creature = original.clone();
        creature.rotate_right().unwrap();
        // the mouth at +y swings round to +x
        assert_eq!(creature.mouths(), &cell_set(&[(1, 0)]));
        creature.rotate_left().unwrap();
        assert_eq!(creature.cells(), original.cells());
        assert_eq!(creature.mouths(), original.mouths());
    }

    #[test]
    fn test_reshape_rejects_cycle() {
        let mut creature =
            Creature::new(Coord::ORIGIN, ancestor_cells(), Coord::ORIGIN, 0).unwrap();
        let result = creature.reshape(|cells| {
            cells.insert(Coord::new(0, 1));
        });
        assert_eq!(result.unwrap_err(), StructureError::Cycle);
    }

    #[test]
    fn test_absolute_positions() {
        let creature =
            Creature::new(Coord::new(20, 30), ancestor_cells(), Coord::ORIGIN, 0).unwrap();
        let mouths: Vec<_> = creature.absolute_mouths().collect();
        assert_eq!(mouths, vec![Coord::new(20, 31)]);
        assert!(creature.absolute_cells().any(|c| c == Coord::new(19, 31)));
    }

    #[test]
    fn test_creature_serialization() {
        let creature = Creature::new(Coord::new(5, 5), ancestor_cells(), Coord::ORIGIN, 42).unwrap();
        let data = CreatureData::from(&creature);
        let json = serde_json::to_string(&data).unwrap();
        let back: CreatureData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
        assert_eq!(back.energy, 42);
        assert_eq!(back.cells.len(), 5);
    }
}
