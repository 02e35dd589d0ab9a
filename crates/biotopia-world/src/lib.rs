//! World simulation engine.
//!
//! Creatures are trees of grid cells whose shape alone decides how they move
//! and where they eat. The [`Zoo`] advances a population of them over a
//! bounded grid seeded with food and key particles.

pub mod ancestor;
pub mod creature;
pub mod multiset;
pub mod mutation;
pub mod zoo;

pub use ancestor::ancestor;
pub use creature::{Creature, CreatureData, Movement};
pub use multiset::MultiSet;
pub use mutation::{add_random_cell, remove_random_cell, MutationKind, Mutator};
pub use zoo::{CreatureId, TickReport, Zoo};
