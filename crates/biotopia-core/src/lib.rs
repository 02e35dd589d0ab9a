//! Core types and utilities for the Biotopia artificial life simulator.

pub mod types;
pub mod config;
pub mod error;
pub mod stats;

pub use error::{Error, MutationError, Result, StructureError};
pub use types::*;
pub use config::*;
pub use stats::*;
