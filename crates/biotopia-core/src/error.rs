//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A creature body that violates the tree invariants.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureError {
    #[error("invalid structure: cycle found")]
    Cycle,

    #[error("invalid structure: unconnected cells")]
    Disconnected,

    #[error("invalid structure: head is not one of the cells")]
    MissingHead,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationError {
    #[error("unexpected mutation error: could not add cell")]
    NoGrowthFrontier,

    #[error(transparent)]
    Structure(#[from] StructureError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
