//! Error types for the chunk allocator and the simulation harness.
//!
//! Allocation failure is an expected outcome and is modelled as a value, not
//! a fault. Structural invariant violations are defects and only surface from
//! [`crate::ChunkList::check_invariants`] and list construction.

use std::path::PathBuf;

use thiserror::Error;

/// Outcome of a failed [`crate::Allocator::allocate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// No single free chunk can hold the request.
    #[error("no free chunk can hold {requested} units (largest free chunk: {largest_free})")]
    OutOfMemory { requested: usize, largest_free: usize },

    /// Zero-sized requests would produce an empty chunk.
    #[error("cannot allocate a zero-sized chunk")]
    ZeroSize,

    /// The node storage behind the chunk list refused the operation.
    #[error(transparent)]
    Storage(#[from] collections::Error),
}

impl AllocError {
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, AllocError::OutOfMemory { .. })
    }
}

/// A broken chunk list. Seeing one of these outside of
/// [`crate::ChunkList::from_chunks`] means split or merge logic is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("chunk list is empty")]
    Empty,

    #[error("first chunk starts at {0} instead of 0")]
    FirstAddress(usize),

    #[error("chunk at {address} has zero size")]
    ZeroSized { address: usize },

    #[error("chunk at {address} should start at {expected} (gap or overlap)")]
    Discontiguous { expected: usize, address: usize },

    #[error("free chunks at {first} and {second} are adjacent")]
    AdjacentFree { first: usize, second: usize },

    #[error("chunks cover {covered} units but the arena has {arena_size}")]
    Coverage { covered: usize, arena_size: usize },

    #[error(transparent)]
    Storage(#[from] collections::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("unknown strategy '{0}', expected best-fit or worst-fit")]
    UnknownStrategy(String),
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("allocator failed")]
    Alloc(#[from] AllocError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error("failed to write report")]
    Report(#[from] std::io::Error),
}
