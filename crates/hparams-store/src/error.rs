//! Error types for store operations.

use std::fmt;

use thiserror::Error;

/// Which side of a scalar/sub-tree clash was hit during an insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictKind {
    /// A directory segment of the keypath is already bound to a scalar.
    ScalarInPath,
    /// The terminal key is already bound to a sub-tree.
    SubTreeAtKey,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::ScalarInPath => write!(f, "already holds a scalar value"),
            ConflictKind::SubTreeAtKey => write!(f, "already exists as a sub-tree"),
        }
    }
}

/// Errors that can occur while inserting into a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A scalar and a sub-tree collided at some segment of the keypath.
    #[error("path conflict at {segment:?} in {keypath:?}: {kind}")]
    PathConflict {
        segment: String,
        keypath: String,
        kind: ConflictKind,
    },

    /// The keypath is empty or has an empty segment.
    #[error("invalid keypath {keypath:?}: {reason}")]
    InvalidKeyPath { keypath: String, reason: String },
}

impl StoreError {
    /// Returns `true` for scalar/sub-tree clashes.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::PathConflict { .. })
    }
}

/// Convenience type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
