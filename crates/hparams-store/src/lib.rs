//! Hierarchical parameter store.
//!
//! Parameters live in a tree of [`Node`]s. Each key within a node is bound
//! either to a scalar string or to a nested node, never both. Values are
//! addressed by keypaths such as `tasks.sieve.lim0`, with the separator
//! chosen per store.
//!
//! # Operations
//!
//! - **Insert** binds a scalar at a keypath, creating intermediate levels on
//!   demand. Turning a scalar into a sub-tree, or the reverse, is a
//!   [`StoreError::PathConflict`].
//! - **Resolve** walks from the root down an explicit path and merges the
//!   requested keys, so values set deeper in the tree override those set
//!   above them.
//!
//! # Modules
//!
//! - [`error`] — Error types for store operations
//! - [`keypath`] — Keypath splitting and key validation
//! - [`node`] — The [`Node`] tree and [`Value`] union
//! - [`store`] — [`HierarchicalStore`] with insert/resolve

pub mod error;
pub mod keypath;
pub mod node;
pub mod store;

pub use error::{ConflictKind, Result, StoreError};
pub use node::{Node, Value};
pub use store::{HierarchicalStore, StoreConfig, DEFAULT_SEPARATOR};
