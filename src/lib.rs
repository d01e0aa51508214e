//! banyan - distinguishing trees for black-box reverse engineering.
//!
//! Given candidate configurations and the oracle responses each of them
//! produces, banyan builds a binary tree of oracle queries that tells the
//! configurations apart. Walking the tree against a live oracle then narrows
//! the candidates down to an indistinguishable group.

pub mod map;
pub mod output;
pub mod project;
pub mod tree;
pub mod walk;

// Re-exports for convenience
pub use map::{ConfigMapping, Query};
pub use tree::{
    DistinguishingElementSelector, DistinguishingTree, TreeBuilder, TreeError, TreeNode,
};
pub use walk::{MappingOracle, Oracle, TreeWalker, WalkError};
