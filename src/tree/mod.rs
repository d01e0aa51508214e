//! Tree construction module

mod builder;
mod distinguishing;
mod selector;

pub use builder::{TreeBuilder, TreeError, TreeNode};
pub use distinguishing::{DistinguishingTree, TreeSummary};
pub use selector::DistinguishingElementSelector;
