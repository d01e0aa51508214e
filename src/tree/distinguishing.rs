//! Distinguishing trees together with the mapping they were built from

use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

use super::builder::{TreeBuilder, TreeError, TreeNode};
use crate::map::ConfigMapping;

/// Shape statistics of a distinguishing tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSummary {
    pub total_cfgs: usize,
    pub depth: usize,
    /// Leaf sizes in ascending order
    pub leaf_sizes: Vec<usize>,
    pub average_leaf_size: f64,
    /// Expected number of surviving candidates when the device is a
    /// configuration drawn uniformly at random
    pub mean_result_size: f64,
}

/// A distinguishing tree and the mapping its splits refer to
#[derive(Debug, Clone)]
pub struct DistinguishingTree<C, E> {
    root: TreeNode<C, E>,
    mapping: ConfigMapping<C, E>,
}

impl<C, E> DistinguishingTree<C, E>
where
    C: Hash + Eq + Clone + Debug,
    E: Hash + Eq + Clone + Debug,
{
    /// Build a tree over every configuration of `mapping`
    pub fn build(mapping: ConfigMapping<C, E>) -> Result<Self, TreeError> {
        let root = TreeBuilder::build(&mapping, None)?;
        debug!(
            cfgs = mapping.len(),
            height = root.height(),
            "built distinguishing tree"
        );
        Ok(Self { root, mapping })
    }

    /// Refine the tree with another query set.
    ///
    /// `more` is merged into the tree's mapping and every leaf holding more
    /// than one configuration is rebuilt against the merged mapping. Existing
    /// splits are kept, so the height never decreases. Configurations of
    /// `more` that the tree does not hold are ignored.
    pub fn expand(&self, more: &ConfigMapping<C, E>) -> Result<Self, TreeError> {
        if let Some(missing) = self.root.cfgs().iter().find(|cfg| !more.contains(cfg)) {
            return Err(TreeError::MissingConfiguration(format!("{:?}", missing)));
        }

        let mapping = self.mapping.merge(&more.restrict(self.root.cfgs()));
        let root = Self::expand_node(self.root.clone(), &mapping)?;
        debug!(
            before = self.root.height(),
            after = root.height(),
            "expanded distinguishing tree"
        );
        Ok(Self { root, mapping })
    }

    fn expand_node(
        node: TreeNode<C, E>,
        mapping: &ConfigMapping<C, E>,
    ) -> Result<TreeNode<C, E>, TreeError> {
        match node {
            TreeNode::Leaf { ref cfgs, response } if cfgs.len() > 1 => {
                TreeBuilder::build(&mapping.restrict(cfgs), response)
            }
            TreeNode::Leaf { .. } => Ok(node),
            TreeNode::Split {
                label,
                cfgs,
                response,
                present,
                absent,
            } => Ok(TreeNode::Split {
                label,
                cfgs,
                response,
                present: Box::new(Self::expand_node(*present, mapping)?),
                absent: Box::new(Self::expand_node(*absent, mapping)?),
            }),
        }
    }

    pub fn root(&self) -> &TreeNode<C, E> {
        &self.root
    }

    pub fn mapping(&self) -> &ConfigMapping<C, E> {
        &self.mapping
    }

    pub fn leaves(&self) -> Vec<&TreeNode<C, E>> {
        self.root.leaves()
    }

    pub fn height(&self) -> usize {
        self.root.height()
    }

    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Whether every leaf identifies exactly one configuration
    pub fn is_precise(&self) -> bool {
        self.leaves().iter().all(|leaf| leaf.cfgs().len() == 1)
    }

    /// The decisions leading from the root to the leaf holding `cfg`
    pub fn path_to(&self, cfg: &C) -> Option<Vec<(&E, bool)>> {
        if !self.root.cfgs().contains(cfg) {
            return None;
        }

        let mut path = Vec::new();
        let mut node = &self.root;
        while let Some(label) = node.label() {
            let response = node.child(true)?.cfgs().contains(cfg);
            path.push((label, response));
            node = node.child(response)?;
        }
        Some(path)
    }

    pub fn summary(&self) -> TreeSummary {
        let mut leaf_sizes: Vec<usize> = self
            .leaves()
            .iter()
            .map(|leaf| leaf.cfgs().len())
            .collect();
        leaf_sizes.sort_unstable();

        let total: usize = leaf_sizes.iter().sum();
        let squares: usize = leaf_sizes.iter().map(|size| size * size).sum();

        TreeSummary {
            total_cfgs: self.root.cfgs().len(),
            depth: self.height(),
            average_leaf_size: total as f64 / leaf_sizes.len() as f64,
            mean_result_size: squares as f64 / total as f64,
            leaf_sizes,
        }
    }
}
