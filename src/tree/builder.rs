//! Distinguishing tree builder

use indexmap::IndexSet;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;
use tracing::{debug, trace};

use super::selector::DistinguishingElementSelector;
use crate::map::ConfigMapping;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Cannot build a tree from an empty configuration mapping")]
    EmptyMapping,

    #[error("Configuration {0} is missing from the mapping")]
    MissingConfiguration(String),

    #[error("Split on {0} is missing a built child")]
    IncompleteSplit(String),
}

/// A node in a distinguishing tree
#[derive(Debug, Clone)]
pub enum TreeNode<C, E> {
    /// Configurations that no element tells apart
    Leaf {
        cfgs: IndexSet<C>,
        /// Oracle response on the edge from the parent, `None` at the root
        response: Option<bool>,
    },
    /// Split on whether `label` is in a configuration's response set
    Split {
        label: E,
        cfgs: IndexSet<C>,
        response: Option<bool>,
        /// Configurations whose response set contains `label`
        present: Box<TreeNode<C, E>>,
        /// Configurations whose response set lacks `label`
        absent: Box<TreeNode<C, E>>,
    },
}

impl<C, E> TreeNode<C, E> {
    /// The discriminating element, `None` at leaves
    pub fn label(&self) -> Option<&E> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split { label, .. } => Some(label),
        }
    }

    /// Configurations reachable at or below this node
    pub fn cfgs(&self) -> &IndexSet<C> {
        match self {
            TreeNode::Leaf { cfgs, .. } | TreeNode::Split { cfgs, .. } => cfgs,
        }
    }

    pub fn oracle_response(&self) -> Option<bool> {
        match self {
            TreeNode::Leaf { response, .. } | TreeNode::Split { response, .. } => *response,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// The child followed when the oracle answers `response`
    pub fn child(&self, response: bool) -> Option<&TreeNode<C, E>> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split { present, .. } if response => Some(present.as_ref()),
            TreeNode::Split { absent, .. } => Some(absent.as_ref()),
        }
    }

    /// Children, present first; empty for leaves
    pub fn children(&self) -> Vec<&TreeNode<C, E>> {
        match self {
            TreeNode::Leaf { .. } => Vec::new(),
            TreeNode::Split {
                present, absent, ..
            } => vec![present.as_ref(), absent.as_ref()],
        }
    }

    /// Leaves from left (present) to right (absent)
    pub fn leaves(&self) -> Vec<&TreeNode<C, E>> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                TreeNode::Leaf { .. } => leaves.push(node),
                TreeNode::Split {
                    present, absent, ..
                } => {
                    stack.push(absent.as_ref());
                    stack.push(present.as_ref());
                }
            }
        }
        leaves
    }

    /// Number of edges on the longest path down to a leaf
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            for child in node.children() {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    /// Number of nodes
    pub fn size(&self) -> usize {
        let mut size = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            size += 1;
            stack.extend(node.children());
        }
        size
    }
}

impl<C, E> PartialEq for TreeNode<C, E>
where
    C: Hash + Eq,
    E: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                TreeNode::Leaf { cfgs, response },
                TreeNode::Leaf {
                    cfgs: other_cfgs,
                    response: other_response,
                },
            ) => response == other_response && cfgs.iter().eq(other_cfgs.iter()),
            (
                TreeNode::Split {
                    label,
                    cfgs,
                    response,
                    present,
                    absent,
                },
                TreeNode::Split {
                    label: other_label,
                    cfgs: other_cfgs,
                    response: other_response,
                    present: other_present,
                    absent: other_absent,
                },
            ) => {
                label == other_label
                    && response == other_response
                    && cfgs.iter().eq(other_cfgs.iter())
                    && present == other_present
                    && absent == other_absent
            }
            _ => false,
        }
    }
}

impl<C, E> Eq for TreeNode<C, E>
where
    C: Hash + Eq,
    E: Eq,
{
}

/// Pending work while building a tree without call-stack recursion
enum Task<E> {
    /// Build the subtree for the configurations at these positions
    Build {
        members: Vec<usize>,
        response: Option<bool>,
    },
    /// Both children are built, join them under a split node
    Assemble {
        label: E,
        members: Vec<usize>,
        response: Option<bool>,
    },
}

/// Builds distinguishing trees from configuration mappings
pub struct TreeBuilder;

impl TreeBuilder {
    /// Build a tree separating the configurations of `cfg2resp`.
    ///
    /// `oracle_response` tags the returned node with the answer on the edge
    /// from its future parent; it is `None` for a root.
    ///
    /// The result equals the recursive definition (split on the selected
    /// element, recurse into the present then the absent configurations) but
    /// uses an explicit worklist, since unbalanced splits make the tree as deep
    /// as there are configurations.
    pub fn build<C, E>(
        cfg2resp: &ConfigMapping<C, E>,
        oracle_response: Option<bool>,
    ) -> Result<TreeNode<C, E>, TreeError>
    where
        C: Hash + Eq + Clone + Debug,
        E: Hash + Eq + Clone + Debug,
    {
        if cfg2resp.is_empty() {
            return Err(TreeError::EmptyMapping);
        }

        let selector = DistinguishingElementSelector::new();
        let mut pending = vec![Task::Build {
            members: (0..cfg2resp.len()).collect(),
            response: oracle_response,
        }];
        let mut built: Vec<TreeNode<C, E>> = Vec::new();

        while let Some(task) = pending.pop() {
            match task {
                Task::Build { members, response } => {
                    // Base case 1: a single configuration
                    if members.len() == 1 {
                        built.push(TreeNode::Leaf {
                            cfgs: Self::collect_cfgs(cfg2resp, &members),
                            response,
                        });
                        continue;
                    }

                    // Base case 2: the best candidate is shared by all or none
                    let Some(label) = selector.select_among(cfg2resp, &members) else {
                        trace!(cfgs = members.len(), "no distinguishing element");
                        built.push(TreeNode::Leaf {
                            cfgs: Self::collect_cfgs(cfg2resp, &members),
                            response,
                        });
                        continue;
                    };

                    let (present, absent): (Vec<usize>, Vec<usize>) =
                        members.iter().partition(|&&index| {
                            cfg2resp
                                .get_index(index)
                                .is_some_and(|(_, responses)| responses.contains(label))
                        });
                    debug!(
                        element = ?label,
                        present = present.len(),
                        absent = absent.len(),
                        "split configurations"
                    );

                    pending.push(Task::Assemble {
                        label: label.clone(),
                        members,
                        response,
                    });
                    pending.push(Task::Build {
                        members: absent,
                        response: Some(false),
                    });
                    pending.push(Task::Build {
                        members: present,
                        response: Some(true),
                    });
                }

                Task::Assemble {
                    label,
                    members,
                    response,
                } => {
                    // Present was built first, so absent sits on top
                    let (Some(absent), Some(present)) = (built.pop(), built.pop()) else {
                        return Err(TreeError::IncompleteSplit(format!("{:?}", label)));
                    };
                    built.push(TreeNode::Split {
                        label,
                        cfgs: Self::collect_cfgs(cfg2resp, &members),
                        response,
                        present: Box::new(present),
                        absent: Box::new(absent),
                    });
                }
            }
        }

        built.pop().ok_or(TreeError::EmptyMapping)
    }

    fn collect_cfgs<C, E>(cfg2resp: &ConfigMapping<C, E>, members: &[usize]) -> IndexSet<C>
    where
        C: Hash + Eq + Clone,
        E: Hash + Eq,
    {
        members
            .iter()
            .filter_map(|&index| cfg2resp.get_index(index))
            .map(|(cfg, _)| cfg.clone())
            .collect()
    }
}
