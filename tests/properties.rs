//! Property-based tests for distinguishing trees using proptest.

mod common;

use std::collections::BTreeSet;

use banyan::map::ConfigMapping;
use banyan::tree::{DistinguishingTree, TreeBuilder, TreeNode};
use banyan::walk::{MappingOracle, TreeWalker};
use common::numbered_mapping;
use proptest::prelude::*;

// ============================================================================
// Strategies for generating random mappings
// ============================================================================

fn arb_response_sets(max_cfgs: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..10, 0..6), 1..max_cfgs)
}

/// Two response-set lists over the same configurations
fn arb_two_maps(max_cfgs: usize) -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<Vec<u8>>)> {
    (1..max_cfgs).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::collection::vec(0u8..6, 0..4), n),
            prop::collection::vec(prop::collection::vec(100u8..106, 0..4), n),
        )
    })
}

// ============================================================================
// Tree invariant checks
// ============================================================================

fn response_set(mapping: &ConfigMapping<usize, u8>, cfg: usize) -> BTreeSet<u8> {
    mapping.responses(&cfg).unwrap().iter().copied().collect()
}

/// Children partition their parent, carry the right edge tags and the right
/// side of the split element
fn check_node(node: &TreeNode<usize, u8>, mapping: &ConfigMapping<usize, u8>) {
    assert!(!node.cfgs().is_empty());

    match node.label() {
        None => assert!(node.children().is_empty()),
        Some(label) => {
            let present = node.child(true).unwrap();
            let absent = node.child(false).unwrap();
            assert_eq!(present.oracle_response(), Some(true));
            assert_eq!(absent.oracle_response(), Some(false));
            assert!(present.cfgs().len() < node.cfgs().len());
            assert!(absent.cfgs().len() < node.cfgs().len());
            assert_eq!(present.cfgs().len() + absent.cfgs().len(), node.cfgs().len());

            for cfg in present.cfgs() {
                assert!(node.cfgs().contains(cfg));
                assert!(mapping.responses(cfg).unwrap().contains(label));
            }
            for cfg in absent.cfgs() {
                assert!(node.cfgs().contains(cfg));
                assert!(!mapping.responses(cfg).unwrap().contains(label));
            }

            check_node(present, mapping);
            check_node(absent, mapping);
        }
    }
}

/// Leaves are disjoint, cover the root and hold only indistinguishable
/// configurations
fn check_leaves(root: &TreeNode<usize, u8>, mapping: &ConfigMapping<usize, u8>) {
    let mut seen = BTreeSet::new();
    for leaf in root.leaves() {
        let first = *leaf.cfgs().first().unwrap();
        for &cfg in leaf.cfgs() {
            assert!(seen.insert(cfg), "configuration {cfg} in two leaves");
            assert_eq!(response_set(mapping, cfg), response_set(mapping, first));
        }
    }
    assert_eq!(seen.len(), root.cfgs().len());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Building terminates and every node partitions its configurations
    #[test]
    fn prop_tree_partitions_configurations(sets in arb_response_sets(16)) {
        let mapping = numbered_mapping(&sets);
        let root = TreeBuilder::build(&mapping, None).unwrap();

        prop_assert_eq!(root.oracle_response(), None);
        prop_assert_eq!(root.cfgs().len(), mapping.len());
        check_node(&root, &mapping);
    }

    /// Leaves are singletons or hold configurations no element separates
    #[test]
    fn prop_leaves_are_minimal(sets in arb_response_sets(16)) {
        let mapping = numbered_mapping(&sets);
        let root = TreeBuilder::build(&mapping, None).unwrap();

        check_leaves(&root, &mapping);
    }

    /// The same input always gives the same tree
    #[test]
    fn prop_build_is_deterministic(sets in arb_response_sets(16)) {
        let mapping = numbered_mapping(&sets);

        prop_assert_eq!(
            TreeBuilder::build(&mapping, None).unwrap(),
            TreeBuilder::build(&mapping.clone(), None).unwrap()
        );
    }

    /// Expanding with a second query set never lowers the tree and keeps
    /// every invariant over the merged mapping
    #[test]
    fn prop_expand_never_lowers_height((first, second) in arb_two_maps(12)) {
        let tree = DistinguishingTree::build(numbered_mapping(&first)).unwrap();
        let expanded = tree.expand(&numbered_mapping(&second)).unwrap();

        prop_assert!(expanded.height() >= tree.height());
        prop_assert!(expanded.leaves().len() >= tree.leaves().len());
        check_node(expanded.root(), expanded.mapping());
        check_leaves(expanded.root(), expanded.mapping());
    }

    /// Walking with an honest oracle ends in the leaf holding the configuration
    #[test]
    fn prop_walk_finds_configuration(sets in arb_response_sets(16)) {
        let tree = DistinguishingTree::build(numbered_mapping(&sets)).unwrap();
        let walker = TreeWalker::default();

        for cfg in 0..sets.len() {
            let mut oracle = MappingOracle::new(tree.mapping(), &cfg);
            let outcome = walker.walk(&tree, &mut oracle).unwrap();

            prop_assert!(outcome.candidates.contains(&cfg));
            prop_assert_eq!(outcome.queries, tree.path_to(&cfg).unwrap().len());
        }
    }
}
