//! Walking a distinguishing tree against a live oracle

use indexmap::IndexSet;
use std::convert::Infallible;
use std::hash::Hash;
use thiserror::Error;
use tracing::debug;

use crate::map::ConfigMapping;
use crate::tree::{DistinguishingTree, TreeNode};

#[derive(Error, Debug)]
pub enum WalkError<E> {
    #[error("Majority must be odd, got {0}")]
    EvenMajority(usize),

    #[error("Oracle query failed: {0}")]
    Oracle(E),
}

/// A black box answering whether an element shows up in its responses
pub trait Oracle<E> {
    type Error;

    fn query(&mut self, element: &E) -> Result<bool, Self::Error>;
}

/// Answers queries as if the device were one known configuration
pub struct MappingOracle<'a, E> {
    responses: Option<&'a IndexSet<E>>,
}

impl<'a, E> MappingOracle<'a, E>
where
    E: Hash + Eq,
{
    /// An oracle for `cfg`; an unknown configuration answers `false` to
    /// every query
    pub fn new<C>(mapping: &'a ConfigMapping<C, E>, cfg: &C) -> Self
    where
        C: Hash + Eq,
    {
        Self {
            responses: mapping.responses(cfg),
        }
    }
}

impl<E> Oracle<E> for MappingOracle<'_, E>
where
    E: Hash + Eq,
{
    type Error = Infallible;

    fn query(&mut self, element: &E) -> Result<bool, Self::Error> {
        Ok(self
            .responses
            .is_some_and(|responses| responses.contains(element)))
    }
}

/// Where a walk ended up
#[derive(Debug)]
pub struct WalkOutcome<'a, C> {
    /// Configurations consistent with every answer
    pub candidates: &'a IndexSet<C>,
    /// Total oracle calls, repeated votes included
    pub queries: usize,
}

/// Walks a tree from the root, asking the oracle at every split
pub struct TreeWalker {
    majority: usize,
}

impl TreeWalker {
    /// A walker taking the majority answer of up to `majority` queries per
    /// split. `majority` has to be odd so that a vote cannot tie.
    pub fn new(majority: usize) -> Result<Self, WalkError<Infallible>> {
        if majority % 2 == 0 {
            return Err(WalkError::EvenMajority(majority));
        }
        Ok(Self { majority })
    }

    pub fn majority(&self) -> usize {
        self.majority
    }

    pub fn walk<'t, C, E, O>(
        &self,
        tree: &'t DistinguishingTree<C, E>,
        oracle: &mut O,
    ) -> Result<WalkOutcome<'t, C>, WalkError<O::Error>>
    where
        C: Hash + Eq + Clone + std::fmt::Debug,
        E: Hash + Eq + Clone + std::fmt::Debug,
        O: Oracle<E>,
    {
        self.walk_node(tree.root(), oracle)
    }

    /// Walk down from any node, e.g. a subtree of a larger tree
    pub fn walk_node<'t, C, E, O>(
        &self,
        root: &'t TreeNode<C, E>,
        oracle: &mut O,
    ) -> Result<WalkOutcome<'t, C>, WalkError<O::Error>>
    where
        E: std::fmt::Debug,
        O: Oracle<E>,
    {
        let mut node = root;
        let mut queries = 0;

        while let Some(label) = node.label() {
            let (response, asked) = self.vote(label, oracle)?;
            queries += asked;
            debug!(element = ?label, response, "oracle response");

            match node.child(response) {
                Some(child) => node = child,
                None => break,
            }
        }

        Ok(WalkOutcome {
            candidates: node.cfgs(),
            queries,
        })
    }

    /// Ask until one answer holds a strict majority of `self.majority` votes
    fn vote<E, O>(&self, element: &E, oracle: &mut O) -> Result<(bool, usize), WalkError<O::Error>>
    where
        O: Oracle<E>,
    {
        let needed = self.majority / 2 + 1;
        let (mut yes, mut no) = (0, 0);

        for asked in 1..=self.majority {
            if oracle.query(element).map_err(WalkError::Oracle)? {
                yes += 1;
            } else {
                no += 1;
            }
            if yes >= needed {
                return Ok((true, asked));
            }
            if no >= needed {
                return Ok((false, asked));
            }
        }

        // odd majorities always decide inside the loop
        Ok((yes > no, self.majority))
    }
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self { majority: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> DistinguishingTree<&'static str, u32> {
        let mapping: ConfigMapping<&'static str, u32> = [
            ("a", vec![1, 2]),
            ("b", vec![1]),
            ("c", vec![2]),
            ("d", vec![]),
        ]
        .into_iter()
        .collect();
        DistinguishingTree::build(mapping).unwrap()
    }

    /// Replays scripted answers, whatever the element
    struct Scripted(Vec<bool>);

    impl Oracle<u32> for Scripted {
        type Error = &'static str;

        fn query(&mut self, _element: &u32) -> Result<bool, Self::Error> {
            if self.0.is_empty() {
                return Err("out of answers");
            }
            Ok(self.0.remove(0))
        }
    }

    #[test]
    fn test_even_majority_rejected() {
        assert!(matches!(
            TreeWalker::new(2),
            Err(WalkError::EvenMajority(2))
        ));
    }

    #[test]
    fn test_walk_identifies_every_configuration() {
        let tree = tree();
        let walker = TreeWalker::default();

        for cfg in ["a", "b", "c", "d"] {
            let mut oracle = MappingOracle::new(tree.mapping(), &cfg);
            let outcome = walker.walk(&tree, &mut oracle).unwrap();
            assert_eq!(outcome.candidates.iter().copied().collect::<Vec<_>>(), vec![cfg]);
            assert_eq!(outcome.queries, 2);
        }
    }

    #[test]
    fn test_majority_vote_stops_early() {
        let tree = tree();
        let walker = TreeWalker::new(3).unwrap();

        // root: true, true (decided after two); second split: false, true, false
        let mut oracle = Scripted(vec![true, true, false, true, false]);
        let outcome = walker.walk(&tree, &mut oracle).unwrap();

        assert_eq!(outcome.candidates.iter().copied().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(outcome.queries, 5);
    }

    #[test]
    fn test_oracle_error_propagates() {
        let tree = tree();
        let mut oracle = Scripted(vec![true]);

        let result = TreeWalker::default().walk(&tree, &mut oracle);
        assert!(matches!(result, Err(WalkError::Oracle("out of answers"))));
    }
}
