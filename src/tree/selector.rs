//! Distinguishing element selection
//!
//! The selector is greedy with a single level of lookahead: it picks the
//! element whose presence count is closest to half of the surviving
//! configurations. This approximates a minimum-depth tree but does not
//! guarantee one (finding the optimum is NP-hard in general).

use indexmap::IndexMap;
use std::hash::Hash;

use crate::map::ConfigMapping;

/// Picks the element that best bisects a set of configurations
pub struct DistinguishingElementSelector;

impl DistinguishingElementSelector {
    pub fn new() -> Self {
        Self
    }

    /// Select the best splitting element for the whole mapping.
    ///
    /// Returns `None` when no element separates any two configurations.
    pub fn select<'a, C, E>(&self, cfg2resp: &'a ConfigMapping<C, E>) -> Option<&'a E>
    where
        C: Hash + Eq,
        E: Hash + Eq,
    {
        let members: Vec<usize> = (0..cfg2resp.len()).collect();
        self.select_among(cfg2resp, &members)
    }

    /// Select the best splitting element for the configurations at the
    /// `members` positions of `cfg2resp`.
    ///
    /// Candidates are ranked by `|count - n/2|`. Ties keep the element counted
    /// first, and counting follows member order then response-set order, so
    /// the choice is fully determined by the mapping's insertion order.
    pub fn select_among<'a, C, E>(
        &self,
        cfg2resp: &'a ConfigMapping<C, E>,
        members: &[usize],
    ) -> Option<&'a E>
    where
        C: Hash + Eq,
        E: Hash + Eq,
    {
        let n = members.len();
        let counts = self.counts(cfg2resp, members);

        let mut best: Option<(&E, usize)> = None;
        for (elem, count) in counts {
            // |2·count - n| orders candidates exactly like |count - n/2|
            let distance = (2 * count).abs_diff(n);
            let better = match best {
                None => true,
                Some((_, best_count)) => distance < (2 * best_count).abs_diff(n),
            };
            if better {
                best = Some((elem, count));
            }
        }

        match best {
            Some((_, count)) if count == 0 || count == n => None,
            Some((elem, _)) => Some(elem),
            None => None,
        }
    }

    /// For every element, the number of member configurations whose response
    /// set contains it, in first-seen order.
    pub fn counts<'a, C, E>(
        &self,
        cfg2resp: &'a ConfigMapping<C, E>,
        members: &[usize],
    ) -> IndexMap<&'a E, usize>
    where
        C: Hash + Eq,
        E: Hash + Eq,
    {
        let mut counts: IndexMap<&'a E, usize> = IndexMap::new();
        for &index in members {
            if let Some((_, responses)) = cfg2resp.get_index(index) {
                for elem in responses {
                    *counts.entry(elem).or_insert(0) += 1;
                }
            }
        }
        counts
    }
}

impl Default for DistinguishingElementSelector {
    fn default() -> Self {
        Self::new()
    }
}
