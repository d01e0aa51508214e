//! Ordered configuration to response-set mapping

use indexmap::{IndexMap, IndexSet};
use std::hash::Hash;

/// Maps every configuration to the set of oracle responses it produces.
///
/// Configurations keep their insertion order and so does every response set.
/// That order matters: the element selector breaks ties by
/// [`ConfigMapping::domain`] order, so the same mapping always yields the same
/// tree.
#[derive(Debug, Clone)]
pub struct ConfigMapping<C, E> {
    responses: IndexMap<C, IndexSet<E>>,
}

impl<C, E> ConfigMapping<C, E>
where
    C: Hash + Eq,
    E: Hash + Eq,
{
    pub fn new() -> Self {
        Self {
            responses: IndexMap::new(),
        }
    }

    /// Add responses for a configuration.
    ///
    /// Inserting a configuration twice unions the sets and keeps the position
    /// of the first insertion.
    pub fn insert<I>(&mut self, cfg: C, elements: I)
    where
        I: IntoIterator<Item = E>,
    {
        self.responses.entry(cfg).or_default().extend(elements);
    }

    /// Number of configurations
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn contains(&self, cfg: &C) -> bool {
        self.responses.contains_key(cfg)
    }

    /// The response set of a configuration
    pub fn responses(&self, cfg: &C) -> Option<&IndexSet<E>> {
        self.responses.get(cfg)
    }

    pub fn configurations(&self) -> impl Iterator<Item = &C> {
        self.responses.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, C, IndexSet<E>> {
        self.responses.iter()
    }

    /// Configuration and response set at a position in insertion order
    pub fn get_index(&self, index: usize) -> Option<(&C, &IndexSet<E>)> {
        self.responses.get_index(index)
    }

    /// Position of a configuration in insertion order
    pub fn index_of(&self, cfg: &C) -> Option<usize> {
        self.responses.get_index_of(cfg)
    }

    /// Every element of every response set, in first-seen order.
    ///
    /// Configurations are visited in insertion order and each response set in
    /// its own insertion order.
    pub fn domain(&self) -> IndexSet<&E> {
        self.responses.values().flatten().collect()
    }
}

impl<C, E> ConfigMapping<C, E>
where
    C: Hash + Eq + Clone,
    E: Hash + Eq + Clone,
{
    /// The sub-mapping holding only `cfgs`, in this mapping's order.
    ///
    /// Configurations in `cfgs` that this mapping does not know are skipped.
    pub fn restrict(&self, cfgs: &IndexSet<C>) -> Self {
        self.responses
            .iter()
            .filter(|(cfg, _)| cfgs.contains(*cfg))
            .map(|(cfg, set)| (cfg.clone(), set.clone()))
            .collect()
    }

    /// Union of both mappings, per configuration.
    ///
    /// Configurations only present in `other` are appended after the ones of
    /// `self`; elements of `other` follow the elements of `self`.
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (cfg, set) in other.iter() {
            merged.insert(cfg.clone(), set.iter().cloned());
        }
        merged
    }
}

impl<C, I, O> ConfigMapping<C, (I, O)>
where
    C: Hash + Eq,
    I: Hash + Eq,
    O: Hash + Eq,
{
    /// Normalize input -> output maps into a set view.
    ///
    /// The response set of a configuration holds the `(input, output)` pairs it
    /// produced, so a split asks whether a configuration maps an input to one
    /// particular output.
    pub fn from_io_maps<M>(io_maps: M) -> Self
    where
        M: IntoIterator<Item = (C, IndexMap<I, O>)>,
    {
        io_maps.into_iter().collect()
    }
}

impl<C, E> Default for ConfigMapping<C, E>
where
    C: Hash + Eq,
    E: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E, S> FromIterator<(C, S)> for ConfigMapping<C, E>
where
    C: Hash + Eq,
    E: Hash + Eq,
    S: IntoIterator<Item = E>,
{
    fn from_iter<T: IntoIterator<Item = (C, S)>>(iter: T) -> Self {
        let mut mapping = Self::new();
        for (cfg, elements) in iter {
            mapping.insert(cfg, elements);
        }
        mapping
    }
}

impl<'a, C, E> IntoIterator for &'a ConfigMapping<C, E> {
    type Item = (&'a C, &'a IndexSet<E>);
    type IntoIter = indexmap::map::Iter<'a, C, IndexSet<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.iter()
    }
}
