//! Map-tagged oracle queries

use std::fmt;

/// An element tagged with the map (query set) it came from.
///
/// Two maps may use the same element text for unrelated queries, e.g. the
/// same point under two different scalars. Tagging keeps them apart once the
/// maps are merged into one tree.
///
/// Io-map elements keep the observed `output` next to the `element` input,
/// so an input holding `=` can never be confused with another pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub map: String,
    pub element: String,
    pub output: Option<String>,
}

impl Query {
    pub fn new(map: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            map: map.into(),
            element: element.into(),
            output: None,
        }
    }

    /// An `(input, output)` pair of an io-map
    pub fn with_output(
        map: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            map: map.into(),
            element: input.into(),
            output: Some(output.into()),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.output {
            Some(output) => write!(f, "{}({}={})", self.map, self.element, output),
            None => write!(f, "{}({})", self.map, self.element),
        }
    }
}
