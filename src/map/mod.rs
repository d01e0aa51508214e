//! Map module - configuration to oracle response mappings

mod mapping;
mod query;

pub use mapping::ConfigMapping;
pub use query::Query;
