//! Per-parser state: merging selected packages and keeping them attached to a
//! host engine.
//!
//! - [`ActiveConfiguration`]: the merged contributions.
//! - [`merge`]: the fold that combines one package into it.
//! - [`HandlerIndex`]: flattened handler lookup derived from the merged lists.
//! - [`PreparedConfiguration`] / [`ParserConfiguration`]: construction and
//!   dynamic extension.

pub mod active;
pub mod index;
pub mod merge;
pub mod parser;
pub mod summary;

pub use active::ActiveConfiguration;
pub use index::{HandlerIndex, HandlerMapLookup, HandlerMaps, Resolution};
pub use merge::{Field, Merge, MergePolicy, MergeStep, MERGE_ORDER};
pub use parser::{PackageRequest, ParserConfiguration, PreparedConfiguration};
pub use summary::ConfigurationSummary;
