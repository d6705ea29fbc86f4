//! Package registration and configuration merging for a pluggable TeX-style
//! parser.
//!
//! Packages are registered by name in a [`ConfigurationRegistry`]. A parser
//! selects an ordered subset of them; [`PreparedConfiguration`] folds the
//! selection into an [`ActiveConfiguration`] and [`ParserConfiguration`]
//! keeps it attached to a host engine, where more packages can be added later.

pub use crate::config::{ConfigurationEntry, ConfigurationRegistry, HandlerCategory};
pub use crate::errors::{ConfigError, ConfigResult};
pub use crate::runtime::{ActiveConfiguration, ParserConfiguration, PreparedConfiguration};

pub mod builtins;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod options;
pub mod priority;
pub mod runtime;
pub mod settings;
