//! Package definitions and the registry that holds them.
//!
//! ## Module Structure
//! - **Definitions**: [`ConfigurationEntry`] and its [`EntryBuilder`]
//! - **Contributions**: handler lists, opaque [`Rule`]s, hooks and processors
//! - **Storage**: [`ConfigurationRegistry`], keyed by package name

pub mod entry;
pub mod handlers;
pub mod hooks;
pub mod registry;
pub mod rule;

pub use entry::{ConfigurationEntry, EntryBuilder, FallbackMap, Stage, DEFAULT_PARSER, LOCAL_NAME};
pub use handlers::{HandlerCategory, HandlerLists};
pub use hooks::{
    filter_fn, init_fn, ready_engine_fn, ready_fn, EngineFn, FilterFn, Hook, InitFn, Processor,
    ReadyFn,
};
pub use registry::ConfigurationRegistry;
pub use rule::{Rule, RuleMap};
