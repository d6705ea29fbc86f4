//! The append/merge fold.
//!
//! Applying a package to an [`ActiveConfiguration`] walks [`MERGE_ORDER`], a
//! fixed table pairing each contributed [`Field`] with the [`MergePolicy`] that
//! combines it. Every policy is implemented once, per container shape, by the
//! [`Merge`] trait.
//!
//! | Step | Fields                                         | Policy    |
//! |------|------------------------------------------------|-----------|
//! | 1    | handler lists                                  | Prepend   |
//! | 2    | fallbacks, stack items, tags, node factories   | LastWins  |
//! | 3    | option defaults                                | FirstWins |
//! | 4    | pre- and postprocessors                        | Append    |
//! | 5    | init and ready hooks                           | Append    |
//!
//! The order is part of the contract. Handler lookup precedence follows the
//! most recent package while option defaults follow the first.
//!
//! Each container shape reduces the four policies to the two it can express:
//!
//! | Shape            | Prepend, LastWins        | Append, FirstWins      |
//! |------------------|--------------------------|------------------------|
//! | sequence         | incoming in front        | incoming behind        |
//! | keyed map        | incoming replaces        | existing kept          |
//! | option tree      | incoming replaces        | existing kept          |
//! | callback chain   | added at hook priority   | added at hook priority |

use std::fmt;

use crate::config::{ConfigurationEntry, HandlerCategory, HandlerLists, Hook};
use crate::options::OptionTree;
use crate::priority::CallbackChain;
use crate::runtime::active::ActiveConfiguration;

/// How incoming contributions combine with what is already merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Incoming items go first, in their own order.
    Prepend,
    /// Incoming items go last, in their own order.
    Append,
    /// Incoming values replace existing values with the same key.
    LastWins,
    /// Existing values are kept; only new keys are added.
    FirstWins,
}

/// A contribution slot of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Handlers,
    Fallbacks,
    StackItems,
    Tags,
    NodeFactories,
    Options,
    Preprocessors,
    Postprocessors,
    InitHook,
    ReadyHook,
}

impl Field {
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Handlers => "handlers",
            Field::Fallbacks => "fallbacks",
            Field::StackItems => "stack_items",
            Field::Tags => "tags",
            Field::NodeFactories => "node_factories",
            Field::Options => "options",
            Field::Preprocessors => "preprocessors",
            Field::Postprocessors => "postprocessors",
            Field::InitHook => "init_hook",
            Field::ReadyHook => "ready_hook",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the merge table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStep {
    pub field: Field,
    pub policy: MergePolicy,
}

impl MergeStep {
    const fn new(field: Field, policy: MergePolicy) -> Self {
        Self { field, policy }
    }

    /// Merges this step's field of `entry` into `active`.
    pub fn apply(&self, active: &mut ActiveConfiguration, entry: &ConfigurationEntry) {
        tracing::trace!(
            package = entry.name(),
            field = %self.field,
            policy = ?self.policy,
            "merge step"
        );
        let policy = self.policy;
        match self.field {
            Field::Handlers => active.handlers.merge(entry.handlers(), policy),
            Field::Fallbacks => active.fallbacks.merge(entry.fallbacks(), policy),
            Field::StackItems => active.stack_items.merge(entry.stack_items(), policy),
            Field::Tags => active.tags.merge(entry.tags(), policy),
            Field::NodeFactories => active.nodes.merge(entry.node_factories(), policy),
            Field::Options => active.options.merge(entry.options(), policy),
            Field::Preprocessors => active.preprocessors.merge(entry.preprocessors(), policy),
            Field::Postprocessors => active.postprocessors.merge(entry.postprocessors(), policy),
            Field::InitHook => {
                if let Some(hook) = entry.init_hook() {
                    active.init_chain.merge(hook, policy);
                }
            }
            Field::ReadyHook => {
                if let Some(hook) = entry.ready_hook() {
                    active.ready_chain.merge(hook, policy);
                }
            }
        }
    }
}

/// The merge table, in application order.
pub const MERGE_ORDER: [MergeStep; 10] = [
    MergeStep::new(Field::Handlers, MergePolicy::Prepend),
    MergeStep::new(Field::Fallbacks, MergePolicy::LastWins),
    MergeStep::new(Field::StackItems, MergePolicy::LastWins),
    MergeStep::new(Field::Tags, MergePolicy::LastWins),
    MergeStep::new(Field::NodeFactories, MergePolicy::LastWins),
    MergeStep::new(Field::Options, MergePolicy::FirstWins),
    MergeStep::new(Field::Preprocessors, MergePolicy::Append),
    MergeStep::new(Field::Postprocessors, MergePolicy::Append),
    MergeStep::new(Field::InitHook, MergePolicy::Append),
    MergeStep::new(Field::ReadyHook, MergePolicy::Append),
];

/// Applies every step of [`MERGE_ORDER`] for one package.
pub fn fold(active: &mut ActiveConfiguration, entry: &ConfigurationEntry) {
    for step in &MERGE_ORDER {
        step.apply(active, entry);
    }
}

/// Combines an incoming contribution into an accumulated value.
pub trait Merge<Incoming: ?Sized = Self> {
    fn merge(&mut self, incoming: &Incoming, policy: MergePolicy);
}

/// Sequences are read front first, so `LastWins` puts incoming items in front
/// like `Prepend`, and `FirstWins` puts them behind like `Append`.
impl<T: Clone> Merge<[T]> for Vec<T> {
    fn merge(&mut self, incoming: &[T], policy: MergePolicy) {
        match policy {
            MergePolicy::Prepend | MergePolicy::LastWins => {
                self.splice(0..0, incoming.iter().cloned());
            }
            MergePolicy::Append | MergePolicy::FirstWins => self.extend_from_slice(incoming),
        }
    }
}

impl<K, V> Merge for im::OrdMap<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    fn merge(&mut self, incoming: &Self, policy: MergePolicy) {
        for (key, value) in incoming {
            match policy {
                MergePolicy::Prepend | MergePolicy::LastWins => {
                    self.insert(key.clone(), value.clone());
                }
                MergePolicy::Append | MergePolicy::FirstWins => {
                    if !self.contains_key(key) {
                        self.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    }
}

impl Merge for HandlerLists {
    fn merge(&mut self, incoming: &Self, policy: MergePolicy) {
        for category in HandlerCategory::ALL {
            self.get_mut(category).merge(incoming.get(category), policy);
        }
    }
}

impl Merge for OptionTree {
    fn merge(&mut self, incoming: &Self, policy: MergePolicy) {
        match policy {
            MergePolicy::FirstWins | MergePolicy::Append => {
                let kept = self.merge_defaults(incoming);
                if !kept.is_empty() {
                    tracing::trace!(?kept, "option defaults already declared");
                }
            }
            MergePolicy::LastWins | MergePolicy::Prepend => self.overwrite(incoming),
        }
    }
}

/// Chains order by priority and keep merge order among equal priorities, so
/// every policy adds the hook at its own priority.
impl<F: ?Sized> Merge<Hook<F>> for CallbackChain<F> {
    fn merge(&mut self, incoming: &Hook<F>, _policy: MergePolicy) {
        self.add(incoming.callable.clone(), incoming.priority);
    }
}
