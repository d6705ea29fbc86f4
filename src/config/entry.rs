//! Package definitions.
//!
//! A [`ConfigurationEntry`] is an immutable, named bundle of everything one
//! package contributes to a parser. Entries are assembled with an
//! [`EntryBuilder`], which resolves callable shapes and default priorities and
//! validates names before the entry exists.
//!
//! # Example
//! ```rust
//! use texpack::config::{ConfigurationEntry, HandlerCategory, Rule};
//! let entry = ConfigurationEntry::builder("physics")
//!     .priority(10)
//!     .handlers(HandlerCategory::Macro, ["Physics-macros"])
//!     .stack_item("braket", Rule::named("physics.BraketItem"))
//!     .option("italicdiff", false)
//!     .build()
//!     .unwrap();
//! assert_eq!(entry.handlers().get(HandlerCategory::Macro), ["Physics-macros"]);
//! assert!(entry.handlers().get(HandlerCategory::Environment).is_empty());
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::config::handlers::{HandlerCategory, HandlerLists};
use crate::config::hooks::{
    filter_fn, init_fn, ready_engine_fn, ready_fn, Hook, InitFn, Processor, ReadyFn,
};
use crate::config::rule::{Rule, RuleMap};
use crate::engine::{FilterData, HostEngine};
use crate::errors::{require_name, ConfigResult};
use crate::malformed;
use crate::options::OptionTree;
use crate::priority::{Flow, Priority, DEFAULT_PRIORITY};
use crate::runtime::ActiveConfiguration;

/// Parser a package extends unless it says otherwise.
pub const DEFAULT_PARSER: &str = "tex";

/// Name given to entries built with [`ConfigurationEntry::local`].
pub const LOCAL_NAME: &str = "<local>";

/// Fallback behavior per handler category.
pub type FallbackMap = im::OrdMap<HandlerCategory, Rule>;

#[derive(Debug, Clone)]
pub struct ConfigurationEntry {
    name: String,
    parser: String,
    priority: Priority,
    handlers: HandlerLists,
    fallbacks: FallbackMap,
    stack_items: RuleMap,
    tags: RuleMap,
    nodes: RuleMap,
    options: OptionTree,
    preprocessors: Vec<Processor>,
    postprocessors: Vec<Processor>,
    init: Option<Hook<InitFn>>,
    ready: Option<Hook<ReadyFn>>,
}

impl ConfigurationEntry {
    pub fn builder(name: impl Into<String>) -> EntryBuilder {
        EntryBuilder::new(name)
    }

    /// Starts an entry that is never registered, for init hooks to append
    /// directly to the configuration they are given.
    pub fn local() -> EntryBuilder {
        EntryBuilder::new(LOCAL_NAME)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parser this package extends.
    pub fn parser(&self) -> &str {
        &self.parser
    }

    /// Priority used when the package is selected without an explicit one.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn handlers(&self) -> &HandlerLists {
        &self.handlers
    }

    pub fn fallbacks(&self) -> &FallbackMap {
        &self.fallbacks
    }

    pub fn stack_items(&self) -> &RuleMap {
        &self.stack_items
    }

    pub fn tags(&self) -> &RuleMap {
        &self.tags
    }

    pub fn node_factories(&self) -> &RuleMap {
        &self.nodes
    }

    pub fn options(&self) -> &OptionTree {
        &self.options
    }

    pub fn preprocessors(&self) -> &[Processor] {
        &self.preprocessors
    }

    pub fn postprocessors(&self) -> &[Processor] {
        &self.postprocessors
    }

    pub fn init_hook(&self) -> Option<&Hook<InitFn>> {
        self.init.as_ref()
    }

    pub fn ready_hook(&self) -> Option<&Hook<ReadyFn>> {
        self.ready.as_ref()
    }
}

/// Builder for [`ConfigurationEntry`].
///
/// Hooks added without a priority take the entry's own priority, whatever it
/// is when [`build`](EntryBuilder::build) runs.
pub struct EntryBuilder {
    name: String,
    parser: String,
    priority: Priority,
    handlers: HandlerLists,
    fallbacks: FallbackMap,
    stack_items: RuleMap,
    tags: RuleMap,
    nodes: RuleMap,
    options: OptionTree,
    preprocessors: Vec<Processor>,
    postprocessors: Vec<Processor>,
    init: Option<(Arc<InitFn>, Option<Priority>)>,
    ready: Option<(Arc<ReadyFn>, Option<Priority>)>,
}

impl EntryBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parser: DEFAULT_PARSER.to_string(),
            priority: DEFAULT_PRIORITY,
            handlers: HandlerLists::new(),
            fallbacks: FallbackMap::new(),
            stack_items: RuleMap::new(),
            tags: RuleMap::new(),
            nodes: RuleMap::new(),
            options: OptionTree::new(),
            preprocessors: Vec::new(),
            postprocessors: Vec::new(),
            init: None,
            ready: None,
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn parser(mut self, parser: impl Into<String>) -> Self {
        self.parser = parser.into();
        self
    }

    /// Adds handler-map names for a category, in the order given.
    pub fn handlers<I, S>(mut self, category: HandlerCategory, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handlers.extend(category, names);
        self
    }

    pub fn fallback(mut self, category: HandlerCategory, rule: Rule) -> Self {
        self.fallbacks.insert(category, rule);
        self
    }

    pub fn stack_item(mut self, kind: impl Into<String>, rule: Rule) -> Self {
        self.stack_items.insert(kind.into(), rule);
        self
    }

    pub fn tag(mut self, scheme: impl Into<String>, rule: Rule) -> Self {
        self.tags.insert(scheme.into(), rule);
        self
    }

    pub fn node_factory(mut self, kind: impl Into<String>, rule: Rule) -> Self {
        self.nodes.insert(kind.into(), rule);
        self
    }

    pub fn option(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.options.set(name, default);
        self
    }

    /// Adds every option in `defaults`, replacing earlier declarations.
    pub fn options(mut self, defaults: OptionTree) -> Self {
        self.options.overwrite(&defaults);
        self
    }

    pub fn preprocessor<R, F>(mut self, filter: F) -> Self
    where
        R: Into<Flow>,
        F: Fn(&mut FilterData) -> R + Send + Sync + 'static,
    {
        self.preprocessors.push(Processor::Plain(filter_fn(filter)));
        self
    }

    pub fn preprocessor_at<R, F>(mut self, filter: F, priority: Priority) -> Self
    where
        R: Into<Flow>,
        F: Fn(&mut FilterData) -> R + Send + Sync + 'static,
    {
        self.preprocessors
            .push(Processor::Prioritized(filter_fn(filter), priority));
        self
    }

    pub fn postprocessor<R, F>(mut self, filter: F) -> Self
    where
        R: Into<Flow>,
        F: Fn(&mut FilterData) -> R + Send + Sync + 'static,
    {
        self.postprocessors.push(Processor::Plain(filter_fn(filter)));
        self
    }

    pub fn postprocessor_at<R, F>(mut self, filter: F, priority: Priority) -> Self
    where
        R: Into<Flow>,
        F: Fn(&mut FilterData) -> R + Send + Sync + 'static,
    {
        self.postprocessors
            .push(Processor::Prioritized(filter_fn(filter), priority));
        self
    }

    /// Adds an already-shaped processor.
    pub fn processor(mut self, stage: Stage, processor: Processor) -> Self {
        match stage {
            Stage::Pre => self.preprocessors.push(processor),
            Stage::Post => self.postprocessors.push(processor),
        }
        self
    }

    pub fn init<R, F>(mut self, hook: F) -> Self
    where
        R: Into<Flow>,
        F: Fn(&mut ActiveConfiguration) -> R + Send + Sync + 'static,
    {
        self.init = Some((init_fn(hook), None));
        self
    }

    pub fn init_at<R, F>(mut self, hook: F, priority: Priority) -> Self
    where
        R: Into<Flow>,
        F: Fn(&mut ActiveConfiguration) -> R + Send + Sync + 'static,
    {
        self.init = Some((init_fn(hook), Some(priority)));
        self
    }

    pub fn ready<R, F>(mut self, hook: F) -> Self
    where
        R: Into<Flow>,
        F: Fn(&mut ActiveConfiguration) -> R + Send + Sync + 'static,
    {
        self.ready = Some((Arc::new(ready_fn(hook)), None));
        self
    }

    pub fn ready_at<R, F>(mut self, hook: F, priority: Priority) -> Self
    where
        R: Into<Flow>,
        F: Fn(&mut ActiveConfiguration) -> R + Send + Sync + 'static,
    {
        self.ready = Some((Arc::new(ready_fn(hook)), Some(priority)));
        self
    }

    pub fn ready_with_engine<R, F>(mut self, hook: F) -> Self
    where
        R: Into<Flow>,
        F: Fn(&mut ActiveConfiguration, &mut dyn HostEngine) -> R + Send + Sync + 'static,
    {
        self.ready = Some((Arc::new(ready_engine_fn(hook)), None));
        self
    }

    pub fn ready_with_engine_at<R, F>(mut self, hook: F, priority: Priority) -> Self
    where
        R: Into<Flow>,
        F: Fn(&mut ActiveConfiguration, &mut dyn HostEngine) -> R + Send + Sync + 'static,
    {
        self.ready = Some((Arc::new(ready_engine_fn(hook)), Some(priority)));
        self
    }

    /// Validates the definition and freezes it.
    ///
    /// # Errors
    /// - [`EmptyName`](crate::errors::ConfigError::EmptyName) for a blank
    ///   package name.
    /// - [`MalformedEntry`](crate::errors::ConfigError::MalformedEntry) for a
    ///   blank parser target, handler-map name, rule key or option name.
    pub fn build(self) -> ConfigResult<ConfigurationEntry> {
        require_name(&self.name, "package")?;
        if self.parser.trim().is_empty() {
            return Err(malformed!(self.name, "parser target must not be empty"));
        }
        for (category, names) in self.handlers.iter() {
            if let Some(position) = names.iter().position(|n| n.trim().is_empty()) {
                return Err(malformed!(
                    self.name,
                    "{category} handler map #{position} has an empty name"
                ));
            }
        }
        let keyed = [
            ("stack item", &self.stack_items),
            ("tag scheme", &self.tags),
            ("node factory", &self.nodes),
        ];
        for (what, map) in keyed {
            if map.keys().any(|k| k.trim().is_empty()) {
                return Err(malformed!(self.name, "{what} with an empty name"));
            }
        }
        if self.options.keys().any(|k| k.trim().is_empty()) {
            return Err(malformed!(self.name, "option with an empty name"));
        }

        let priority = self.priority;
        Ok(ConfigurationEntry {
            init: self
                .init
                .map(|(callable, p)| Hook::new(callable, p.unwrap_or(priority))),
            ready: self
                .ready
                .map(|(callable, p)| Hook::new(callable, p.unwrap_or(priority))),
            name: self.name,
            parser: self.parser,
            priority,
            handlers: self.handlers,
            fallbacks: self.fallbacks,
            stack_items: self.stack_items,
            tags: self.tags,
            nodes: self.nodes,
            options: self.options,
            preprocessors: self.preprocessors,
            postprocessors: self.postprocessors,
        })
    }
}

/// Which filter chain a processor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pre,
    Post,
}
