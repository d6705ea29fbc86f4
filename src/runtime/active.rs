//! The merged, per-parser configuration.

use crate::config::{
    ConfigurationEntry, FallbackMap, HandlerCategory, HandlerLists, InitFn, Processor, ReadyFn,
    Rule, RuleMap,
};
use crate::engine::HostEngine;
use crate::options::OptionTree;
use crate::priority::{CallbackChain, Flow};
use crate::runtime::index::{HandlerIndex, HandlerMapLookup, Resolution};
use crate::runtime::merge;
use crate::runtime::summary::ConfigurationSummary;

/// Everything the selected packages contributed, folded together.
///
/// Owned by exactly one parser. Packages are appended with
/// [`append`](Self::append); reads go through the accessors. The handler
/// index used by [`resolve`](Self::resolve) is derived state and only reflects
/// the handler lists as of the last [`rebuild_index`](Self::rebuild_index).
#[derive(Debug, Clone, Default)]
pub struct ActiveConfiguration {
    pub(crate) handlers: HandlerLists,
    pub(crate) fallbacks: FallbackMap,
    pub(crate) stack_items: RuleMap,
    pub(crate) tags: RuleMap,
    pub(crate) nodes: RuleMap,
    pub(crate) options: OptionTree,
    pub(crate) preprocessors: Vec<Processor>,
    pub(crate) postprocessors: Vec<Processor>,
    pub(crate) init_chain: CallbackChain<InitFn>,
    pub(crate) ready_chain: CallbackChain<ReadyFn>,
    packages: Vec<String>,
    index: HandlerIndex,
}

impl ActiveConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one package into this configuration.
    ///
    /// Hooks are queued on the chains but not run.
    pub fn append(&mut self, entry: &ConfigurationEntry) {
        merge::fold(self, entry);
        self.packages.push(entry.name().to_string());
    }

    /// Handler-map names for `category`, earlier names first.
    pub fn handlers(&self, category: HandlerCategory) -> &[String] {
        self.handlers.get(category)
    }

    pub fn handler_lists(&self) -> &HandlerLists {
        &self.handlers
    }

    pub fn fallback(&self, category: HandlerCategory) -> Option<&Rule> {
        self.fallbacks.get(&category)
    }

    pub fn fallbacks(&self) -> &FallbackMap {
        &self.fallbacks
    }

    pub fn stack_item(&self, kind: &str) -> Option<&Rule> {
        self.stack_items.get(kind)
    }

    pub fn stack_items(&self) -> &RuleMap {
        &self.stack_items
    }

    pub fn tag(&self, scheme: &str) -> Option<&Rule> {
        self.tags.get(scheme)
    }

    pub fn tags(&self) -> &RuleMap {
        &self.tags
    }

    pub fn node_factory(&self, kind: &str) -> Option<&Rule> {
        self.nodes.get(kind)
    }

    pub fn node_factories(&self) -> &RuleMap {
        &self.nodes
    }

    pub fn options(&self) -> &OptionTree {
        &self.options
    }

    /// Hooks may adjust merged options before the engine sees them.
    pub fn options_mut(&mut self) -> &mut OptionTree {
        &mut self.options
    }

    pub fn preprocessors(&self) -> &[Processor] {
        &self.preprocessors
    }

    pub fn postprocessors(&self) -> &[Processor] {
        &self.postprocessors
    }

    pub fn init_chain(&self) -> &CallbackChain<InitFn> {
        &self.init_chain
    }

    pub fn ready_chain(&self) -> &CallbackChain<ReadyFn> {
        &self.ready_chain
    }

    /// Names of the appended packages, in merge order.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    pub fn contains_package(&self, name: &str) -> bool {
        self.packages.iter().any(|p| p == name)
    }

    /// Recomputes the flattened handler lookup from the current lists.
    pub fn rebuild_index(&mut self) {
        self.index = HandlerIndex::build(&self.handlers);
    }

    pub fn index(&self) -> &HandlerIndex {
        &self.index
    }

    /// Finds the handler for `token`: the first map claiming it, else the
    /// category fallback.
    pub fn resolve<L>(&self, category: HandlerCategory, token: &str, maps: &L) -> Resolution<'_>
    where
        L: HandlerMapLookup + ?Sized,
    {
        self.index.resolve(category, token, maps, &self.fallbacks)
    }

    /// Runs the init chain against this configuration.
    ///
    /// Hooks appended while the chain runs are queued for later passes only.
    pub fn run_init(&mut self) -> Flow {
        let chain = self.init_chain.clone();
        chain.execute(|hook| hook(&mut *self))
    }

    /// Runs the ready chain against this configuration and `engine`.
    pub fn run_ready(&mut self, engine: &mut dyn HostEngine) -> Flow {
        let chain = self.ready_chain.clone();
        chain.execute(|hook| hook.call(&mut *self, &mut *engine))
    }

    pub fn summary(&self) -> ConfigurationSummary {
        ConfigurationSummary::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigurationEntry;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn macro_entry(name: &str, map: &str) -> ConfigurationEntry {
        ConfigurationEntry::builder(name)
            .handlers(HandlerCategory::Macro, [map])
            .build()
            .unwrap()
    }

    #[test]
    fn later_packages_shadow_earlier_handlers() {
        let mut active = ActiveConfiguration::new();
        active.append(&macro_entry("e1", "a"));
        active.append(&macro_entry("e2", "b"));
        assert_eq!(active.handlers(HandlerCategory::Macro), ["b", "a"]);
        assert_eq!(active.packages(), ["e1", "e2"]);
    }

    #[test]
    fn stack_items_take_the_last_definition() {
        let first = Rule::named("e1.Foo");
        let second = Rule::named("e2.Foo");
        let mut active = ActiveConfiguration::new();
        for (name, rule) in [("e1", &first), ("e2", &second)] {
            let entry = ConfigurationEntry::builder(name)
                .stack_item("foo", rule.clone())
                .build()
                .unwrap();
            active.append(&entry);
        }
        assert!(active.stack_item("foo").unwrap().same_as(&second));
    }

    #[test]
    fn option_defaults_keep_first_declaration() {
        let mut active = ActiveConfiguration::new();
        for (name, value) in [("e1", 1), ("e2", 2)] {
            let entry = ConfigurationEntry::builder(name).option("x", value).build().unwrap();
            active.append(&entry);
        }
        assert_eq!(active.options().get("x"), Some(&json!(1)));
    }

    #[test]
    fn init_hooks_run_in_priority_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut active = ActiveConfiguration::new();
        for (name, priority) in [("late", 20), ("early", 1)] {
            let log = Arc::clone(&order);
            let entry = ConfigurationEntry::builder(name)
                .init_at(
                    move |_config: &mut ActiveConfiguration| log.lock().unwrap().push(name),
                    priority,
                )
                .build()
                .unwrap();
            active.append(&entry);
        }
        assert_eq!(active.run_init(), Flow::Continue);
        assert_eq!(*order.lock().unwrap(), ["early", "late"]);
    }

    #[test]
    fn hooks_appended_during_init_wait_for_the_next_pass() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let outer = ConfigurationEntry::builder("outer")
            .init(move |config: &mut ActiveConfiguration| {
                let counter = Arc::clone(&counter);
                let inner = ConfigurationEntry::local()
                    .init(move |_c: &mut ActiveConfiguration| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .build()
                    .unwrap();
                config.append(&inner);
            })
            .build()
            .unwrap();
        let mut active = ActiveConfiguration::new();
        active.append(&outer);
        active.run_init();
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(active.init_chain().len(), 2);
    }

    #[test]
    fn index_is_stale_until_rebuilt() {
        let mut active = ActiveConfiguration::new();
        active.append(&macro_entry("base", "macros"));
        assert!(active.index().maps(HandlerCategory::Macro).is_empty());
        active.rebuild_index();
        assert_eq!(active.index().maps(HandlerCategory::Macro), ["macros"]);
    }
}
