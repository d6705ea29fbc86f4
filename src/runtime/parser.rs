//! Building a parser configuration from package names.
//!
//! ## Lifecycle
//!
//! 1. [`PreparedConfiguration::new`] looks the requested packages up, orders
//!    them by priority, folds them and runs the init chain.
//! 2. [`PreparedConfiguration::configure`] takes the host engine, applies
//!    options, runs the ready chain and installs processors, yielding a
//!    [`ParserConfiguration`].
//! 3. [`ParserConfiguration::extend`] adds one more package to the running
//!    configuration.
//!
//! The ready phase needs an engine, so it only exists on the types that have
//! one.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{
    ConfigurationEntry, ConfigurationRegistry, Processor, ReadyFn, DEFAULT_PARSER,
};
use crate::engine::HostEngine;
use crate::errors::{ConfigError, ConfigResult};
use crate::options::OptionTree;
use crate::priority::{CallbackChain, Priority, PriorityList};
use crate::runtime::active::ActiveConfiguration;
use crate::runtime::summary::ConfigurationSummary;

/// A package name with an optional explicit priority.
///
/// Deserializes from either `"name"` or `{ name, priority }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRequest")]
pub struct PackageRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRequest {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        priority: Option<Priority>,
    },
}

impl From<RawRequest> for PackageRequest {
    fn from(raw: RawRequest) -> Self {
        match raw {
            RawRequest::Name(name) => Self { name, priority: None },
            RawRequest::Full { name, priority } => Self { name, priority },
        }
    }
}

impl PackageRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: None,
        }
    }

    pub fn with_priority(name: impl Into<String>, priority: Priority) -> Self {
        Self {
            name: name.into(),
            priority: Some(priority),
        }
    }
}

impl From<&str> for PackageRequest {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PackageRequest {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<(&str, Priority)> for PackageRequest {
    fn from((name, priority): (&str, Priority)) -> Self {
        Self::with_priority(name, priority)
    }
}

fn check_parser(entry: &ConfigurationEntry, parsers: &[String]) -> ConfigResult<()> {
    if parsers.iter().any(|p| p == entry.parser()) {
        return Ok(());
    }
    Err(ConfigError::WrongParser {
        name: entry.name().to_string(),
        target: entry.parser().to_string(),
        accepted: parsers.to_vec(),
    })
}

/// Ready hooks in `after` that were not already in `before`, in chain order.
fn queued_since(
    before: &CallbackChain<ReadyFn>,
    after: &CallbackChain<ReadyFn>,
) -> CallbackChain<ReadyFn> {
    let mut known: Vec<&Arc<ReadyFn>> = before.entries().map(|(hook, _)| hook).collect();
    let mut fresh = CallbackChain::new();
    for (hook, priority) in after.entries() {
        match known.iter().position(|old| Arc::ptr_eq(old, hook)) {
            Some(at) => {
                known.swap_remove(at);
            }
            None => fresh.add(Arc::clone(hook), priority),
        }
    }
    fresh
}

fn install_processors(pre: &[Processor], post: &[Processor], engine: &mut dyn HostEngine) {
    for processor in pre {
        engine
            .pre_filters()
            .add(Arc::clone(processor.callable()), processor.install_priority());
    }
    for processor in post {
        engine
            .post_filters()
            .add(Arc::clone(processor.callable()), processor.install_priority());
    }
}

/// A configuration whose init phase has run but which has no engine yet.
#[derive(Debug, Clone)]
pub struct PreparedConfiguration {
    active: ActiveConfiguration,
    parsers: Vec<String>,
}

impl PreparedConfiguration {
    /// Builds a configuration for the default parser.
    ///
    /// # Example
    /// ```rust
    /// use texpack::config::{ConfigurationEntry, ConfigurationRegistry, HandlerCategory};
    /// use texpack::runtime::PreparedConfiguration;
    /// let mut registry = ConfigurationRegistry::new();
    /// registry
    ///     .define(ConfigurationEntry::builder("base").handlers(HandlerCategory::Macro, ["macros"]))
    ///     .unwrap();
    /// let prepared = PreparedConfiguration::new(&registry, ["base", "missing"]).unwrap();
    /// assert_eq!(prepared.active().packages(), ["base"]);
    /// ```
    pub fn new<I, R>(registry: &ConfigurationRegistry, packages: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<PackageRequest>,
    {
        Self::for_parsers(registry, packages, [DEFAULT_PARSER])
    }

    /// Builds a configuration accepting packages for any of `parsers`.
    ///
    /// Unknown names and repeated requests are skipped; a request repeats when
    /// it resolves to an already selected package name, aliases included. Each found package is
    /// ordered by its explicit priority, else its own priority, with ties kept
    /// in request order. The packages are folded in that order and the init
    /// chain runs once.
    ///
    /// # Errors
    /// [`ConfigError::WrongParser`] if a found package targets a parser not in
    /// `parsers`.
    pub fn for_parsers<I, R, P, S>(
        registry: &ConfigurationRegistry,
        packages: I,
        parsers: P,
    ) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<PackageRequest>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parsers: Vec<String> = parsers.into_iter().map(Into::into).collect();
        let mut ordered = PriorityList::new();
        let mut requested = HashSet::new();
        for request in packages.into_iter().map(Into::into) {
            let Some(entry) = registry.lookup(&request.name) else {
                tracing::debug!(package = %request.name, "skipping unregistered package");
                continue;
            };
            if !requested.insert(entry.name().to_string()) {
                tracing::debug!(package = %request.name, "skipping repeated package request");
                continue;
            }
            check_parser(&entry, &parsers)?;
            let priority = request.priority.unwrap_or_else(|| entry.priority());
            ordered.insert(entry, priority);
        }

        let mut active = ActiveConfiguration::new();
        for entry in ordered {
            active.append(&entry);
        }
        active.run_init();
        active.rebuild_index();
        tracing::debug!(packages = ?active.packages(), "prepared parser configuration");
        Ok(Self { active, parsers })
    }

    pub fn active(&self) -> &ActiveConfiguration {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut ActiveConfiguration {
        &mut self.active
    }

    pub fn parsers(&self) -> &[String] {
        &self.parsers
    }

    /// Hands the configuration to the host engine.
    ///
    /// Merged option defaults are applied first so ready hooks see the final
    /// options. Then the ready chain runs and every merged processor is
    /// installed into the engine's filter chains.
    ///
    /// # Errors
    /// Whatever the engine's option step reports, typically
    /// [`ConfigError::UnknownOption`].
    pub fn configure(mut self, engine: &mut dyn HostEngine) -> ConfigResult<ParserConfiguration> {
        engine.apply_options(self.active.options(), None)?;
        self.active.run_ready(engine);
        install_processors(
            self.active.preprocessors(),
            self.active.postprocessors(),
            engine,
        );
        Ok(ParserConfiguration {
            active: self.active,
            parsers: self.parsers,
        })
    }
}

/// A configuration attached to a host engine.
#[derive(Debug, Clone)]
pub struct ParserConfiguration {
    active: ActiveConfiguration,
    parsers: Vec<String>,
}

impl ParserConfiguration {
    pub fn active(&self) -> &ActiveConfiguration {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut ActiveConfiguration {
        &mut self.active
    }

    pub fn into_active(self) -> ActiveConfiguration {
        self.active
    }

    pub fn parsers(&self) -> &[String] {
        &self.parsers
    }

    pub fn summary(&self) -> ConfigurationSummary {
        self.active.summary()
    }

    /// Adds the package `name` to the running configuration.
    ///
    /// The package is merged, then only its own init hook runs and the handler
    /// index is rebuilt. Merged options reach the engine together with
    /// `overrides`. Then the ready hooks queued by this extension run, and the
    /// processors it merged are installed, including those of local entries
    /// its init hook appended. Hooks of previously merged packages do not run
    /// again.
    ///
    /// Returns `false`, changing nothing, if the package is already merged.
    /// On error the configuration is left as it was.
    ///
    /// # Errors
    /// - [`ConfigError::UnknownPackage`] if `registry` has no such package.
    /// - [`ConfigError::WrongParser`] if it targets another parser.
    /// - Option errors reported by the engine.
    pub fn extend(
        &mut self,
        registry: &ConfigurationRegistry,
        name: &str,
        engine: &mut dyn HostEngine,
        overrides: Option<&OptionTree>,
    ) -> ConfigResult<bool> {
        let entry = registry
            .lookup(name)
            .ok_or_else(|| ConfigError::UnknownPackage {
                name: name.to_string(),
            })?;
        if self.active.contains_package(entry.name()) {
            tracing::debug!(package = name, "package already merged");
            return Ok(false);
        }
        check_parser(&entry, &self.parsers)?;

        let mut active = self.active.clone();
        let pre_start = active.preprocessors().len();
        let post_start = active.postprocessors().len();
        active.append(&entry);
        if let Some(hook) = entry.init_hook() {
            (hook.callable)(&mut active);
        }
        active.rebuild_index();

        if let Err(err) = engine.apply_options(active.options(), overrides) {
            tracing::debug!(package = name, "extension rolled back");
            return Err(err);
        }
        let ready = queued_since(self.active.ready_chain(), active.ready_chain());
        ready.execute(|hook| hook.call(&mut active, &mut *engine));
        install_processors(
            &active.preprocessors()[pre_start..],
            &active.postprocessors()[post_start..],
            engine,
        );
        self.active = active;
        tracing::info!(package = name, "extended parser configuration");
        Ok(true)
    }
}
