//! Callables contributed by packages.
//!
//! ## Shapes
//!
//! - [`InitFn`]: runs before any parsing, against the active configuration.
//! - [`ReadyFn`]: runs once the host engine exists. Tagged by how many leading
//!   arguments it consumes: the configuration alone, or the configuration and
//!   the engine.
//! - [`FilterFn`]: a pre- or post-processing step installed into the host
//!   engine's filter chains.
//!
//! Shapes are resolved once, when a package is built. A hook always carries an
//! explicit priority ([`Hook`]); a processor is either [`Processor::Plain`] or
//! [`Processor::Prioritized`].

use std::fmt;
use std::sync::Arc;

use crate::engine::{FilterData, HostEngine};
use crate::priority::{Flow, Priority, DEFAULT_PRIORITY};
use crate::runtime::ActiveConfiguration;

pub type InitFn = dyn Fn(&mut ActiveConfiguration) -> Flow + Send + Sync;

pub type EngineFn = dyn Fn(&mut ActiveConfiguration, &mut dyn HostEngine) -> Flow + Send + Sync;

pub type FilterFn = dyn Fn(&mut FilterData) -> Flow + Send + Sync;

/// A ready hook, tagged with the arguments it consumes.
pub enum ReadyFn {
    /// Consumes the configuration only.
    Configuration(Box<InitFn>),
    /// Consumes the configuration and the host engine.
    Engine(Box<EngineFn>),
}

impl ReadyFn {
    /// Number of leading arguments forwarded to the callable.
    pub const fn consumed_args(&self) -> usize {
        match self {
            ReadyFn::Configuration(_) => 1,
            ReadyFn::Engine(_) => 2,
        }
    }

    pub fn call(&self, config: &mut ActiveConfiguration, engine: &mut dyn HostEngine) -> Flow {
        match self {
            ReadyFn::Configuration(hook) => hook(config),
            ReadyFn::Engine(hook) => hook(config, engine),
        }
    }
}

impl fmt::Debug for ReadyFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadyFn::Configuration(_) => f.write_str("ReadyFn::Configuration(..)"),
            ReadyFn::Engine(_) => f.write_str("ReadyFn::Engine(..)"),
        }
    }
}

/// A callable paired with the priority it runs at.
pub struct Hook<F: ?Sized> {
    pub callable: Arc<F>,
    pub priority: Priority,
}

impl<F: ?Sized> Hook<F> {
    pub fn new(callable: Arc<F>, priority: Priority) -> Self {
        Self { callable, priority }
    }
}

impl<F: ?Sized> Clone for Hook<F> {
    fn clone(&self) -> Self {
        Self {
            callable: Arc::clone(&self.callable),
            priority: self.priority,
        }
    }
}

impl<F: ?Sized> fmt::Debug for Hook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// A pre- or post-processing step.
#[derive(Clone)]
pub enum Processor {
    /// Installed at the filter chain's default priority, in merge order.
    Plain(Arc<FilterFn>),
    /// Installed at an explicit priority.
    Prioritized(Arc<FilterFn>, Priority),
}

impl Processor {
    pub fn callable(&self) -> &Arc<FilterFn> {
        match self {
            Processor::Plain(filter) | Processor::Prioritized(filter, _) => filter,
        }
    }

    /// The explicit priority, if one was given.
    pub fn priority(&self) -> Option<Priority> {
        match self {
            Processor::Plain(_) => None,
            Processor::Prioritized(_, priority) => Some(*priority),
        }
    }

    /// Priority used when installing into a host filter chain.
    pub fn install_priority(&self) -> Priority {
        self.priority().unwrap_or(DEFAULT_PRIORITY)
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Processor::Plain(_) => f.write_str("Processor::Plain(..)"),
            Processor::Prioritized(_, priority) => write!(f, "Processor::Prioritized(.., {priority})"),
        }
    }
}

/// Wraps a closure as an [`InitFn`].
pub fn init_fn<R, F>(hook: F) -> Arc<InitFn>
where
    R: Into<Flow>,
    F: Fn(&mut ActiveConfiguration) -> R + Send + Sync + 'static,
{
    Arc::new(move |config: &mut ActiveConfiguration| hook(config).into())
}

/// Wraps a closure as a [`FilterFn`].
pub fn filter_fn<R, F>(filter: F) -> Arc<FilterFn>
where
    R: Into<Flow>,
    F: Fn(&mut FilterData) -> R + Send + Sync + 'static,
{
    Arc::new(move |data: &mut FilterData| filter(data).into())
}

/// Wraps a configuration-only closure as a [`ReadyFn`].
pub fn ready_fn<R, F>(hook: F) -> ReadyFn
where
    R: Into<Flow>,
    F: Fn(&mut ActiveConfiguration) -> R + Send + Sync + 'static,
{
    ReadyFn::Configuration(Box::new(move |config: &mut ActiveConfiguration| {
        hook(config).into()
    }))
}

/// Wraps a closure that also needs the host engine as a [`ReadyFn`].
pub fn ready_engine_fn<R, F>(hook: F) -> ReadyFn
where
    R: Into<Flow>,
    F: Fn(&mut ActiveConfiguration, &mut dyn HostEngine) -> R + Send + Sync + 'static,
{
    ReadyFn::Engine(Box::new(
        move |config: &mut ActiveConfiguration, engine: &mut dyn HostEngine| {
            hook(config, engine).into()
        },
    ))
}
