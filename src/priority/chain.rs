//! Priority-ordered callback chains.
//!
//! A [`CallbackChain`] stores shared callables in a [`PriorityList`] and runs
//! them in order. Callables report a [`Flow`]; [`Flow::Stop`] ends the pass so
//! a later-registered hook can suppress default behavior that would otherwise
//! follow it.
//!
//! The chain is generic over the callable type `F` (usually a `dyn Fn(..)`
//! object). How arguments reach each callable is decided by the invoker passed
//! to [`CallbackChain::execute`], which lets a callable declare that it
//! consumes only a prefix of the arguments (see
//! [`ReadyFn`](crate::config::ReadyFn)).

use std::fmt;
use std::sync::Arc;

use super::{Priority, PriorityList, DEFAULT_PRIORITY};

/// Outcome of a single callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flow {
    /// Keep running the remaining callbacks.
    #[default]
    Continue,
    /// Skip every callback after this one.
    Stop,
}

impl From<()> for Flow {
    fn from(_: ()) -> Self {
        Flow::Continue
    }
}

impl From<bool> for Flow {
    /// `true` continues, `false` stops.
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Flow::Continue
        } else {
            Flow::Stop
        }
    }
}

/// Ordered list of shared callables.
pub struct CallbackChain<F: ?Sized> {
    callbacks: PriorityList<Arc<F>>,
}

impl<F: ?Sized> Default for CallbackChain<F> {
    fn default() -> Self {
        Self {
            callbacks: PriorityList::new(),
        }
    }
}

impl<F: ?Sized> Clone for CallbackChain<F> {
    fn clone(&self) -> Self {
        Self {
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<F: ?Sized> fmt::Debug for CallbackChain<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let priorities: Vec<Priority> = self.callbacks.entries().map(|e| e.priority).collect();
        f.debug_struct("CallbackChain")
            .field("priorities", &priorities)
            .finish()
    }
}

impl<F: ?Sized> CallbackChain<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a callable at the given priority.
    pub fn add(&mut self, callback: Arc<F>, priority: Priority) {
        self.callbacks.insert(callback, priority);
    }

    /// Adds a callable at [`DEFAULT_PRIORITY`].
    pub fn push(&mut self, callback: Arc<F>) {
        self.add(callback, DEFAULT_PRIORITY);
    }

    /// Runs `invoke` on every callable in priority order.
    ///
    /// Returns [`Flow::Stop`] if some callable stopped the pass, otherwise
    /// [`Flow::Continue`].
    pub fn execute<R>(&self, mut invoke: impl FnMut(&F) -> R) -> Flow
    where
        R: Into<Flow>,
    {
        for (position, entry) in self.callbacks.entries().enumerate() {
            if invoke(entry.item.as_ref()).into() == Flow::Stop {
                tracing::debug!(
                    position,
                    priority = entry.priority,
                    remaining = self.callbacks.len() - position - 1,
                    "callback chain stopped early"
                );
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Callables with their priorities, in execution order.
    pub fn entries(&self) -> impl Iterator<Item = (&Arc<F>, Priority)> + '_ {
        self.callbacks.entries().map(|e| (&e.item, e.priority))
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
