//! Opaque construction rules.
//!
//! Fallback behaviors, stack-item classes, tagging schemes and node factories
//! are defined by the parsing and tree-building subsystems, not here. A package
//! hands them over as [`Rule`]s: a label for inspection plus a type-erased
//! payload that the consuming subsystem downcasts.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Map from a kind or scheme name to its rule.
pub type RuleMap = im::OrdMap<String, Rule>;

#[derive(Clone)]
pub struct Rule {
    label: Arc<str>,
    value: Arc<dyn Any + Send + Sync>,
}

impl Rule {
    pub fn new<T>(label: impl Into<Arc<str>>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            label: label.into(),
            value: Arc::new(value),
        }
    }

    /// A rule that carries only its label.
    pub fn named(label: impl Into<Arc<str>>) -> Self {
        Self::new(label, ())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The payload, if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// True when both rules share the same payload allocation.
    pub fn same_as(&self, other: &Rule) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rule").field(&self.label).finish()
    }
}
