//! Named package registry.
//!
//! Stores package definitions by name. Names are case-sensitive and must not
//! be empty. Registering under an existing name silently replaces the earlier
//! definition; nothing is merged at registration time.
//!
//! # Sharing
//! Entries are held behind `Arc`, so a parser built from an earlier
//! definition keeps what it merged even after the name is re-registered. The
//! registry itself is a persistent map: cloning it is cheap and yields an
//! independent snapshot.
//!
//! # Summary Table
//! | Method   | Overwrites | Validates          | Notes                              |
//! |----------|------------|--------------------|------------------------------------|
//! | register | Yes        | non-empty name     | stores under an explicit name      |
//! | add      | Yes        | non-empty name     | stores under the entry's own name  |
//! | define   | Yes        | whole entry        | builds, then adds                  |
//! | lookup   | N/A        | N/A                | case-sensitive                     |

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::entry::{ConfigurationEntry, EntryBuilder};
use crate::errors::{require_name, ConfigResult};

#[derive(Debug, Clone, Default)]
pub struct ConfigurationRegistry {
    entries: im::HashMap<String, Arc<ConfigurationEntry>>,
}

impl ConfigurationRegistry {
    /// Creates a new, empty registry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use texpack::config::ConfigurationRegistry;
    /// let registry = ConfigurationRegistry::new();
    /// assert!(registry.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `entry` under `name`.
    ///
    /// # Returns
    /// The entry previously registered under `name`, if any.
    ///
    /// # Errors
    /// Returns [`EmptyName`](crate::errors::ConfigError::EmptyName) if `name`
    /// is blank.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        entry: impl Into<Arc<ConfigurationEntry>>,
    ) -> ConfigResult<Option<Arc<ConfigurationEntry>>> {
        let name = name.into();
        require_name(&name, "registry")?;
        let replaced = self.entries.insert(name.clone(), entry.into());
        if replaced.is_some() {
            tracing::debug!(package = %name, "replaced registered package");
        }
        Ok(replaced)
    }

    /// Stores `entry` under its own name.
    pub fn add(
        &mut self,
        entry: impl Into<Arc<ConfigurationEntry>>,
    ) -> ConfigResult<Option<Arc<ConfigurationEntry>>> {
        let entry = entry.into();
        let name = entry.name().to_string();
        self.register(name, entry)
    }

    /// Builds a package definition and adds it.
    ///
    /// # Example
    /// ```rust
    /// use texpack::config::{ConfigurationEntry, ConfigurationRegistry};
    /// let mut registry = ConfigurationRegistry::new();
    /// registry
    ///     .define(ConfigurationEntry::builder("color").option("padding", "5px"))
    ///     .unwrap();
    /// assert!(registry.contains("color"));
    /// ```
    pub fn define(&mut self, builder: EntryBuilder) -> ConfigResult<Arc<ConfigurationEntry>> {
        let entry = Arc::new(builder.build()?);
        self.add(Arc::clone(&entry))?;
        Ok(entry)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ConfigurationEntry>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Every registered name.
    pub fn names(&self) -> BTreeSet<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Registered entries, in name order.
    pub fn entries(&self) -> Vec<(&str, &Arc<ConfigurationEntry>)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
