//! Flattened handler lookup.
//!
//! The merged handler lists may name the same map more than once (two
//! packages contributing the same map, or one package appended twice through a
//! local entry). [`HandlerIndex`] caches each category's list with only the
//! first occurrence of every name, which is what token lookup walks. It is
//! derived state: rebuild it whenever the handler lists change.
//!
//! The maps themselves live outside this crate. Resolution asks a
//! [`HandlerMapLookup`] whether a named map claims a token.

use crate::config::{FallbackMap, HandlerCategory, HandlerLists, Rule};

/// Answers whether a named handler map handles a token.
pub trait HandlerMapLookup {
    fn claims(&self, map: &str, token: &str) -> bool;
}

impl<F> HandlerMapLookup for F
where
    F: Fn(&str, &str) -> bool,
{
    fn claims(&self, map: &str, token: &str) -> bool {
        self(map, token)
    }
}

/// A simple in-memory set of handler maps, keyed by map name.
#[derive(Debug, Clone, Default)]
pub struct HandlerMaps {
    maps: im::HashMap<String, im::HashSet<String>>,
}

impl HandlerMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines (or extends) the map `name` with the given tokens.
    pub fn define<I, S>(&mut self, name: impl Into<String>, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = self.maps.entry(name.into()).or_insert_with(im::HashSet::new);
        set.extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, map: &str) -> bool {
        self.maps.contains_key(map)
    }
}

impl HandlerMapLookup for HandlerMaps {
    fn claims(&self, map: &str, token: &str) -> bool {
        self.maps.get(map).is_some_and(|tokens| tokens.contains(token))
    }
}

/// Outcome of looking a token up.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    /// The first map, in precedence order, that claims the token.
    Map(&'a str),
    /// No map claimed it; the category's fallback applies.
    Fallback(&'a Rule),
    /// No map claimed it and the category has no fallback.
    Unhandled,
}

impl Resolution<'_> {
    pub fn map_name(&self) -> Option<&str> {
        match self {
            Resolution::Map(name) => Some(*name),
            _ => None,
        }
    }

    pub fn is_handled(&self) -> bool {
        !matches!(self, Resolution::Unhandled)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerIndex {
    lists: [Vec<String>; 4],
}

impl HandlerIndex {
    /// Flattens `handlers`, keeping the first occurrence of each map name.
    pub fn build(handlers: &HandlerLists) -> Self {
        let mut index = Self::default();
        for (category, names) in handlers.iter() {
            let mut seen = std::collections::HashSet::new();
            index.lists[category.index()] = names
                .iter()
                .filter(|name| seen.insert(name.as_str()))
                .cloned()
                .collect();
        }
        index
    }

    /// Map names for `category`, in lookup order.
    pub fn maps(&self, category: HandlerCategory) -> &[String] {
        &self.lists[category.index()]
    }

    pub fn resolve<'a, L>(
        &'a self,
        category: HandlerCategory,
        token: &str,
        maps: &L,
        fallbacks: &'a FallbackMap,
    ) -> Resolution<'a>
    where
        L: HandlerMapLookup + ?Sized,
    {
        if let Some(name) = self
            .maps(category)
            .iter()
            .find(|name| maps.claims(name, token))
        {
            return Resolution::Map(name);
        }
        match fallbacks.get(&category) {
            Some(rule) => Resolution::Fallback(rule),
            None => Resolution::Unhandled,
        }
    }
}
