//! Handler categories and the per-category lists of handler-map names.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of token classes the parser dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerCategory {
    Character,
    Delimiter,
    Macro,
    Environment,
}

impl HandlerCategory {
    /// Every category, in declaration order.
    pub const ALL: [HandlerCategory; 4] = [
        HandlerCategory::Character,
        HandlerCategory::Delimiter,
        HandlerCategory::Macro,
        HandlerCategory::Environment,
    ];

    pub const fn index(self) -> usize {
        match self {
            HandlerCategory::Character => 0,
            HandlerCategory::Delimiter => 1,
            HandlerCategory::Macro => 2,
            HandlerCategory::Environment => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            HandlerCategory::Character => "character",
            HandlerCategory::Delimiter => "delimiter",
            HandlerCategory::Macro => "macro",
            HandlerCategory::Environment => "environment",
        }
    }
}

impl fmt::Display for HandlerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlerCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandlerCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("unknown handler category '{s}'"))
    }
}

/// Ordered handler-map names for each [`HandlerCategory`].
///
/// All four categories are always present; an unset category is an empty
/// list. Earlier names take precedence during lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerLists {
    lists: [Vec<String>; 4],
}

impl HandlerLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: HandlerCategory) -> &[String] {
        &self.lists[category.index()]
    }

    pub(crate) fn get_mut(&mut self, category: HandlerCategory) -> &mut Vec<String> {
        &mut self.lists[category.index()]
    }

    /// Appends names to a category, keeping their relative order.
    pub fn extend<I, S>(&mut self, category: HandlerCategory, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.get_mut(category)
            .extend(names.into_iter().map(Into::into));
    }

    /// Categories paired with their lists, in [`HandlerCategory::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (HandlerCategory, &[String])> + '_ {
        HandlerCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    /// True when no category holds any name.
    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }
}

impl Index<HandlerCategory> for HandlerLists {
    type Output = [String];

    fn index(&self, category: HandlerCategory) -> &Self::Output {
        self.get(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_starts_empty() {
        let lists = HandlerLists::new();
        assert!(lists.is_empty());
        assert_eq!(lists.iter().count(), 4);
        assert!(lists[HandlerCategory::Macro].is_empty());
    }

    #[test]
    fn extend_preserves_order() {
        let mut lists = HandlerLists::new();
        lists.extend(HandlerCategory::Macro, ["macros", "mathchar0mi"]);
        lists.extend(HandlerCategory::Macro, ["mathchar7"]);
        assert_eq!(
            lists.get(HandlerCategory::Macro),
            ["macros", "mathchar0mi", "mathchar7"]
        );
    }

    #[test]
    fn categories_parse_from_names() {
        assert_eq!("environment".parse::<HandlerCategory>(), Ok(HandlerCategory::Environment));
        assert!("token".parse::<HandlerCategory>().is_err());
    }
}
