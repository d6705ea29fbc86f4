//! # Priority-ordered containers
//!
//! Package contributions are combined deterministically by priority. Lower
//! priorities order (and run) first; items sharing a priority keep the order in
//! which they were inserted.
//!
//! - [`PriorityList`]: the sorted container.
//! - [`CallbackChain`]: a priority list of callables with early exit.

pub mod chain;

pub use chain::{CallbackChain, Flow};

/// Numeric priority. Lower values come first.
pub type Priority = i32;

/// Priority used whenever a caller does not supply one.
pub const DEFAULT_PRIORITY: Priority = 5;

/// An item stored in a [`PriorityList`] together with its priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityItem<T> {
    pub item: T,
    pub priority: Priority,
}

/// A list kept sorted by ascending priority, stable for equal priorities.
///
/// # Example
/// ```rust
/// use texpack::priority::PriorityList;
/// let mut list = PriorityList::new();
/// list.insert("late", 10);
/// list.insert("early", 1);
/// list.insert("also-late", 10);
/// let order: Vec<_> = list.iter().copied().collect();
/// assert_eq!(order, ["early", "late", "also-late"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityList<T> {
    items: Vec<PriorityItem<T>>,
}

impl<T> Default for PriorityList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> PriorityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item` after every item whose priority is less than or equal to
    /// `priority`.
    pub fn insert(&mut self, item: T, priority: Priority) {
        let at = self.items.partition_point(|existing| existing.priority <= priority);
        self.items.insert(at, PriorityItem { item, priority });
    }

    /// Inserts `item` at [`DEFAULT_PRIORITY`].
    pub fn push(&mut self, item: T) {
        self.insert(item, DEFAULT_PRIORITY);
    }

    /// Items in priority order. Each call starts a fresh pass.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().map(|entry| &entry.item)
    }

    /// Items in priority order, paired with their priorities.
    pub fn entries(&self) -> std::slice::Iter<'_, PriorityItem<T>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> FromIterator<(T, Priority)> for PriorityList<T> {
    fn from_iter<I: IntoIterator<Item = (T, Priority)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (item, priority) in iter {
            list.insert(item, priority);
        }
        list
    }
}

impl<T> IntoIterator for PriorityList<T> {
    type Item = T;
    type IntoIter = std::iter::Map<std::vec::IntoIter<PriorityItem<T>>, fn(PriorityItem<T>) -> T>;

    fn into_iter(self) -> Self::IntoIter {
        let unwrap: fn(PriorityItem<T>) -> T = |entry| entry.item;
        self.items.into_iter().map(unwrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_ascending_priority() {
        let list: PriorityList<_> = [("c", 30), ("a", 10), ("b", 20)].into_iter().collect();
        let order: Vec<_> = list.iter().copied().collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn equal_priorities_keep_insertion_order() {
        let mut list = PriorityList::new();
        list.insert("first", 5);
        list.insert("before", 1);
        list.insert("second", 5);
        list.push("third");
        let order: Vec<_> = list.iter().copied().collect();
        assert_eq!(order, ["before", "first", "second", "third"]);
    }

    #[test]
    fn iteration_is_restartable() {
        let list: PriorityList<_> = [(1, 2), (2, 1)].into_iter().collect();
        let once: Vec<_> = list.iter().collect();
        let twice: Vec<_> = list.iter().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn negative_priorities_sort_first() {
        let mut list = PriorityList::new();
        list.push("default");
        list.insert("local", -1);
        assert_eq!(list.entries().next().map(|e| e.priority), Some(-1));
        assert_eq!(list.into_iter().collect::<Vec<_>>(), ["local", "default"]);
    }
}
