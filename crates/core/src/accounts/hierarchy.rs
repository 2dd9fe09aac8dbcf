//! Parent/child hierarchies and cascading selection.
//!
//! A [`Hierarchy`] maps each parent key to its children in insertion order.
//! [`CascadeSelection`] walks it one level at a time: picking a value at
//! level `n` clears every level below `n`, so a stale child never survives
//! a change of parent.

use std::collections::HashMap;
use std::hash::Hash;

use super::error::AccountError;

/// Tree of values keyed by `K`; top-level items have no parent.
#[derive(Debug, Clone)]
pub struct Hierarchy<K, V> {
    items: HashMap<K, (Option<K>, V)>,
    roots: Vec<K>,
    children: HashMap<K, Vec<K>>,
}

impl<K, V> Default for Hierarchy<K, V> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            roots: Vec::new(),
            children: HashMap::new(),
        }
    }
}

impl<K, V> Hierarchy<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` under `parent`. Re-inserting a key replaces its value
    /// but keeps its original position.
    pub fn insert(&mut self, key: K, parent: Option<K>, value: V) {
        if let Some(existing) = self.items.get_mut(&key) {
            existing.1 = value;
            return;
        }
        match &parent {
            Some(p) => self.children.entry(p.clone()).or_default().push(key.clone()),
            None => self.roots.push(key.clone()),
        }
        self.items.insert(key, (parent, value));
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.items.get(key).map(|(_, value)| value)
    }

    /// Parent of `key`, `None` for roots and unknown keys.
    #[must_use]
    pub fn parent_of(&self, key: &K) -> Option<&K> {
        self.items.get(key).and_then(|(parent, _)| parent.as_ref())
    }

    /// Top-level keys.
    #[must_use]
    pub fn roots(&self) -> &[K] {
        &self.roots
    }

    /// Direct children of `parent`; an empty slice for leaves.
    #[must_use]
    pub fn children(&self, parent: &K) -> &[K] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Options available under an optional parent: roots for `None`.
    #[must_use]
    pub fn options(&self, parent: Option<&K>) -> &[K] {
        parent.map_or(self.roots.as_slice(), |p| self.children(p))
    }

    /// Keys from the root down to `key`, inclusive.
    #[must_use]
    pub fn path(&self, key: &K) -> Vec<K> {
        let mut path = Vec::new();
        let mut current = self.items.contains_key(key).then(|| key.clone());
        while let Some(k) = current {
            current = self.parent_of(&k).cloned();
            path.push(k);
        }
        path.reverse();
        path
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K, V> FromIterator<(K, Option<K>, V)> for Hierarchy<K, V>
where
    K: Clone + Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<K>, V)>>(iter: I) -> Self {
        let mut hierarchy = Self::new();
        for (key, parent, value) in iter {
            hierarchy.insert(key, parent, value);
        }
        hierarchy
    }
}

/// Selected key per level of a cascading select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeSelection<K> {
    levels: Vec<Option<K>>,
}

impl<K> CascadeSelection<K>
where
    K: Clone + Eq + Hash,
{
    /// An empty selection with `depth` levels.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            levels: vec![None; depth],
        }
    }

    /// Number of levels.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Key selected at `level`.
    #[must_use]
    pub fn selected(&self, level: usize) -> Option<&K> {
        self.levels.get(level).and_then(Option::as_ref)
    }

    /// Deepest selected key.
    #[must_use]
    pub fn leaf(&self) -> Option<&K> {
        self.levels.iter().rev().find_map(Option::as_ref)
    }

    /// Options offered at `level`: roots for level 0, otherwise the children
    /// of the level above, or nothing while the level above is unset.
    #[must_use]
    pub fn options<'h, V>(&self, hierarchy: &'h Hierarchy<K, V>, level: usize) -> &'h [K] {
        if level == 0 {
            return hierarchy.roots();
        }
        match self.selected(level - 1) {
            Some(parent) => hierarchy.children(parent),
            None => &[],
        }
    }

    /// Selects `key` at `level` and clears every level below.
    ///
    /// # Errors
    ///
    /// `LevelOutOfRange`, or `InvalidSelection` when `key` is not among the
    /// options for the level. The selection is unchanged on error.
    pub fn select<V>(
        &mut self,
        hierarchy: &Hierarchy<K, V>,
        level: usize,
        key: K,
    ) -> Result<(), AccountError> {
        self.check_level(level)?;
        if !self.options(hierarchy, level).contains(&key) {
            return Err(AccountError::InvalidSelection { level });
        }
        self.levels[level] = Some(key);
        self.clear_below(level);
        Ok(())
    }

    /// Clears `level` and every level below.
    ///
    /// # Errors
    ///
    /// `LevelOutOfRange` for a level beyond the depth.
    pub fn clear(&mut self, level: usize) -> Result<(), AccountError> {
        self.check_level(level)?;
        self.levels[level] = None;
        self.clear_below(level);
        Ok(())
    }

    fn clear_below(&mut self, level: usize) {
        for slot in self.levels.iter_mut().skip(level + 1) {
            *slot = None;
        }
    }

    fn check_level(&self, level: usize) -> Result<(), AccountError> {
        if level >= self.levels.len() {
            return Err(AccountError::LevelOutOfRange {
                level,
                depth: self.levels.len(),
            });
        }
        Ok(())
    }
}
