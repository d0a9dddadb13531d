//! Keyed prototype tables cloned into independent runtime instances.

use std::collections::BTreeMap;

/// Table of immutable templates keyed by an enumerated type.
///
/// Prototypes are never handed out mutably once registered. [`Catalog::create`]
/// yields a deep, independent clone so runtime state such as cooldown timers or
/// resolved paths is never shared between instances.
#[derive(Clone, Debug)]
pub struct Catalog<K, T> {
    entries: BTreeMap<K, T>,
}

impl<K, T> Default for Catalog<K, T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K, T> Catalog<K, T>
where
    K: Ord + Copy,
    T: Clone,
{
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a template under `key`, replacing any previous entry.
    ///
    /// Returns the template that was replaced, if any.
    pub fn register(&mut self, key: K, prototype: T) -> Option<T> {
        self.entries.insert(key, prototype)
    }

    /// Clones the template registered under `key`.
    ///
    /// An unregistered key is a lookup miss and yields `None`; callers treat
    /// it as a recoverable no-op.
    #[must_use]
    pub fn create(&self, key: K) -> Option<T> {
        self.entries.get(&key).cloned()
    }

    /// Borrows the shared template registered under `key` without cloning.
    #[must_use]
    pub fn prototype(&self, key: K) -> Option<&T> {
        self.entries.get(&key)
    }

    /// Reports whether a template is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    /// Registered keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.keys().copied()
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the catalog holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, T> FromIterator<(K, T)> for Catalog<K, T>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Catalog;

    #[derive(Clone, Debug, PartialEq)]
    struct Template {
        cooldown: Vec<u32>,
    }

    #[test]
    fn create_misses_unregistered_keys() {
        let catalog: Catalog<u8, Template> = Catalog::new();
        assert!(catalog.create(3).is_none());
        assert!(catalog.prototype(3).is_none());
    }

    #[test]
    fn register_replaces_existing_entry() {
        let mut catalog = Catalog::new();
        assert!(catalog.register(1, Template { cooldown: vec![1] }).is_none());
        let replaced = catalog.register(1, Template { cooldown: vec![2] });

        assert_eq!(replaced, Some(Template { cooldown: vec![1] }));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.create(1), Some(Template { cooldown: vec![2] }));
    }

    #[test]
    fn created_instances_do_not_alias_the_prototype() {
        let mut catalog = Catalog::new();
        let _ = catalog.register(7, Template { cooldown: vec![5] });

        let mut first = catalog.create(7).expect("registered");
        first.cooldown.push(9);
        let second = catalog.create(7).expect("registered");

        assert_eq!(second.cooldown, vec![5]);
        assert_eq!(catalog.prototype(7).map(|t| t.cooldown.len()), Some(1));
    }
}
