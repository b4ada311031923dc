//! Utility functions and traits shared by every `KeyedContainer`

use crate::KeyedContainer;

/// Extension trait for container implementations that provides additional utility methods
pub trait ContainerExtensions<K, V> {
    /// Returns the keys of the container as a Vec, in enumeration order
    fn keys(&self) -> Vec<K>;

    /// Returns the values of the container as a Vec, in enumeration order
    fn values(&self) -> Vec<V>;

    /// Returns true if the container contains the given key
    fn contains_key(&self, key: &K) -> bool;

    /// Live entries per slot (or per bucket); 0 before any storage is allocated
    fn load_factor(&self) -> f64;
}

impl<K, V, C> ContainerExtensions<K, V> for C
where
    C: KeyedContainer<K, V>,
    K: Clone,
    V: Clone,
{
    fn keys(&self) -> Vec<K> {
        self.begin().map(|(k, _)| k.clone()).collect()
    }

    fn values(&self) -> Vec<V> {
        self.begin().map(|(_, v)| v.clone()).collect()
    }

    fn contains_key(&self, key: &K) -> bool {
        self.find(key) != self.end()
    }

    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    fn load_factor(&self) -> f64 {
        if self.capacity() == 0 {
            return 0.0;
        }
        self.len() as f64 / self.capacity() as f64
    }
}

/// Creates any container from an iterator of key-value pairs.
///
/// Later pairs overwrite earlier ones with the same key.
pub fn collect_into<C, K, V, I>(iter: I) -> C
where
    C: KeyedContainer<K, V> + Default,
    I: IntoIterator<Item = (K, V)>,
{
    let iter = iter.into_iter();
    let mut container = C::default();
    container.reserve(iter.size_hint().0);

    for (key, value) in iter {
        container.insert(key, value);
    }

    container
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildIdentityHasher, ChainingMap, ProbingMap};

    #[test]
    fn test_collect_into() {
        let data = vec![("a".to_string(), 1), ("b".to_string(), 2), ("c".to_string(), 3)];

        let map: ProbingMap<String, i32> = collect_into(data.clone());
        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.get("b"), Some(&2));
        assert_eq!(map.get("c"), Some(&3));
        assert_eq!(map.len(), 3);

        let map: ChainingMap<String, i32> = collect_into(data);
        assert_eq!(map.get("c"), Some(&3));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_collect_into_keeps_last_value() {
        let map: ChainingMap<i32, &str> = collect_into([(1, "first"), (1, "second")]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"second"));
    }

    #[test]
    fn test_keys_and_values() {
        let mut map = ProbingMap::new();
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);
        map.insert("c".to_string(), 3);

        let mut keys = map.keys();
        keys.sort(); // Sort for predictable comparison

        let mut values = map.values();
        values.sort_unstable();

        assert_eq!(keys, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_keys_follow_enumeration_order() {
        let mut map = ChainingMap::with_hasher(BuildIdentityHasher);
        map.insert(2_usize, 'b');
        map.insert(0, 'a');

        assert_eq!(map.keys(), vec![0, 2]);
        assert_eq!(map.values(), vec!['a', 'b']);
    }

    #[test]
    fn test_contains_key() {
        let mut map = ChainingMap::new();
        map.insert(1, 10);

        assert!(ContainerExtensions::contains_key(&map, &1));
        assert!(!ContainerExtensions::contains_key(&map, &2));
    }

    #[test]
    fn test_load_factor() {
        let mut map = ProbingMap::with_hasher(BuildIdentityHasher);
        assert!(map.load_factor().abs() < f64::EPSILON);

        map.insert(0_usize, ());
        assert_eq!(map.capacity(), 4);
        assert!((map.load_factor() - 0.25).abs() < f64::EPSILON);
    }
}
