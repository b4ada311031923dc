//! The contract shared by both map engines.

/// A key-value container with upsert semantics and cursor-based enumeration.
///
/// Cursors returned by [`find`](KeyedContainer::find), [`begin`](KeyedContainer::begin) and
/// [`end`](KeyedContainer::end) borrow the container immutably, so they are invalidated by
/// (and cannot coexist with) any later `insert`, `remove` or `reserve` on the same container.
pub trait KeyedContainer<K, V> {
    /// Read-only position inside the container.
    ///
    /// Iterating a cursor yields the entry it points at and then every live entry after it.
    type Cursor<'a>: Iterator<Item = (&'a K, &'a V)> + Clone + PartialEq
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    /// Inserts `value` under `key`, returning the value it replaced, if any.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Returns a cursor at the entry for `key`, or [`end`](KeyedContainer::end) if absent.
    fn find(&self, key: &K) -> Self::Cursor<'_>;

    /// Removes `key`, handing its value back to the caller.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Number of live entries.
    fn len(&self) -> usize;

    /// Grows storage so that `target` entries fit without another resize.
    fn reserve(&mut self, target: usize);

    /// Slot count (open addressing) or bucket count (chaining).
    fn capacity(&self) -> usize;

    /// Number of stored entries a lookup of `key` inspects.
    fn probe_length(&self, key: &K) -> usize;

    /// Cursor at the first live entry, equal to [`end`](KeyedContainer::end) when empty.
    fn begin(&self) -> Self::Cursor<'_>;

    /// Past-the-end cursor.
    fn end(&self) -> Self::Cursor<'_>;

    /// Returns true if the container holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value stored under `key`.
    fn get<'a>(&'a self, key: &K) -> Option<&'a V>
    where
        K: 'a,
        V: 'a,
    {
        self.find(key).next().map(|(_, value)| value)
    }

    /// Eager snapshot of all live entries in enumeration order.
    fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.begin().map(|(key, value)| (key.clone(), value.clone())).collect()
    }
}
