use std::{
    borrow::Borrow,
    hash::{BuildHasher, Hash},
    iter::{self, FusedIterator},
    mem,
};

use crate::{DefaultHashBuilder, KeyedContainer};

/// A bucket: every pair whose hash maps to the same index, in append order
type Bucket<K, V> = Vec<(K, V)>;

/// Result of scanning the bucket of a key
#[derive(Debug, Clone, Copy)]
struct Lookup {
    /// Bucket index and offset of the key, if it is present
    position: Option<(usize, usize)>,
    /// Number of pairs compared before the scan stopped
    inspected: usize,
}

/// A hash map using separate chaining.
///
/// Keys hash to one of `bucket_count` buckets, and each bucket is an ordered list scanned
/// linearly. The bucket count doubles once the load factor would pass 3/4, and every entry is
/// rehashed into the new array right away.
///
/// Equality is physical: two maps are equal when their bucket arrays match element by
/// element, so the same entries inserted in a different order may compare unequal.
///
/// Note: This implementation is not thread-safe.
#[derive(Debug, Clone)]
pub struct ChainingMap<K, V, S = DefaultHashBuilder> {
    /// The buckets storing the key-value pairs, unallocated until first needed
    buckets: Vec<Bucket<K, V>>,
    /// Current number of elements in the hash table
    size: usize,
    /// Builds the hasher applied to every key
    hash_builder: S,
}

impl<K, V> ChainingMap<K, V> {
    /// Creates an empty `ChainingMap` with the default hasher. Allocates nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V> ChainingMap<K, V>
where
    K: Eq + Hash,
{
    /// Creates a `ChainingMap` able to hold `capacity` entries without resizing
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ChainingMap<K, V, S> {
    /// Creates an empty `ChainingMap` hashing keys with `hash_builder`
    #[must_use]
    pub fn with_hasher(hash_builder: S) -> Self {
        Self { buckets: Vec::new(), size: 0, hash_builder }
    }

    /// Returns the number of elements in the map
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of buckets
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns a reference to the map's hasher builder
    #[must_use]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Cursor at the first pair of the first non-empty bucket
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, K, V> {
        Cursor::first_live_from(&self.buckets, 0)
    }

    /// Past-the-end cursor
    #[must_use]
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor { buckets: &self.buckets, bucket: self.buckets.len(), offset: 0 }
    }

    /// Returns an iterator over the entries, bucket by bucket
    #[must_use]
    pub fn iter(&self) -> Cursor<'_, K, V> {
        self.begin()
    }

    /// Eager snapshot of the entries: buckets in index order, each in append order
    #[must_use]
    pub fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.buckets.iter().flatten().cloned().collect()
    }

    /// Empties every bucket. The bucket count is kept.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.size = 0;
    }
}

impl<K, V, S> ChainingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates a `ChainingMap` with room for `capacity` entries, hashing with `hash_builder`
    #[must_use]
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let mut map = Self::with_hasher(hash_builder);
        map.reserve(capacity);
        map
    }

    /// Gets the bucket index for a key, `None` while no buckets are allocated
    #[allow(clippy::cast_possible_truncation)]
    fn bucket_index<Q: ?Sized + Hash>(&self, key: &Q) -> Option<usize> {
        let hash = self.hash_builder.hash_one(key) as usize;
        hash.checked_rem(self.buckets.len())
    }

    /// Scans the bucket of `key` for an equal key
    fn locate<Q>(&self, key: &Q) -> Lookup
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some((index, bucket)) =
            self.bucket_index(key).and_then(|index| Some((index, self.buckets.get(index)?)))
        else {
            return Lookup { position: None, inspected: 0 };
        };

        match bucket.iter().position(|(stored, _)| stored.borrow() == key) {
            Some(offset) => {
                Lookup { position: Some((index, offset)), inspected: offset.saturating_add(1) }
            }
            None => Lookup { position: None, inspected: bucket.len() },
        }
    }

    /// Insert a key-value pair, returning the value previously stored under the key
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.reserve(self.size.saturating_add(1));

        let bucket = self.bucket_index(&key).and_then(|index| self.buckets.get_mut(index))?;
        if let Some((_, current)) = bucket.iter_mut().find(|(stored, _)| *stored == key) {
            return Some(mem::replace(current, value));
        }

        bucket.push((key, value));
        self.size = self.size.saturating_add(1);
        None
    }

    /// Returns a cursor at the entry for `key`, or the end cursor if it is absent
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.locate(key).position {
            Some((bucket, offset)) => Cursor { buckets: &self.buckets, bucket, offset },
            None => self.end(),
        }
    }

    /// Retrieve a value for a given key
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (bucket, offset) = self.locate(key).position?;
        self.buckets.get(bucket)?.get(offset).map(|(_, value)| value)
    }

    /// Get a mutable reference to a value for a given key
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (bucket, offset) = self.locate(key).position?;
        self.buckets.get_mut(bucket)?.get_mut(offset).map(|(_, value)| value)
    }

    /// Returns true if the map contains the given key
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).position.is_some()
    }

    /// Removes a key-value pair, shifting the rest of its bucket down
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (bucket, offset) = self.locate(key).position?;
        let bucket = self.buckets.get_mut(bucket)?;
        if offset >= bucket.len() {
            return None;
        }

        let (_, value) = bucket.remove(offset);
        self.size = self.size.saturating_sub(1);
        Some(value)
    }

    /// Number of pairs a lookup of `key` compares
    pub fn probe_length<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).inspected
    }

    /// Doubles the bucket count until `target` entries keep the load factor at or below 3/4,
    /// then rehashes every entry.
    ///
    /// Does nothing if there are already enough buckets. Never shrinks.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn reserve(&mut self, target: usize) {
        let needed = target.saturating_add(1);
        let mut bucket_count = self.buckets.len().max(1);
        while bucket_count.saturating_mul(3) / 4 < needed {
            match bucket_count.checked_mul(2) {
                Some(doubled) => bucket_count = doubled,
                None => break,
            }
        }

        if bucket_count != self.buckets.len() {
            self.rehash(bucket_count);
        }
    }

    /// Redistributes every entry over `bucket_count` fresh buckets.
    ///
    /// Old buckets are drained in index order, each in append order.
    fn rehash(&mut self, bucket_count: usize) {
        let old = mem::replace(
            &mut self.buckets,
            iter::repeat_with(Vec::new).take(bucket_count).collect(),
        );

        for (key, value) in old.into_iter().flatten() {
            let index = self.bucket_index(&key);
            if let Some(bucket) = index.and_then(|index| self.buckets.get_mut(index)) {
                bucket.push((key, value));
            }
        }
    }
}

impl<K, V, S> PartialEq for ChainingMap<K, V, S>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.buckets == other.buckets
    }
}

impl<K, V, S> Eq for ChainingMap<K, V, S>
where
    K: Eq,
    V: Eq,
{
}

impl<K, V, S> Default for ChainingMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> Extend<(K, V)> for ChainingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainingMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Cursor<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.begin()
    }
}

impl<K, V, S> KeyedContainer<K, V> for ChainingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Cursor<'a>
        = Cursor<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        Self::insert(self, key, value)
    }

    fn find(&self, key: &K) -> Self::Cursor<'_> {
        Self::find(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        Self::remove(self, key)
    }

    fn len(&self) -> usize {
        self.size
    }

    fn reserve(&mut self, target: usize) {
        Self::reserve(self, target);
    }

    fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn probe_length(&self, key: &K) -> usize {
        Self::probe_length(self, key)
    }

    fn begin(&self) -> Self::Cursor<'_> {
        Self::begin(self)
    }

    fn end(&self) -> Self::Cursor<'_> {
        Self::end(self)
    }
}

/// Read-only position in a [`ChainingMap`]: a (bucket, offset) pair or past-the-end.
///
/// Borrows the map, so no insert, remove or reserve can happen while it is alive.
/// As an iterator it yields the pair it points at, then the rest of its bucket and every
/// later non-empty bucket.
#[derive(Debug)]
pub struct Cursor<'a, K, V> {
    /// The map's bucket array
    buckets: &'a [Bucket<K, V>],
    /// Current bucket, `buckets.len()` at the end
    bucket: usize,
    /// Position inside the current bucket, 0 at the end
    offset: usize,
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// Cursor at the head of the first non-empty bucket at or after `from`
    fn first_live_from(buckets: &'a [Bucket<K, V>], from: usize) -> Self {
        let bucket = buckets
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, bucket)| !bucket.is_empty())
            .map_or(buckets.len(), |(index, _)| index);
        Self { buckets, bucket, offset: 0 }
    }

    /// The key-value pair under the cursor, `None` at the end
    #[must_use]
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        let buckets = self.buckets;
        buckets.get(self.bucket)?.get(self.offset).map(|(key, value)| (key, value))
    }

    /// Moves to the next pair in this bucket, else to the head of the next non-empty
    /// bucket, else to the end. Stays put once at the end.
    pub fn advance(&mut self) {
        let Some(current) = self.buckets.get(self.bucket) else {
            return;
        };

        let next = self.offset.saturating_add(1);
        if next < current.len() {
            self.offset = next;
        } else {
            *self = Self::first_live_from(self.buckets, self.bucket.saturating_add(1));
        }
    }

    /// Returns true for the past-the-end cursor
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.bucket >= self.buckets.len()
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Self { buckets: self.buckets, bucket: self.bucket, offset: self.offset }
    }
}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        (self.bucket, self.offset) == (other.bucket, other.offset)
            && std::ptr::eq(self.buckets, other.buckets)
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<'a, K, V> Iterator for Cursor<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entry()?;
        self.advance();
        Some(entry)
    }
}

impl<K, V> FusedIterator for Cursor<'_, K, V> {}
