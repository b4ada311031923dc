use std::{
    borrow::Borrow,
    hash::{BuildHasher, Hash},
    iter::{self, FusedIterator},
    mem,
};

use crate::{DefaultHashBuilder, KeyedContainer};

/// State of a single slot in the table
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot<K, V> {
    /// Never held an entry since the last resize or clear
    Empty,
    /// Holds a live key-value pair
    Occupied(K, V),
    /// Held an entry that was removed (tombstone). Lookups probe past it, inserts reuse it.
    Vacated,
}

impl<K, V> Slot<K, V> {
    /// Key and value of an occupied slot
    fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Self::Occupied(key, value) => Some((key, value)),
            Self::Empty | Self::Vacated => None,
        }
    }

    /// Moves the pair out of an occupied slot
    fn into_entry(self) -> Option<(K, V)> {
        match self {
            Self::Occupied(key, value) => Some((key, value)),
            Self::Empty | Self::Vacated => None,
        }
    }

    /// Returns true for a slot holding a live entry
    fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied(..))
    }
}

/// Result of walking the probe sequence for a key
#[derive(Debug, Clone, Copy)]
struct Lookup {
    /// Slot holding the key, if it is present
    index: Option<usize>,
    /// Number of slots inspected before the walk stopped
    inspected: usize,
}

/// Where an insert should land
#[derive(Debug, Clone, Copy)]
enum Placement {
    /// The key is already stored at this slot
    Existing(usize),
    /// The key is absent and this slot is free for it
    Free(usize),
    /// A full probe cycle met neither the key nor a free slot
    Exhausted,
}

/// Slot index visited at step `step` of the quadratic probe sequence for `hash`.
///
/// `capacity` must be non-zero.
#[allow(clippy::arithmetic_side_effects)]
fn probe_index(hash: usize, step: usize, capacity: usize) -> usize {
    hash.wrapping_add(step.wrapping_mul(step)) % capacity
}

/// Allocates `capacity` empty slots
fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    iter::repeat_with(|| Slot::Empty).take(capacity).collect()
}

/// A hash map using open addressing with quadratic probing.
///
/// Every key lives in one flat array of slots. A key with hash `h` is stored at the first
/// free slot of the sequence `(h + i²) mod capacity`. Capacity is kept above twice the number
/// of non-empty slots, which keeps that sequence short.
///
/// Removal leaves a tombstone so keys displaced past the removed one stay reachable;
/// tombstones are reused by later inserts and dropped on the next resize.
///
/// Equality is physical: two maps are equal when their slot arrays match element by element.
/// Maps holding the same entries but built in a different order may compare unequal.
///
/// Note: This implementation is not thread-safe.
#[derive(Debug, Clone)]
pub struct ProbingMap<K, V, S = DefaultHashBuilder> {
    /// The slots storing the key-value pairs, unallocated until first needed
    slots: Vec<Slot<K, V>>,
    /// Current number of live entries
    size: usize,
    /// Number of tombstones currently in `slots`
    vacated: usize,
    /// Builds the hasher applied to every key
    hash_builder: S,
}

impl<K, V> ProbingMap<K, V> {
    /// Creates an empty `ProbingMap` with the default hasher. Allocates nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V> ProbingMap<K, V>
where
    K: Eq + Hash,
{
    /// Creates a `ProbingMap` able to hold `capacity` entries without resizing
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ProbingMap<K, V, S> {
    /// Creates an empty `ProbingMap` hashing keys with `hash_builder`
    #[must_use]
    pub fn with_hasher(hash_builder: S) -> Self {
        Self { slots: Vec::new(), size: 0, vacated: 0, hash_builder }
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

    /// Returns the number of slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns a reference to the map's hasher builder
    #[must_use]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Cursor at the first occupied slot
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, K, V> {
        Cursor::first_live_from(&self.slots, 0)
    }

    /// Past-the-end cursor
    #[must_use]
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor { slots: &self.slots, index: self.slots.len() }
    }

    /// Returns an iterator over the entries in ascending slot order
    #[must_use]
    pub fn iter(&self) -> Cursor<'_, K, V> {
        self.begin()
    }

    /// Eager snapshot of the entries in ascending slot order
    #[must_use]
    pub fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
    }

    /// Removes every entry and tombstone. The capacity is kept.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.size = 0;
        self.vacated = 0;
    }

    /// Puts a key-value pair into a slot known to be free
    fn occupy(&mut self, index: usize, key: K, value: V) {
        if let Some(slot) = self.slots.get_mut(index) {
            if matches!(slot, Slot::Vacated) {
                self.vacated = self.vacated.saturating_sub(1);
            }
            *slot = Slot::Occupied(key, value);
            self.size = self.size.saturating_add(1);
        }
    }

    /// Takes every live entry out in ascending slot order, leaving no storage behind
    fn drain_entries(&mut self) -> Vec<(K, V)> {
        self.size = 0;
        self.vacated = 0;
        mem::take(&mut self.slots).into_iter().filter_map(Slot::into_entry).collect()
    }
}

impl<K, V, S> ProbingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates a `ProbingMap` with room for `capacity` entries, hashing with `hash_builder`
    #[must_use]
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let mut map = Self::with_hasher(hash_builder);
        map.reserve(capacity);
        map
    }

    /// Computes the hash for a key
    #[allow(clippy::cast_possible_truncation)]
    fn hash<Q: ?Sized + Hash>(&self, key: &Q) -> usize {
        self.hash_builder.hash_one(key) as usize
    }

    /// Walks the probe sequence of `key` until it finds the key, meets an empty slot, or
    /// completes a full cycle
    fn locate<Q>(&self, key: &Q) -> Lookup
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let capacity = self.slots.len();
        if capacity == 0 {
            return Lookup { index: None, inspected: 0 };
        }

        let hash = self.hash(key);
        for step in 0..capacity {
            let index = probe_index(hash, step, capacity);
            let inspected = step.saturating_add(1);
            match self.slots.get(index) {
                None | Some(Slot::Empty) => return Lookup { index: None, inspected },
                Some(Slot::Occupied(stored, _)) if stored.borrow() == key => {
                    return Lookup { index: Some(index), inspected };
                }
                Some(_) => {}
            }
        }

        // i² mod capacity repeats with period `capacity`, nothing new past this point
        Lookup { index: None, inspected: capacity }
    }

    /// Finds the slot an insert of `key` should write to.
    ///
    /// The first tombstone on the way is preferred over the empty slot that ends the walk.
    fn placement(&self, key: &K) -> Placement {
        let capacity = self.slots.len();
        if capacity == 0 {
            return Placement::Exhausted;
        }

        let hash = self.hash(key);
        let mut tombstone = None;
        for step in 0..capacity {
            let index = probe_index(hash, step, capacity);
            match self.slots.get(index) {
                Some(Slot::Occupied(stored, _)) if stored == key => {
                    return Placement::Existing(index);
                }
                Some(Slot::Vacated) => {
                    tombstone.get_or_insert(index);
                }
                Some(Slot::Empty) => return Placement::Free(tombstone.unwrap_or(index)),
                _ => {}
            }
        }

        tombstone.map_or(Placement::Exhausted, Placement::Free)
    }

    /// Insert a key-value pair, returning the value previously stored under the key
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.reserve(self.size.saturating_add(1));

        let index = loop {
            match self.placement(&key) {
                Placement::Existing(index) => {
                    return match self.slots.get_mut(index) {
                        Some(Slot::Occupied(_, current)) => Some(mem::replace(current, value)),
                        _ => None,
                    };
                }
                Placement::Free(index) => break index,
                // quadratic residues cover only part of a power-of-two table
                Placement::Exhausted => self.resize(self.slots.len().saturating_mul(2).max(1)),
            }
        };

        self.occupy(index, key, value);
        None
    }

    /// Returns a cursor at the entry for `key`, or the end cursor if it is absent
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.locate(key).index {
            Some(index) => Cursor { slots: &self.slots, index },
            None => self.end(),
        }
    }

    /// Retrieve a value for a given key
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.locate(key).index?;
        self.slots.get(index).and_then(Slot::entry).map(|(_, value)| value)
    }

    /// Get a mutable reference to a value for a given key
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.locate(key).index?;
        match self.slots.get_mut(index) {
            Some(Slot::Occupied(_, value)) => Some(value),
            _ => None,
        }
    }

    /// Returns true if the map contains the given key
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).index.is_some()
    }

    /// Removes a key-value pair, leaving a tombstone in its slot
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.locate(key).index?;
        let slot = self.slots.get_mut(index)?;
        match mem::replace(slot, Slot::Vacated) {
            Slot::Occupied(_, value) => {
                self.size = self.size.saturating_sub(1);
                self.vacated = self.vacated.saturating_add(1);
                Some(value)
            }
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Number of slots a lookup of `key` inspects
    pub fn probe_length<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).inspected
    }

    /// Doubles the capacity until it exceeds twice `target`.
    ///
    /// If only the tombstones push the table past that bound, it is rebuilt at the current
    /// capacity instead, which drops them. Does nothing if the table is already large
    /// enough. Never shrinks.
    pub fn reserve(&mut self, target: usize) {
        let mut capacity = self.slots.len().max(1);
        while capacity <= target.saturating_mul(2) {
            match capacity.checked_mul(2) {
                Some(doubled) => capacity = doubled,
                None => break,
            }
        }

        if capacity != self.slots.len()
            || capacity <= target.saturating_add(self.vacated).saturating_mul(2)
        {
            self.resize(capacity);
        }
    }

    /// Moves every live entry into a fresh table of `capacity` slots.
    ///
    /// If some entry finds no free slot in its probe cycle the table doubles again.
    fn resize(&mut self, capacity: usize) {
        let mut capacity = capacity;
        let mut pending = self.drain_entries();

        loop {
            self.slots = empty_slots(capacity);

            let mut rest = pending.into_iter();
            let mut overflow = None;
            for (key, value) in rest.by_ref() {
                match self.placement(&key) {
                    Placement::Free(index) => self.occupy(index, key, value),
                    Placement::Exhausted => {
                        overflow = Some((key, value));
                        break;
                    }
                    // keys are unique, only a broken `Eq` gets here
                    Placement::Existing(_) => {}
                }
            }

            let Some(entry) = overflow else {
                return;
            };

            pending = self.drain_entries();
            pending.push(entry);
            pending.extend(rest);
            capacity = capacity.saturating_mul(2);
        }
    }
}

impl<K, V, S> PartialEq for ProbingMap<K, V, S>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.slots == other.slots
    }
}

impl<K, V, S> Eq for ProbingMap<K, V, S>
where
    K: Eq,
    V: Eq,
{
}

impl<K, V, S> Default for ProbingMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> Extend<(K, V)> for ProbingMap<K, V, S>
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

impl<K, V, S> FromIterator<(K, V)> for ProbingMap<K, V, S>
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

impl<'a, K, V, S> IntoIterator for &'a ProbingMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Cursor<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.begin()
    }
}

impl<K, V, S> KeyedContainer<K, V> for ProbingMap<K, V, S>
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
        self.slots.len()
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

/// Read-only position in a [`ProbingMap`]: either an occupied slot or past-the-end.
///
/// Borrows the map, so no insert, remove or reserve can happen while it is alive.
/// As an iterator it yields the entry it points at, then every later occupied slot.
#[derive(Debug)]
pub struct Cursor<'a, K, V> {
    /// The map's slot array
    slots: &'a [Slot<K, V>],
    /// Current slot, `slots.len()` at the end
    index: usize,
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// Cursor at the first occupied slot at or after `from`
    fn first_live_from(slots: &'a [Slot<K, V>], from: usize) -> Self {
        let index = slots
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, slot)| slot.is_occupied())
            .map_or(slots.len(), |(index, _)| index);
        Self { slots, index }
    }

    /// The key-value pair under the cursor, `None` at the end
    #[must_use]
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        let slots = self.slots;
        slots.get(self.index).and_then(Slot::entry)
    }

    /// Moves to the next occupied slot, or to the end. Stays put once at the end.
    pub fn advance(&mut self) {
        if self.index < self.slots.len() {
            *self = Self::first_live_from(self.slots, self.index.saturating_add(1));
        }
    }

    /// Returns true for the past-the-end cursor
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.index >= self.slots.len()
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Self { slots: self.slots, index: self.index }
    }
}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && std::ptr::eq(self.slots, other.slots)
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

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::from(!self.is_end()), Some(self.slots.len().saturating_sub(self.index)))
    }
}

impl<K, V> FusedIterator for Cursor<'_, K, V> {}
