//! # Keyed Tables
//!
//! Two hash map engines behind one contract, [`KeyedContainer`]:
//!
//! - `ProbingMap`: open addressing with quadratic probing over a flat array of tagged slots
//! - `ChainingMap`: separate chaining over an array of append-ordered buckets
//!
//! Both hash keys through a caller-supplied [`BuildHasher`](std::hash::BuildHasher), grow
//! before they mutate, and enumerate through borrowing cursors that skip vacated slots and
//! empty buckets.
//!
//! ## Basic Usage
//!
//! ```rust
//! use keyed_tables::ProbingMap;
//!
//! let mut map = ProbingMap::new();
//!
//! map.insert("apple".to_string(), 1);
//! map.insert("banana".to_string(), 2);
//! assert_eq!(map.get("apple"), Some(&1));
//!
//! // Inserting an existing key overwrites in place
//! assert_eq!(map.insert("apple".to_string(), 10), Some(1));
//! assert_eq!(map.len(), 2);
//!
//! assert_eq!(map.remove("apple"), Some(10));
//! assert!(map.find("apple") == map.end());
//! ```
//!
//! ## Cursors
//!
//! ```rust
//! use keyed_tables::{BuildIdentityHasher, ChainingMap};
//!
//! let mut map = ChainingMap::with_hasher(BuildIdentityHasher);
//! map.insert(0, "zero");
//! map.insert(2, "two");
//!
//! let mut cursor = map.begin();
//! assert_eq!(cursor.entry(), Some((&0, &"zero")));
//! cursor.advance();
//! assert_eq!(cursor.entry(), Some((&2, &"two")));
//! cursor.advance();
//! assert!(cursor == map.end());
//! ```

use std::hash::{BuildHasherDefault, DefaultHasher};

/// Module implementing separate chaining over append-ordered buckets
pub mod chaining_map;
/// Module implementing a hasher that maps integers to themselves
mod identity_hasher;
/// Module defining the contract both maps implement
mod keyed;
/// Module implementing open addressing with quadratic probing
pub mod probing_map;
/// Utility functions and traits for the maps
mod utils;

pub use chaining_map::ChainingMap;
pub use identity_hasher::{BuildIdentityHasher, IdentityHasher};
pub use keyed::KeyedContainer;
pub use probing_map::ProbingMap;
pub use utils::{ContainerExtensions, collect_into};

/// Hasher used when the caller does not supply one. Deterministic across runs.
pub type DefaultHashBuilder = BuildHasherDefault<DefaultHasher>;
