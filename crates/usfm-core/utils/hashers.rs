//! Hash function utilities for marker and metadata maps
//!
//! Provides ahash-based hashers used by the stylesheet registry, the
//! update block handler registry and row metadata maps.
//!
//! # Example
//!
//! ```rust
//! use usfm_core::utils::hashers::create_hash_map;
//!
//! let mut map = create_hash_map::<String, i32>();
//! map.insert("v".to_string(), 1);
//! assert_eq!(map.get("v"), Some(&1));
//! ```

use ahash::RandomState;
use std::collections::{HashMap, HashSet};

/// Map type used throughout the crate
pub type FastMap<K, V> = HashMap<K, V, RandomState>;

/// Set type used throughout the crate
pub type FastSet<T> = HashSet<T, RandomState>;

/// Create a new `HashMap` with the crate's hasher
#[must_use]
pub fn create_hash_map<K, V>() -> FastMap<K, V> {
    HashMap::with_hasher(RandomState::new())
}

/// Create a new `HashMap` with specific capacity
///
/// Pre-allocates the specified capacity to avoid rehashing during
/// construction, e.g. when loading the ~300 markers of the default
/// stylesheet.
///
/// # Example
///
/// ```rust
/// use usfm_core::utils::hashers::create_hash_map_with_capacity;
///
/// let mut map = create_hash_map_with_capacity::<String, i32>(100);
/// map.insert("p".to_string(), 1);
/// ```
#[must_use]
pub fn create_hash_map_with_capacity<K, V>(capacity: usize) -> FastMap<K, V> {
    HashMap::with_capacity_and_hasher(capacity, RandomState::new())
}

/// Create a new `HashSet` with the crate's hasher
#[must_use]
pub fn create_hash_set<T>() -> FastSet<T> {
    HashSet::with_hasher(RandomState::new())
}

/// Create a deterministic `HashMap` for testing
#[cfg(test)]
#[must_use]
pub fn create_deterministic_hash_map<K, V>() -> FastMap<K, V> {
    HashMap::with_hasher(RandomState::with_seeds(
        0x1234_5678_9abc_def0,
        0xfedc_ba98_7654_3210,
        0,
        0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_hash_map_works() {
        let mut map = create_hash_map::<&str, i32>();
        map.insert("test", 42);
        assert_eq!(map.get("test"), Some(&42));
    }

    #[test]
    fn create_hash_map_with_capacity_works() {
        let map = create_hash_map_with_capacity::<String, i32>(100);
        assert!(map.capacity() >= 100);
    }

    #[test]
    fn hash_set_deduplicates() {
        let mut set = create_hash_set();
        set.insert("r");
        set.insert("r");
        set.insert("rem");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn deterministic_map_works() {
        let mut map = create_deterministic_hash_map::<u32, u32>();
        map.insert(1, 2);
        assert_eq!(map[&1], 2);
    }
}
