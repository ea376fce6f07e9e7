//! Side-channel context carried alongside a request.
//!
//! The environ is a string-keyed map of shared, type-erased values. It is how
//! the invitation handshake hands an [`Operator`](crate::Operator) to a mounted
//! application: the party inserts the operator under a well-known key and the
//! application reads it back out by the same key.
//!
//! # Example
//!
//! ```rust
//! use partyline_core::Environ;
//!
//! let mut environ = Environ::new();
//! environ.insert("answer", 42i32);
//!
//! assert_eq!(environ.get::<i32>("answer"), Some(&42));
//! // Wrong type under an existing key behaves like a missing key.
//! assert_eq!(environ.get::<String>("answer"), None);
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// String-keyed side-channel container.
///
/// Values are stored behind `Arc`, so cloning an environ is cheap and every
/// clone observes the same values.
#[derive(Clone, Default)]
pub struct Environ {
    map: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Environ {
    /// Create a new empty environ.
    #[inline]
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Insert a value under `key`, replacing any previous value.
    #[inline]
    pub fn insert<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.map.insert(key.into(), Arc::new(value));
    }

    /// Insert an Arc-wrapped value directly, keeping its identity.
    #[inline]
    pub fn insert_arc<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: Arc<T>) {
        self.map
            .insert(key.into(), value as Arc<dyn Any + Send + Sync>);
    }

    /// Get a reference to the value under `key` if it has type `T`.
    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<&T> {
        self.map.get(key).and_then(|arc| arc.downcast_ref::<T>())
    }

    /// Get a shared handle to the value under `key` if it has type `T`.
    #[inline]
    pub fn get_arc<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<T>> {
        self.map
            .get(key)
            .and_then(|arc| arc.clone().downcast::<T>().ok())
    }

    /// Check if any value exists under `key`.
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Remove the value under `key`. Returns true if one existed.
    #[inline]
    pub fn remove(&mut self, key: &str) -> bool {
        self.map.remove(key).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Merge another environ into this one; `other` wins on key clashes.
    #[inline]
    pub fn extend(&mut self, other: Environ) {
        self.map.extend(other.map);
    }

    /// Iterate over the keys present.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Environ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Environ").field("keys", &keys).finish()
    }
}
