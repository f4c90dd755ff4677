//! Body handle registry
//!
//! Maps logical body keys to live engine handles. Entries are written when a
//! body mounts and removed when it unmounts; the registry never creates or
//! destroys bodies itself.

use std::collections::HashMap;

use super::{BodyHandle, BodyKey};

#[derive(Debug, Default)]
pub struct BodyHandleRegistry {
    handles: HashMap<BodyKey, BodyHandle>,
}

impl BodyHandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `key` with `handle`, overwriting any previous entry.
    pub fn register(&mut self, key: BodyKey, handle: BodyHandle) -> Option<BodyHandle> {
        self.handles.insert(key, handle)
    }

    /// Drops the entry for `key`; a missing key is a no-op.
    pub fn unregister(&mut self, key: BodyKey) -> Option<BodyHandle> {
        self.handles.remove(&key)
    }

    /// `None` means the body is not mounted yet, or no longer.
    pub fn get(&self, key: BodyKey) -> Option<BodyHandle> {
        self.handles.get(&key).copied()
    }

    pub fn contains(&self, key: BodyKey) -> bool {
        self.handles.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.handles.keys().copied()
    }
}
