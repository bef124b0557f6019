//! A tree that can be handed to several threads.
//!
//! Rotations may rewrite any node up to the root, so the whole tree sits
//! behind one exclusive lock that every operation takes for its duration.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::tree::AvlTree;

/// Cloneable handle to an [`AvlTree`] guarded by a single mutex.
///
/// Clones share the same tree. Reads return owned values so no guard leaks
/// out of a call; use [`SharedTree::with`] or [`SharedTree::with_mut`] for
/// several steps under one lock.
pub struct SharedTree<V> {
    inner: Arc<Mutex<AvlTree<V>>>,
}

impl<V> SharedTree<V> {
    pub fn new() -> Self {
        Self::from_tree(AvlTree::new())
    }

    pub fn from_tree(tree: AvlTree<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tree)),
        }
    }

    pub fn insert(&self, key: &str, value: V) -> Result<()> {
        let mut tree = self.inner.lock();
        tree.insert(key, value)?;
        log::debug!("inserted {key:?}, {} entries", tree.len());
        Ok(())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub fn update(&self, key: &str, value: V) -> Result<V> {
        self.inner.lock().update(key, value)
    }

    pub fn remove(&self, key: &str) -> Result<V> {
        let mut tree = self.inner.lock();
        let value = tree.remove(key)?;
        log::debug!("removed {key:?}, {} entries", tree.len());
        Ok(value)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn height(&self) -> usize {
        self.inner.lock().height()
    }

    /// Runs `f` with the tree locked.
    pub fn with<R>(&self, f: impl FnOnce(&AvlTree<V>) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Runs `f` with the tree locked for writing.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut AvlTree<V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<V: Clone> SharedTree<V> {
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    /// Every entry in ascending key order, copied out under one lock.
    pub fn snapshot(&self) -> Vec<(String, V)> {
        self.inner
            .lock()
            .iter()
            .map(|(k, v)| (k.to_owned(), v.clone()))
            .collect()
    }
}

impl<V> Clone for SharedTree<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for SharedTree<V> {
    fn default() -> Self {
        Self::new()
    }
}
