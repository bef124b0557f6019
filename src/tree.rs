//! Height-balanced binary search tree keyed by strings.
//!
//! Nodes live in a slot arena and refer to their children by `NodeId`.
//! There are no parent links: every recursive step returns the root of the
//! subtree it processed and the caller writes it back into its own child
//! slot. That is how rotations travel upward.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;
use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};

// =============================================================================
// Node ids
// =============================================================================

/// Slot index into the node arena. `NIL` is the empty subtree.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const NIL: NodeId = NodeId(u32::MAX);

    #[inline]
    pub(crate) fn is_nil(self) -> bool {
        self == Self::NIL
    }

    #[inline]
    fn slot(self) -> usize {
        debug_assert!(!self.is_nil());
        self.0 as usize
    }
}

// =============================================================================
// Nodes
// =============================================================================

#[derive(Clone)]
pub(crate) struct Node<V> {
    pub(crate) key: String,
    pub(crate) value: V,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    /// Height of the subtree rooted here; a leaf is 1.
    pub(crate) height: u8,
}

impl<V> Node<V> {
    fn leaf(key: String, value: V) -> Self {
        Self {
            key,
            value,
            left: NodeId::NIL,
            right: NodeId::NIL,
            height: 1,
        }
    }
}

// =============================================================================
// Node Arena
// =============================================================================

/// Node slots plus a free list of released slot indices.
///
/// `free.capacity() >= slots.len()` at all times, so releasing a slot never
/// allocates.
#[derive(Clone)]
pub(crate) struct NodeArena<V> {
    slots: Vec<Option<Node<V>>>,
    free: Vec<u32>,
}

impl<V> NodeArena<V> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    fn with_capacity(n: usize) -> Self {
        Self {
            slots: Vec::with_capacity(n),
            free: Vec::with_capacity(n),
        }
    }

    /// Places `node` in a free slot, growing the arena if none is free.
    ///
    /// Growth goes through `try_reserve`, so running out of memory surfaces
    /// as [`Error::AllocationFailure`] instead of aborting.
    fn alloc(&mut self, node: Node<V>) -> Result<NodeId> {
        if let Some(slot) = self.free.pop() {
            self.slots[slot as usize] = Some(node);
            return Ok(NodeId(slot));
        }

        let slot = u32::try_from(self.slots.len())
            .ok()
            .filter(|&slot| slot != NodeId::NIL.0)
            .ok_or(Error::AllocationFailure)?;
        self.slots
            .try_reserve(1)
            .map_err(|_| Error::AllocationFailure)?;
        // The free list is empty here.
        self.free
            .try_reserve(self.slots.len() + 1)
            .map_err(|_| Error::AllocationFailure)?;
        self.slots.push(Some(node));
        Ok(NodeId(slot))
    }

    /// Appends without checking the free list. Only used while compacting into
    /// an arena sized up front.
    fn push(&mut self, node: Node<V>) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Some(node));
        id
    }

    fn release(&mut self, id: NodeId) -> Node<V> {
        let node = self.slots[id.slot()]
            .take()
            .expect("released a vacant node slot");
        self.free.push(id.0);
        node
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn holes(&self) -> usize {
        self.free.len()
    }

    fn capacity_bytes(&self) -> usize {
        self.slots.capacity() * mem::size_of::<Option<Node<V>>>()
            + self.free.capacity() * mem::size_of::<u32>()
    }

    fn shrink_to_fit(&mut self) {
        self.slots.shrink_to_fit();
        // Keep the free list able to hold every slot.
        self.free.shrink_to(self.slots.len());
    }
}

impl<V> Index<NodeId> for NodeArena<V> {
    type Output = Node<V>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<V> {
        self.slots[id.slot()].as_ref().expect("dangling node id")
    }
}

impl<V> IndexMut<NodeId> for NodeArena<V> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<V> {
        self.slots[id.slot()].as_mut().expect("dangling node id")
    }
}

// =============================================================================
// AvlTree
// =============================================================================

/// An ordered map from string keys to `V` that keeps itself height-balanced.
///
/// Every node's subtrees differ in height by at most one, so lookups, inserts
/// and removals touch O(log n) nodes.
///
/// Inserting an existing key and updating or removing a missing key are
/// reported as [`Error::AlreadyExists`] / [`Error::NotFound`] and leave the
/// tree untouched.
#[derive(Clone)]
pub struct AvlTree<V> {
    pub(crate) nodes: NodeArena<V>,
    pub(crate) root: NodeId,
    pub(crate) count: usize,
}

impl<V> AvlTree<V> {
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            root: NodeId::NIL,
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Height of the whole tree. Empty is 0, a single node is 1.
    pub fn height(&self) -> usize {
        usize::from(self.height_of(self.root))
    }

    /// Approximate bytes held by the tree: node slots plus key text.
    pub fn memory_usage(&self) -> usize {
        self.nodes.capacity_bytes() + self.iter().map(|(key, _)| key.len()).sum::<usize>()
    }

    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    /// Rebuilds live nodes into a dense arena, dropping the holes left behind
    /// by removals. Returns the number of nodes moved (0 if already dense).
    pub fn compact(&mut self) -> usize {
        if self.nodes.holes() == 0 {
            return 0;
        }

        let mut old = mem::replace(&mut self.nodes, NodeArena::with_capacity(self.count));
        self.root = Self::move_subtree(&mut old, &mut self.nodes, self.root);
        log::trace!("compacted {} nodes", self.count);
        self.count
    }

    fn move_subtree(old: &mut NodeArena<V>, new: &mut NodeArena<V>, id: NodeId) -> NodeId {
        if id.is_nil() {
            return id;
        }
        let mut node = old.release(id);
        node.left = Self::move_subtree(old, new, node.left);
        node.right = Self::move_subtree(old, new, node.right);
        new.push(node)
    }

    /// Drops every entry. Capacity is kept for refilling.
    pub fn clear(&mut self) {
        if !self.is_empty() {
            log::trace!("clearing {} entries", self.count);
        }
        self.nodes.clear();
        self.root = NodeId::NIL;
        self.count = 0;
    }

    pub fn iter(&self) -> Iter<'_, V> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::with_capacity(self.height()),
            remaining: self.count,
        };
        iter.push_left_spine(self.root);
        iter
    }
}

// =============================================================================
// Height bookkeeping and rotations
// =============================================================================

impl<V> AvlTree<V> {
    #[inline]
    fn height_of(&self, id: NodeId) -> u8 {
        if id.is_nil() {
            0
        } else {
            self.nodes[id].height
        }
    }

    #[inline]
    fn fix_height(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes[id].height = height;
    }

    /// `height(left) - height(right)`; 0 for the empty subtree.
    #[inline]
    fn balance_factor(&self, id: NodeId) -> i16 {
        if id.is_nil() {
            return 0;
        }
        let node = &self.nodes[id];
        i16::from(self.height_of(node.left)) - i16::from(self.height_of(node.right))
    }

    /// Promotes `y`'s left child. Returns the new subtree root.
    fn rotate_right(&mut self, y: NodeId) -> NodeId {
        let x = self.nodes[y].left;
        let moved = self.nodes[x].right;

        self.nodes[x].right = y;
        self.nodes[y].left = moved;

        self.fix_height(y);
        self.fix_height(x);
        x
    }

    /// Promotes `x`'s right child. Returns the new subtree root.
    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let y = self.nodes[x].right;
        let moved = self.nodes[y].left;

        self.nodes[y].left = x;
        self.nodes[x].right = moved;

        self.fix_height(x);
        self.fix_height(y);
        y
    }

    /// Restores balance at `id` after a removal below it.
    ///
    /// With no inserted key to steer by, the heavy child's own balance picks
    /// between the single and the double rotation.
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.fix_height(id);
        let balance = self.balance_factor(id);

        if balance > 1 {
            let left = self.nodes[id].left;
            if self.balance_factor(left) < 0 {
                let left = self.rotate_left(left);
                self.nodes[id].left = left;
            }
            return self.rotate_right(id);
        }

        if balance < -1 {
            let right = self.nodes[id].right;
            if self.balance_factor(right) > 0 {
                let right = self.rotate_right(right);
                self.nodes[id].right = right;
            }
            return self.rotate_left(id);
        }

        id
    }
}

// =============================================================================
// Lookup, insert, update, remove
// =============================================================================

impl<V> AvlTree<V> {
    fn find(&self, key: &str) -> Option<NodeId> {
        let mut current = self.root;
        while !current.is_nil() {
            let node = &self.nodes[current];
            current = match key.cmp(node.key.as_str()) {
                Ordering::Equal => return Some(current),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.find(key).map(|id| &self.nodes[id].value)
    }

    pub fn get_key_value(&self, key: &str) -> Option<(&str, &V)> {
        self.find(key).map(|id| {
            let node = &self.nodes[id];
            (node.key.as_str(), &node.value)
        })
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let id = self.find(key)?;
        Some(&mut self.nodes[id].value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Adds `key` with `value`.
    ///
    /// An existing key is never overwritten: the call fails with
    /// [`Error::AlreadyExists`] and nothing along the path is rebalanced.
    pub fn insert(&mut self, key: &str, value: V) -> Result<()> {
        self.root = self.insert_at(self.root, key, value)?;
        self.count += 1;
        debug_assert_eq!(self.nodes.live(), self.count);
        Ok(())
    }

    fn insert_at(&mut self, id: NodeId, key: &str, value: V) -> Result<NodeId> {
        if id.is_nil() {
            let mut owned = String::new();
            owned
                .try_reserve_exact(key.len())
                .map_err(|_| Error::AllocationFailure)?;
            owned.push_str(key);
            return self.nodes.alloc(Node::leaf(owned, value));
        }

        match key.cmp(self.nodes[id].key.as_str()) {
            Ordering::Less => {
                let left = self.nodes[id].left;
                let left = self.insert_at(left, key, value)?;
                self.nodes[id].left = left;
            }
            Ordering::Greater => {
                let right = self.nodes[id].right;
                let right = self.insert_at(right, key, value)?;
                self.nodes[id].right = right;
            }
            Ordering::Equal => {
                return Err(Error::AlreadyExists {
                    key: key.to_owned(),
                })
            }
        }

        self.fix_height(id);
        let balance = self.balance_factor(id);

        // Left-left is a single right rotation; left-right rotates the child
        // first. Mirrored on the right.
        if balance > 1 {
            let left = self.nodes[id].left;
            if key > self.nodes[left].key.as_str() {
                let left = self.rotate_left(left);
                self.nodes[id].left = left;
            }
            return Ok(self.rotate_right(id));
        }

        if balance < -1 {
            let right = self.nodes[id].right;
            if key < self.nodes[right].key.as_str() {
                let right = self.rotate_right(right);
                self.nodes[id].right = right;
            }
            return Ok(self.rotate_left(id));
        }

        Ok(id)
    }

    /// Replaces the value stored under `key`, returning the previous one.
    /// Shape is untouched.
    pub fn update(&mut self, key: &str, value: V) -> Result<V> {
        match self.get_mut(key) {
            Some(slot) => Ok(mem::replace(slot, value)),
            None => Err(Error::NotFound {
                key: key.to_owned(),
            }),
        }
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &str) -> Result<V> {
        let (root, value) = self.remove_at(self.root, key)?;
        self.root = root;
        self.count -= 1;
        debug_assert_eq!(self.nodes.live(), self.count);
        Ok(value)
    }

    fn remove_at(&mut self, id: NodeId, key: &str) -> Result<(NodeId, V)> {
        if id.is_nil() {
            return Err(Error::NotFound {
                key: key.to_owned(),
            });
        }

        let left = self.nodes[id].left;
        let right = self.nodes[id].right;

        let removed = match key.cmp(self.nodes[id].key.as_str()) {
            Ordering::Less => {
                let (left, value) = self.remove_at(left, key)?;
                self.nodes[id].left = left;
                value
            }
            Ordering::Greater => {
                let (right, value) = self.remove_at(right, key)?;
                self.nodes[id].right = right;
                value
            }
            Ordering::Equal if left.is_nil() || right.is_nil() => {
                let child = if left.is_nil() { right } else { left };
                let node = self.nodes.release(id);
                return Ok((child, node.value));
            }
            Ordering::Equal => {
                // Two children: the successor's content moves into this node
                // and the successor's own slot is freed.
                let (right, successor) = self.take_min(right);
                let target = &mut self.nodes[id];
                target.right = right;
                target.key = successor.key;
                mem::replace(&mut target.value, successor.value)
            }
        };

        Ok((self.rebalance(id), removed))
    }

    /// Detaches the leftmost node under `id`, rebalancing each level on the
    /// way back up. Returns the new subtree root and the detached node.
    fn take_min(&mut self, id: NodeId) -> (NodeId, Node<V>) {
        let left = self.nodes[id].left;
        if left.is_nil() {
            let right = self.nodes[id].right;
            return (right, self.nodes.release(id));
        }

        let (left, min) = self.take_min(left);
        self.nodes[id].left = left;
        (self.rebalance(id), min)
    }
}

impl<V> Default for AvlTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for AvlTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a AvlTree<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

// =============================================================================
// In-order iteration
// =============================================================================

/// Ascending-key iterator over an [`AvlTree`].
pub struct Iter<'a, V> {
    tree: &'a AvlTree<V>,
    /// Nodes whose left subtree is done but which are not yet yielded.
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    fn push_left_spine(&mut self, mut id: NodeId) {
        while !id.is_nil() {
            self.stack.push(id);
            id = self.tree.nodes[id].left;
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let node = &tree.nodes[id];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some((node.key.as_str(), &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}
