//! # avl-store
//!
//! An ordered string-keyed store on a height-balanced (AVL) binary search
//! tree. Every node's subtrees differ in height by at most one, so insert,
//! lookup, update and remove are O(log n) whatever the insertion order.
//!
//! ## Example
//!
//! ```rust
//! use avl_store::{AvlTree, Error};
//!
//! let mut tree: AvlTree<u64> = AvlTree::new();
//! tree.insert("hello", 1).unwrap();
//! tree.insert("world", 2).unwrap();
//!
//! assert_eq!(tree.get("hello"), Some(&1));
//! assert!(matches!(tree.insert("hello", 3), Err(Error::AlreadyExists { .. })));
//! assert_eq!(tree.update("hello", 3), Ok(1));
//!
//! let keys: Vec<&str> = tree.iter().map(|(k, _)| k).collect();
//! assert_eq!(keys, ["hello", "world"]);
//! ```
//!
//! [`ContactBook`] stores bounded-length contact records on top of the tree,
//! and [`SharedTree`] puts a tree behind a single lock for use across threads.

#![deny(unsafe_code)]

pub mod contact;
pub mod error;
pub mod shared;
pub mod tree;
#[cfg(feature = "workload")]
pub mod workload;

pub use contact::{Contact, ContactBook};
pub use error::{Error, Result};
pub use shared::SharedTree;
pub use tree::{AvlTree, Iter};

#[cfg(test)]
mod proptests;
