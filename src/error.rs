//! Error type shared by the tree and the layers built on it.

use crate::contact::Field;

/// Outcome of a store operation that did not apply.
///
/// `AlreadyExists` and `NotFound` are ordinary outcomes: the store is left
/// exactly as it was and the caller decides how to surface them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Insert found a node with the same key. The stored value is untouched.
    #[error("key already exists: {key:?}")]
    AlreadyExists { key: String },

    /// Update or remove did not find the key.
    #[error("key not found: {key:?}")]
    NotFound { key: String },

    /// Storage for a new node could not be reserved. The tree is unchanged.
    #[error("failed to allocate tree node")]
    AllocationFailure,

    /// A contact field is over its limit and the book rejects overflow.
    #[error("{field} is {len} bytes, limit is {max}")]
    FieldTooLong {
        field: Field,
        len: usize,
        max: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
