//! UUID v7 utilities for time-ordered identifiers.
//!
//! Category ids are UUIDv7: the first 48 bits embed a millisecond
//! timestamp, so ascending id order equals creation order. The tree
//! query engine relies on this for its child tie-break ordering.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// # Example
///
/// ```
/// use taxa_core::uuid_utils::new_v7;
///
/// let id = new_v7();
/// // IDs generated later will be lexicographically greater
/// ```
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Check if a UUID is version 7.
pub fn is_v7(uuid: &Uuid) -> bool {
    uuid.get_version_num() == 7
}
