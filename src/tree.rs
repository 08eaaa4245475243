//! Tree store: structural mutation over the node pool.
//!
//! Role
//! - All insert/delete/ancestor-walk operations used by both the parser and
//!   the public builder API live here. Every operation is O(1) except
//!   subtree delete (O(subtree size)) and ancestor walks (O(depth)) —
//!   nothing here ever reallocates.
use crate::config::{MAX_KEY_LENGTH, MAX_VALUE_LENGTH};
use crate::descriptor::{ElementType, NodeDescriptor, NONE};
use crate::error::{FixJsonError, Result};
use crate::pool::NodePool;

/// Insert a freshly allocated node as a child of `parent`, immediately after
/// `anchor` (or as the new first child if `anchor` is `NONE`). If `parent`
/// is `NONE`, `node` becomes the root — only legal when the pool is
/// otherwise empty, which callers must check themselves (the root is
/// tracked on `Context`, not here).
pub fn insert_after(
    pool: &mut NodePool<'_>,
    parent: NodeDescriptor,
    anchor: NodeDescriptor,
    node: NodeDescriptor,
) -> Result<()> {
    pool.get_mut(node).parent = parent;

    if parent == NONE {
        return Ok(());
    }

    if anchor == NONE {
        // Prepend: new node becomes first_child, chained in front of the
        // previous first_child.
        let previous_first = pool.get(parent).first_child;
        pool.get_mut(node).sibling = previous_first;
        pool.get_mut(parent).first_child = node;
        if previous_first == NONE {
            pool.get_mut(parent).last_child = node;
        }
    } else {
        let anchor_sibling = pool.get(anchor).sibling;
        pool.get_mut(node).sibling = anchor_sibling;
        pool.get_mut(anchor).sibling = node;
        if pool.get(parent).last_child == anchor {
            pool.get_mut(parent).last_child = node;
        }
    }
    Ok(())
}

/// Append `node` as the new last child of `parent`.
pub fn append(pool: &mut NodePool<'_>, parent: NodeDescriptor, node: NodeDescriptor) -> Result<()> {
    let anchor = if parent == NONE { NONE } else { pool.get(parent).last_child };
    insert_after(pool, parent, anchor, node)
}

/// Walk `parent` links starting at (and including) `start` until a node of
/// `kind` is found, or the root is exhausted without a match.
pub fn parent_of_type(
    pool: &NodePool<'_>,
    start: NodeDescriptor,
    kind: ElementType,
) -> Option<NodeDescriptor> {
    let mut cursor = start;
    while cursor != NONE {
        if pool.get(cursor).kind == kind {
            return Some(cursor);
        }
        cursor = pool.get(cursor).parent;
    }
    None
}

/// Walk `parent` links starting at `start` until an `Object` or `Array` is
/// reached.
pub fn container_parent(pool: &NodePool<'_>, start: NodeDescriptor) -> Option<NodeDescriptor> {
    let mut cursor = pool.get(start).parent;
    while cursor != NONE {
        let kind = pool.get(cursor).kind;
        if kind == ElementType::Object || kind == ElementType::Array {
            return Some(cursor);
        }
        cursor = pool.get(cursor).parent;
    }
    None
}

/// Unlink `node` from its parent's child chain, patching `first_child`,
/// `last_child` and the preceding sibling's `sibling` pointer. Does not free
/// `node`.
fn unlink(pool: &mut NodePool<'_>, node: NodeDescriptor) {
    let parent = pool.get(node).parent;
    if parent == NONE {
        return;
    }
    let next_sibling = pool.get(node).sibling;

    if pool.get(parent).first_child == node {
        pool.get_mut(parent).first_child = next_sibling;
    } else {
        let mut cursor = pool.get(parent).first_child;
        while cursor != NONE && pool.get(cursor).sibling != node {
            cursor = pool.get(cursor).sibling;
        }
        if cursor != NONE {
            pool.get_mut(cursor).sibling = next_sibling;
        }
    }

    if pool.get(parent).last_child == node {
        pool.get_mut(parent).last_child = if pool.get(parent).first_child == NONE {
            NONE
        } else {
            let mut cursor = pool.get(parent).first_child;
            while pool.get(cursor).sibling != NONE {
                cursor = pool.get(cursor).sibling;
            }
            cursor
        };
    }
}

/// Delete the entire subtree rooted at `node`: descend to the leftmost leaf,
/// unlink and free it, ascend and repeat, until `node` itself is reached,
/// unlinked and freed. `on_key_freed` is invoked for every freed `Key` node
/// so the caller can keep a hash index consistent without this module
/// depending on one.
pub fn delete(
    pool: &mut NodePool<'_>,
    node: NodeDescriptor,
    mut on_key_freed: impl FnMut(&mut NodePool<'_>, NodeDescriptor),
) -> Result<()> {
    pool.validate(node)?;

    loop {
        let mut leaf = node;
        while pool.get(leaf).first_child != NONE {
            leaf = pool.get(leaf).first_child;
        }

        if leaf == node {
            unlink(pool, node);
            if pool.get(node).kind == ElementType::Key {
                on_key_freed(pool, node);
            }
            pool.free(node);
            return Ok(());
        }

        unlink(pool, leaf);
        if pool.get(leaf).kind == ElementType::Key {
            on_key_freed(pool, leaf);
        }
        pool.free(leaf);
    }
}

/// Linear scan for a `Key` child of `parent` whose bytes equal `name`. Used
/// for duplicate detection in linear mode and as the hashed-mode fallback
/// once the index has been turned off.
pub fn find_key(pool: &NodePool<'_>, parent: NodeDescriptor, name: &[u8]) -> Option<NodeDescriptor> {
    let mut cursor = pool.get(parent).first_child;
    while cursor != NONE {
        let candidate = pool.get(cursor);
        if candidate.kind == ElementType::Key && candidate.value == name {
            return Some(cursor);
        }
        cursor = candidate.sibling;
    }
    None
}

/// Resolve a negative-from-end array index (`-k` means the `k`-th element
/// from the end, 1-based) against a known array length. Returns `None` when
/// `|index|` exceeds `len` (used by read-style accessors, which must report
/// `ElementNotFound` on out-of-range).
pub fn resolve_array_index(index: i64, len: usize) -> Option<usize> {
    if index >= 0 {
        let index = index as usize;
        if index < len { Some(index) } else { None }
    } else {
        let from_end = (-index) as usize;
        if from_end <= len { Some(len - from_end) } else { None }
    }
}

/// Resolve a negative-from-end array index for insertion, where an
/// out-of-range index clamps to prepend (too negative) or append (too
/// large) instead of failing.
pub fn clamp_array_index(index: i64, len: usize) -> usize {
    if index >= 0 {
        (index as usize).min(len)
    } else {
        let from_end = (-index) as usize;
        len.saturating_sub(from_end)
    }
}

pub(crate) fn invalid_parameter(msg: &'static str) -> FixJsonError {
    FixJsonError::InvalidParameter(msg)
}

/// Find the child of `parent` immediately preceding `node` in the sibling
/// chain, or `NONE` if `node` is already `first_child`. Used by
/// `add_key_before` to translate "insert before X" into `insert_after`'s
/// "insert after X's predecessor" contract.
pub(crate) fn preceding_sibling(pool: &NodePool<'_>, parent: NodeDescriptor, node: NodeDescriptor) -> NodeDescriptor {
    let mut cursor = pool.get(parent).first_child;
    if cursor == node {
        return NONE;
    }
    while cursor != NONE && pool.get(cursor).sibling != node {
        cursor = pool.get(cursor).sibling;
    }
    cursor
}

/// Enforce the encodable-length ceiling shared by the parser's token
/// insertion and the builder API's direct node construction.
pub(crate) fn validate_length(kind: ElementType, bytes: &[u8]) -> Result<()> {
    let max = if kind == ElementType::Key { MAX_KEY_LENGTH } else { MAX_VALUE_LENGTH };
    if bytes.len() > max {
        let msg = if kind == ElementType::Key {
            "key exceeds the maximum encodable length"
        } else {
            "value exceeds the maximum encodable length"
        };
        Err(FixJsonError::InvalidParameter(msg))
    } else {
        Ok(())
    }
}
