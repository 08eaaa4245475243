//! Dotted-path key resolution.
use crate::config::MAX_PATH_LENGTH;
use crate::descriptor::{ElementType, NodeDescriptor, NONE};
use crate::error::{FixJsonError, Result};
use crate::hash::HashIndex;
use crate::pool::NodePool;
use crate::tree;

/// Resolve `path`, split at `separator`, starting from `parent`. At each
/// segment: if the current node is a `Key`, descend to its `Object` child
/// first, then search that object's children for a `Key` matching the
/// segment bytes.
pub fn get_key<'buf>(
    pool: &NodePool<'buf>,
    hash_index: Option<&HashIndex<'buf>>,
    parent: NodeDescriptor,
    path: &[u8],
    separator: u8,
) -> Result<NodeDescriptor> {
    if path.is_empty() {
        return Err(FixJsonError::ElementNotFound);
    }
    if path.len() > MAX_PATH_LENGTH {
        return Err(FixJsonError::PathTooLong);
    }
    pool.validate(parent)?;

    let mut current = parent;
    for segment in path.split(|&byte| byte == separator) {
        if pool.get(current).kind == ElementType::Key {
            let child = pool.get(current).first_child;
            if child == NONE || pool.get(child).kind != ElementType::Object {
                return Err(FixJsonError::ElementNotFound);
            }
            current = child;
        }

        let found = match hash_index {
            Some(index) if index.is_enabled() => index.find(pool, current, segment),
            _ => tree::find_key(pool, current, segment),
        };
        current = found.ok_or(FixJsonError::ElementNotFound)?;
    }
    Ok(current)
}
