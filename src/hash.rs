//! Optional hash index over `(parent_node, key_bytes)`.
//!
//! Role
//! - Open-addressed, linear-probed table carved from the workspace in
//!   hashed mode, giving O(1) expected duplicate-key detection and lookup.
//! - `remove` uses the classic backward-shift deletion for linear probing
//!   (no tombstones, no scratch buffer) so probe chains never break — the
//!   naive "just clear the slot" approach does break them and is the
//!   specific defect this module exists to avoid.
use crate::descriptor::NodeDescriptor;
use crate::error::{FixJsonError, Result};
use crate::pool::NodePool;

const FNV_OFFSET_BASIS: u32 = 2166136261;
const FNV_PRIME: u32 = 16777619;

fn fnv1a(mut hash: u32, bytes: &[u8]) -> u32 {
    for &byte in bytes {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash a `(parent, key_bytes)` pair. Folding the parent descriptor in
/// first lets identically named keys in different objects coexist.
fn hash_key(parent: NodeDescriptor, key_bytes: &[u8]) -> u32 {
    let hash = fnv1a(FNV_OFFSET_BASIS, &parent.to_le_bytes());
    fnv1a(hash, key_bytes)
}

#[derive(Clone, Copy)]
enum Slot {
    Empty,
    Occupied { hash: u32, key: NodeDescriptor },
}

impl Default for Slot {
    fn default() -> Self {
        Slot::Empty
    }
}

pub struct HashIndex<'buf> {
    slots: &'buf mut [Slot],
    enabled: bool,
    count: usize,
}

impl<'buf> HashIndex<'buf> {
    pub fn new(storage: &'buf mut [Slot]) -> Self {
        for slot in storage.iter_mut() {
            *slot = Slot::Empty;
        }
        HashIndex {
            slots: storage,
            enabled: true,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.count = 0;
        self.enabled = true;
    }

    /// Dynamically fall back to linear scan: `add`/`remove` become no-ops.
    pub fn turn_off(&mut self) {
        self.enabled = false;
        log::warn!("hash index turned off, falling back to linear key scan");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn add(
        &mut self,
        pool: &NodePool<'_>,
        parent: NodeDescriptor,
        key_node: NodeDescriptor,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let cap = self.slots.len();
        if cap == 0 {
            return Err(FixJsonError::OutOfMemory {
                requested: 1,
                available: 0,
            });
        }
        let key_bytes = pool.get(key_node).value;
        let hash = hash_key(parent, key_bytes);
        let mut index = (hash as usize) % cap;

        for _ in 0..cap {
            match self.slots[index] {
                Slot::Empty => {
                    self.slots[index] = Slot::Occupied { hash, key: key_node };
                    self.count += 1;
                    log::debug!("hash index: added key at slot {index}");
                    return Ok(());
                }
                Slot::Occupied { hash: existing_hash, key: existing_key } => {
                    // A real equality check on the stored key's bytes, not an
                    // assignment: this is the duplicate-check defect from the
                    // source this module's shape was distilled from.
                    if existing_hash == hash
                        && pool.get(existing_key).parent == parent
                        && pool.get(existing_key).value == key_bytes
                    {
                        return Err(FixJsonError::DuplicateKey);
                    }
                }
            }
            index = (index + 1) % cap;
        }
        Err(FixJsonError::OutOfMemory {
            requested: 1,
            available: 0,
        })
    }

    pub fn find(
        &self,
        pool: &NodePool<'_>,
        parent: NodeDescriptor,
        name: &[u8],
    ) -> Option<NodeDescriptor> {
        if !self.enabled {
            return None;
        }
        let cap = self.slots.len();
        if cap == 0 {
            return None;
        }
        let hash = hash_key(parent, name);
        let mut index = (hash as usize) % cap;

        for _ in 0..cap {
            match self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied { hash: existing_hash, key } => {
                    if existing_hash == hash
                        && pool.get(key).parent == parent
                        && pool.get(key).value == name
                    {
                        return Some(key);
                    }
                }
            }
            index = (index + 1) % cap;
        }
        None
    }

    pub fn remove(&mut self, pool: &NodePool<'_>, parent: NodeDescriptor, key_node: NodeDescriptor) {
        if !self.enabled {
            return;
        }
        let cap = self.slots.len();
        if cap == 0 {
            return;
        }
        let key_bytes = pool.get(key_node).value;
        let hash = hash_key(parent, key_bytes);
        let mut index = (hash as usize) % cap;

        for _ in 0..cap {
            match self.slots[index] {
                Slot::Occupied { key, .. } if key == key_node => {
                    self.remove_at(index);
                    self.count -= 1;
                    log::debug!("hash index: removed key at slot {index}");
                    return;
                }
                Slot::Empty => return,
                _ => {}
            }
            index = (index + 1) % cap;
        }
    }

    /// Rebuild the table into `new_slots` (a different capacity, so slot
    /// positions cannot simply be copied) by re-adding every currently
    /// occupied key. Used by `Context::resize`, where the node pool has
    /// already moved but offers no shortcut for re-deriving hashes other
    /// than revisiting every live key once.
    pub fn rebuild(&mut self, pool: &NodePool<'_>, new_slots: &'buf mut [Slot]) -> Result<()> {
        for slot in new_slots.iter_mut() {
            *slot = Slot::Empty;
        }
        let was_enabled = self.enabled;
        let mut rebuilt = HashIndex { slots: new_slots, enabled: true, count: 0 };
        if was_enabled {
            for slot in self.slots.iter() {
                if let Slot::Occupied { key, .. } = *slot {
                    let parent = pool.get(key).parent;
                    rebuilt.add(pool, parent, key)?;
                }
            }
        }
        rebuilt.enabled = was_enabled;
        *self = rebuilt;
        Ok(())
    }

    /// Backward-shift deletion: clear slot `i`, then pull later entries in
    /// the same probe run back to fill the hole, skipping any entry whose
    /// own home slot still needs it to remain beyond the hole.
    fn remove_at(&mut self, mut i: usize) {
        let cap = self.slots.len();
        self.slots[i] = Slot::Empty;
        let mut j = i;
        loop {
            j = (j + 1) % cap;
            let (hash, occupied) = match self.slots[j] {
                Slot::Empty => break,
                Slot::Occupied { hash, .. } => (hash, true),
            };
            debug_assert!(occupied);
            let home = (hash as usize) % cap;
            let blocked = if i <= j {
                home > i && home <= j
            } else {
                home <= j || home > i
            };
            if blocked {
                continue;
            }
            self.slots[i] = self.slots[j];
            self.slots[j] = Slot::Empty;
            i = j;
        }
    }
}

/// Storage type callers allocate for the hash index partition; re-exported
/// so `Context::init` can accept `&mut [HashSlot]` without naming the
/// private `Slot` enum.
pub type HashSlot = Slot;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_matches_known_vector() {
        // FNV-1a of the empty string is the offset basis unchanged.
        assert_eq!(fnv1a(FNV_OFFSET_BASIS, b""), FNV_OFFSET_BASIS);
        // Differing parents must not collide for the same key bytes.
        assert_ne!(hash_key(0, b"key"), hash_key(1, b"key"));
    }
}
