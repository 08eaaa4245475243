//! The public handle: owns the workspace partitions and exposes every
//! read/mutate/telemetry operation as a method.
//!
//! Role
//! - Ties the node pool, optional hash index, parser, path resolver and
//!   evaluator together. Every fallible method funnels its `Result` through
//!   [`Context::track`] so `status`/`status_block` always reflect the most
//!   recent call, matching the "every public entry point records its
//!   outcome" policy.
use crate::config::{Config, Mode};
use crate::descriptor::{ElementRef, ElementType, NodeDescriptor, NONE};
use crate::error::{FixJsonError, FixJsonStatus, Result, StatusBlock};
use crate::eval;
use crate::hash::{HashIndex, HashSlot};
use crate::parser;
use crate::path;
use crate::pool::{Node, NodePool};
use crate::token;
use crate::tree;
use crate::value::Value;

/// Per-kind element counts gathered by one pre-order walk. See [`Context::stat`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementStat {
    pub objects: usize,
    pub arrays: usize,
    pub keys: usize,
    pub strings: usize,
    pub numbers: usize,
    pub booleans: usize,
    pub nulls: usize,
}

/// Workspace region sizes and live occupancy. See [`Context::workspace_stat`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkspaceStat {
    pub node_capacity: usize,
    pub node_live: usize,
    pub hash_capacity: usize,
    pub hash_live: usize,
}

fn array_len(pool: &NodePool<'_>, parent: NodeDescriptor) -> usize {
    let mut count = 0;
    let mut cursor = pool.get(parent).first_child;
    while cursor != NONE {
        count += 1;
        cursor = pool.get(cursor).sibling;
    }
    count
}

fn nth_child(pool: &NodePool<'_>, parent: NodeDescriptor, n: usize) -> NodeDescriptor {
    let mut cursor = pool.get(parent).first_child;
    for _ in 0..n {
        cursor = pool.get(cursor).sibling;
    }
    cursor
}

pub struct Context<'buf> {
    pool: NodePool<'buf>,
    hash_index: Option<HashIndex<'buf>>,
    mode: Mode,
    config: Config,
    root: NodeDescriptor,
    path_separator: u8,
    status: FixJsonStatus,
    status_block: StatusBlock,
}

impl<'buf> Context<'buf> {
    /// Partition the workspace: `node_storage` backs the node pool, and in
    /// `Mode::Hashed`, `hash_storage` backs the hash index. The caller owns
    /// sizing both; [`crate::config::recommended_hash_capacity`] offers a
    /// starting ratio.
    pub fn init(
        node_storage: &'buf mut [Node<'buf>],
        hash_storage: Option<&'buf mut [HashSlot]>,
        mode: Mode,
        config: Config,
    ) -> Result<Self> {
        if node_storage.is_empty() {
            return Err(FixJsonError::InvalidParameter("node storage must hold at least one slot"));
        }
        let pool = NodePool::new(node_storage);
        let hash_index = match (mode, hash_storage) {
            (Mode::Hashed, Some(storage)) => {
                if storage.is_empty() {
                    return Err(FixJsonError::InvalidParameter("hashed mode requires non-empty hash storage"));
                }
                Some(HashIndex::new(storage))
            }
            (Mode::Hashed, None) => {
                return Err(FixJsonError::InvalidParameter("hashed mode requires hash index storage"));
            }
            (Mode::Linear, _) => None,
        };
        log::debug!("context initialized: {} node slots, mode {mode}", pool.capacity());
        Ok(Context {
            pool,
            hash_index,
            mode,
            config,
            root: NONE,
            path_separator: b'.',
            status: FixJsonStatus::NoError,
            status_block: StatusBlock::default(),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> Config {
        self.config
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => {
                self.status = FixJsonStatus::NoError;
                self.status_block = StatusBlock::default();
            }
            Err(err) => {
                self.status = err.status();
                self.status_block = StatusBlock {
                    status: self.status,
                    token_type: match err {
                        FixJsonError::UnexpectedToken { found, .. } => Some(*found),
                        _ => None,
                    },
                    line: match err {
                        FixJsonError::UnexpectedToken { line, .. }
                        | FixJsonError::UnexpectedEof { line, .. }
                        | FixJsonError::InvalidNumber { line, .. }
                        | FixJsonError::InvalidUnicode { line, .. }
                        | FixJsonError::UnexpectedSymbol { line, .. } => *line,
                        _ => 0,
                    },
                    column: match err {
                        FixJsonError::UnexpectedToken { column, .. }
                        | FixJsonError::UnexpectedEof { column, .. }
                        | FixJsonError::InvalidNumber { column, .. }
                        | FixJsonError::InvalidUnicode { column, .. }
                        | FixJsonError::UnexpectedSymbol { column, .. } => *column,
                        _ => 0,
                    },
                };
            }
        }
        result
    }

    /// Empty the tree, keeping the workspace and its capacity.
    pub fn reset(&mut self) {
        self.pool.reset();
        if let Some(index) = self.hash_index.as_mut() {
            index.reset();
        }
        self.root = NONE;
        self.status = FixJsonStatus::NoError;
        self.status_block = StatusBlock::default();
    }

    /// Parse `input` into a fresh tree. On failure the tree is left exactly
    /// as far as the parser got (see [`parser::parse`]); `status`/
    /// `status_block` describe the failure.
    pub fn load(&mut self, input: &'buf [u8]) -> Result<()> {
        self.reset();
        let result = parser::parse(&mut self.pool, self.hash_index.as_mut(), self.config, &mut self.root, input);
        self.track(result)
    }

    pub fn evaluate(&self, compact: bool) -> usize {
        eval::evaluate(&self.pool, self.root, compact)
    }

    pub fn render(&mut self, buf: &mut [u8], compact: bool) -> Result<usize> {
        let result = eval::render(&self.pool, self.root, compact, buf);
        self.track(result)
    }

    // --- Read accessors ---------------------------------------------------

    pub fn root(&mut self) -> Result<ElementRef> {
        let result = if self.root == NONE { Err(FixJsonError::ElementNotFound) } else { Ok(ElementRef::new(self.root)) };
        self.track(result)
    }

    fn linked(&self, elem: ElementRef, pick: impl Fn(&Node<'buf>) -> NodeDescriptor) -> Result<ElementRef> {
        self.pool.validate(elem.raw())?;
        let linked = pick(self.pool.get(elem.raw()));
        if linked == NONE { Err(FixJsonError::ElementNotFound) } else { Ok(ElementRef::new(linked)) }
    }

    pub fn parent(&mut self, elem: ElementRef) -> Result<ElementRef> {
        let result = self.linked(elem, |node| node.parent);
        self.track(result)
    }

    pub fn child(&mut self, elem: ElementRef) -> Result<ElementRef> {
        let result = self.linked(elem, |node| node.first_child);
        self.track(result)
    }

    pub fn sibling(&mut self, elem: ElementRef) -> Result<ElementRef> {
        let result = self.linked(elem, |node| node.sibling);
        self.track(result)
    }

    pub fn element_type(&mut self, elem: ElementRef) -> Result<ElementType> {
        let result = (|| {
            self.pool.validate(elem.raw())?;
            Ok(self.pool.get(elem.raw()).kind)
        })();
        self.track(result)
    }

    pub fn parent_type(&mut self, elem: ElementRef) -> Result<ElementType> {
        let result = (|| {
            self.pool.validate(elem.raw())?;
            let parent = self.pool.get(elem.raw()).parent;
            if parent == NONE {
                return Err(FixJsonError::ElementNotFound);
            }
            Ok(self.pool.get(parent).kind)
        })();
        self.track(result)
    }

    pub fn array_size(&mut self, elem: ElementRef) -> Result<usize> {
        let result = (|| {
            self.pool.validate(elem.raw())?;
            if self.pool.get(elem.raw()).kind != ElementType::Array {
                return Err(FixJsonError::InvalidParameter("array_size requires an Array element"));
            }
            Ok(array_len(&self.pool, elem.raw()))
        })();
        self.track(result)
    }

    /// Negative `index` counts from the end (`-1` is the last element);
    /// `|index|` beyond the array's length is `ElementNotFound`.
    pub fn array_value(&mut self, elem: ElementRef, index: i64) -> Result<ElementRef> {
        let result = (|| {
            self.pool.validate(elem.raw())?;
            if self.pool.get(elem.raw()).kind != ElementType::Array {
                return Err(FixJsonError::InvalidParameter("array_value requires an Array element"));
            }
            let len = array_len(&self.pool, elem.raw());
            let pos = tree::resolve_array_index(index, len).ok_or(FixJsonError::ElementNotFound)?;
            Ok(ElementRef::new(nth_child(&self.pool, elem.raw(), pos)))
        })();
        self.track(result)
    }

    pub fn get_key(&mut self, parent: ElementRef, path: &[u8]) -> Result<ElementRef> {
        let result = path::get_key(&self.pool, self.hash_index.as_ref(), parent.raw(), path, self.path_separator)
            .map(ElementRef::new);
        self.track(result)
    }

    /// Raw stored bytes of a `String`/`Number`/`True`/`False`/`Null` element
    /// — what the tokenizer captured, or what a builder call supplied,
    /// un-decoded. Not tracked through `status`: reading a value cannot
    /// itself fail in any way callers need to diagnose beyond the `Result`.
    pub fn value(&self, elem: ElementRef) -> Result<&'buf [u8]> {
        self.pool.validate(elem.raw())?;
        let node = self.pool.get(elem.raw());
        if !node.kind.is_value() {
            return Err(FixJsonError::InvalidParameter("value requires a String/Number/True/False/Null element"));
        }
        Ok(node.value)
    }

    pub fn get_key_value(&mut self, key: ElementRef) -> Result<ElementRef> {
        let result = (|| {
            self.pool.validate(key.raw())?;
            if self.pool.get(key.raw()).kind != ElementType::Key {
                return Err(FixJsonError::InvalidParameter("get_key_value requires a Key element"));
            }
            let value = self.pool.get(key.raw()).first_child;
            if value == NONE { return Err(FixJsonError::ElementNotFound); }
            Ok(ElementRef::new(value))
        })();
        self.track(result)
    }

    // --- Mutations ----------------------------------------------------

    /// Insert a key into `object`, or into the object that hangs off `object`
    /// when it is itself a `Key` (auto-vivifying that object if the key has
    /// no value yet). Enforces uniqueness the same way the parser does.
    fn resolve_object_target(&mut self, parent: NodeDescriptor) -> Result<NodeDescriptor> {
        match self.pool.get(parent).kind {
            ElementType::Object => Ok(parent),
            ElementType::Key => {
                let child = self.pool.get(parent).first_child;
                if child == NONE {
                    let object = self.pool.allocate(ElementType::Object, &[])?;
                    tree::append(&mut self.pool, parent, object)?;
                    Ok(object)
                } else if self.pool.get(child).kind == ElementType::Object {
                    Ok(child)
                } else {
                    Err(FixJsonError::InvalidOperation)
                }
            }
            _ => Err(FixJsonError::InvalidParameter("add_key requires an Object or Key parent")),
        }
    }

    fn insert_key_checked(&mut self, object: NodeDescriptor, anchor: NodeDescriptor, name: &'buf [u8]) -> Result<NodeDescriptor> {
        tree::validate_length(ElementType::Key, name)?;
        if self.hash_index.is_none() && !self.config.contains(Config::ALLOW_DUPLICATE_KEYS) {
            if tree::find_key(&self.pool, object, name).is_some() {
                return Err(FixJsonError::DuplicateKey);
            }
        }
        let node = self.pool.allocate(ElementType::Key, name)?;
        if let Some(index) = self.hash_index.as_mut() {
            if let Err(err) = index.add(&self.pool, object, node) {
                self.pool.free(node);
                return Err(err);
            }
        }
        tree::insert_after(&mut self.pool, object, anchor, node)?;
        Ok(node)
    }

    pub fn add_key(&mut self, parent: ElementRef, name: &'buf [u8]) -> Result<ElementRef> {
        let result = (|| {
            self.pool.validate(parent.raw())?;
            let object = self.resolve_object_target(parent.raw())?;
            let anchor = self.pool.get(object).last_child;
            self.insert_key_checked(object, anchor, name).map(ElementRef::new)
        })();
        self.track(result)
    }

    fn add_key_adjacent(&mut self, anchor: ElementRef, name: &'buf [u8], before: bool) -> Result<ElementRef> {
        self.pool.validate(anchor.raw())?;
        let anchor_raw = anchor.raw();
        if self.pool.get(anchor_raw).kind != ElementType::Key {
            return Err(FixJsonError::InvalidParameter("add_key_before/add_key_after require a Key anchor"));
        }
        let object = self.pool.get(anchor_raw).parent;
        let insert_anchor = if before { tree::preceding_sibling(&self.pool, object, anchor_raw) } else { anchor_raw };
        self.insert_key_checked(object, insert_anchor, name).map(ElementRef::new)
    }

    pub fn add_key_before(&mut self, anchor: ElementRef, name: &'buf [u8]) -> Result<ElementRef> {
        let result = self.add_key_adjacent(anchor, name, true);
        self.track(result)
    }

    pub fn add_key_after(&mut self, anchor: ElementRef, name: &'buf [u8]) -> Result<ElementRef> {
        let result = self.add_key_adjacent(anchor, name, false);
        self.track(result)
    }

    /// Rename `key` in place, re-indexing it if a hash index is active.
    pub fn update_key(&mut self, key: ElementRef, name: &'buf [u8]) -> Result<()> {
        let result = (|| {
            self.pool.validate(key.raw())?;
            let key_raw = key.raw();
            if self.pool.get(key_raw).kind != ElementType::Key {
                return Err(FixJsonError::InvalidParameter("update_key requires a Key element"));
            }
            tree::validate_length(ElementType::Key, name)?;
            let parent = self.pool.get(key_raw).parent;

            // Check for a colliding name before touching anything: renaming
            // must not leave `key` partially renamed if it turns out to
            // collide with an existing sibling.
            let existing = match self.hash_index.as_ref() {
                Some(index) => index.find(&self.pool, parent, name),
                None if !self.config.contains(Config::ALLOW_DUPLICATE_KEYS) => {
                    tree::find_key(&self.pool, parent, name)
                }
                None => None,
            };
            if let Some(existing) = existing {
                if existing != key_raw {
                    return Err(FixJsonError::DuplicateKey);
                }
            }

            if let Some(index) = self.hash_index.as_mut() {
                index.remove(&self.pool, parent, key_raw);
            }
            self.pool.get_mut(key_raw).value = name;
            if let Some(index) = self.hash_index.as_mut() {
                index.add(&self.pool, parent, key_raw)?;
            }
            Ok(())
        })();
        self.track(result)
    }

    /// Remove `node`'s hash-index entry the moment the tree store frees it,
    /// whatever the node's position in the freed subtree.
    fn delete_subtree(&mut self, node: NodeDescriptor) -> Result<()> {
        let pool = &mut self.pool;
        let hash_index = &mut self.hash_index;
        tree::delete(pool, node, |pool, freed_key| {
            if let Some(index) = hash_index.as_mut() {
                let parent = pool.get(freed_key).parent;
                index.remove(pool, parent, freed_key);
            }
        })
    }

    pub fn delete_element(&mut self, elem: ElementRef) -> Result<()> {
        let result = (|| {
            self.pool.validate(elem.raw())?;
            let raw = elem.raw();
            let was_root = raw == self.root;
            self.delete_subtree(raw)?;
            if was_root {
                self.root = NONE;
            }
            Ok(())
        })();
        self.track(result)
    }

    /// Replace a single value node (kept distinct from `update_key_value`,
    /// `append_array_value` etc. so each caller only validates the
    /// constraint that applies to it).
    fn insert_value(&mut self, parent: NodeDescriptor, anchor: NodeDescriptor, value: Value<'buf>) -> Result<NodeDescriptor> {
        let kind = value.kind();
        if let Value::Number(bytes) = value {
            token::validate_number(bytes)?;
        }
        tree::validate_length(kind, value.bytes())?;
        let node = self.pool.allocate(kind, value.bytes())?;
        tree::insert_after(&mut self.pool, parent, anchor, node)?;
        Ok(node)
    }

    /// Generic low-level insert: `parent` must be an `Array` (appends) or a
    /// valueless `Key` (the key's single value).
    pub fn add_element(&mut self, parent: ElementRef, value: Value<'buf>) -> Result<ElementRef> {
        let result = (|| {
            self.pool.validate(parent.raw())?;
            let parent_raw = parent.raw();
            match self.pool.get(parent_raw).kind {
                ElementType::Array => {
                    if !value.kind().is_array_element() {
                        return Err(FixJsonError::InvalidParameter("value type cannot be an array element"));
                    }
                    let anchor = self.pool.get(parent_raw).last_child;
                    self.insert_value(parent_raw, anchor, value).map(ElementRef::new)
                }
                ElementType::Key => {
                    if self.pool.get(parent_raw).first_child != NONE {
                        return Err(FixJsonError::InvalidOperation);
                    }
                    self.insert_value(parent_raw, NONE, value).map(ElementRef::new)
                }
                _ => Err(FixJsonError::InvalidParameter("add_element requires an Array or Key parent")),
            }
        })();
        self.track(result)
    }

    /// Replace `key`'s value subtree (freeing the old one, if any) with a
    /// freshly built node of `value`'s kind.
    pub fn update_key_value(&mut self, key: ElementRef, value: Value<'buf>) -> Result<ElementRef> {
        let result = (|| {
            self.pool.validate(key.raw())?;
            let key_raw = key.raw();
            if self.pool.get(key_raw).kind != ElementType::Key {
                return Err(FixJsonError::InvalidParameter("update_key_value requires a Key element"));
            }
            let old_child = self.pool.get(key_raw).first_child;
            if old_child != NONE {
                self.delete_subtree(old_child)?;
            }
            self.insert_value(key_raw, NONE, value).map(ElementRef::new)
        })();
        self.track(result)
    }

    fn require_array(&self, elem: ElementRef) -> Result<NodeDescriptor> {
        self.pool.validate(elem.raw())?;
        if self.pool.get(elem.raw()).kind != ElementType::Array {
            return Err(FixJsonError::InvalidParameter("expected an Array element"));
        }
        Ok(elem.raw())
    }

    pub fn append_array_value(&mut self, array: ElementRef, value: Value<'buf>) -> Result<ElementRef> {
        let result = (|| {
            let array_raw = self.require_array(array)?;
            if !value.kind().is_array_element() {
                return Err(FixJsonError::InvalidParameter("value type cannot be an array element"));
            }
            let anchor = self.pool.get(array_raw).last_child;
            self.insert_value(array_raw, anchor, value).map(ElementRef::new)
        })();
        self.track(result)
    }

    /// Negative `index` counts from the end; out-of-range clamps to prepend
    /// (too negative) or append (too large) rather than failing.
    pub fn add_array_value(&mut self, array: ElementRef, index: i64, value: Value<'buf>) -> Result<ElementRef> {
        let result = (|| {
            let array_raw = self.require_array(array)?;
            if !value.kind().is_array_element() {
                return Err(FixJsonError::InvalidParameter("value type cannot be an array element"));
            }
            let len = array_len(&self.pool, array_raw);
            let pos = tree::clamp_array_index(index, len);
            let anchor = if pos == 0 { NONE } else { nth_child(&self.pool, array_raw, pos - 1) };
            self.insert_value(array_raw, anchor, value).map(ElementRef::new)
        })();
        self.track(result)
    }

    /// Replace the element at `index`, preserving its position. Negative
    /// `index` counts from the end; out-of-range is `ElementNotFound`.
    pub fn update_array_value(&mut self, array: ElementRef, index: i64, value: Value<'buf>) -> Result<ElementRef> {
        let result = (|| {
            let array_raw = self.require_array(array)?;
            if !value.kind().is_array_element() {
                return Err(FixJsonError::InvalidParameter("value type cannot be an array element"));
            }
            let len = array_len(&self.pool, array_raw);
            let pos = tree::resolve_array_index(index, len).ok_or(FixJsonError::ElementNotFound)?;
            let old = nth_child(&self.pool, array_raw, pos);
            let anchor = if pos == 0 { NONE } else { nth_child(&self.pool, array_raw, pos - 1) };
            self.delete_subtree(old)?;
            self.insert_value(array_raw, anchor, value).map(ElementRef::new)
        })();
        self.track(result)
    }

    // --- Configuration ---------------------------------------------------

    /// Set the byte used to split `get_key` paths (default `.`). Infallible;
    /// does not touch `status`.
    pub fn set_path_separator(&mut self, separator: u8) {
        self.path_separator = separator;
    }

    // --- Telemetry ---------------------------------------------------------

    pub fn status(&self) -> FixJsonStatus {
        self.status
    }

    pub fn status_block(&self) -> StatusBlock {
        self.status_block
    }

    pub fn element_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn element_capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Count live elements by kind with a single pre-order walk, using the
    /// same stackless traversal shape as the renderer.
    pub fn stat(&self) -> ElementStat {
        let mut stat = ElementStat::default();
        if self.root == NONE {
            return stat;
        }
        let mut cursor = self.root;
        loop {
            match self.pool.get(cursor).kind {
                ElementType::Object => stat.objects += 1,
                ElementType::Array => stat.arrays += 1,
                ElementType::Key => stat.keys += 1,
                ElementType::String => stat.strings += 1,
                ElementType::Number => stat.numbers += 1,
                ElementType::True | ElementType::False => stat.booleans += 1,
                ElementType::Null => stat.nulls += 1,
                ElementType::Unknown => unreachable!("freed node reached during stat walk"),
            }

            if self.pool.get(cursor).first_child != NONE {
                cursor = self.pool.get(cursor).first_child;
                continue;
            }

            loop {
                if cursor == self.root {
                    return stat;
                }
                if self.pool.get(cursor).sibling != NONE {
                    cursor = self.pool.get(cursor).sibling;
                    break;
                }
                cursor = self.pool.get(cursor).parent;
                if cursor == self.root {
                    return stat;
                }
            }
        }
    }

    pub fn workspace_stat(&self) -> WorkspaceStat {
        WorkspaceStat {
            node_capacity: self.pool.capacity(),
            node_live: self.pool.live_count(),
            hash_capacity: self.hash_index.as_ref().map_or(0, |index| index.capacity()),
            hash_live: self.hash_index.as_ref().map_or(0, |index| index.len()),
        }
    }

    /// Move to a strictly larger workspace, preserving every live node's
    /// descriptor and re-deriving the hash index (whose slot count is
    /// capacity-dependent and so can't simply be copied).
    pub fn resize(&mut self, node_storage: &'buf mut [Node<'buf>], hash_storage: Option<&'buf mut [HashSlot]>) -> Result<()> {
        let result = (|| {
            self.pool.resize(node_storage)?;
            match (self.hash_index.as_mut(), hash_storage) {
                (Some(index), Some(storage)) => index.rebuild(&self.pool, storage)?,
                (Some(_), None) => {
                    return Err(FixJsonError::InvalidParameter("hashed mode requires new hash storage on resize"));
                }
                (None, _) => {}
            }
            Ok(())
        })();
        self.track(result)
    }
}
