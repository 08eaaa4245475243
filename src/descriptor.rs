//! Compact node addressing.
//!
//! Role
//! - [`NodeDescriptor`] is the pool index width: `u16` by default (65,534
//!   live nodes), `u32` under the `descriptor32` feature. The max value of
//!   the chosen width is reserved as [`NONE`].
#[cfg(not(feature = "descriptor32"))]
pub type NodeDescriptor = u16;
#[cfg(feature = "descriptor32")]
pub type NodeDescriptor = u32;

/// Sentinel meaning "no node" — the max representable value of the width.
pub const NONE: NodeDescriptor = NodeDescriptor::MAX;

/// Public handle to a node. A thin newtype over [`NodeDescriptor`] so callers
/// cannot pass an arbitrary integer where a tree handle is expected; every
/// [`crate::Context`] method that accepts one still re-validates it through
/// [`crate::pool::NodePool::validate`] before use, since a handle can go
/// stale across a `delete_element`/`reset` even though its type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(pub(crate) NodeDescriptor);

impl ElementRef {
    /// A reference that never validates. Useful for exercising precondition
    /// failures (e.g. a mutation against a context that has no root yet)
    /// without needing a second, otherwise-unused context to source a
    /// dangling handle from.
    pub const INVALID: ElementRef = ElementRef(NONE);

    pub(crate) fn new(d: NodeDescriptor) -> Self {
        ElementRef(d)
    }

    pub(crate) fn raw(self) -> NodeDescriptor {
        self.0
    }
}

/// Tag carried by every node, including the `Unknown` sentinel for freed
/// slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIs)]
pub enum ElementType {
    Unknown,
    Object,
    Key,
    Array,
    String,
    Number,
    True,
    False,
    Null,
}

impl ElementType {
    /// Whether a node of this type may hold a single raw value that prints
    /// verbatim (as opposed to being a container or a sentinel).
    pub fn is_value(self) -> bool {
        matches!(
            self,
            ElementType::String
                | ElementType::Number
                | ElementType::True
                | ElementType::False
                | ElementType::Null
        )
    }

    /// Whether this type may legally be a child of an `Array`.
    pub fn is_array_element(self) -> bool {
        self.is_value() || matches!(self, ElementType::Object | ElementType::Array)
    }
}
