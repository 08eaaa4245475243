//! Two-pass evaluator/serializer: exact length, then byte emission.
//!
//! Role
//! - Both passes run the identical stackless pre-order DFS over
//!   parent/sibling/first_child links; the only difference is the [`Sink`]
//!   they write through, so length and bytes can never drift apart (§8
//!   property 2).
use crate::descriptor::{ElementType, NodeDescriptor, NONE};
use crate::error::{FixJsonError, Result};
use crate::pool::NodePool;

trait Sink {
    fn emit(&mut self, bytes: &[u8]);
}

struct LengthSink(usize);

impl Sink for LengthSink {
    fn emit(&mut self, bytes: &[u8]) {
        self.0 += bytes.len();
    }
}

struct WriteSink<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Sink for WriteSink<'a> {
    fn emit(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }
}

fn emit_indent(indent: usize, sink: &mut impl Sink) {
    for _ in 0..indent {
        sink.emit(b" ");
    }
}

fn parent_kind(pool: &NodePool<'_>, node: NodeDescriptor) -> Option<ElementType> {
    let parent = pool.get(node).parent;
    if parent == NONE { None } else { Some(pool.get(parent).kind) }
}

fn emit_enter(pool: &NodePool<'_>, cursor: NodeDescriptor, compact: bool, indent: &mut usize, sink: &mut impl Sink) {
    let node = pool.get(cursor);
    match node.kind {
        ElementType::Object | ElementType::Array => {
            if !compact && parent_kind(pool, cursor) == Some(ElementType::Array) {
                sink.emit(b"\n");
                emit_indent(*indent, sink);
            }
            sink.emit(if node.kind == ElementType::Object { b"{" } else { b"[" });
            *indent += 2;
        }
        ElementType::Key => {
            if !compact {
                sink.emit(b"\n");
                emit_indent(*indent, sink);
            }
            sink.emit(b"\"");
            sink.emit(node.value);
            sink.emit(b"\":");
            if !compact {
                sink.emit(b" ");
            }
        }
        ElementType::String => {
            if !compact && parent_kind(pool, cursor) == Some(ElementType::Array) {
                sink.emit(b"\n");
                emit_indent(*indent, sink);
            }
            sink.emit(b"\"");
            sink.emit(node.value);
            sink.emit(b"\"");
        }
        ElementType::Number | ElementType::True | ElementType::False | ElementType::Null => {
            if !compact && parent_kind(pool, cursor) == Some(ElementType::Array) {
                sink.emit(b"\n");
                emit_indent(*indent, sink);
            }
            sink.emit(node.value);
        }
        ElementType::Unknown => unreachable!("freed node reached during traversal"),
    }
}

/// Close `cursor` if it is an `Object`/`Array`. Returns whether it closed
/// anything (a plain value leaf is a no-op here).
fn maybe_close(pool: &NodePool<'_>, cursor: NodeDescriptor, indent: &mut usize, sink: &mut impl Sink) -> bool {
    match pool.get(cursor).kind {
        ElementType::Object => {
            *indent -= 2;
            sink.emit(b"}");
            true
        }
        ElementType::Array => {
            *indent -= 2;
            sink.emit(b"]");
            true
        }
        _ => false,
    }
}

fn traverse(pool: &NodePool<'_>, root: NodeDescriptor, compact: bool, sink: &mut impl Sink) {
    if root == NONE {
        return;
    }
    let mut indent: usize = 0;
    let mut cursor = root;

    loop {
        emit_enter(pool, cursor, compact, &mut indent, sink);

        if pool.get(cursor).first_child != NONE {
            cursor = pool.get(cursor).first_child;
            continue;
        }

        maybe_close(pool, cursor, &mut indent, sink);

        loop {
            if cursor == root {
                return;
            }
            if pool.get(cursor).sibling != NONE {
                sink.emit(b",");
                cursor = pool.get(cursor).sibling;
                break;
            }
            cursor = pool.get(cursor).parent;
            maybe_close(pool, cursor, &mut indent, sink);
            if cursor == root {
                return;
            }
        }
    }
}

/// Compute the exact rendered length without writing any bytes.
pub fn evaluate(pool: &NodePool<'_>, root: NodeDescriptor, compact: bool) -> usize {
    let mut sink = LengthSink(0);
    traverse(pool, root, compact, &mut sink);
    sink.0
}

/// Write the rendered bytes into `buf`, first checking it is large enough
/// via [`evaluate`]. Returns the number of bytes written (not
/// NUL-terminated).
pub fn render(pool: &NodePool<'_>, root: NodeDescriptor, compact: bool, buf: &mut [u8]) -> Result<usize> {
    let required = evaluate(pool, root, compact);
    if buf.len() < required {
        return Err(FixJsonError::OutOfMemory { requested: required, available: buf.len() });
    }
    let mut sink = WriteSink { buf, pos: 0 };
    traverse(pool, root, compact, &mut sink);
    Ok(sink.pos)
}
