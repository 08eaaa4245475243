//! Single-lookahead LL parser state machine.
//!
//! Role
//! - Consumes tokens from [`Tokenizer`] and drives tree-store insertions
//!   directly; there is no intermediate AST. `current` tracks the node most
//!   recently touched, the same role `iter` plays in the component this was
//!   grounded on — its meaning shifts with state (container being filled,
//!   key awaiting a value, value just completed) exactly as the transition
//!   table in SPEC_FULL.md §4.6 describes.
use crate::config::{Config, MAX_KEY_LENGTH, MAX_VALUE_LENGTH};
use crate::descriptor::{ElementType, NodeDescriptor, NONE};
use crate::error::{FixJsonError, Result};
use crate::hash::HashIndex;
use crate::pool::NodePool;
use crate::token::{Token, TokenType, Tokenizer};
use crate::tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    ExpectKey,
    ExpectColon,
    ExpectKeyValue,
    HaveKeyValue,
    ExpectArrayValue,
    HaveArrayValue,
    ExpectEof,
    End,
}

fn value_kind(token_kind: TokenType) -> ElementType {
    match token_kind {
        TokenType::String => ElementType::String,
        TokenType::Number => ElementType::Number,
        TokenType::True => ElementType::True,
        TokenType::False => ElementType::False,
        TokenType::Null => ElementType::Null,
        _ => unreachable!("value_kind called on non-primitive token"),
    }
}

fn unexpected(token: &Token<'_>) -> FixJsonError {
    FixJsonError::UnexpectedToken { found: token.kind, line: token.line, column: token.column }
}

/// Allocate `kind` with `token.value` and append it as the new last child of
/// `parent` (or make it the root when `parent == NONE`).
fn insert_child<'buf>(
    pool: &mut NodePool<'buf>,
    parent: NodeDescriptor,
    kind: ElementType,
    token: &Token<'buf>,
) -> Result<NodeDescriptor> {
    let max_len = if kind == ElementType::Key { MAX_KEY_LENGTH } else { MAX_VALUE_LENGTH };
    if token.value.len() > max_len {
        return Err(FixJsonError::InvalidParameter("element exceeds the maximum encodable length"));
    }
    let node = pool.allocate(kind, token.value)?;
    tree::append(pool, parent, node)?;
    Ok(node)
}

/// Insert a `Key` child of `object`, enforcing uniqueness per `config` and
/// `hash_index`. Allocates nothing on a duplicate.
fn insert_key<'buf>(
    pool: &mut NodePool<'buf>,
    hash_index: &mut Option<HashIndex<'buf>>,
    config: Config,
    object: NodeDescriptor,
    token: &Token<'buf>,
) -> Result<NodeDescriptor> {
    if token.value.len() > MAX_KEY_LENGTH {
        return Err(FixJsonError::InvalidParameter("key exceeds the maximum encodable length"));
    }

    if hash_index.is_none() && !config.contains(Config::ALLOW_DUPLICATE_KEYS) {
        if tree::find_key(pool, object, token.value).is_some() {
            return Err(FixJsonError::DuplicateKey);
        }
    }

    let node = pool.allocate(ElementType::Key, token.value)?;

    if let Some(index) = hash_index.as_mut() {
        if let Err(err) = index.add(pool, object, node) {
            pool.free(node);
            return Err(err);
        }
    }

    tree::append(pool, object, node)?;
    Ok(node)
}

/// Close the innermost `kind` container reachable by walking up from
/// `current` (inclusive), then decide the next state from whatever
/// contains it.
fn close<'buf>(
    pool: &NodePool<'buf>,
    current: NodeDescriptor,
    kind: ElementType,
) -> Result<(NodeDescriptor, State)> {
    let container = tree::parent_of_type(pool, current, kind).ok_or(FixJsonError::UnexpectedElement)?;
    let next_state = match tree::container_parent(pool, container) {
        Some(ancestor) => match pool.get(ancestor).kind {
            ElementType::Array => State::HaveArrayValue,
            ElementType::Object => State::HaveKeyValue,
            _ => return Err(FixJsonError::BrokenTree),
        },
        None => State::ExpectEof,
    };
    Ok((container, next_state))
}

/// Parse `input` into the tree, writing newly created nodes through `pool`
/// (and `hash_index`, when active) and updating `*root` as soon as the
/// first node exists. On failure the tree is left exactly as far as it got:
/// `*root` and `pool`'s contents are not rolled back, matching §7.
pub fn parse<'buf>(
    pool: &mut NodePool<'buf>,
    mut hash_index: Option<&mut HashIndex<'buf>>,
    config: Config,
    root: &mut NodeDescriptor,
    input: &'buf [u8],
) -> Result<()> {
    let mut tokenizer = Tokenizer::new(input);
    let mut state = State::Start;
    let mut current: NodeDescriptor = NONE;

    loop {
        let token = tokenizer.next_token()?;

        state = match state {
            State::Start => match token.kind {
                TokenType::OpenBrace => {
                    let node = insert_child(pool, NONE, ElementType::Object, &token)?;
                    *root = node;
                    current = node;
                    State::ExpectKey
                }
                TokenType::OpenBracket if config.contains(Config::ALLOW_TOPLEVEL_ARRAY) => {
                    let node = insert_child(pool, NONE, ElementType::Array, &token)?;
                    *root = node;
                    current = node;
                    State::ExpectArrayValue
                }
                kind if kind.is_primitive() && config.contains(Config::ALLOW_TOPLEVEL_PRIMITIVE) => {
                    let node = insert_child(pool, NONE, value_kind(kind), &token)?;
                    *root = node;
                    current = node;
                    State::ExpectEof
                }
                _ => return Err(unexpected(&token)),
            },

            State::ExpectKey => match token.kind {
                TokenType::String => {
                    let key = insert_key(pool, &mut hash_index, config, current, &token)?;
                    current = key;
                    State::ExpectColon
                }
                TokenType::CloseBrace => {
                    let (container, next_state) = close(pool, current, ElementType::Object)?;
                    current = container;
                    next_state
                }
                _ => return Err(unexpected(&token)),
            },

            State::ExpectColon => match token.kind {
                TokenType::Colon => State::ExpectKeyValue,
                _ => return Err(unexpected(&token)),
            },

            State::ExpectKeyValue => match token.kind {
                TokenType::OpenBrace => {
                    let node = insert_child(pool, current, ElementType::Object, &token)?;
                    current = node;
                    State::ExpectKey
                }
                TokenType::OpenBracket => {
                    let node = insert_child(pool, current, ElementType::Array, &token)?;
                    current = node;
                    State::ExpectArrayValue
                }
                kind if kind.is_primitive() => {
                    let node = insert_child(pool, current, value_kind(kind), &token)?;
                    current = node;
                    State::HaveKeyValue
                }
                _ => return Err(unexpected(&token)),
            },

            State::HaveKeyValue => match token.kind {
                TokenType::Comma => {
                    let object = tree::container_parent(pool, current).ok_or_else(|| unexpected(&token))?;
                    current = object;
                    State::ExpectKey
                }
                TokenType::CloseBrace => {
                    let (container, next_state) = close(pool, current, ElementType::Object)?;
                    current = container;
                    next_state
                }
                _ => return Err(unexpected(&token)),
            },

            State::ExpectArrayValue => match token.kind {
                TokenType::OpenBrace => {
                    let node = insert_child(pool, current, ElementType::Object, &token)?;
                    current = node;
                    State::ExpectKey
                }
                TokenType::OpenBracket => {
                    let node = insert_child(pool, current, ElementType::Array, &token)?;
                    current = node;
                    State::ExpectArrayValue
                }
                TokenType::CloseBracket => {
                    let (container, next_state) = close(pool, current, ElementType::Array)?;
                    current = container;
                    next_state
                }
                kind if kind.is_primitive() => {
                    let node = insert_child(pool, current, value_kind(kind), &token)?;
                    current = node;
                    State::HaveArrayValue
                }
                _ => return Err(unexpected(&token)),
            },

            State::HaveArrayValue => match token.kind {
                TokenType::Comma => {
                    let array = tree::container_parent(pool, current).ok_or_else(|| unexpected(&token))?;
                    current = array;
                    State::ExpectArrayValue
                }
                TokenType::CloseBracket => {
                    let (container, next_state) = close(pool, current, ElementType::Array)?;
                    current = container;
                    next_state
                }
                _ => return Err(unexpected(&token)),
            },

            State::ExpectEof => match token.kind {
                TokenType::Eof => State::End,
                _ => return Err(unexpected(&token)),
            },

            State::End => unreachable!("loop exits before re-entering End"),
        };

        log::trace!("parser: -> {state:?}");
        if state == State::End {
            return Ok(());
        }
    }
}
