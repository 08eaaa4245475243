//! Value payload for the builder API.
//!
//! Role
//! - Collapses the "variant per type" shape the mutation surface would
//!   otherwise need (`update_key_value_string`, `update_key_value_number`,
//!   `update_key_object_value`, ...) into a single sum type, the same way
//!   this crate's `ElementType` replaces the source's type tag. One
//!   `update_key_value`/`append_array_value`/`add_array_value` call accepts
//!   any `Value`; the node kind and bytes to store follow from which
//!   variant was passed.
use crate::descriptor::ElementType;

#[derive(Debug, Clone, Copy)]
pub enum Value<'buf> {
    Object,
    Array,
    String(&'buf [u8]),
    Number(&'buf [u8]),
    True,
    False,
    Null,
}

impl<'buf> Value<'buf> {
    pub(crate) fn kind(&self) -> ElementType {
        match self {
            Value::Object => ElementType::Object,
            Value::Array => ElementType::Array,
            Value::String(_) => ElementType::String,
            Value::Number(_) => ElementType::Number,
            Value::True => ElementType::True,
            Value::False => ElementType::False,
            Value::Null => ElementType::Null,
        }
    }

    pub(crate) fn bytes(&self) -> &'buf [u8] {
        match self {
            Value::Object | Value::Array => &[],
            Value::String(bytes) | Value::Number(bytes) => bytes,
            Value::True => b"true",
            Value::False => b"false",
            Value::Null => b"null",
        }
    }
}
