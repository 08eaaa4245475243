//! `fixjson` — an in-place JSON document engine with a fixed, caller-supplied
//! workspace and no internal heap allocation.
//!
//! A [`Context`] borrows `&mut` node-pool (and, in [`Mode::Hashed`],
//! hash-index) storage for its entire lifetime. Parsing borrows the input
//! buffer directly: node values are byte spans into whatever buffer produced
//! them, never copies. There is no growth beyond what the caller hands in;
//! running out is `OutOfMemory`, recoverable only via [`Context::resize`]
//! with a strictly larger buffer.
//!
//! ```
//! use fixjson::{Context, Mode, Config, Node};
//!
//! let mut nodes = [Node::default(); 64];
//! let mut ctx = Context::init(&mut nodes, None, Mode::Linear, Config::default()).unwrap();
//! ctx.load(br#"{"a":1}"#).unwrap();
//! let mut out = [0u8; 32];
//! let written = ctx.render(&mut out, true).unwrap();
//! assert_eq!(&out[..written], br#"{"a":1}"#);
//! ```

mod config;
mod context;
mod descriptor;
mod error;
mod eval;
mod hash;
mod parser;
mod path;
mod pool;
mod token;
mod tree;
mod value;

pub use config::{recommended_hash_capacity, Config, Mode, MAX_KEY_LENGTH, MAX_PATH_LENGTH, MAX_VALUE_LENGTH};
pub use context::{Context, ElementStat, WorkspaceStat};
pub use descriptor::{ElementRef, ElementType};
pub use error::{FixJsonError, FixJsonStatus, Result, StatusBlock};
pub use hash::HashSlot;
pub use pool::Node;
pub use token::TokenType;
pub use value::Value;
