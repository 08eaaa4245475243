//! Engine-wide configuration: search mode and parser leniency flags.
use bitflags::bitflags;

/// Key-lookup strategy selected at `init` time. Switching later requires a
/// fresh `init`; see [`crate::Context::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Mode {
    /// No hash index: duplicate checks and lookups are linear scans.
    Linear,
    /// Carve a hash index out of the workspace tail for O(1) expected
    /// duplicate detection and key lookup.
    Hashed,
}

bitflags! {
    /// Parser leniency and enforcement switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Config: u32 {
        /// Accept a top-level `[...]` document, not only `{...}`.
        const ALLOW_TOPLEVEL_ARRAY = 0b0001;
        /// Accept a top-level bare primitive document (`"s"`, `42`, `true`, ...).
        const ALLOW_TOPLEVEL_PRIMITIVE = 0b0010;
        /// Skip the linear duplicate-key scan in `Mode::Linear`. Has no effect
        /// in `Mode::Hashed`, where the hash index always enforces uniqueness.
        const ALLOW_DUPLICATE_KEYS = 0b0100;
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::ALLOW_TOPLEVEL_ARRAY
    }
}

pub const MAX_KEY_LENGTH: usize = 255;
pub const MAX_VALUE_LENGTH: usize = 65_535;
pub const MAX_PATH_LENGTH: usize = 256;

/// Suggested hash-index slot count for a given node pool capacity, roughly
/// preserving a legacy ~75/25 node-pool/hash-table workspace split (about
/// one hash slot per three node slots). Purely advisory: `Context::init`
/// accepts any two capacities a caller supplies.
pub fn recommended_hash_capacity(node_capacity: usize) -> usize {
    (node_capacity / 3).max(1)
}
