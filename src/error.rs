//! Public error types for the two data-dependent fallible boundaries:
//! decoding a binary trie and finalizing a builder.
//!
//! Every other failure mode named by the design (an out-of-domain code
//! point passed to a mutator, a consumed builder reused) is a programmer
//! contract violation and panics at the call site instead of returning a
//! `Result` — see `DESIGN.md` for the rationale.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrieError {
    #[error("invalid binary trie: {reason}")]
    InvalidBinary { reason: String },

    #[error("builder exceeded structural limits: {reason}")]
    StructuralLimit { reason: String },
}

pub type Result<T> = std::result::Result<T, TrieError>;
