#![forbid(unsafe_code)]
//! A compact, multi-stage lookup structure mapping every Unicode code
//! point to a small unsigned integer, plus the builder that constructs it.
//!
//! [`builder::Builder`] accumulates `set`/`set_range` assignments and
//! compacts them, on [`builder::Builder::build_immutable`], into a
//! [`trie::ImmutableTrie`] — an immutable structure cheap enough to query
//! that callers can afford to look up every code point in a string one at
//! a time. [`codec`] reads and writes the trie's own binary format;
//! [`cursor::StringCursor`] walks a UTF-16 string yielding `(code point,
//! value)` pairs using either representation as the backing map.

pub mod builder;
pub mod codec;
pub mod constants;
pub mod cursor;
pub mod error;
pub mod map;
pub mod trie;
pub mod value;

pub use builder::Builder;
pub use codec::{AnyKindTrie, ByteOrder};
pub use cursor::StringCursor;
pub use error::{Result, TrieError};
pub use map::{CodePointMap, Range, RangeOption};
pub use trie::{Fast, ImmutableTrie, Small, TrieKind};
pub use value::Width;

#[cfg(test)]
mod test;
