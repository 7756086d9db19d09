//! Structural constants shared by the builder and the immutable trie.
//!
//! These are fixed by the binary format and the shape of the multi-stage
//! index; none of them are configurable per-instance.

/// log2 of the fast-kind small-block size (64 code points).
pub const FAST_SHIFT: u32 = 6;

/// Limit of the linear BMP index for [`crate::trie::Fast`] tries.
pub const FAST_LIMIT: u32 = 0x1000;
pub const FAST_DATA_BLOCK_LENGTH: u32 = 1 << FAST_SHIFT;
pub const FAST_DATA_MASK: u32 = FAST_DATA_BLOCK_LENGTH - 1;

/// log2 of the small data block size (16 code points) shared by both kinds
/// above their respective linear ranges.
pub const SHIFT_3: u32 = 4;
pub const SMALL_DATA_BLOCK_LENGTH: u32 = 1 << SHIFT_3;
pub const SMALL_DATA_MASK: u32 = SMALL_DATA_BLOCK_LENGTH - 1;

/// log2 of the span of one index-3 block (512 code points).
pub const SHIFT_2: u32 = 9;
/// log2 of the span of one index-2 block (16384 code points).
pub const SHIFT_1: u32 = 14;

pub const INDEX_3_BLOCK_LENGTH: u32 = 1 << (SHIFT_2 - SHIFT_3);
pub const INDEX_2_BLOCK_LENGTH: u32 = 1 << (SHIFT_1 - SHIFT_2);
/// 9 packed entries per group of 8 data offsets when the 16-bit index-3
/// cannot hold an offset.
pub const INDEX_3_18BIT_BLOCK_LENGTH: u32 = INDEX_3_BLOCK_LENGTH + INDEX_3_BLOCK_LENGTH / 8;

pub const CP_PER_INDEX_1_ENTRY: u32 = 1 << SHIFT_1;
pub const CP_PER_INDEX_2_ENTRY: u32 = 1 << SHIFT_2;

/// Number of fast-index entries covering the whole BMP.
pub const BMP_INDEX_LENGTH: u32 = 0x10000 >> FAST_SHIFT;
/// `Small`-kind index-1 length below the multi-stage range.
pub const SMALL_INDEX_LENGTH: u32 = FAST_LIMIT >> SHIFT_2;

/// Index-1 entries below `highStart` are never serialized for `Fast`
/// tries; they are reconstructed implicitly from the BMP fast index.
pub const OMITTED_BMP_INDEX_1_LENGTH: u32 = 0x10000 >> SHIFT_1;

pub const NO_INDEX_3_NULL_OFFSET: u32 = 0x7fff;
pub const NO_DATA_NULL_OFFSET: u32 = 0xfffff;

pub const ERROR_VALUE_NEG_OFFSET: u32 = 1;
pub const HIGH_VALUE_NEG_OFFSET: u32 = 2;

/// Highest valid Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;
/// Upper bound (exclusive) of the whole code point domain.
pub const CODE_POINT_LIMIT: u32 = 0x110000;

pub const SURROGATE_LOW_START: u32 = 0xD800;
pub const LEAD_SURROGATE_END: u32 = 0xDBFF;
pub const SURROGATE_HIGH_END: u32 = 0xDFFF;

/// Small data blocks per fast (64-cp) block; used when materializing a
/// fast-range block so it stays contiguous for the fast index.
pub const SMALL_DATA_BLOCKS_PER_FAST_BLOCK: u32 =
    FAST_DATA_BLOCK_LENGTH / SMALL_DATA_BLOCK_LENGTH;

/// Absolute ceiling on the builder's flat data array.
pub const MAX_DATA_LENGTH: u32 = CODE_POINT_LIMIT;

/// Maximum offset of the last data block the compactor may address
/// (15-bit block index space, in small-block units, plus one block).
pub const MAX_DATA_OFFSET: u32 = 0x3ffff + SMALL_DATA_BLOCK_LENGTH;

/// Binary header signature, ASCII `"Tri3"`.
pub const SIGNATURE: u32 = 0x5472_6933;
pub const SIGNATURE_SWAPPED: u32 = 0x3369_7254;
