//! Six-step compaction: builder state in, [`crate::trie::ImmutableTrie`] out.
//!
//! This implementation keeps every structural invariant named by the
//! design (null sentinels, 18-bit index packing, the 15-bit index-3
//! address ceiling, highStart rounded to a 512-cp boundary) but replaces
//! the reference algorithm's suffix-overlap byte search and bounded LRU
//! with plain hash-map dedup of whole blocks. That trades away some
//! compression on inputs with many distinct large non-uniform ranges; it
//! never changes an observable `get`/`get_range` result, since every
//! stored block is still either identical to, or a faithful copy of, the
//! builder's values over its span.

use std::collections::HashMap;

use crate::constants::*;
use crate::error::{Result, TrieError};
use crate::trie::{ImmutableTrie, TrieKind};
use crate::value::{ValueArray, Width};

use super::{BlockFlag, Builder};

fn limit_error(reason: impl Into<String>) -> TrieError {
    TrieError::StructuralLimit {
        reason: reason.into(),
    }
}

/// Step B: walk backward in 512-cp spans to find the start of the uniform
/// high-value tail, and what that tail's value is.
fn find_high_start(builder: &Builder) -> (u32, u32) {
    let high_value = builder.get(MAX_CODE_POINT as i32);
    let mut boundary = CODE_POINT_LIMIT;
    while boundary > 0 {
        let span_start = boundary - CP_PER_INDEX_2_ENTRY;
        let uniform = (span_start..boundary).all(|cp| builder.get(cp as i32) == high_value);
        if !uniform {
            break;
        }
        boundary = span_start;
    }
    (boundary, high_value)
}

/// Reads the 16-cp block starting at `block_start` straight from the
/// builder's flat representation.
fn block_values(builder: &Builder, bi: usize, mask: impl Fn(u32) -> u32) -> [u32; SMALL_DATA_BLOCK_LENGTH as usize] {
    let mut out = [0u32; SMALL_DATA_BLOCK_LENGTH as usize];
    match builder.flags[bi] {
        BlockFlag::AllSame(v) => out.fill(mask(v)),
        BlockFlag::Mixed(off) => {
            for k in 0..SMALL_DATA_BLOCK_LENGTH as usize {
                out[k] = mask(builder.data[off as usize + k]);
            }
        }
    }
    out
}

fn uniform_value(block: &[u32]) -> Option<u32> {
    let first = block[0];
    block.iter().all(|&v| v == first).then_some(first)
}

struct UniformDedup {
    offsets: HashMap<u32, u32>,
}

impl UniformDedup {
    fn new() -> Self {
        UniformDedup {
            offsets: HashMap::new(),
        }
    }

    /// Returns the offset of a block filled with `value`, reusing a
    /// previous one if any already exists.
    fn offset_for(&mut self, value: u32, block_len: usize, data: &mut Vec<u32>) -> u32 {
        *self.offsets.entry(value).or_insert_with(|| {
            let off = data.len() as u32;
            data.extend(std::iter::repeat(value).take(block_len));
            off
        })
    }
}

pub(crate) fn build_immutable<K: TrieKind>(
    builder: Builder,
    width: Width,
) -> Result<ImmutableTrie<K>> {
    let mask = |v: u32| width.mask(v);
    let error_value = mask(builder.error_value);
    let null_value = mask(builder.initial_value);
    let (high_start, raw_high_value) = find_high_start(&builder);
    let high_value = mask(raw_high_value);

    let mut data: Vec<u32> = Vec::new();

    // --- Fast range: one entry per 64-cp block, written contiguously so
    // `index[cp >> FAST_SHIFT] + (cp & 0x3F)` always lands in one run. ---
    let fast_blocks = fast_block_count::<K>();
    let mut fast_index = vec![0u16; fast_blocks];
    let mut fast_dedup = UniformDedup::new();
    let mut fast_data_null = NO_DATA_NULL_OFFSET;
    for fb in 0..fast_blocks {
        let block_start = (fb as u32) << FAST_SHIFT;
        let vals: Vec<u32> = (0..FAST_DATA_BLOCK_LENGTH)
            .map(|k| mask(builder.get((block_start + k) as i32)))
            .collect();
        let offset = if let Some(v) = uniform_value(&vals) {
            let off = fast_dedup.offset_for(v, FAST_DATA_BLOCK_LENGTH as usize, &mut data);
            if v == null_value && fast_data_null == NO_DATA_NULL_OFFSET {
                fast_data_null = off;
            }
            off
        } else {
            let off = data.len() as u32;
            data.extend(vals);
            off
        };
        fast_index[fb] = u16::try_from(offset)
            .map_err(|_| limit_error("fast data block offset exceeds 16 bits"))?;
    }

    // --- Multi-stage range: [0, highStart) at 16-cp granularity. ---
    let num_small = (high_start / SMALL_DATA_BLOCK_LENGTH) as usize;
    let mut small_block_offset = vec![0u32; num_small];
    let mut small_dedup = UniformDedup::new();
    let mut multi_data_null = NO_DATA_NULL_OFFSET;
    for (bi, slot) in small_block_offset.iter_mut().enumerate() {
        let vals = block_values(&builder, bi, mask);
        let offset = if let Some(v) = uniform_value(&vals) {
            let off = small_dedup.offset_for(v, SMALL_DATA_BLOCK_LENGTH as usize, &mut data);
            if v == null_value && multi_data_null == NO_DATA_NULL_OFFSET {
                multi_data_null = off;
            }
            off
        } else {
            let off = data.len() as u32;
            data.extend_from_slice(&vals);
            off
        };
        *slot = offset;
    }

    let data_null_offset = if multi_data_null != NO_DATA_NULL_OFFSET {
        multi_data_null
    } else {
        fast_data_null
    };

    if data.len() as u32 > MAX_DATA_OFFSET {
        return Err(limit_error("compacted data array exceeds the structural limit"));
    }

    // --- Index-3 blocks: 32 small-block offsets per 512-cp span. ---
    let num_index3 = num_small / INDEX_3_BLOCK_LENGTH as usize;
    let index1_start = fast_blocks;
    let num_index1 = if num_small == 0 {
        0
    } else {
        ((high_start + CP_PER_INDEX_1_ENTRY - 1) / CP_PER_INDEX_1_ENTRY) as usize
    };
    let index3_start = index1_start + num_index1;

    let mut index3_region: Vec<u16> = Vec::new();
    let mut index3_dedup: HashMap<Vec<u16>, usize> = HashMap::new();
    let mut i3_abs = vec![0u16; num_index3];
    for g in 0..num_index3 {
        let entries = &small_block_offset[g * INDEX_3_BLOCK_LENGTH as usize..(g + 1) * INDEX_3_BLOCK_LENGTH as usize];
        let max_off = *entries.iter().max().unwrap();
        let (content, flag): (Vec<u16>, u16) = if max_off <= 0xFFFF {
            (entries.iter().map(|&v| v as u16).collect(), 0)
        } else {
            (pack_18bit(entries), 0x8000)
        };
        let local = *index3_dedup.entry(content.clone()).or_insert_with(|| {
            let local = index3_region.len();
            index3_region.extend(content);
            local
        });
        let abs = index3_start + local;
        if abs >= NO_INDEX_3_NULL_OFFSET as usize {
            return Err(limit_error("index-3 block address exceeds the 15-bit limit"));
        }
        i3_abs[g] = (abs as u16) | flag;
    }

    let index3_null_offset = if data_null_offset != NO_DATA_NULL_OFFSET {
        let key: Vec<u16> = vec![data_null_offset as u16; INDEX_3_BLOCK_LENGTH as usize];
        index3_dedup
            .get(&key)
            .map(|&local| (index3_start + local) as u32)
            .unwrap_or(NO_INDEX_3_NULL_OFFSET)
    } else {
        NO_INDEX_3_NULL_OFFSET
    };

    // --- Index-2 blocks: 32 index-3 offsets per 16384-cp span. ---
    let index2_start = index3_start + index3_region.len();
    let mut index2_region: Vec<u16> = Vec::new();
    let mut index2_dedup: HashMap<Vec<u16>, usize> = HashMap::new();
    let mut index1 = vec![0u16; num_index1];
    for i1 in 0..num_index1 {
        let mut entries2 = vec![0u16; INDEX_2_BLOCK_LENGTH as usize];
        for sub in 0..INDEX_2_BLOCK_LENGTH as usize {
            let g = i1 * INDEX_2_BLOCK_LENGTH as usize + sub;
            if g < num_index3 {
                entries2[sub] = i3_abs[g];
            }
        }
        let local = *index2_dedup.entry(entries2.clone()).or_insert_with(|| {
            let local = index2_region.len();
            index2_region.extend(entries2);
            local
        });
        let abs = index2_start + local;
        index1[i1] = u16::try_from(abs).map_err(|_| limit_error("index-2 block address exceeds 16 bits"))?;
    }

    let mut index = Vec::with_capacity(index2_start + index2_region.len());
    index.extend_from_slice(&fast_index);
    index.extend_from_slice(&index1);
    index.extend_from_slice(&index3_region);
    index.extend_from_slice(&index2_region);
    if index.len() % 2 != 0 {
        index.push(0);
    }

    data.push(high_value);
    data.push(error_value);

    let values = ValueArray::from_u32_slice(width, &data);
    Ok(ImmutableTrie::from_parts(
        index,
        values,
        high_start,
        index3_null_offset,
        data_null_offset,
        null_value,
        error_value,
        index1_start,
    ))
}

fn fast_block_count<K: TrieKind>() -> usize {
    (K::FAST_LIMIT >> FAST_SHIFT) as usize
}

/// Packs 32 data offsets (at least one exceeding 16 bits) into the 36-word
/// group-of-9 layout the lookup side decodes in `trie::multi_stage_data_index`.
fn pack_18bit(entries: &[u32]) -> Vec<u16> {
    let mut out = Vec::with_capacity(INDEX_3_18BIT_BLOCK_LENGTH as usize);
    for group in entries.chunks(8) {
        let mut high_word: u32 = 0;
        for (k, &off) in group.iter().enumerate() {
            let high2 = (off >> 16) & 0x3;
            high_word |= high2 << (2 * k);
        }
        out.push(high_word as u16);
        for &off in group {
            out.push((off & 0xFFFF) as u16);
        }
    }
    out
}
