//! Mutable builder for [`crate::trie::ImmutableTrie`].
//!
//! The builder holds a flat, uncompacted representation: one entry per
//! 16-code-point block, either a repeated value or an offset into an
//! expandable data array. `set`/`set_range` never touch more than the
//! blocks they overlap; compaction happens once, in
//! [`Self::build_immutable`].

mod compact;

use crate::constants::*;
use crate::map::{apply_filter, apply_surrogate_policy, CodePointMap, Range, RangeOption, ValueFilter};
use crate::trie::TrieKind;
use crate::value::Width;

const NUM_BLOCKS: usize = (CODE_POINT_LIMIT / SMALL_DATA_BLOCK_LENGTH) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockFlag {
    AllSame(u32),
    Mixed(u32),
}

/// Mutable, single-writer intermediate representation of a code-point map.
#[derive(Debug, Clone)]
pub struct Builder {
    pub(crate) flags: Vec<BlockFlag>,
    pub(crate) data: Vec<u32>,
    pub(crate) initial_value: u32,
    pub(crate) error_value: u32,
}

fn validate_cp(cp: i32) -> u32 {
    assert!(
        (0..=MAX_CODE_POINT as i32).contains(&cp),
        "code point {cp:#x} outside [0, 0x10FFFF]"
    );
    cp as u32
}

impl Builder {
    pub fn new(initial_value: u32, error_value: u32) -> Self {
        Builder {
            flags: vec![BlockFlag::AllSame(initial_value); NUM_BLOCKS],
            data: Vec::new(),
            initial_value,
            error_value,
        }
    }

    /// Replays every range of `map` (as reported by `get_range`) into a
    /// fresh builder, using `map`'s value at `U+10FFFF` as the initial
    /// value so the resulting `highStart` stays small.
    pub fn from_map<M: CodePointMap>(map: &M) -> Self {
        let initial_value = map.get(MAX_CODE_POINT as i32);
        let mut builder = Builder::new(initial_value, initial_value);
        let mut cp = 0u32;
        while cp <= MAX_CODE_POINT {
            let range = map
                .get_range(cp, None, RangeOption::Normal, 0)
                .expect("cp within domain always yields a range");
            if range.value != initial_value {
                builder.set_range_raw(range.start, range.end, range.value);
            }
            if range.end == MAX_CODE_POINT {
                break;
            }
            cp = range.end + 1;
        }
        builder
    }

    fn block_index(cp: u32) -> usize {
        (cp >> SHIFT_3) as usize
    }

    fn materialize(&mut self, bi: usize) -> u32 {
        match self.flags[bi] {
            BlockFlag::Mixed(off) => off,
            BlockFlag::AllSame(v) => {
                let off = self.data.len() as u32;
                self.data
                    .extend(std::iter::repeat(v).take(SMALL_DATA_BLOCK_LENGTH as usize));
                self.flags[bi] = BlockFlag::Mixed(off);
                off
            }
        }
    }

    pub fn get(&self, cp: i32) -> u32 {
        if cp < 0 || cp as u32 > MAX_CODE_POINT {
            return self.error_value;
        }
        let cp = cp as u32;
        match self.flags[Self::block_index(cp)] {
            BlockFlag::AllSame(v) => v,
            BlockFlag::Mixed(off) => self.data[(off + (cp & SMALL_DATA_MASK)) as usize],
        }
    }

    pub fn set(&mut self, cp: i32, value: u32) {
        let cp = validate_cp(cp);
        self.set_range_raw(cp, cp, value);
    }

    pub fn set_range(&mut self, start: i32, end: i32, value: u32) {
        let start = validate_cp(start);
        let end = validate_cp(end);
        assert!(start <= end, "range start {start:#x} exceeds end {end:#x}");
        self.set_range_raw(start, end, value);
    }

    fn set_range_raw(&mut self, start: u32, end: u32, value: u32) {
        let mut cp = start;
        while cp <= end {
            let bi = Self::block_index(cp);
            let block_start = (bi as u32) << SHIFT_3;
            let block_end = block_start + SMALL_DATA_MASK;
            if block_start >= start && block_end <= end {
                self.flags[bi] = BlockFlag::AllSame(value);
            } else {
                let off = self.materialize(bi);
                let lo = cp.max(block_start);
                let hi = end.min(block_end);
                for c in lo..=hi {
                    self.data[(off + (c - block_start)) as usize] = value;
                }
            }
            cp = block_end + 1;
        }
    }

    /// Enumerates the maximal same-(filtered-)value run starting at `start`
    /// by walking this builder's native 16-cp blocks directly — an
    /// `AllSame` block is a single comparison, a `Mixed` block is scanned
    /// once from its data offset — rather than calling `get` per cp.
    fn get_range_blocks(
        &self,
        start: u32,
        filter: ValueFilter<'_>,
        range_option: RangeOption,
        surrogate_value: u32,
    ) -> Option<Range> {
        if start > MAX_CODE_POINT {
            return None;
        }
        let mut c = start;
        let mut value: Option<u32> = None;
        loop {
            let bi = Self::block_index(c);
            let block_start = (bi as u32) << SHIFT_3;
            let block_end = (block_start + SMALL_DATA_MASK).min(MAX_CODE_POINT);

            let mismatch_at = match self.flags[bi] {
                BlockFlag::AllSame(v) => {
                    let fv = apply_filter(filter, v);
                    match value {
                        None => {
                            value = Some(fv);
                            None
                        }
                        Some(cur) if cur != fv => Some(c),
                        _ => None,
                    }
                }
                BlockFlag::Mixed(off) => {
                    let mut cc = c;
                    let mut found = None;
                    loop {
                        let fv = apply_filter(filter, self.data[(off + (cc - block_start)) as usize]);
                        match value {
                            None => value = Some(fv),
                            Some(cur) if cur != fv => {
                                found = Some(cc);
                                break;
                            }
                            _ => {}
                        }
                        if cc == block_end {
                            break;
                        }
                        cc += 1;
                    }
                    found
                }
            };

            if let Some(m) = mismatch_at {
                let range = Range { start, end: m - 1, value: value.unwrap() };
                return Some(apply_surrogate_policy(range, range_option, surrogate_value));
            }
            if block_end == MAX_CODE_POINT {
                let range = Range { start, end: MAX_CODE_POINT, value: value.unwrap() };
                return Some(apply_surrogate_policy(range, range_option, surrogate_value));
            }
            c = block_end + 1;
        }
    }

    /// Finalizes this builder into an immutable, compacted trie of shape
    /// `K` with the given value width. Consumes the builder (construction
    /// is destructive, matching the single-pass compaction it runs).
    pub fn build_immutable<K: TrieKind>(
        self,
        width: Width,
    ) -> crate::error::Result<crate::trie::ImmutableTrie<K>> {
        compact::build_immutable(self, width)
    }
}

impl CodePointMap for Builder {
    fn get(&self, cp: i32) -> u32 {
        Builder::get(self, cp)
    }

    fn get_range(
        &self,
        start: u32,
        filter: ValueFilter<'_>,
        range_option: RangeOption,
        surrogate_value: u32,
    ) -> Option<Range> {
        self.get_range_blocks(start, filter, range_option, surrogate_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_is_uniform() {
        let b = Builder::new(5, 5);
        assert_eq!(b.get(0), 5);
        assert_eq!(b.get(MAX_CODE_POINT as i32), 5);
        let r = b.get_range(0, None, RangeOption::Normal, 0).unwrap();
        assert_eq!(r, Range { start: 0, end: MAX_CODE_POINT, value: 5 });
    }

    #[test]
    fn set_range_overwrites_partial_blocks() {
        let mut b = Builder::new(0, 0);
        b.set_range(5, 20, 3);
        assert_eq!(b.get(4), 0);
        assert_eq!(b.get(5), 3);
        assert_eq!(b.get(20), 3);
        assert_eq!(b.get(21), 0);
    }

    #[test]
    fn single_set_then_overwrite() {
        let mut b = Builder::new(0, 0);
        b.set(100, 1);
        b.set(100, 2);
        assert_eq!(b.get(100), 2);
        assert_eq!(b.get(99), 0);
        assert_eq!(b.get(101), 0);
    }

    #[test]
    #[should_panic]
    fn set_out_of_domain_panics() {
        let mut b = Builder::new(0, 0);
        b.set(-1, 1);
    }

    #[test]
    fn from_map_round_trips_ranges() {
        let mut b = Builder::new(0, 0);
        b.set_range(0x100, 0x200, 7);
        let b2 = Builder::from_map(&b);
        for cp in [0x0, 0xff, 0x100, 0x180, 0x200, 0x201] {
            assert_eq!(b.get(cp), b2.get(cp));
        }
    }
}
