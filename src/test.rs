//! Cross-module tests exercising the builder, both trie kinds, the codec,
//! and the cursor together, the way a caller actually uses them.

use insta::assert_yaml_snapshot;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use rstest::rstest;

use crate::builder::Builder;
use crate::codec::ByteOrder;
use crate::map::CodePointMap;
use crate::trie::{Fast, Small};
use crate::value::Width;

const BOUNDARY_CODE_POINTS: [i32; 13] = [
    0, 0x7F, 0x80, 0x7FF, 0x800, 0xD7FF, 0xD800, 0xDC00, 0xDFFF, 0xE000, 0xFFFF, 0x10000, 0x10FFFF,
];

#[rstest]
#[case(0, 0x10FFFF, 5)]
#[case(0x80, 0xFFFF, 7)]
#[case(0x7FF, 0x800, 11)]
#[case(0x10000, 0x10FFFF, 9)]
fn boundary_code_points_agree_with_builder(#[case] start: i32, #[case] end: i32, #[case] value: u32) {
    let mut builder = Builder::new(0, 1);
    builder.set_range(start, end, value);
    let fast = builder
        .clone()
        .build_immutable::<Fast>(Width::W32)
        .expect("compaction of a single range never exceeds structural limits");
    let small = builder
        .build_immutable::<Small>(Width::W32)
        .expect("compaction of a single range never exceeds structural limits");

    for &cp in &BOUNDARY_CODE_POINTS {
        let expected = if cp >= start && cp <= end { value } else { 0 };
        assert_eq!(fast.get(cp), expected, "fast mismatch at {cp:#x}");
        assert_eq!(small.get(cp), expected, "small mismatch at {cp:#x}");
    }
}

#[rstest]
#[case(Width::W8)]
#[case(Width::W16)]
#[case(Width::W32)]
fn codec_round_trips_every_width(#[case] width: Width) {
    let mut builder = Builder::new(0, 0xFF);
    builder.set_range(0x41, 0x5A, 1);
    builder.set_range(0x10000, 0x103FF, 2);
    let trie = builder
        .build_immutable::<Fast>(width)
        .expect("two small ranges stay well within structural limits");

    for order in [ByteOrder::Big, ByteOrder::Little] {
        let bytes = trie.to_binary(order);
        let back = crate::trie::ImmutableTrie::<Fast>::from_binary(&bytes, Some(width))
            .expect("a trie this crate just encoded decodes cleanly");
        for cp in BOUNDARY_CODE_POINTS {
            assert_eq!(trie.get(cp), back.get(cp), "{order:?} mismatch at {cp:#x}");
        }
    }
}

#[rstest]
#[case(Width::W8)]
#[case(Width::W16)]
#[case(Width::W32)]
fn codec_round_trips_every_width_for_small_kind(#[case] width: Width) {
    let mut builder = Builder::new(0, 0xFF);
    builder.set_range(0x41, 0x5A, 1);
    builder.set_range(0x10000, 0x103FF, 2);
    let trie = builder
        .build_immutable::<Small>(width)
        .expect("two small ranges stay well within structural limits");

    for order in [ByteOrder::Big, ByteOrder::Little] {
        let bytes = trie.to_binary(order);
        let back = crate::trie::ImmutableTrie::<Small>::from_binary(&bytes, Some(width))
            .expect("a trie this crate just encoded decodes cleanly");
        for cp in BOUNDARY_CODE_POINTS {
            assert_eq!(trie.get(cp), back.get(cp), "{order:?} mismatch at {cp:#x}");
        }
    }
}

/// A trie whose only non-default block sits inside the small null block
/// that the fast range carves out (the scenario from the module docs).
#[test]
fn get_range_decomposition_snapshot() {
    let mut builder = Builder::new(1, 0xFFFFFFFF);
    builder.set_range(0x880, 0x88F, 0);
    builder.set_range(0x890, 0x103F, 2);
    builder.set_range(0x1040, 0x1050, 0);
    builder.set_range(0x1051, 0xFFFF, 3);
    builder.set_range(0x10000, 0x1FFFF, 0);
    builder.set_range(0x20000, 0x10FFFF, 9);

    let trie = builder
        .build_immutable::<Fast>(Width::W32)
        .expect("a handful of disjoint ranges stays within structural limits");

    let mut ranges = Vec::new();
    let mut cp = 0u32;
    loop {
        let range = trie
            .get_range(cp, None, crate::map::RangeOption::Normal, 0)
            .expect("every code point in range yields a range");
        ranges.push((range.start, range.end, range.value));
        if range.end == 0x10FFFF {
            break;
        }
        cp = range.end + 1;
    }

    assert_yaml_snapshot!(ranges);
}

/// For any sequence of non-overlapping range assignments, a compacted
/// trie of either kind must agree with the builder it was compacted
/// from, everywhere, not just at the assigned ranges.
#[quickcheck]
fn compaction_preserves_every_value(assignments: Vec<(u32, u32, u8)>) -> TestResult {
    if assignments.is_empty() || assignments.len() > 12 {
        return TestResult::discard();
    }
    let mut builder = Builder::new(0, 0);
    for (start, len, value) in assignments {
        let start = start % 0x10FFFF;
        let end = (start + (len % 0x4000)).min(0x10FFFF);
        builder.set_range(start as i32, end as i32, value as u32);
    }

    let fast = match builder.clone().build_immutable::<Fast>(Width::W32) {
        Ok(t) => t,
        Err(_) => return TestResult::discard(),
    };
    let small = match builder.build_immutable::<Small>(Width::W32) {
        Ok(t) => t,
        Err(_) => return TestResult::discard(),
    };

    for cp in BOUNDARY_CODE_POINTS {
        if fast.get(cp) != small.get(cp) {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}

/// `get_range` must return contiguous, non-overlapping ranges that cover
/// the full domain and agree with `get` at every boundary.
#[quickcheck]
fn get_range_covers_the_domain_contiguously(start: i32, end: i32, value: u8) -> TestResult {
    if !(0..=0x10FFFF).contains(&start) || !(0..=0x10FFFF).contains(&end) || start > end {
        return TestResult::discard();
    }
    let mut builder = Builder::new(0, 0);
    builder.set_range(start, end, value as u32);
    let trie = match builder.build_immutable::<Fast>(Width::W32) {
        Ok(t) => t,
        Err(_) => return TestResult::discard(),
    };

    let mut cp = 0u32;
    let mut last_end: Option<u32> = None;
    loop {
        let range = trie
            .get_range(cp, None, crate::map::RangeOption::Normal, 0)
            .expect("every code point in range yields a range");
        if let Some(prev) = last_end {
            if range.start != prev + 1 {
                return TestResult::failed();
            }
        } else if range.start != 0 {
            return TestResult::failed();
        }
        if trie.get(range.start as i32) != range.value {
            return TestResult::failed();
        }
        last_end = Some(range.end);
        if range.end == 0x10FFFF {
            break;
        }
        cp = range.end + 1;
    }
    TestResult::passed()
}
