use std::path::Path;

use anyhow::{anyhow, Result};
use cp_trie::{ByteOrder, CodePointMap};

use super::dump::AnyTrie;
use super::{KindArg, WidthArg};

/// Re-serializes a trie in the opposite byte order and checks that every
/// sampled code point still maps to the same value.
pub(crate) fn roundtrip(input: &Path, kind: &KindArg, width: &WidthArg) -> Result<()> {
    let trie = AnyTrie::load(input, kind, width)?;

    let samples: Vec<i32> = (0..0x10FFFF)
        .step_by(4001)
        .chain([0, 0x7F, 0x7FF, 0xFFFF, 0x10000, 0x10FFFF, -1, 0x110000])
        .collect();

    for order in [ByteOrder::Big, ByteOrder::Little] {
        let (bytes, expected): (Vec<u8>, Vec<(i32, u32)>) = match &trie {
            AnyTrie::Fast(t) => (
                t.to_binary(order),
                samples.iter().map(|&cp| (cp, t.get(cp))).collect(),
            ),
            AnyTrie::Small(t) => (
                t.to_binary(order),
                samples.iter().map(|&cp| (cp, t.get(cp))).collect(),
            ),
        };
        let back_kind = kind.clone();
        let back = AnyTrieOwned::decode(&bytes, &back_kind, width)?;
        for (cp, value) in &expected {
            let got = match &back {
                AnyTrieOwned::Fast(t) => t.get(*cp),
                AnyTrieOwned::Small(t) => t.get(*cp),
            };
            if got != *value {
                return Err(anyhow!(
                    "roundtrip mismatch at cp {cp:#x} under {order:?}: expected {value:#x}, got {got:#x}"
                ));
            }
        }
        println!("{order:?}: {} sampled code points match", expected.len());
    }
    Ok(())
}

enum AnyTrieOwned {
    Fast(cp_trie::ImmutableTrie<cp_trie::Fast>),
    Small(cp_trie::ImmutableTrie<cp_trie::Small>),
}

impl AnyTrieOwned {
    fn decode(bytes: &[u8], kind: &KindArg, width: &WidthArg) -> Result<Self> {
        Ok(match kind {
            KindArg::Fast => AnyTrieOwned::Fast(
                cp_trie::ImmutableTrie::<cp_trie::Fast>::from_binary(bytes, Some((*width).into()))
                    .map_err(anyhow::Error::from)?,
            ),
            KindArg::Small => AnyTrieOwned::Small(
                cp_trie::ImmutableTrie::<cp_trie::Small>::from_binary(
                    bytes,
                    Some((*width).into()),
                )
                .map_err(anyhow::Error::from)?,
            ),
        })
    }
}
