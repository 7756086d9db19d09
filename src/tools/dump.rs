use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cp_trie::{CodePointMap, Fast, ImmutableTrie, RangeOption, Small};

use super::{KindArg, WidthArg};

pub(crate) enum AnyTrie {
    Fast(ImmutableTrie<Fast>),
    Small(ImmutableTrie<Small>),
}

impl AnyTrie {
    pub(crate) fn load(input: &Path, kind: &KindArg, width: &WidthArg) -> Result<Self> {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        Ok(match kind {
            KindArg::Fast => AnyTrie::Fast(
                ImmutableTrie::<Fast>::from_binary(&bytes, Some((*width).into()))
                    .map_err(anyhow::Error::from)?,
            ),
            KindArg::Small => AnyTrie::Small(
                ImmutableTrie::<Small>::from_binary(&bytes, Some((*width).into()))
                    .map_err(anyhow::Error::from)?,
            ),
        })
    }

    pub(crate) fn get(&self, cp: i32) -> u32 {
        match self {
            AnyTrie::Fast(t) => t.get(cp),
            AnyTrie::Small(t) => t.get(cp),
        }
    }

    pub(crate) fn get_range(&self, start: u32) -> Option<cp_trie::Range> {
        match self {
            AnyTrie::Fast(t) => t.get_range(start, None, RangeOption::Normal, 0),
            AnyTrie::Small(t) => t.get_range(start, None, RangeOption::Normal, 0),
        }
    }
}

pub(crate) fn dump_trie(input: &Path, kind: &KindArg, width: &WidthArg) -> Result<()> {
    let trie = AnyTrie::load(input, kind, width)?;
    let mut cp = 0u32;
    loop {
        let range = trie
            .get_range(cp)
            .expect("cp within domain always yields a range");
        println!("{:#08X}..={:#08X} = {:#X}", range.start, range.end, range.value);
        if range.end == 0x10FFFF {
            break;
        }
        cp = range.end + 1;
    }
    let _ = trie.get(0);
    Ok(())
}
