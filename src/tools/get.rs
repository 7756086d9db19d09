use std::path::Path;

use anyhow::{anyhow, Result};

use super::{GetArgs, KindArg, WidthArg};

fn parse_cp(s: &str) -> Result<i32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(i32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse()?)
    }
}

pub(crate) fn get_values(
    input: &Path,
    kind: &KindArg,
    width: &WidthArg,
    args: &GetArgs,
) -> Result<()> {
    if args.code_points.is_empty() {
        return Err(anyhow!("no code points given"));
    }
    let trie = super::dump::AnyTrie::load(input, kind, width)?;
    for raw in &args.code_points {
        let cp = parse_cp(raw)?;
        println!("{raw} -> {:#X}", trie.get(cp));
    }
    Ok(())
}
