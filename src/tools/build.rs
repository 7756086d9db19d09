use std::fs;

use anyhow::{anyhow, Context, Result};
use cp_trie::{Builder, Fast, Small};

use super::{BuildArgs, KindArg, WidthArg};

/// Parses one `start[..end] value` line. Both code points and the value
/// accept decimal or `0x`-prefixed hex.
fn parse_line(line: &str) -> Result<Option<(u32, u32, u32)>> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }
    let mut parts = line.split_whitespace();
    let range = parts
        .next()
        .ok_or_else(|| anyhow!("missing code point range in line: {line}"))?;
    let value = parts
        .next()
        .ok_or_else(|| anyhow!("missing value in line: {line}"))?;
    let value = parse_num(value)?;
    let (start, end) = match range.split_once("..") {
        Some((s, e)) => (parse_num(s)?, parse_num(e)?),
        None => {
            let cp = parse_num(range)?;
            (cp, cp)
        }
    };
    Ok(Some((start, end, value)))
}

fn parse_num(s: &str) -> Result<u32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse()?)
    }
}

pub(crate) fn build_trie(kind: &KindArg, width: &WidthArg, args: &BuildArgs) -> Result<()> {
    let text = fs::read_to_string(&args.ranges)
        .with_context(|| format!("reading {}", args.ranges.display()))?;

    let mut builder = Builder::new(0, 0);
    for line in text.lines() {
        if let Some((start, end, value)) = parse_line(line)? {
            builder.set_range(start as i32, end as i32, value);
        }
    }

    let bytes = match kind {
        KindArg::Fast => {
            let trie = builder
                .build_immutable::<Fast>((*width).into())
                .map_err(anyhow::Error::from)?;
            trie.to_binary(cp_trie::ByteOrder::Big)
        }
        KindArg::Small => {
            let trie = builder
                .build_immutable::<Small>((*width).into())
                .map_err(anyhow::Error::from)?;
            trie.to_binary(cp_trie::ByteOrder::Big)
        }
    };

    fs::write(&args.output, bytes)
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(())
}
