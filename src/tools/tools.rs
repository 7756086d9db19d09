mod build;
pub(crate) mod dump;
mod get;
mod roundtrip;

use build::build_trie;
use dump::dump_trie;
use get::get_values;
use roundtrip::roundtrip;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

/// Build, inspect, and round-trip compact code point tries from a shell.
#[derive(Clone, Debug, Parser)]
struct Args {
    /// path to a serialized trie, or (for `build`) the output path
    #[arg(short, long)]
    input: PathBuf,
    /// trie shape; defaults to fast
    #[arg(short, long, value_enum, default_value_t = KindArg::Fast)]
    kind: KindArg,
    /// stored value width; defaults to 32-bit
    #[arg(short, long, value_enum, default_value_t = WidthArg::W32)]
    width: WidthArg,
    #[command(subcommand)]
    operation: Operation,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum KindArg {
    Fast,
    Small,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum WidthArg {
    W8,
    W16,
    W32,
}

impl From<WidthArg> for cp_trie::Width {
    fn from(w: WidthArg) -> Self {
        match w {
            WidthArg::W8 => cp_trie::Width::W8,
            WidthArg::W16 => cp_trie::Width::W16,
            WidthArg::W32 => cp_trie::Width::W32,
        }
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Operation {
    /// Build a trie from a text file of `start[..end] value` assignments
    /// and write it to `--input`'s sibling `.bin` path.
    Build(BuildArgs),
    /// Print the `get_range` decomposition of a serialized trie.
    Dump,
    /// Print the mapped value for one or more code points.
    Get(GetArgs),
    /// Re-serialize in the opposite byte order and assert equivalence.
    Roundtrip,
}

/// Build a trie from a text range list.
#[derive(Clone, Debug, Parser)]
struct BuildArgs {
    /// text file of `start[..end] value` lines, one assignment per line
    ranges: PathBuf,
    /// where to write the serialized trie
    output: PathBuf,
}

/// Look up one or more code points.
#[derive(Clone, Debug, Parser)]
struct GetArgs {
    /// code points to look up, as decimal or `0x`-prefixed hex
    code_points: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    match &args.operation {
        Operation::Build(build_args) => build_trie(&args.kind, &args.width, build_args),
        Operation::Dump => dump_trie(&args.input, &args.kind, &args.width),
        Operation::Get(get_args) => get_values(&args.input, &args.kind, &args.width, get_args),
        Operation::Roundtrip => roundtrip(&args.input, &args.kind, &args.width),
    }
}
