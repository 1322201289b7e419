//! Assembles a textual word-literal source into a code or heap image blob
//! that `lc3os run --code`/`--heap` can load directly (C10).
//!
//! Source format: one 16-bit word literal per line, decimal, `0x`-prefixed
//! hex, or `0b`-prefixed binary. `#` starts a line comment; blank lines are
//! ignored. The output is padded with zero words up to the segment's fixed
//! page count and truncated with an error if the source overflows it —
//! the reference tool silently truncated and, separately, never closed its
//! input file handle; neither behaviour is reproduced here.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use lc3os::constants::{CODE_PAGES, HEAP_PAGES, PAGE_SIZE_WORDS};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Segment {
    Code,
    Heap,
}

impl Segment {
    fn words(self) -> usize {
        match self {
            Segment::Code => CODE_PAGES * PAGE_SIZE_WORDS,
            Segment::Heap => HEAP_PAGES * PAGE_SIZE_WORDS,
        }
    }
}

/// Build a code or heap image from a textual word-literal source.
#[derive(Debug, Parser)]
#[command(name = "mkimage", version, about)]
struct Cli {
    /// Which fixed-size segment this source fills.
    #[arg(long, value_enum)]
    kind: Segment,

    /// Path to the word-literal source file.
    input: PathBuf,

    /// Path to write the little-endian image blob to.
    output: PathBuf,
}

fn parse_word(line: &str) -> Result<Option<u16>> {
    let trimmed = line.split('#').next().unwrap_or("").trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let word = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16)
    } else if let Some(bin) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        u16::from_str_radix(bin, 2)
    } else {
        trimmed.parse::<u16>()
    }
    .with_context(|| format!("invalid word literal: {trimmed:?}"))?;
    Ok(Some(word))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let mut words = Vec::new();
    for line in source.lines() {
        if let Some(word) = parse_word(line)? {
            words.push(word);
        }
    }

    let capacity = cli.kind.words();
    if words.len() > capacity {
        bail!(
            "source has {} words, which overflows the {:?} segment's {} words",
            words.len(),
            cli.kind,
            capacity
        );
    }
    words.resize(capacity, 0);

    let mut out = fs::File::create(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    for word in words {
        out.write_all(&word.to_le_bytes())?;
    }

    Ok(())
}
