//! Command-line surface (§4.10).
//!
//! Mirrors `gluon`'s `clap::Parser` derive style: a flat struct with one
//! repeatable pair of options per process and a `-v` counter that feeds
//! `env_logger`'s filter.

use std::path::PathBuf;

use clap::Parser;

/// Run the LC-3 OS virtual machine over one or more processes.
#[derive(Debug, Parser)]
#[command(name = "lc3os", version, about)]
pub struct Cli {
    /// Path to a process's code image. Repeat `--code`/`--heap` in pairs,
    /// in creation order.
    #[arg(long = "code", required = true)]
    pub code: Vec<PathBuf>,

    /// Path to a process's heap image, paired positionally with `--code`.
    #[arg(long = "heap", required = true)]
    pub heap: Vec<PathBuf>,

    /// Increase log verbosity: unset is warn, `-v` info, `-vv` debug,
    /// `-vvv` trace.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Override the maximum number of processes the PCB list can hold.
    #[arg(long)]
    pub max_processes: Option<usize>,
}

impl Cli {
    /// Maps the `-v` count to an `env_logger`/`log` level filter string.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
