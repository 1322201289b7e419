//! VM-fatal error types.
//!
//! [`Fault`] covers the guest faults the address translator can raise
//! (§7 category 1 in the specification): reserved-region access, unmapped
//! access, and permission violations. All four are fatal to the whole VM;
//! the run loop is the only place that converts a `Fault` into process
//! termination and an exit code, per the "surface a typed fault value"
//! re-architecture hint.
//!
//! [`ImageError`] covers I/O failure while loading a process image, which
//! the specification calls fatal at process-creation time.

use std::path::PathBuf;

use thiserror::Error;

/// A fault raised by the address translator or the instruction decoder.
///
/// Every variant's `Display` text is the exact diagnostic string the
/// specification requires to be printed before the VM exits.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("Segmentation fault.")]
    SegFaultReserved,

    #[error("Segmentation fault inside free space.")]
    SegFaultUnmapped,

    #[error("Cannot read from a write-only page.")]
    SegFaultPermRead,

    #[error("Cannot write to a read-only page.")]
    SegFaultPermWrite,

    /// `trapvec` fell outside `0x20..0x29`. Undefined behaviour in the
    /// original; this implementation treats it as VM-fatal (see
    /// `DESIGN.md`, open question on the trap table).
    #[error("Undefined trap vector 0x{0:02x}.")]
    BadTrapVector(u16),
}

/// Failure to load a process's code or heap image from disk.
#[derive(Debug, Error)]
#[error("cannot open image {path}: {source}")]
pub struct ImageError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}
