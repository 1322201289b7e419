//! Free-frame bitmap allocator (§4.1).
//!
//! Bit `31 - pfn` is set iff frame `pfn` is free. The two-word physical
//! layout (`BitmapHi`/`BitmapLo`) is a storage detail of [`PhysicalMemory`];
//! this module exposes a single typed `u32` view over it, per the
//! re-architecture hint not to leak the split into allocator logic.

use crate::constants::FRAME_COUNT;
use crate::memory::PhysicalMemory;

/// Frames 0 and 1 hold the OS header/PCB list, frame 2 holds page tables.
/// They are permanently excluded from allocation.
const RESERVED_FRAMES: u32 = 3;

/// A view over the bitmap word stored in physical memory.
pub struct FreeFrameBitmap<'a> {
    mem: &'a mut PhysicalMemory,
}

impl<'a> FreeFrameBitmap<'a> {
    pub fn new(mem: &'a mut PhysicalMemory) -> Self {
        Self { mem }
    }

    fn bits(&self) -> u32 {
        self.mem.bitmap_raw()
    }

    fn set_bits(&mut self, bits: u32) {
        self.mem.set_bitmap_raw(bits);
    }

    /// True if at least `n` frames are currently free.
    pub fn has_free(&self, n: u32) -> bool {
        self.bits().count_ones() >= n
    }

    /// Number of frames currently free.
    pub fn free_count(&self) -> u32 {
        self.bits().count_ones()
    }

    /// Allocates the highest-indexed free frame, returning its PFN.
    ///
    /// Scans bits 31..0 and takes the first set bit (`bitIndex`); the PFN
    /// is `31 - bitIndex`, so frames are handed out in ascending PFN order
    /// starting at [`RESERVED_FRAMES`]. Returns `None` if no frame is free.
    pub fn allocate(&mut self) -> Option<u8> {
        let bits = self.bits();
        if bits == 0 {
            return None;
        }
        let bit_index = 31 - bits.leading_zeros();
        let pfn = 31 - bit_index;
        self.set_bits(bits & !(1 << bit_index));
        Some(pfn as u8)
    }

    /// Marks `pfn` free again. Idempotent on an already-free frame.
    pub fn release(&mut self, pfn: u8) {
        let bit_index = 31 - pfn as u32;
        self.set_bits(self.bits() | (1 << bit_index));
    }
}
