//! Page frame allocation and deallocation (§4.4, §4.5).
//!
//! The dual meaning of the original `read`/`write` parameters (`0xFFFF` =
//! set, anything else = unset) is a wart kept only at the trap boundary;
//! internally these take a clean boolean pair, per the re-architecture
//! hint.

use crate::bitmap::FreeFrameBitmap;
use crate::constants::PAGE_SIZE_WORDS;
use crate::memory::PhysicalMemory;
use crate::page_table::{self, Pte, PteFlags};

/// Allocates a fresh frame for `vpn` in the table at `ptbr` with the given
/// permissions.
///
/// Returns the word offset of the allocated frame (`pfn * PAGE_SIZE_WORDS`),
/// or `0` if allocation failed: either no frame was free, or `vpn` already
/// had a valid mapping.
///
/// The bitmap is updated before the PTE is written, so a trap handler that
/// observes state between the two steps never sees a half-updated PTE: the
/// bitmap bit is already claimed while the PTE is still invalid, and the
/// PTE becomes valid only once the frame really is reserved.
pub fn alloc_mem(mem: &mut PhysicalMemory, ptbr: u16, vpn: u16, read: bool, write: bool) -> u16 {
    if page_table::read(mem, ptbr, vpn).is_valid() {
        return 0;
    }

    let pfn = match FreeFrameBitmap::new(mem).allocate() {
        Some(pfn) => pfn,
        None => return 0,
    };

    let mut flags = PteFlags::empty();
    if read {
        flags |= PteFlags::READ;
    }
    if write {
        flags |= PteFlags::WRITE;
    }
    page_table::write(mem, ptbr, vpn, Pte::new(pfn, flags));

    pfn as u16 * PAGE_SIZE_WORDS as u16
}

/// Unmaps `vpn` in the table at `ptbr`, freeing its frame.
///
/// No-op if the page was not mapped. Clears the PTE's valid bit before
/// releasing the bitmap bit, the mirror ordering of [`alloc_mem`], and
/// clears the `OSStatus` full flag since a frame became available.
pub fn free_mem(mem: &mut PhysicalMemory, vpn: u16, ptbr: u16) {
    let pte = page_table::read(mem, ptbr, vpn);
    if !pte.is_valid() {
        return;
    }

    page_table::write(mem, ptbr, vpn, Pte::INVALID);
    FreeFrameBitmap::new(mem).release(pte.pfn());
    mem.set_os_status_full(false);
}
