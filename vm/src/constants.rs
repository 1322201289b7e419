//! Layout constants shared by every module.
//!
//! These mirror the fixed physical-memory layout from the specification:
//! a 2^16-word address space, 32 frames of 2048 words each, an OS header
//! in words 0..11, a PCB list starting at word 12, and a page-table region
//! starting at word 0x1000.

/// Total number of 16-bit words in physical memory (2^16).
pub const PHYS_MEM_WORDS: usize = 1 << 16;

/// Number of bits in a virtual address offset (2048-word pages).
pub const PAGE_SIZE_WORDS: usize = 2048;

/// Number of physical frames the free-frame bitmap tracks.
pub const FRAME_COUNT: usize = 32;

/// Number of low bits of a virtual address that form the page offset.
pub const VPN_SHIFT: u16 = 11;

/// Mask selecting the in-page offset bits of a virtual address.
pub const OFFSET_MASK: u16 = 0x7FF;

/// Virtual pages below this VPN are the reserved OS region.
pub const RESERVED_VPN_LIMIT: u16 = 6;

// ---------------------------------------------------------------------------
// OS header (words 0..11)
// ---------------------------------------------------------------------------

pub const HDR_CUR_PROC_ID: usize = 0;
pub const HDR_PROC_COUNT: usize = 1;
pub const HDR_OS_STATUS: usize = 2;
pub const HDR_BITMAP_HI: usize = 3;
pub const HDR_BITMAP_LO: usize = 4;
/// First header word that is reserved/unused (zeroed at boot).
pub const HDR_RESERVED_START: usize = 5;
/// Sentinel "no current process" value, also used to tombstone a PCB.
pub const INVALID_PID: u16 = 0xFFFF;
/// `OSStatus` bit 0: the PCB list is at capacity.
pub const OS_STATUS_FULL: u16 = 0x0001;

// ---------------------------------------------------------------------------
// PCB list
// ---------------------------------------------------------------------------

/// Word offset of the first PCB.
pub const PCB_LIST_BASE: usize = 12;
/// Words per PCB: `{ PID, PC, PTBR }`.
pub const PCB_SIZE: usize = 3;
pub const PCB_FIELD_PID: usize = 0;
pub const PCB_FIELD_PC: usize = 1;
pub const PCB_FIELD_PTBR: usize = 2;
/// `floor((4096 - PCB_LIST_BASE) / PCB_SIZE) = 1361`.
///
/// The reference implementation reuses its byte-granular `PAGE_SIZE`
/// (4096) rather than the word-granular frame size for this bound, so
/// the PCB list is treated as spanning one 4096-word region here too —
/// preserved for compatibility rather than recomputed from
/// `PAGE_SIZE_WORDS`.
pub const MAX_PROCESSES: usize = (4096 - PCB_LIST_BASE) / PCB_SIZE;

// ---------------------------------------------------------------------------
// Page tables
// ---------------------------------------------------------------------------

/// Word offset of process 0's page table (third physical frame).
pub const PAGE_TABLE_BASE: u16 = 0x1000;
/// Entries per page table, one per VPN.
pub const PAGE_TABLE_ENTRIES: u16 = 32;

// ---------------------------------------------------------------------------
// Process image layout
// ---------------------------------------------------------------------------

pub const PC_START: u16 = 0x3000;
pub const CODE_VPN_START: u16 = 6;
pub const CODE_PAGES: usize = 2;
pub const HEAP_VPN_START: u16 = 8;
pub const HEAP_PAGES: usize = 2;

// ---------------------------------------------------------------------------
// Trap vectors
// ---------------------------------------------------------------------------

pub const TRAP_VEC_BASE: u16 = 0x20;
pub const TRAP_VEC_COUNT: u16 = 10;
