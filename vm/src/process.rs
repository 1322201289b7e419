//! Process control blocks and process lifecycle (§4.6, C5/C6).

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::alloc::{alloc_mem, free_mem};
use crate::bitmap::FreeFrameBitmap;
use crate::constants::*;
use crate::error::ImageError;
use crate::loader::load_image;
use crate::memory::PhysicalMemory;
use crate::page_table::ptbr_of;
use crate::registers::Registers;

/// A process control block: `{ PID, PC, PTBR }`.
///
/// A PCB with `pid == INVALID_PID` is a tombstone: the process has halted
/// and its slot is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pcb {
    pub pid: u16,
    pub pc: u16,
    pub ptbr: u16,
}

fn pcb_index(pid: u16) -> usize {
    PCB_LIST_BASE + pid as usize * PCB_SIZE
}

/// Reads the PCB for `pid` out of the PCB list.
pub fn read_pcb(mem: &PhysicalMemory, pid: u16) -> Pcb {
    let base = pcb_index(pid) as u16;
    Pcb {
        pid: mem.read(base + PCB_FIELD_PID as u16),
        pc: mem.read(base + PCB_FIELD_PC as u16),
        ptbr: mem.read(base + PCB_FIELD_PTBR as u16),
    }
}

/// Writes `pcb` into the PCB list at `pid`'s slot.
pub fn write_pcb(mem: &mut PhysicalMemory, pid: u16, pcb: Pcb) {
    let base = pcb_index(pid) as u16;
    mem.write(base + PCB_FIELD_PID as u16, pcb.pid);
    mem.write(base + PCB_FIELD_PC as u16, pcb.pc);
    mem.write(base + PCB_FIELD_PTBR as u16, pcb.ptbr);
}

/// Tombstones the PCB at `pid` by setting its PID field to [`INVALID_PID`].
pub fn tombstone(mem: &mut PhysicalMemory, pid: u16) {
    let base = pcb_index(pid) as u16;
    mem.write(base + PCB_FIELD_PID as u16, INVALID_PID);
}

/// Copies `PC`/`PTBR` from `pid`'s PCB into the CPU registers and sets
/// `CurProcID`. Performs no validation.
pub fn load_proc(mem: &mut PhysicalMemory, reg: &mut Registers, pid: u16) {
    let pcb = read_pcb(mem, pid);
    reg.pc = pcb.pc;
    reg.ptbr = pcb.ptbr;
    mem.set_cur_proc_id(pid);
}

/// Unmaps every valid page in `ptbr`'s table, covering `start_vpn..=end_vpn`.
fn free_range(mem: &mut PhysicalMemory, ptbr: u16, start_vpn: u16, end_vpn: u16) {
    for vpn in start_vpn..=end_vpn {
        free_mem(mem, vpn, ptbr);
    }
}

/// Creates a process from already-open code/heap image readers.
///
/// Returns `Ok(true)` on success, `Ok(false)` if an OS resource
/// constraint (PCB list full, or frame exhaustion during code/heap
/// allocation) prevented creation — a recoverable condition, per §7.
///
/// `ProcCount` is incremented as soon as the three preconditions pass,
/// before the per-segment `allocMem` calls that can still fail. A failed
/// creation past that point therefore permanently leaks the PCB slot and
/// PID, matching the reference implementation; see `DESIGN.md`.
pub fn create_proc<R1: Read, R2: Read>(
    mem: &mut PhysicalMemory,
    code: R1,
    heap: R2,
) -> std::io::Result<bool> {
    if mem.os_status_full() {
        println!("The OS memory region is full. Cannot create a new PCB.");
        return Ok(false);
    }
    if !FreeFrameBitmap::new(mem).has_free(CODE_PAGES as u32) {
        println!("Cannot create code segment.");
        return Ok(false);
    }
    if !FreeFrameBitmap::new(mem).has_free(HEAP_PAGES as u32) {
        println!("Cannot create heap segment.");
        return Ok(false);
    }

    let pid = mem.proc_count();
    mem.set_proc_count(pid + 1);
    let ptbr = ptbr_of(pid);
    write_pcb(
        mem,
        pid,
        Pcb {
            pid,
            pc: PC_START,
            ptbr,
        },
    );
    debug!("process {pid}: ptbr=0x{ptbr:04x}");

    let code_end_vpn = CODE_VPN_START + CODE_PAGES as u16 - 1;
    let mut code_offsets = Vec::with_capacity(CODE_PAGES);
    for i in 0..CODE_PAGES as u16 {
        code_offsets.push(alloc_mem(mem, ptbr, CODE_VPN_START + i, true, false));
    }
    if code_offsets.iter().any(|&o| o == 0) {
        println!("Cannot allocate memory for code segment.");
        free_range(mem, ptbr, CODE_VPN_START, code_end_vpn);
        return Ok(false);
    }
    load_image(mem, code, &code_offsets)?;

    let heap_end_vpn = HEAP_VPN_START + HEAP_PAGES as u16 - 1;
    let mut heap_offsets = Vec::with_capacity(HEAP_PAGES);
    for i in 0..HEAP_PAGES as u16 {
        heap_offsets.push(alloc_mem(mem, ptbr, HEAP_VPN_START + i, true, true));
    }
    if heap_offsets.iter().any(|&o| o == 0) {
        println!("Cannot allocate memory for heap segment.");
        free_range(mem, ptbr, CODE_VPN_START, code_end_vpn);
        free_range(mem, ptbr, HEAP_VPN_START, heap_end_vpn);
        return Ok(false);
    }
    load_image(mem, heap, &heap_offsets)?;

    if mem.proc_count() as usize == MAX_PROCESSES {
        mem.set_os_status_full(true);
    }

    info!("process {pid} created");
    Ok(true)
}

/// Creates a process from code/heap image files on disk.
///
/// An unopenable image file is fatal at process-creation time (§7), so
/// this returns [`ImageError`] rather than the recoverable `bool` that
/// [`create_proc`] uses for OS resource exhaustion.
pub fn create_proc_from_files(
    mem: &mut PhysicalMemory,
    code_path: &Path,
    heap_path: &Path,
) -> Result<bool, ImageError> {
    // Read each file fully up front so an I/O failure can be attributed to
    // the file that actually caused it; `create_proc` then reads from
    // in-memory cursors, which never fail.
    let read = |p: &Path| -> Result<Vec<u8>, ImageError> {
        std::fs::read(p).map_err(|source| ImageError {
            path: PathBuf::from(p),
            source,
        })
    };
    let code = Cursor::new(read(code_path)?);
    let heap = Cursor::new(read(heap_path)?);
    let created = create_proc(mem, code, heap).expect("in-memory cursor reads cannot fail");
    if !created {
        warn!("createProc rejected {code_path:?} / {heap_path:?}");
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_table::{self};
    use std::io::Cursor;

    fn empty() -> Cursor<Vec<u8>> {
        Cursor::new(Vec::new())
    }

    #[test]
    fn successful_create_proc_maps_four_frames_with_expected_permissions() {
        let mut mem = PhysicalMemory::new();
        let before = FreeFrameBitmap::new(&mut mem).free_count();

        let ok = create_proc(&mut mem, empty(), empty()).unwrap();
        assert!(ok);

        let after = FreeFrameBitmap::new(&mut mem).free_count();
        assert_eq!(before - after, 4);

        let ptbr = ptbr_of(0);
        for vpn in [CODE_VPN_START, CODE_VPN_START + 1] {
            let pte = page_table::read(&mem, ptbr, vpn);
            assert!(pte.is_valid());
            assert!(pte.can_read());
            assert!(!pte.can_write());
        }
        for vpn in [HEAP_VPN_START, HEAP_VPN_START + 1] {
            let pte = page_table::read(&mem, ptbr, vpn);
            assert!(pte.is_valid());
            assert!(pte.can_read());
            assert!(pte.can_write());
        }

        let pcb = read_pcb(&mem, 0);
        assert_eq!(pcb, Pcb { pid: 0, pc: PC_START, ptbr });
    }

    #[test]
    fn create_proc_fails_when_only_three_frames_free() {
        let mut mem = PhysicalMemory::new();
        // Drain the bitmap down to exactly 3 free frames.
        {
            let mut bm = FreeFrameBitmap::new(&mut mem);
            while bm.free_count() > 3 {
                bm.allocate();
            }
        }

        let ok = create_proc(&mut mem, empty(), empty()).unwrap();
        assert!(!ok);

        // Code allocation succeeded and consumed 2 of the 3 frames, then
        // heap allocation partially failed; the code frames are released.
        let ptbr = ptbr_of(0);
        for vpn in [CODE_VPN_START, CODE_VPN_START + 1, HEAP_VPN_START, HEAP_VPN_START + 1] {
            assert!(!page_table::read(&mem, ptbr, vpn).is_valid());
        }
        // ProcCount was still incremented: this is the leaked-slot bug the
        // reference implementation exhibits, preserved per DESIGN.md.
        assert_eq!(mem.proc_count(), 1);
    }

    #[test]
    fn pcb_list_full_rejects_further_creation() {
        let mut mem = PhysicalMemory::new();
        mem.set_os_status_full(true);
        let ok = create_proc(&mut mem, empty(), empty()).unwrap();
        assert!(!ok);
        assert_eq!(mem.proc_count(), 0);
    }
}
