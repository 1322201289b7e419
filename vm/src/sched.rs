//! Cooperative scheduler: `YIELD` and `HALT` (§4.7, C7).
//!
//! All scheduling is initiated by trap instructions; there is no
//! preemption. Both operations scan the PCB ring forward from the current
//! process, modulo `ProcCount`, skipping tombstones — an explicit state
//! machine over the PCB array rather than host threads, per the
//! re-architecture hint.

use log::info;

use crate::alloc::free_mem;
use crate::constants::{INVALID_PID, PAGE_TABLE_ENTRIES};
use crate::memory::PhysicalMemory;
use crate::process::{load_proc, read_pcb, tombstone, write_pcb};
use crate::registers::Registers;

/// Finds the next runnable PCB after `from`, wrapping modulo `total`.
/// Returns `None` if `from` itself is the only runnable process.
fn next_runnable(mem: &PhysicalMemory, from: u16, total: u16) -> Option<u16> {
    let mut next = (from + 1) % total;
    while next != from {
        if read_pcb(mem, next).pid != INVALID_PID {
            return Some(next);
        }
        next = (next + 1) % total;
    }
    None
}

/// Handles the `YIELD` trap.
///
/// If another runnable process exists, saves the current `PC` into its
/// PCB (only on an actual switch — this save is skipped when no switch
/// happens), prints the switch diagnostic, and loads the next process.
/// Otherwise leaves everything untouched.
pub fn yield_proc(mem: &mut PhysicalMemory, reg: &mut Registers) {
    let cur_pid = mem.cur_proc_id();
    let total = mem.proc_count();

    match next_runnable(mem, cur_pid, total) {
        Some(next_pid) => {
            println!("We are switching from process {cur_pid} to {next_pid}.");
            let mut pcb = read_pcb(mem, cur_pid);
            pcb.pc = reg.pc;
            write_pcb(mem, cur_pid, pcb);
            load_proc(mem, reg, next_pid);
        }
        None => info!("process {cur_pid}: no other runnable process, continuing"),
    }
}

/// Handles the `HALT` trap.
///
/// Frees every page in the current process's table, tombstones its PCB,
/// then either loads the next runnable process or reports that the VM
/// should stop (no process left runnable). Does not save any PC for the
/// halted process.
pub fn halt_proc(mem: &mut PhysicalMemory, reg: &mut Registers) -> bool {
    let cur_pid = mem.cur_proc_id();
    let ptbr = reg.ptbr;

    for vpn in 0..PAGE_TABLE_ENTRIES {
        free_mem(mem, vpn, ptbr);
    }
    tombstone(mem, cur_pid);
    info!("process {cur_pid} halted");

    let total = mem.proc_count();
    match next_runnable(mem, cur_pid, total) {
        Some(next_pid) => {
            load_proc(mem, reg, next_pid);
            true
        }
        None => false,
    }
}
