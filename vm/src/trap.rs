//! Trap dispatch: host I/O traps and `BRK` (§4.7, §6, C7).
//!
//! `YIELD` and `HALT` live in [`crate::sched`]; this module owns the
//! traps that are local bookkeeping (`BRK`) or pure host I/O passthrough.

use std::io::{Read, Write};

use crate::alloc::{alloc_mem, free_mem};
use crate::bitmap::FreeFrameBitmap;
use crate::constants::{TRAP_VEC_BASE, TRAP_VEC_COUNT, VPN_SHIFT};
use crate::error::Fault;
use crate::memory::PhysicalMemory;
use crate::page_table;
use crate::registers::Registers;
use crate::sched::{halt_proc, yield_proc};

const TRAP_GETC: u16 = 0x20;
const TRAP_OUT: u16 = 0x21;
const TRAP_PUTS: u16 = 0x22;
const TRAP_IN: u16 = 0x23;
const TRAP_PUTSP: u16 = 0x24;
const TRAP_HALT: u16 = 0x25;
const TRAP_INU16: u16 = 0x26;
const TRAP_OUTU16: u16 = 0x27;
const TRAP_YIELD: u16 = 0x28;
const TRAP_BRK: u16 = 0x29;

/// Dispatches a decoded `trapvec`. Returns `Ok(true)` to keep the run loop
/// going, `Ok(false)` if a `HALT` left no runnable process (the VM should
/// stop cleanly). An out-of-range `trapvec` is VM-fatal.
pub fn dispatch(mem: &mut PhysicalMemory, reg: &mut Registers, vector: u16) -> Result<bool, Fault> {
    if vector < TRAP_VEC_BASE || vector >= TRAP_VEC_BASE + TRAP_VEC_COUNT {
        return Err(Fault::BadTrapVector(vector));
    }

    match vector {
        TRAP_GETC => trap_getc(reg),
        TRAP_OUT => trap_out(reg),
        TRAP_PUTS => trap_puts(mem, reg),
        TRAP_IN => trap_in(reg),
        TRAP_PUTSP => { /* unimplemented, no-op permitted */ }
        TRAP_HALT => return Ok(halt_proc(mem, reg)),
        TRAP_INU16 => trap_inu16(reg),
        TRAP_OUTU16 => trap_outu16(reg),
        TRAP_YIELD => yield_proc(mem, reg),
        TRAP_BRK => handle_brk(mem, reg),
        _ => unreachable!("range already checked"),
    }

    Ok(true)
}

fn read_one_byte() -> Option<u8> {
    let mut buf = [0u8; 1];
    match std::io::stdin().read(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf[0]),
    }
}

fn trap_getc(reg: &mut Registers) {
    // EOF is reported as 0xFFFF, mirroring `getchar()` returning -1.
    reg.r[0] = read_one_byte().map_or(0xFFFF, |b| b as u16);
}

fn trap_out(reg: &Registers) {
    print!("{}", (reg.r[0] & 0xFF) as u8 as char);
    let _ = std::io::stdout().flush();
}

/// `PUTS` deliberately reads **physical** memory starting at `R0`, with no
/// translation — preserved for test compatibility (§6 note).
fn trap_puts(mem: &PhysicalMemory, reg: &Registers) {
    let mut addr = reg.r[0];
    loop {
        let word = mem.read(addr);
        if word == 0 {
            break;
        }
        print!("{}", (word & 0xFF) as u8 as char);
        addr = addr.wrapping_add(1);
    }
    let _ = std::io::stdout().flush();
}

fn trap_in(reg: &mut Registers) {
    // Mirrors `getchar()` on EOF: R0 becomes 0xFFFF, and the echoed byte is
    // its truncated low byte (0xFF), not a null.
    reg.r[0] = read_one_byte().map_or(0xFFFF, |b| b as u16);
    print!("{}", (reg.r[0] & 0xFF) as u8 as char);
    let _ = std::io::stdout().flush();
}

fn trap_inu16(reg: &mut Registers) {
    let mut line = String::new();
    reg.r[0] = match std::io::stdin().read_line(&mut line) {
        Ok(_) => line.trim().parse::<u16>().unwrap_or(0),
        Err(_) => 0,
    };
}

fn trap_outu16(reg: &Registers) {
    println!("{}", reg.r[0]);
}

/// `BRK`: dynamic heap (un)mapping (§4.7).
fn handle_brk(mem: &mut PhysicalMemory, reg: &mut Registers) {
    let request = reg.r[0];
    let vpn = (request >> VPN_SHIFT) & 0x1F;
    let want_write = request & 0x4 != 0;
    let want_read = request & 0x2 != 0;
    let allocate = request & 0x1 != 0;

    let cur_pid = mem.cur_proc_id();
    let ptbr = reg.ptbr;
    let valid = page_table::read(mem, ptbr, vpn).is_valid();

    if allocate {
        println!("Heap increase requested by process {cur_pid}.");
        if valid {
            println!(
                "Cannot allocate memory for page {vpn} of pid {cur_pid} since it is already allocated."
            );
            return;
        }
        if !FreeFrameBitmap::new(mem).has_free(1) {
            println!("Cannot allocate more space for pid {cur_pid} since there is no free page frames.");
            return;
        }
        alloc_mem(mem, ptbr, vpn, want_read, want_write);
    } else {
        println!("Heap decrease requested by process {cur_pid}.");
        if !valid {
            println!("Cannot free memory of page {vpn} of pid {cur_pid} since it is not allocated.");
            return;
        }
        free_mem(mem, vpn, ptbr);
    }
}
