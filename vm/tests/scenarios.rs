//! End-to-end VM scenarios (§8).
//!
//! These assemble small LC-3 programs by hand rather than depending on a
//! real assembler, since none is in scope here. Each program sums ten
//! heap words into R1 by building the heap's base virtual address
//! (`0x4000`) through repeated doubling, since `LEA`'s PC-relative reach
//! cannot cross from the code segment into the heap segment.

use std::io::Cursor;

use lc3os::constants::{HEAP_VPN_START, PC_START, VPN_SHIFT};
use lc3os::error::Fault;
use lc3os::page_table::{self, ptbr_of};
use lc3os::process::{create_proc, load_proc, read_pcb};
use lc3os::runloop::Vm;

const TEN_HEAP_WORDS: [u16; 10] = [5, 2, 1, 2, 3, 1, 2, 1, 2, 1]; // sums to 20

fn and_imm(dr: u16, sr1: u16, imm5: u16) -> u16 {
    (0b0101 << 12) | (dr << 9) | (sr1 << 6) | (1 << 5) | (imm5 & 0x1F)
}
fn add_imm(dr: u16, sr1: u16, imm5: u16) -> u16 {
    (0b0001 << 12) | (dr << 9) | (sr1 << 6) | (1 << 5) | (imm5 & 0x1F)
}
fn add_reg(dr: u16, sr1: u16, sr2: u16) -> u16 {
    (0b0001 << 12) | (dr << 9) | (sr1 << 6) | (sr2 & 0x7)
}
fn ldr(dr: u16, base: u16, offset6: u16) -> u16 {
    (0b0110 << 12) | (dr << 9) | (base << 6) | (offset6 & 0x3F)
}
fn str_(sr: u16, base: u16, offset6: u16) -> u16 {
    (0b0111 << 12) | (sr << 9) | (base << 6) | (offset6 & 0x3F)
}
fn trap(vector: u16) -> u16 {
    0xF000 | (vector & 0xFF)
}

/// Builds `vpn << VPN_SHIFT` into register `dr` by setting it to `vpn` and
/// doubling it `VPN_SHIFT` times, since `LEA`'s PC-relative reach cannot
/// cross from the code segment into another segment.
fn build_vaddr_into_reg(dr: u16, vpn: u16) -> Vec<u16> {
    let mut v = vec![and_imm(dr, dr, 0), add_imm(dr, dr, vpn)];
    for _ in 0..VPN_SHIFT {
        v.push(add_reg(dr, dr, dr));
    }
    v
}

/// Sums the ten heap words at `HEAP_VPN_START` into R1, then optionally
/// `YIELD`s, then `HALT`s.
fn sum_heap_program(yield_before_halt: bool) -> Vec<u16> {
    let mut words = vec![and_imm(1, 1, 0)]; // R1 = 0
    words.extend(build_vaddr_into_reg(2, HEAP_VPN_START)); // R2 = heap base vaddr
    for i in 0..10u16 {
        words.push(ldr(4, 2, i));
        words.push(add_reg(1, 1, 4));
    }
    if yield_before_halt {
        words.push(trap(0x28));
    }
    words.push(trap(0x25));
    words
}

fn to_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

fn heap_bytes() -> Vec<u8> {
    to_bytes(&TEN_HEAP_WORDS)
}

#[test]
fn single_process_sum_of_ten() {
    let mut vm = Vm::new();
    let code = Cursor::new(to_bytes(&sum_heap_program(false)));
    let heap = Cursor::new(heap_bytes());
    assert!(create_proc(&mut vm.mem, code, heap).unwrap());
    load_proc(&mut vm.mem, &mut vm.reg, 0);

    vm.run().unwrap();

    assert_eq!(vm.reg.r[1], 20);
}

#[test]
fn two_processes_yield_back_and_forth() {
    let mut vm = Vm::new();
    for _ in 0..2 {
        let code = Cursor::new(to_bytes(&sum_heap_program(true)));
        let heap = Cursor::new(heap_bytes());
        assert!(create_proc(&mut vm.mem, code, heap).unwrap());
    }
    load_proc(&mut vm.mem, &mut vm.reg, 0);

    vm.run().unwrap();

    assert_eq!(read_pcb(&vm.mem, 0).pid, 0xFFFF);
    assert_eq!(read_pcb(&vm.mem, 1).pid, 0xFFFF);
}

#[test]
fn heap_growth_via_brk_then_shrink() {
    let mut vm = Vm::new();

    // R2 = 10<<11 == 0x5000: the virtual address of the freshly allocated
    // page's start.
    let mut words = build_vaddr_into_reg(2, 10);
    // R0 built the same way, +7 to set R/W/alloc for the BRK alloc call.
    words.extend(build_vaddr_into_reg(0, 10));
    words.push(add_imm(0, 0, 7)); // VPN 10, R=1, W=1, alloc=1
    words.push(trap(0x29)); // BRK alloc
    words.push(and_imm(1, 1, 0));
    words.push(add_imm(1, 1, 9)); // sentinel value
    words.push(str_(1, 2, 0)); // store to the newly mapped page; faults if BRK failed
    words.push(add_imm(0, 0, -7i16 as u16)); // back to just VPN 10, for the free call
    words.push(trap(0x29)); // BRK free
    words.push(trap(0x25)); // HALT

    let code = Cursor::new(to_bytes(&words));
    let heap = Cursor::new(Vec::new());
    assert!(create_proc(&mut vm.mem, code, heap).unwrap());
    load_proc(&mut vm.mem, &mut vm.reg, 0);

    let ptbr = ptbr_of(0);
    vm.run().unwrap();
    assert!(!page_table::read(&vm.mem, ptbr, 10).is_valid());
}

fn st(dr: u16, pc_off9: u16) -> u16 {
    (0b0011 << 12) | (dr << 9) | (pc_off9 & 0x1FF)
}

#[test]
fn segfault_on_write_to_code_page() {
    let mut vm = Vm::new();
    // ST R0, #-1: PC is already 0x3001 after the fetch increment, so
    // offset9 = -1 targets 0x3000 itself, the code page.
    let code = Cursor::new(to_bytes(&[st(0, -1i16 as u16)]));
    let heap = Cursor::new(Vec::new());
    assert!(create_proc(&mut vm.mem, code, heap).unwrap());
    load_proc(&mut vm.mem, &mut vm.reg, 0);

    let err = vm.run().unwrap_err();
    assert_eq!(err, Fault::SegFaultPermWrite);
    assert_eq!(err.to_string(), "Cannot write to a read-only page.");
}

#[test]
fn pcb_list_full_rejects_further_creation() {
    let mut vm = Vm::new();
    vm.mem.set_os_status_full(true);
    let ok = create_proc(&mut vm.mem, Cursor::new(Vec::new()), Cursor::new(Vec::new())).unwrap();
    assert!(!ok);
}

#[test]
fn free_frame_exhaustion_blocks_new_process_creation() {
    let mut vm = Vm::new();
    // Each process consumes 4 frames; 29 - 4*7 = 1, leaving fewer than the
    // 2 frames createProc needs for a code segment on the 8th attempt.
    for _ in 0..7 {
        assert!(create_proc(&mut vm.mem, Cursor::new(Vec::new()), Cursor::new(Vec::new())).unwrap());
    }
    let ok = create_proc(&mut vm.mem, Cursor::new(Vec::new()), Cursor::new(Vec::new())).unwrap();
    assert!(!ok);
}
