//! Address translator: `mr`/`mw` (§4.3).
//!
//! Every instruction fetch and data access is translated through the
//! current process's page table before touching physical memory. Faults
//! are returned as a typed [`Fault`] rather than printed/exited here, per
//! the re-architecture hint — the run loop owns the fatal-exit behaviour.

use crate::constants::{OFFSET_MASK, PAGE_SIZE_WORDS, RESERVED_VPN_LIMIT, VPN_SHIFT};
use crate::error::Fault;
use crate::memory::PhysicalMemory;
use crate::page_table::{self};

/// Whether a translation is for a load or a store, which gates the R/W bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Read,
    Write,
}

/// Translates `addr` under `ptbr`, returning the physical word index.
pub fn translate(mem: &PhysicalMemory, ptbr: u16, addr: u16, intent: Intent) -> Result<u16, Fault> {
    let vpn = addr >> VPN_SHIFT;
    let offset = addr & OFFSET_MASK;

    if vpn < RESERVED_VPN_LIMIT {
        return Err(Fault::SegFaultReserved);
    }

    let pte = page_table::read(mem, ptbr, vpn);
    if !pte.is_valid() {
        return Err(Fault::SegFaultUnmapped);
    }

    match intent {
        Intent::Read if !pte.can_read() => return Err(Fault::SegFaultPermRead),
        Intent::Write if !pte.can_write() => return Err(Fault::SegFaultPermWrite),
        _ => {}
    }

    let phys = pte.pfn() as u32 * PAGE_SIZE_WORDS as u32 + offset as u32;
    Ok(phys as u16)
}

/// Reads the virtual word at `addr` under `ptbr`.
pub fn mr(mem: &PhysicalMemory, ptbr: u16, addr: u16) -> Result<u16, Fault> {
    let phys = translate(mem, ptbr, addr, Intent::Read)?;
    Ok(mem.read(phys))
}

/// Writes `value` to the virtual address `addr` under `ptbr`.
pub fn mw(mem: &mut PhysicalMemory, ptbr: u16, addr: u16, value: u16) -> Result<(), Fault> {
    let phys = translate(mem, ptbr, addr, Intent::Write)?;
    mem.write(phys, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::alloc_mem;
    use crate::page_table::ptbr_of;
    use proptest::prelude::*;

    #[test]
    fn reserved_region_always_faults() {
        let mem = PhysicalMemory::new();
        let ptbr = ptbr_of(0);
        assert_eq!(
            translate(&mem, ptbr, 0x0000, Intent::Read),
            Err(Fault::SegFaultReserved)
        );
        assert_eq!(
            translate(&mem, ptbr, 0x2FFF, Intent::Read),
            Err(Fault::SegFaultReserved)
        );
    }

    #[test]
    fn unmapped_page_faults() {
        let mem = PhysicalMemory::new();
        let ptbr = ptbr_of(0);
        assert_eq!(
            translate(&mem, ptbr, 0x3000, Intent::Read),
            Err(Fault::SegFaultUnmapped)
        );
    }

    #[test]
    fn permission_faults_are_distinguished() {
        let mut mem = PhysicalMemory::new();
        let ptbr = ptbr_of(0);
        alloc_mem(&mut mem, ptbr, 6, true, false); // read-only page at VPN 6
        assert_eq!(
            translate(&mem, ptbr, 0x3000, Intent::Write),
            Err(Fault::SegFaultPermWrite)
        );
        alloc_mem(&mut mem, ptbr, 7, false, true); // write-only page at VPN 7
        assert_eq!(
            translate(&mem, ptbr, 0x3800, Intent::Read),
            Err(Fault::SegFaultPermRead)
        );
    }

    proptest! {
        /// Writing x then reading it back through the translator yields x,
        /// and the value actually lives at the expected physical index.
        #[test]
        fn round_trip_write_then_read(off in 0u16..PAGE_SIZE_WORDS as u16, value: u16) {
            let mut mem = PhysicalMemory::new();
            let ptbr = ptbr_of(0);
            alloc_mem(&mut mem, ptbr, 6, true, true);
            let vaddr = (6u16 << VPN_SHIFT) | off;
            mw(&mut mem, ptbr, vaddr, value).unwrap();
            prop_assert_eq!(mr(&mem, ptbr, vaddr).unwrap(), value);

            let pte = page_table::read(&mem, ptbr, 6);
            let phys = pte.pfn() as u32 * PAGE_SIZE_WORDS as u32 + off as u32;
            prop_assert_eq!(mem.read(phys as u16), value);
        }
    }
}
