//! Fetch-decode-execute run loop (§4.9, C9).
//!
//! Owns the VM's whole state and drives [`crate::cpu::step`], routing
//! `TRAP` instructions to [`crate::trap::dispatch`]. A [`Fault`] or a
//! `HALT` with no runnable process left both end the loop; everything
//! else keeps it spinning.

use crate::cpu::{step, Step};
use crate::error::Fault;
use crate::memory::PhysicalMemory;
use crate::registers::Registers;
use crate::trap;

/// Owns the two pieces of state a running VM needs: physical memory and
/// the currently-loaded process's registers.
pub struct Vm {
    pub mem: PhysicalMemory,
    pub reg: Registers,
}

impl Vm {
    pub fn new() -> Self {
        Self {
            mem: PhysicalMemory::new(),
            reg: Registers::new(),
        }
    }

    /// Runs until every process has halted or a fault occurs.
    ///
    /// Returns `Ok(())` on a clean shutdown (last process halted) or the
    /// [`Fault`] that ended the VM. The caller is responsible for loading
    /// the first process into `reg` before calling this.
    pub fn run(&mut self) -> Result<(), Fault> {
        loop {
            match step(&mut self.mem, &mut self.reg)? {
                Step::Continue => {}
                Step::Trap(vector) => {
                    if !trap::dispatch(&mut self.mem, &mut self.reg, vector)? {
                        return Ok(());
                    }
                }
            }
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
