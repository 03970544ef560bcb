//! Interrupt latching and servicing.
//!
//! `trigger_nmi`/`trigger_irq` only set latches; the pending request is
//! examined at the top of the next [`Z80::step`], before the opcode
//! fetch. NMI always wins over a maskable interrupt and a maskable
//! request stays latched until IFF1 allows it through.

use crate::core::Bus;
use crate::cpu::z80::{CpuError, Z80};

impl Z80 {
    /// Latch a non-maskable interrupt. Serviced before the next
    /// instruction regardless of IFF1.
    pub fn trigger_nmi(&mut self) {
        self.state.nmi_pending = true;
    }

    /// Latch a maskable interrupt request. Serviced before the next
    /// instruction once IFF1 is set; otherwise it stays pending.
    pub fn trigger_irq(&mut self) {
        self.state.irq_pending = true;
    }

    /// Host-side interrupt mode override (the program normally uses the
    /// IM instruction). Modes above 2 are rejected.
    pub fn set_interrupt_mode(&mut self, mode: u8) -> Result<(), CpuError> {
        if mode > 2 {
            return Err(CpuError::InvalidInterruptMode(mode));
        }
        self.state.im = mode;
        Ok(())
    }

    /// Service a pending interrupt, if any. Returns the T-states spent,
    /// or 0 when execution should proceed with a normal fetch.
    pub(crate) fn service_interrupts<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if self.state.nmi_pending {
            self.state.nmi_pending = false;
            self.state.halted = false;
            // NMI saves IFF1 into IFF2 and masks further IRQs
            self.state.iff2 = self.state.iff1;
            self.state.iff1 = false;
            self.state.bump_r();
            let pc = self.state.pc;
            self.push_word(bus, pc);
            self.state.pc = 0x0066;
            return 11;
        }

        // The EI shadow delays maskable interrupts only: the instruction
        // after EI runs before an IRQ is accepted, but NMI is never held.
        if self.ei_delay {
            self.ei_delay = false;
            return 0;
        }

        if self.state.irq_pending && self.state.iff1 {
            self.state.irq_pending = false;
            self.state.iff1 = false;
            self.state.iff2 = false;
            self.state.halted = false;
            self.state.bump_r();
            let pc = self.state.pc;
            self.push_word(bus, pc);
            return match self.state.im {
                // IM 0 is treated as IM 1: the classic RST 38h response
                0 | 1 => {
                    self.state.pc = 0x0038;
                    13
                }
                _ => {
                    let ptr = ((self.state.i as u16) << 8) | bus.irq_vector() as u16;
                    self.state.pc = bus.read_word(ptr);
                    19
                }
            };
        }

        0
    }
}
