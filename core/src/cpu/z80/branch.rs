//! Control transfer: jumps, relative branches, calls, returns, restarts.
//!
//! Every routine here reports through [`Outcome::branch`], so the step
//! loop charges the taken timing and skips the normal PC advance exactly
//! when the transfer happened. A jump to its own address therefore leaves
//! PC untouched while cycles keep accumulating.

use crate::core::Bus;
use crate::cpu::z80::decode::Operands;
use crate::cpu::z80::error::CpuError;
use crate::cpu::z80::opcodes::{Cond, InstructionDescriptor};
use crate::cpu::z80::{Outcome, Z80};

impl Z80 {
    pub(crate) fn eval_condition(&self, cond: Cond) -> bool {
        let f = &self.state.flags;
        match cond {
            Cond::Always => true,
            Cond::NZ => !f.z,
            Cond::Z => f.z,
            Cond::NC => !f.c,
            Cond::C => f.c,
            Cond::PO => !f.pv, // parity odd
            Cond::PE => f.pv,  // parity even
            Cond::P => !f.s,   // positive
            Cond::M => f.s,    // minus
        }
    }

    pub(crate) fn exec_jp(
        &mut self,
        desc: &InstructionDescriptor,
        ops: &Operands,
        cond: Cond,
    ) -> Result<Outcome, CpuError> {
        let target = ops.address(desc.mnemonic)?;
        let taken = self.eval_condition(cond);
        if taken {
            self.state.pc = target;
        }
        Ok(Outcome::branch(taken))
    }

    /// JP (HL) / JP (IX) / JP (IY): PC from the register, no memory read.
    pub(crate) fn exec_jp_ind(
        &mut self,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<Outcome, CpuError> {
        self.state.pc = self.read16(ops, desc.src, desc.mnemonic)?;
        Ok(Outcome::branch(true))
    }

    pub(crate) fn exec_jr(
        &mut self,
        desc: &InstructionDescriptor,
        ops: &Operands,
        cond: Cond,
        next_pc: u16,
    ) -> Result<Outcome, CpuError> {
        let disp = ops.displacement(desc.mnemonic)?;
        let taken = self.eval_condition(cond);
        if taken {
            self.state.pc = next_pc.wrapping_add_signed(disp as i16);
        }
        Ok(Outcome::branch(taken))
    }

    /// DJNZ: decrement B, branch while non-zero.
    pub(crate) fn exec_djnz(
        &mut self,
        desc: &InstructionDescriptor,
        ops: &Operands,
        next_pc: u16,
    ) -> Result<Outcome, CpuError> {
        let disp = ops.displacement(desc.mnemonic)?;
        self.state.b = self.state.b.wrapping_sub(1);
        let taken = self.state.b != 0;
        if taken {
            self.state.pc = next_pc.wrapping_add_signed(disp as i16);
        }
        Ok(Outcome::branch(taken))
    }

    pub(crate) fn exec_call<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
        cond: Cond,
        next_pc: u16,
    ) -> Result<Outcome, CpuError> {
        let target = ops.address(desc.mnemonic)?;
        let taken = self.eval_condition(cond);
        if taken {
            self.push_word(bus, next_pc);
            self.state.pc = target;
        }
        Ok(Outcome::branch(taken))
    }

    pub(crate) fn exec_ret<B: Bus>(
        &mut self,
        bus: &mut B,
        cond: Cond,
    ) -> Result<Outcome, CpuError> {
        let taken = self.eval_condition(cond);
        if taken {
            self.state.pc = self.pop_word(bus);
        }
        Ok(Outcome::branch(taken))
    }

    /// RETI: a plain return that additionally acknowledges the interrupt
    /// on the bus.
    pub(crate) fn exec_reti<B: Bus>(&mut self, bus: &mut B) -> Result<Outcome, CpuError> {
        self.state.pc = self.pop_word(bus);
        bus.end_of_interrupt();
        Ok(Outcome::branch(true))
    }

    /// RETN: return from NMI, restoring IFF1 from IFF2.
    pub(crate) fn exec_retn<B: Bus>(&mut self, bus: &mut B) -> Result<Outcome, CpuError> {
        self.state.iff1 = self.state.iff2;
        self.state.pc = self.pop_word(bus);
        Ok(Outcome::branch(true))
    }

    pub(crate) fn exec_rst<B: Bus>(
        &mut self,
        bus: &mut B,
        vector: u8,
        next_pc: u16,
    ) -> Result<Outcome, CpuError> {
        self.push_word(bus, next_pc);
        self.state.pc = vector as u16;
        Ok(Outcome::branch(true))
    }
}
