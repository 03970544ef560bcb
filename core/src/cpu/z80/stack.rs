//! Stack operations: PUSH/POP and the stack-top exchange.

use crate::core::Bus;
use crate::cpu::z80::Z80;
use crate::cpu::z80::decode::Operands;
use crate::cpu::z80::error::CpuError;
use crate::cpu::z80::opcodes::InstructionDescriptor;

impl Z80 {
    /// Push high byte then low byte, pre-decrementing SP.
    pub(crate) fn push_word<B: Bus>(&mut self, bus: &mut B, value: u16) {
        self.state.sp = self.state.sp.wrapping_sub(1);
        bus.write(self.state.sp, (value >> 8) as u8);
        self.state.sp = self.state.sp.wrapping_sub(1);
        bus.write(self.state.sp, value as u8);
    }

    /// Pop low byte then high byte, post-incrementing SP.
    pub(crate) fn pop_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read(self.state.sp) as u16;
        self.state.sp = self.state.sp.wrapping_add(1);
        let hi = bus.read(self.state.sp) as u16;
        self.state.sp = self.state.sp.wrapping_add(1);
        (hi << 8) | lo
    }

    pub(crate) fn exec_push<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        let value = self.read16(ops, desc.src, desc.mnemonic)?;
        self.push_word(bus, value);
        Ok(())
    }

    pub(crate) fn exec_pop<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        _ops: &Operands,
    ) -> Result<(), CpuError> {
        let value = self.pop_word(bus);
        self.write16(desc.dst, desc.mnemonic, value)
    }

    /// EX (SP),HL (and the IX/IY forms): swap the pair with the word at
    /// the stack top. SP itself is unchanged.
    pub(crate) fn exec_ex_sp<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        let reg = self.read16(ops, desc.src, desc.mnemonic)?;
        let mem = bus.read_word(self.state.sp);
        bus.write_word(self.state.sp, reg);
        self.write16(desc.src, desc.mnemonic, mem)
    }
}
