//! 8-bit and 16-bit loads, including the absolute-address forms.

use crate::core::Bus;
use crate::cpu::z80::Z80;
use crate::cpu::z80::decode::Operands;
use crate::cpu::z80::error::CpuError;
use crate::cpu::z80::opcodes::{InstructionDescriptor, Mode, Target};

impl Z80 {
    /// Every LD between 8-bit operands. The absolute forms (LD (nn),A and
    /// LD A,(nn)) arrive with the address operand and a `None` side for
    /// the memory end. LD A,I and LD A,R additionally report IFF2 through
    /// P/V, which makes them the one interrupt-state probe a program has.
    pub(crate) fn exec_ld8<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        if matches!(desc.mode, Mode::Extended) {
            let addr = ops.address(desc.mnemonic)?;
            if matches!(desc.dst, Target::None) {
                let value = self.read8(bus, ops, desc.src, desc.mnemonic)?;
                bus.write(addr, value);
            } else {
                let value = bus.read(addr);
                self.write8(bus, ops, desc.dst, desc.mnemonic, value)?;
            }
            return Ok(());
        }

        let value = self.read8(bus, ops, desc.src, desc.mnemonic)?;
        self.write8(bus, ops, desc.dst, desc.mnemonic, value)?;

        if matches!(desc.dst, Target::A) && matches!(desc.src, Target::I | Target::R) {
            let iff2 = self.state.iff2;
            let f = &mut self.state.flags;
            f.h = false;
            f.n = false;
            f.pv = iff2;
            f.set_szxy(value);
        }
        Ok(())
    }

    /// LD between 16-bit operands: immediate (LD rr,nn), register
    /// (LD SP,HL), and the absolute load/store forms.
    pub(crate) fn exec_ld16<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        match desc.mode {
            Mode::Immediate => {
                let value = ops.immediate16(desc.mnemonic)?;
                self.write16(desc.dst, desc.mnemonic, value)
            }
            Mode::Register => {
                let value = self.read16(ops, desc.src, desc.mnemonic)?;
                self.write16(desc.dst, desc.mnemonic, value)
            }
            Mode::Extended => {
                let addr = ops.address(desc.mnemonic)?;
                if matches!(desc.dst, Target::None) {
                    let value = self.read16(ops, desc.src, desc.mnemonic)?;
                    bus.write_word(addr, value);
                    Ok(())
                } else {
                    let value = bus.read_word(addr);
                    self.write16(desc.dst, desc.mnemonic, value)
                }
            }
            _ => Err(CpuError::InvalidParameterType {
                mnemonic: desc.mnemonic,
            }),
        }
    }
}
