//! Rotates, shifts, and single-bit test/set/reset, including the
//! accumulator rotates and the nibble rotates RLD/RRD.
//!
//! The CB-space routines take an optional index-register context: under a
//! DD/FD CB prefix the operand always lives at (IX+d)/(IY+d) and, for the
//! undocumented non-(HL) columns, the result is additionally copied into
//! the register named by the opcode.

use crate::core::Bus;
use crate::cpu::z80::decode::Operands;
use crate::cpu::z80::error::CpuError;
use crate::cpu::z80::flags::parity;
use crate::cpu::z80::opcodes::{InstructionDescriptor, RotOp, Target};
use crate::cpu::z80::{IndexReg, Z80};

impl Z80 {
    /// The four one-byte accumulator rotates only touch C, H, N, X, Y.

    pub(crate) fn exec_rlca(&mut self) {
        let a = self.state.a;
        let result = a.rotate_left(1);
        self.state.a = result;
        let f = &mut self.state.flags;
        f.c = a & 0x80 != 0;
        f.h = false;
        f.n = false;
        f.set_xy(result);
    }

    pub(crate) fn exec_rrca(&mut self) {
        let a = self.state.a;
        let result = a.rotate_right(1);
        self.state.a = result;
        let f = &mut self.state.flags;
        f.c = a & 0x01 != 0;
        f.h = false;
        f.n = false;
        f.set_xy(result);
    }

    pub(crate) fn exec_rla(&mut self) {
        let a = self.state.a;
        let result = (a << 1) | self.state.flags.c as u8;
        self.state.a = result;
        let f = &mut self.state.flags;
        f.c = a & 0x80 != 0;
        f.h = false;
        f.n = false;
        f.set_xy(result);
    }

    pub(crate) fn exec_rra(&mut self) {
        let a = self.state.a;
        let result = (a >> 1) | ((self.state.flags.c as u8) << 7);
        self.state.a = result;
        let f = &mut self.state.flags;
        f.c = a & 0x01 != 0;
        f.h = false;
        f.n = false;
        f.set_xy(result);
    }

    /// CB rotate/shift with full S/Z/P flag treatment.
    fn rotate_shift(&mut self, val: u8, rot: RotOp) -> u8 {
        let carry = self.state.flags.c as u8;
        let (result, c) = match rot {
            RotOp::Rlc => ((val << 1) | (val >> 7), val & 0x80 != 0),
            RotOp::Rrc => ((val >> 1) | (val << 7), val & 0x01 != 0),
            RotOp::Rl => ((val << 1) | carry, val & 0x80 != 0),
            RotOp::Rr => ((val >> 1) | (carry << 7), val & 0x01 != 0),
            RotOp::Sla => (val << 1, val & 0x80 != 0),
            // SRA keeps the sign bit
            RotOp::Sra => (((val as i8) >> 1) as u8, val & 0x01 != 0),
            // SLL (undocumented) shifts a 1 into bit 0
            RotOp::Sll => ((val << 1) | 0x01, val & 0x80 != 0),
            RotOp::Srl => (val >> 1, val & 0x01 != 0),
        };
        let f = &mut self.state.flags;
        f.c = c;
        f.h = false;
        f.n = false;
        f.pv = parity(result);
        f.set_szxy(result);
        result
    }

    /// (IX+d)/(IY+d) address when operating under a DD/FD CB prefix.
    fn index_addr(
        &self,
        ops: &Operands,
        index: Option<IndexReg>,
        mnemonic: &'static str,
    ) -> Result<Option<u16>, CpuError> {
        match index {
            None => Ok(None),
            Some(IndexReg::Ix) => Ok(Some(
                self.state
                    .ix
                    .wrapping_add_signed(ops.displacement(mnemonic)? as i16),
            )),
            Some(IndexReg::Iy) => Ok(Some(
                self.state
                    .iy
                    .wrapping_add_signed(ops.displacement(mnemonic)? as i16),
            )),
        }
    }

    pub(crate) fn exec_rot<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
        rot: RotOp,
        index: Option<IndexReg>,
    ) -> Result<(), CpuError> {
        if let Some(addr) = self.index_addr(ops, index, desc.mnemonic)? {
            let val = bus.read(addr);
            let result = self.rotate_shift(val, rot);
            bus.write(addr, result);
            if !matches!(desc.dst, Target::IndHL) {
                // Undocumented register-copy column
                self.write8(bus, ops, desc.dst, desc.mnemonic, result)?;
            }
            return Ok(());
        }
        let val = self.read8(bus, ops, desc.dst, desc.mnemonic)?;
        let result = self.rotate_shift(val, rot);
        self.write8(bus, ops, desc.dst, desc.mnemonic, result)
    }

    /// BIT b: Z and P/V report the tested bit, S only for a set bit 7,
    /// H is always set and C is preserved. X/Y mirror the examined
    /// register; the memory forms approximate them from the tested value.
    pub(crate) fn exec_bit<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
        index: Option<IndexReg>,
    ) -> Result<(), CpuError> {
        let bit = ops.bit_index(desc.mnemonic)?;
        let (val, from_memory) = if let Some(addr) = self.index_addr(ops, index, desc.mnemonic)? {
            (bus.read(addr), true)
        } else {
            (
                self.read8(bus, ops, desc.src, desc.mnemonic)?,
                matches!(desc.src, Target::IndHL),
            )
        };
        let tested = val & (1 << bit);
        let f = &mut self.state.flags;
        f.z = tested == 0;
        f.pv = tested == 0;
        f.s = bit == 7 && tested != 0;
        f.h = true;
        f.n = false;
        if from_memory {
            f.set_xy(tested);
        } else {
            f.set_xy(val);
        }
        Ok(())
    }

    /// RES/SET leave every flag alone.
    pub(crate) fn exec_res_set<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
        index: Option<IndexReg>,
        set: bool,
    ) -> Result<(), CpuError> {
        let bit = ops.bit_index(desc.mnemonic)?;
        let mask = 1u8 << bit;
        if let Some(addr) = self.index_addr(ops, index, desc.mnemonic)? {
            let val = bus.read(addr);
            let result = if set { val | mask } else { val & !mask };
            bus.write(addr, result);
            if !matches!(desc.dst, Target::IndHL) {
                self.write8(bus, ops, desc.dst, desc.mnemonic, result)?;
            }
            return Ok(());
        }
        let val = self.read8(bus, ops, desc.dst, desc.mnemonic)?;
        let result = if set { val | mask } else { val & !mask };
        self.write8(bus, ops, desc.dst, desc.mnemonic, result)
    }

    /// RLD: the three nibbles A.lo, (HL).hi, (HL).lo rotate left.
    pub(crate) fn exec_rld<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        let hl = self.state.hl();
        let m = bus.read(hl);
        let a = self.state.a;
        let new_m = (m << 4) | (a & 0x0F);
        let new_a = (a & 0xF0) | (m >> 4);
        bus.write(hl, new_m);
        self.state.a = new_a;
        self.rld_flags(new_a);
        Ok(())
    }

    /// RRD: the same three nibbles rotate right.
    pub(crate) fn exec_rrd<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        let hl = self.state.hl();
        let m = bus.read(hl);
        let a = self.state.a;
        let new_m = (a << 4) | (m >> 4);
        let new_a = (a & 0xF0) | (m & 0x0F);
        bus.write(hl, new_m);
        self.state.a = new_a;
        self.rld_flags(new_a);
        Ok(())
    }

    fn rld_flags(&mut self, a: u8) {
        let f = &mut self.state.flags;
        f.h = false;
        f.n = false;
        f.pv = parity(a);
        f.set_szxy(a);
    }
}
