//! 8-bit and 16-bit arithmetic, plus the accumulator specials
//! (DAA/CPL/NEG/SCF/CCF).

use crate::core::Bus;
use crate::cpu::z80::Z80;
use crate::cpu::z80::decode::Operands;
use crate::cpu::z80::error::CpuError;
use crate::cpu::z80::flags::parity;
use crate::cpu::z80::opcodes::{Alu8Op, InstructionDescriptor};

impl Z80 {
    fn add8(&mut self, val: u8, carry_in: bool) {
        let a = self.state.a;
        let c = carry_in as u8;
        let result = a.wrapping_add(val).wrapping_add(c);
        let f = &mut self.state.flags;
        f.c = (a as u16) + (val as u16) + (c as u16) > 0xFF;
        f.h = (a & 0x0F) + (val & 0x0F) + c > 0x0F;
        f.pv = (a ^ result) & (val ^ result) & 0x80 != 0;
        f.n = false;
        f.set_szxy(result);
        self.state.a = result;
    }

    /// Shared by SUB, SBC, and CP. CP discards the result and mirrors the
    /// operand (not the result) into X/Y.
    fn sub8(&mut self, val: u8, carry_in: bool, store: bool) {
        let a = self.state.a;
        let c = carry_in as u8;
        let result = a.wrapping_sub(val).wrapping_sub(c);
        let f = &mut self.state.flags;
        f.c = (val as u16) + (c as u16) > a as u16;
        f.h = (val & 0x0F) + c > (a & 0x0F);
        f.pv = (a ^ val) & (a ^ result) & 0x80 != 0;
        f.n = true;
        f.s = result & 0x80 != 0;
        f.z = result == 0;
        if store {
            f.set_xy(result);
            self.state.a = result;
        } else {
            f.set_xy(val);
        }
    }

    /// AND/XOR/OR common path. Only AND sets H.
    fn logic8(&mut self, result: u8, set_h: bool) {
        let f = &mut self.state.flags;
        f.c = false;
        f.n = false;
        f.h = set_h;
        f.pv = parity(result);
        f.set_szxy(result);
        self.state.a = result;
    }

    pub(crate) fn exec_alu8<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
        op: Alu8Op,
    ) -> Result<(), CpuError> {
        let val = self.read8(bus, ops, desc.src, desc.mnemonic)?;
        let carry = self.state.flags.c;
        match op {
            Alu8Op::Add => self.add8(val, false),
            Alu8Op::Adc => self.add8(val, carry),
            Alu8Op::Sub => self.sub8(val, false, true),
            Alu8Op::Sbc => self.sub8(val, carry, true),
            Alu8Op::And => self.logic8(self.state.a & val, true),
            Alu8Op::Xor => self.logic8(self.state.a ^ val, false),
            Alu8Op::Or => self.logic8(self.state.a | val, false),
            Alu8Op::Cp => self.sub8(val, false, false),
        }
        Ok(())
    }

    /// INC r / INC (HL): carry is untouched, P/V is true overflow (only
    /// at 0x7F).
    pub(crate) fn exec_inc8<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        let val = self.read8(bus, ops, desc.dst, desc.mnemonic)?;
        let result = val.wrapping_add(1);
        let f = &mut self.state.flags;
        f.h = (val & 0x0F) == 0x0F;
        f.pv = val == 0x7F;
        f.n = false;
        f.set_szxy(result);
        self.write8(bus, ops, desc.dst, desc.mnemonic, result)
    }

    pub(crate) fn exec_dec8<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        let val = self.read8(bus, ops, desc.dst, desc.mnemonic)?;
        let result = val.wrapping_sub(1);
        let f = &mut self.state.flags;
        f.h = (val & 0x0F) == 0;
        f.pv = val == 0x80;
        f.n = true;
        f.set_szxy(result);
        self.write8(bus, ops, desc.dst, desc.mnemonic, result)
    }

    /// ADD HL,rr / ADD IX,rr / ADD IY,rr: only C, H, N, X, Y change.
    /// H is carry out of bit 11; X/Y mirror the result high byte.
    pub(crate) fn exec_add16(
        &mut self,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        let dst = self.read16(ops, desc.dst, desc.mnemonic)?;
        let src = self.read16(ops, desc.src, desc.mnemonic)?;
        let result = dst.wrapping_add(src);
        let f = &mut self.state.flags;
        f.c = (dst as u32) + (src as u32) > 0xFFFF;
        f.h = (dst & 0x0FFF) + (src & 0x0FFF) > 0x0FFF;
        f.n = false;
        f.set_xy((result >> 8) as u8);
        self.write16(desc.dst, desc.mnemonic, result)
    }

    pub(crate) fn exec_adc16(
        &mut self,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        let dst = self.read16(ops, desc.dst, desc.mnemonic)?;
        let src = self.read16(ops, desc.src, desc.mnemonic)?;
        let c = self.state.flags.c as u16;
        let result = dst.wrapping_add(src).wrapping_add(c);
        let f = &mut self.state.flags;
        f.c = (dst as u32) + (src as u32) + (c as u32) > 0xFFFF;
        f.h = (dst & 0x0FFF) + (src & 0x0FFF) + c > 0x0FFF;
        f.pv = (dst ^ result) & (src ^ result) & 0x8000 != 0;
        f.n = false;
        f.s = result & 0x8000 != 0;
        f.z = result == 0;
        f.set_xy((result >> 8) as u8);
        self.write16(desc.dst, desc.mnemonic, result)
    }

    pub(crate) fn exec_sbc16(
        &mut self,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        let dst = self.read16(ops, desc.dst, desc.mnemonic)?;
        let src = self.read16(ops, desc.src, desc.mnemonic)?;
        let c = self.state.flags.c as u16;
        let result = dst.wrapping_sub(src).wrapping_sub(c);
        let f = &mut self.state.flags;
        f.c = (src as u32) + (c as u32) > dst as u32;
        f.h = (src & 0x0FFF) + c > (dst & 0x0FFF);
        f.pv = (dst ^ src) & (dst ^ result) & 0x8000 != 0;
        f.n = true;
        f.s = result & 0x8000 != 0;
        f.z = result == 0;
        f.set_xy((result >> 8) as u8);
        self.write16(desc.dst, desc.mnemonic, result)
    }

    /// INC rr / DEC rr touch no flags.
    pub(crate) fn exec_inc16(
        &mut self,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        let val = self.read16(ops, desc.dst, desc.mnemonic)?;
        self.write16(desc.dst, desc.mnemonic, val.wrapping_add(1))
    }

    pub(crate) fn exec_dec16(
        &mut self,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        let val = self.read16(ops, desc.dst, desc.mnemonic)?;
        self.write16(desc.dst, desc.mnemonic, val.wrapping_sub(1))
    }

    /// Decimal adjust after a BCD add or subtract. The correction depends
    /// on the pre-instruction N, H, and C flags.
    pub(crate) fn exec_daa(&mut self) {
        let a = self.state.a;
        let f = &mut self.state.flags;
        let mut correction = 0u8;
        let mut carry = f.c;
        if f.h || (!f.n && (a & 0x0F) > 0x09) {
            correction |= 0x06;
        }
        if f.c || (!f.n && a > 0x99) {
            correction |= 0x60;
            carry = true;
        }
        let result = if f.n {
            a.wrapping_sub(correction)
        } else {
            a.wrapping_add(correction)
        };
        f.h = if f.n {
            f.h && (a & 0x0F) < 0x06
        } else {
            (a & 0x0F) > 0x09
        };
        f.c = carry;
        f.pv = parity(result);
        f.set_szxy(result);
        self.state.a = result;
    }

    pub(crate) fn exec_cpl(&mut self) {
        let result = !self.state.a;
        self.state.a = result;
        let f = &mut self.state.flags;
        f.h = true;
        f.n = true;
        f.set_xy(result);
    }

    /// NEG is 0 - A, with the full subtract flag treatment.
    pub(crate) fn exec_neg(&mut self) {
        let val = self.state.a;
        self.state.a = 0;
        self.sub8(val, false, true);
    }

    pub(crate) fn exec_scf(&mut self) {
        let a = self.state.a;
        let f = &mut self.state.flags;
        f.c = true;
        f.h = false;
        f.n = false;
        f.set_xy(a);
    }

    /// CCF: H receives the old carry.
    pub(crate) fn exec_ccf(&mut self) {
        let a = self.state.a;
        let f = &mut self.state.flags;
        f.h = f.c;
        f.c = !f.c;
        f.n = false;
        f.set_xy(a);
    }
}
