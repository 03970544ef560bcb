//! Port I/O and the ED block operations (transfer, compare, block I/O).
//!
//! The repeating forms (LDIR/CPIR/INIR/OTIR and the decrementing twins)
//! run to completion within one step; every iteration before the last is
//! reported through `Outcome::extra` at the 21T repeat rate.

use crate::core::Bus;
use crate::cpu::z80::decode::Operands;
use crate::cpu::z80::error::CpuError;
use crate::cpu::z80::flags::parity;
use crate::cpu::z80::opcodes::{InstructionDescriptor, Target};
use crate::cpu::z80::{Outcome, Z80};

/// T-states for each block-op iteration that repeats.
const REPEAT_CYCLES: u32 = 21;

impl Z80 {
    /// IN A,(n) sets no flags; IN r,(C) sets S/Z/P from the value with
    /// H=N=0, and the r=6 form only sets flags.
    pub(crate) fn exec_in8<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        if matches!(desc.src, Target::Imm) {
            let port = ops.port(desc.mnemonic)?;
            let value = bus.read_port(port);
            return self.write8(bus, ops, desc.dst, desc.mnemonic, value);
        }
        let value = bus.read_port(self.state.c);
        if !matches!(desc.dst, Target::None) {
            self.write8(bus, ops, desc.dst, desc.mnemonic, value)?;
        }
        let f = &mut self.state.flags;
        f.h = false;
        f.n = false;
        f.pv = parity(value);
        f.set_szxy(value);
        Ok(())
    }

    /// OUT (n),A / OUT (C),r. The undocumented OUT (C),0 form has no
    /// source register and writes zero.
    pub(crate) fn exec_out8<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &InstructionDescriptor,
        ops: &Operands,
    ) -> Result<(), CpuError> {
        let port = if matches!(desc.dst, Target::Imm) {
            ops.port(desc.mnemonic)?
        } else {
            self.state.c
        };
        let value = if matches!(desc.src, Target::None) {
            0
        } else {
            self.read8(bus, ops, desc.src, desc.mnemonic)?
        };
        bus.write_port(port, value);
        Ok(())
    }

    /// LDI/LDD/LDIR/LDDR: copy (HL) to (DE), step the pointers, count BC
    /// down. P/V reports BC != 0; X/Y come from bits 3 and 1 of the
    /// transferred byte plus A.
    pub(crate) fn exec_ldi_ldd<B: Bus>(
        &mut self,
        bus: &mut B,
        increment: bool,
        repeat: bool,
    ) -> Result<Outcome, CpuError> {
        let mut iterations = 0u32;
        loop {
            iterations += 1;
            let hl = self.state.hl();
            let de = self.state.de();
            let val = bus.read(hl);
            bus.write(de, val);
            if increment {
                self.state.set_hl(hl.wrapping_add(1));
                self.state.set_de(de.wrapping_add(1));
            } else {
                self.state.set_hl(hl.wrapping_sub(1));
                self.state.set_de(de.wrapping_sub(1));
            }
            let bc = self.state.bc().wrapping_sub(1);
            self.state.set_bc(bc);
            let n = val.wrapping_add(self.state.a);
            let f = &mut self.state.flags;
            f.h = false;
            f.n = false;
            f.pv = bc != 0;
            f.x = n & 0x08 != 0;
            f.y = n & 0x02 != 0;
            if !repeat || bc == 0 {
                break;
            }
        }
        Ok(Outcome {
            pc_set: false,
            taken: false,
            extra: REPEAT_CYCLES * (iterations - 1),
        })
    }

    /// CPI/CPD/CPIR/CPDR: compare A with (HL), step HL, count BC down.
    /// The repeating forms stop early on a match. X/Y come from the
    /// result with H borrowed back out.
    pub(crate) fn exec_cpi_cpd<B: Bus>(
        &mut self,
        bus: &mut B,
        increment: bool,
        repeat: bool,
    ) -> Result<Outcome, CpuError> {
        let mut iterations = 0u32;
        loop {
            iterations += 1;
            let hl = self.state.hl();
            let val = bus.read(hl);
            if increment {
                self.state.set_hl(hl.wrapping_add(1));
            } else {
                self.state.set_hl(hl.wrapping_sub(1));
            }
            let bc = self.state.bc().wrapping_sub(1);
            self.state.set_bc(bc);
            let a = self.state.a;
            let result = a.wrapping_sub(val);
            let half = (a & 0x0F) < (val & 0x0F);
            let n = result.wrapping_sub(half as u8);
            let f = &mut self.state.flags;
            f.s = result & 0x80 != 0;
            f.z = result == 0;
            f.h = half;
            f.pv = bc != 0;
            f.n = true;
            f.x = n & 0x08 != 0;
            f.y = n & 0x02 != 0;
            if !repeat || bc == 0 || result == 0 {
                break;
            }
        }
        Ok(Outcome {
            pc_set: false,
            taken: false,
            extra: REPEAT_CYCLES * (iterations - 1),
        })
    }

    /// INI/IND/INIR/INDR: port (C) to (HL), step HL, count B down.
    /// Flags follow the decremented B; N is set.
    pub(crate) fn exec_ini_ind<B: Bus>(
        &mut self,
        bus: &mut B,
        increment: bool,
        repeat: bool,
    ) -> Result<Outcome, CpuError> {
        let mut iterations = 0u32;
        loop {
            iterations += 1;
            let value = bus.read_port(self.state.c);
            let hl = self.state.hl();
            bus.write(hl, value);
            if increment {
                self.state.set_hl(hl.wrapping_add(1));
            } else {
                self.state.set_hl(hl.wrapping_sub(1));
            }
            let b = self.state.b.wrapping_sub(1);
            self.state.b = b;
            self.block_io_flags(b);
            if !repeat || b == 0 {
                break;
            }
        }
        Ok(Outcome {
            pc_set: false,
            taken: false,
            extra: REPEAT_CYCLES * (iterations - 1),
        })
    }

    /// OUTI/OUTD/OTIR/OTDR: (HL) to port (C), step HL. B is decremented
    /// before the output, matching the value the hardware places on the
    /// upper address bus.
    pub(crate) fn exec_outi_outd<B: Bus>(
        &mut self,
        bus: &mut B,
        increment: bool,
        repeat: bool,
    ) -> Result<Outcome, CpuError> {
        let mut iterations = 0u32;
        loop {
            iterations += 1;
            self.state.b = self.state.b.wrapping_sub(1);
            let hl = self.state.hl();
            let value = bus.read(hl);
            bus.write_port(self.state.c, value);
            if increment {
                self.state.set_hl(hl.wrapping_add(1));
            } else {
                self.state.set_hl(hl.wrapping_sub(1));
            }
            let b = self.state.b;
            self.block_io_flags(b);
            if !repeat || b == 0 {
                break;
            }
        }
        Ok(Outcome {
            pc_set: false,
            taken: false,
            extra: REPEAT_CYCLES * (iterations - 1),
        })
    }

    /// S/Z/X/Y and the repeat indicator P/V all track the decremented
    /// counter B.
    fn block_io_flags(&mut self, b: u8) {
        let f = &mut self.state.flags;
        f.z = b == 0;
        f.s = b & 0x80 != 0;
        f.pv = b != 0;
        f.n = true;
        f.set_xy(b);
    }
}
