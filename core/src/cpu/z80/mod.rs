//! Z80 CPU core.
//!
//! The CPU is driven one instruction at a time through [`Z80::step`],
//! which services pending interrupts, fetches and decodes through the
//! static opcode tables, executes, and returns the T-state cost. All
//! mutable machine state lives in the public [`CpuState`]; the `Z80`
//! wrapper adds configuration and the step machinery but no hidden
//! registers.

mod alu;
mod bit;
mod block;
mod branch;
pub mod decode;
mod error;
pub mod flags;
mod interrupt;
mod load_store;
pub mod opcodes;
pub mod registers;
mod stack;

pub use decode::{Operand, Operands};
pub use error::CpuError;
pub use flags::Flags;
pub use registers::CpuState;

use crate::core::Bus;
use crate::cpu::state::{CpuStateTrait, Z80State};
use opcodes::{InstructionDescriptor, Mode, Operation, Prefix, Target};

/// Which index register a DD/FD prefix selects for the current
/// instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum IndexReg {
    Ix,
    Iy,
}

/// What an execution routine did with the program counter and whether the
/// data-dependent (taken/repeat) timing applies.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Outcome {
    /// The routine wrote PC itself; the step loop must not advance it.
    pub pc_set: bool,
    /// Charge `cycles_taken` instead of `cycles`.
    pub taken: bool,
    /// Additional T-states beyond the descriptor timing (block repeats).
    pub extra: u32,
}

impl Outcome {
    pub fn normal() -> Self {
        Self::default()
    }

    /// Conditional control transfer: when taken, PC was rewritten.
    pub fn branch(taken: bool) -> Self {
        Self {
            pc_set: taken,
            taken,
            extra: 0,
        }
    }
}

/// Construction-time CPU options.
#[derive(Clone, Copy, Debug)]
pub struct Z80Config {
    /// PC value after reset.
    pub initial_pc: u16,
    /// SP value after reset.
    pub initial_sp: u16,
    /// Accept undocumented opcodes (SLL, IX/IY halves, ED mirrors, ...).
    /// When false, decoding one returns [`CpuError::UnsupportedOpcode`].
    pub allow_undocumented: bool,
}

impl Default for Z80Config {
    fn default() -> Self {
        Self {
            initial_pc: 0x0000,
            initial_sp: 0xFFFF,
            allow_undocumented: true,
        }
    }
}

type TraceHook = Box<dyn FnMut(u16, &'static InstructionDescriptor, &Operands)>;
type PreExecHook = Box<dyn FnMut(&CpuState)>;

/// The CPU itself: state plus configuration, an optional decode trace
/// hook, and an optional pre-execution hook. Memory and I/O live behind
/// the [`Bus`] passed to each step.
pub struct Z80 {
    pub state: CpuState,
    config: Z80Config,
    /// Set by EI; holds off maskable interrupt servicing for exactly one
    /// following instruction. NMI is not delayed.
    ei_delay: bool,
    trace: Option<TraceHook>,
    pre_exec: Option<PreExecHook>,
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Z80 {
    pub fn new() -> Self {
        Self::with_config(Z80Config::default())
    }

    pub fn with_config(config: Z80Config) -> Self {
        Self {
            state: CpuState::new(&config),
            config,
            ei_delay: false,
            trace: None,
            pre_exec: None,
        }
    }

    /// Return every register to its power-on value, keeping the config.
    pub fn reset(&mut self) {
        self.state = CpuState::new(&self.config);
        self.ei_delay = false;
    }

    /// Install a hook called once per decoded instruction with the
    /// instruction address, its descriptor, and the resolved operands.
    pub fn set_trace_hook(&mut self, hook: TraceHook) {
        self.trace = Some(hook);
    }

    pub fn clear_trace_hook(&mut self) {
        self.trace = None;
    }

    /// Install a hook run at the top of every step, before interrupt
    /// servicing, with a read-only view of the CPU state. Hosts use it
    /// for breakpoints, profiling, and other instrumentation.
    pub fn set_pre_exec_hook(&mut self, hook: PreExecHook) {
        self.pre_exec = Some(hook);
    }

    pub fn clear_pre_exec_hook(&mut self) {
        self.pre_exec = None;
    }

    /// Execute one instruction (or service one pending interrupt) and
    /// return the T-states consumed.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        if let Some(hook) = self.pre_exec.as_mut() {
            hook(&self.state);
        }

        let int_cycles = self.service_interrupts(bus);
        if int_cycles > 0 {
            self.state.cycles += int_cycles as u64;
            return Ok(int_cycles);
        }

        if self.state.halted {
            // Burn a NOP's worth of time waiting for an interrupt
            self.state.cycles += 4;
            return Ok(4);
        }

        let start_pc = self.state.pc;
        let mut pos = start_pc;
        let mut extra_cycles = 0u32;
        let mut extra_len = 0u16;
        let mut index: Option<IndexReg> = None;
        let mut byte = self.fetch(bus, pos);

        // Collapse runs of DD/FD: only the last prefix applies, each
        // superseded one costing 4T on its own.
        while byte == 0xDD || byte == 0xFD {
            if index.is_some() {
                extra_cycles += 4;
                extra_len += 1;
            }
            index = Some(if byte == 0xDD {
                IndexReg::Ix
            } else {
                IndexReg::Iy
            });
            pos = pos.wrapping_add(1);
            if pos == start_pc {
                // The whole address space is prefix bytes. Charge the
                // scanned run (the live prefix included) and resume at the
                // same address next step instead of spinning forever.
                let cycles = extra_cycles + 4;
                self.state.cycles += cycles as u64;
                return Ok(cycles);
            }
            byte = self.fetch(bus, pos);
        }

        // DD/FD in front of an ED instruction is ignored, costing 4T
        if byte == 0xED && index.take().is_some() {
            extra_cycles += 4;
            extra_len += 1;
        }

        let eff_pc = start_pc.wrapping_add(extra_len);
        let allow = self.config.allow_undocumented;

        let (desc, ops, isize, ddcb) = if byte == 0xCB && index.is_some() {
            // DD CB d op: the displacement precedes the final opcode byte,
            // which is read without a refresh cycle.
            let disp = bus.read(pos.wrapping_add(1)) as i8;
            let opcode = bus.read(pos.wrapping_add(2));
            let desc = opcodes::lookup(Prefix::Cb, opcode)?;
            // Only the (HL)-column forms are documented under DD/FD CB
            let documented = (opcode & 0x07) == 6 && !desc.undocumented;
            if !allow && !documented {
                let prefix = if matches!(index, Some(IndexReg::Ix)) {
                    Prefix::Dd
                } else {
                    Prefix::Fd
                };
                return Err(CpuError::UnsupportedOpcode { prefix, opcode });
            }
            let mut ops = Operands::default();
            ops.push(Operand::Displacement(disp));
            if matches!(desc.mode, Mode::Bit) {
                ops.push(Operand::BitIndex((opcode >> 3) & 0x07));
            }
            (desc, ops, 4u16, true)
        } else if byte == 0xCB {
            let opcode = self.fetch(bus, pos.wrapping_add(1));
            let desc = opcodes::lookup(Prefix::Cb, opcode)?;
            if desc.undocumented && !allow {
                return Err(CpuError::UnsupportedOpcode {
                    prefix: Prefix::Cb,
                    opcode,
                });
            }
            let ops = decode::resolve_operands(bus, desc, eff_pc, Prefix::Cb, opcode);
            (desc, ops, desc.size as u16, false)
        } else if byte == 0xED {
            let opcode = self.fetch(bus, pos.wrapping_add(1));
            let desc = opcodes::lookup(Prefix::Ed, opcode)?;
            if desc.undocumented && !allow {
                return Err(CpuError::UnsupportedOpcode {
                    prefix: Prefix::Ed,
                    opcode,
                });
            }
            let ops = decode::resolve_operands(bus, desc, eff_pc, Prefix::Ed, opcode);
            (desc, ops, desc.size as u16, false)
        } else if let Some(idx) = index {
            let prefix = match idx {
                IndexReg::Ix => Prefix::Dd,
                IndexReg::Iy => Prefix::Fd,
            };
            let desc = opcodes::lookup(prefix, byte)?;
            if desc.undocumented && !allow {
                return Err(CpuError::UnsupportedOpcode {
                    prefix,
                    opcode: byte,
                });
            }
            let ops = decode::resolve_operands(bus, desc, eff_pc, prefix, byte);
            (desc, ops, desc.size as u16, false)
        } else {
            let desc = opcodes::lookup(Prefix::None, byte)?;
            let ops = decode::resolve_operands(bus, desc, eff_pc, Prefix::None, byte);
            (desc, ops, desc.size as u16, false)
        };

        let next_pc = eff_pc.wrapping_add(isize);
        if let Some(hook) = self.trace.as_mut() {
            hook(eff_pc, desc, &ops);
        }

        let out = self.dispatch(bus, desc, &ops, index, next_pc)?;

        let mut cycles = if out.taken {
            desc.cycles_taken
        } else {
            desc.cycles
        };
        if ddcb {
            // DD/FD CB timing is uniform: 20T for BIT, 23T for the
            // read-modify-write forms
            cycles = if matches!(desc.operation, Operation::Bit) {
                20
            } else {
                23
            };
        }
        cycles += extra_cycles + out.extra;

        if !out.pc_set {
            self.state.pc = next_pc;
        }
        self.state.cycles += cycles as u64;
        Ok(cycles)
    }

    /// Opcode fetch: an M1 cycle, so it ticks the refresh counter.
    fn fetch<B: Bus>(&mut self, bus: &mut B, addr: u16) -> u8 {
        self.state.bump_r();
        bus.read(addr)
    }

    fn dispatch<B: Bus>(
        &mut self,
        bus: &mut B,
        desc: &'static InstructionDescriptor,
        ops: &Operands,
        index: Option<IndexReg>,
        next_pc: u16,
    ) -> Result<Outcome, CpuError> {
        let done = |r: Result<(), CpuError>| r.map(|()| Outcome::normal());
        match desc.operation {
            Operation::Nop => Ok(Outcome::normal()),
            Operation::Halt => {
                self.state.halted = true;
                Ok(Outcome::normal())
            }
            Operation::Ld8 => done(self.exec_ld8(bus, desc, ops)),
            Operation::Ld16 => done(self.exec_ld16(bus, desc, ops)),
            Operation::Push => done(self.exec_push(bus, desc, ops)),
            Operation::Pop => done(self.exec_pop(bus, desc, ops)),
            Operation::ExAf => {
                self.state.ex_af();
                Ok(Outcome::normal())
            }
            Operation::Exx => {
                self.state.exx();
                Ok(Outcome::normal())
            }
            Operation::ExDeHl => {
                self.state.ex_de_hl();
                Ok(Outcome::normal())
            }
            Operation::ExSp => done(self.exec_ex_sp(bus, desc, ops)),
            Operation::Alu8(op) => done(self.exec_alu8(bus, desc, ops, op)),
            Operation::Inc8 => done(self.exec_inc8(bus, desc, ops)),
            Operation::Dec8 => done(self.exec_dec8(bus, desc, ops)),
            Operation::Add16 => done(self.exec_add16(desc, ops)),
            Operation::Adc16 => done(self.exec_adc16(desc, ops)),
            Operation::Sbc16 => done(self.exec_sbc16(desc, ops)),
            Operation::Inc16 => done(self.exec_inc16(desc, ops)),
            Operation::Dec16 => done(self.exec_dec16(desc, ops)),
            Operation::Daa => {
                self.exec_daa();
                Ok(Outcome::normal())
            }
            Operation::Cpl => {
                self.exec_cpl();
                Ok(Outcome::normal())
            }
            Operation::Neg => {
                self.exec_neg();
                Ok(Outcome::normal())
            }
            Operation::Scf => {
                self.exec_scf();
                Ok(Outcome::normal())
            }
            Operation::Ccf => {
                self.exec_ccf();
                Ok(Outcome::normal())
            }
            Operation::Rlca => {
                self.exec_rlca();
                Ok(Outcome::normal())
            }
            Operation::Rrca => {
                self.exec_rrca();
                Ok(Outcome::normal())
            }
            Operation::Rla => {
                self.exec_rla();
                Ok(Outcome::normal())
            }
            Operation::Rra => {
                self.exec_rra();
                Ok(Outcome::normal())
            }
            Operation::Rot(rot) => done(self.exec_rot(bus, desc, ops, rot, index)),
            Operation::Bit => done(self.exec_bit(bus, desc, ops, index)),
            Operation::Res => done(self.exec_res_set(bus, desc, ops, index, false)),
            Operation::Set => done(self.exec_res_set(bus, desc, ops, index, true)),
            Operation::Rld => done(self.exec_rld(bus)),
            Operation::Rrd => done(self.exec_rrd(bus)),
            Operation::Jp(cond) => self.exec_jp(desc, ops, cond),
            Operation::JpInd => self.exec_jp_ind(desc, ops),
            Operation::Jr(cond) => self.exec_jr(desc, ops, cond, next_pc),
            Operation::Djnz => self.exec_djnz(desc, ops, next_pc),
            Operation::Call(cond) => self.exec_call(bus, desc, ops, cond, next_pc),
            Operation::Ret(cond) => self.exec_ret(bus, cond),
            Operation::Reti => self.exec_reti(bus),
            Operation::Retn => self.exec_retn(bus),
            Operation::Rst(vector) => self.exec_rst(bus, vector, next_pc),
            Operation::In8 => done(self.exec_in8(bus, desc, ops)),
            Operation::Out8 => done(self.exec_out8(bus, desc, ops)),
            Operation::Ldi => self.exec_ldi_ldd(bus, true, false),
            Operation::Ldd => self.exec_ldi_ldd(bus, false, false),
            Operation::Ldir => self.exec_ldi_ldd(bus, true, true),
            Operation::Lddr => self.exec_ldi_ldd(bus, false, true),
            Operation::Cpi => self.exec_cpi_cpd(bus, true, false),
            Operation::Cpd => self.exec_cpi_cpd(bus, false, false),
            Operation::Cpir => self.exec_cpi_cpd(bus, true, true),
            Operation::Cpdr => self.exec_cpi_cpd(bus, false, true),
            Operation::Ini => self.exec_ini_ind(bus, true, false),
            Operation::Ind => self.exec_ini_ind(bus, false, false),
            Operation::Inir => self.exec_ini_ind(bus, true, true),
            Operation::Indr => self.exec_ini_ind(bus, false, true),
            Operation::Outi => self.exec_outi_outd(bus, true, false),
            Operation::Outd => self.exec_outi_outd(bus, false, false),
            Operation::Otir => self.exec_outi_outd(bus, true, true),
            Operation::Otdr => self.exec_outi_outd(bus, false, true),
            Operation::Di => {
                self.state.iff1 = false;
                self.state.iff2 = false;
                Ok(Outcome::normal())
            }
            Operation::Ei => {
                self.state.iff1 = true;
                self.state.iff2 = true;
                self.ei_delay = true;
                Ok(Outcome::normal())
            }
            Operation::Im(mode) => {
                self.state.im = mode;
                Ok(Outcome::normal())
            }
        }
    }

    // -----------------------------------------------------------------
    // Operand access shared by the execution routines
    // -----------------------------------------------------------------

    /// Memory address of an indirect operand.
    pub(crate) fn effective_addr(
        &self,
        ops: &Operands,
        target: Target,
        mnemonic: &'static str,
    ) -> Result<u16, CpuError> {
        match target {
            Target::IndBC => Ok(self.state.bc()),
            Target::IndDE => Ok(self.state.de()),
            Target::IndHL => Ok(self.state.hl()),
            Target::IndSP => Ok(self.state.sp),
            Target::IndIX => Ok(self
                .state
                .ix
                .wrapping_add_signed(ops.displacement(mnemonic)? as i16)),
            Target::IndIY => Ok(self
                .state
                .iy
                .wrapping_add_signed(ops.displacement(mnemonic)? as i16)),
            _ => Err(CpuError::InvalidParameterType { mnemonic }),
        }
    }

    /// Read an 8-bit operand value (register, immediate, or memory).
    pub(crate) fn read8<B: Bus>(
        &self,
        bus: &mut B,
        ops: &Operands,
        target: Target,
        mnemonic: &'static str,
    ) -> Result<u8, CpuError> {
        Ok(match target {
            Target::A => self.state.a,
            Target::B => self.state.b,
            Target::C => self.state.c,
            Target::D => self.state.d,
            Target::E => self.state.e,
            Target::H => self.state.h,
            Target::L => self.state.l,
            Target::I => self.state.i,
            Target::R => self.state.r,
            Target::IxH => (self.state.ix >> 8) as u8,
            Target::IxL => self.state.ix as u8,
            Target::IyH => (self.state.iy >> 8) as u8,
            Target::IyL => self.state.iy as u8,
            Target::Imm => ops.immediate8(mnemonic)?,
            Target::IndBC
            | Target::IndDE
            | Target::IndHL
            | Target::IndSP
            | Target::IndIX
            | Target::IndIY => {
                let addr = self.effective_addr(ops, target, mnemonic)?;
                bus.read(addr)
            }
            _ => return Err(CpuError::InvalidParameterType { mnemonic }),
        })
    }

    /// Write an 8-bit operand value (register or memory).
    pub(crate) fn write8<B: Bus>(
        &mut self,
        bus: &mut B,
        ops: &Operands,
        target: Target,
        mnemonic: &'static str,
        value: u8,
    ) -> Result<(), CpuError> {
        match target {
            Target::A => self.state.a = value,
            Target::B => self.state.b = value,
            Target::C => self.state.c = value,
            Target::D => self.state.d = value,
            Target::E => self.state.e = value,
            Target::H => self.state.h = value,
            Target::L => self.state.l = value,
            Target::I => self.state.i = value,
            Target::R => self.state.r = value,
            Target::IxH => self.state.ix = (self.state.ix & 0x00FF) | ((value as u16) << 8),
            Target::IxL => self.state.ix = (self.state.ix & 0xFF00) | value as u16,
            Target::IyH => self.state.iy = (self.state.iy & 0x00FF) | ((value as u16) << 8),
            Target::IyL => self.state.iy = (self.state.iy & 0xFF00) | value as u16,
            Target::IndBC
            | Target::IndDE
            | Target::IndHL
            | Target::IndSP
            | Target::IndIX
            | Target::IndIY => {
                let addr = self.effective_addr(ops, target, mnemonic)?;
                bus.write(addr, value);
            }
            _ => return Err(CpuError::InvalidParameterType { mnemonic }),
        }
        Ok(())
    }

    /// Read a 16-bit operand value (register pair or immediate).
    pub(crate) fn read16(
        &self,
        ops: &Operands,
        target: Target,
        mnemonic: &'static str,
    ) -> Result<u16, CpuError> {
        match target {
            Target::AF => Ok(self.state.af()),
            Target::BC => Ok(self.state.bc()),
            Target::DE => Ok(self.state.de()),
            Target::HL => Ok(self.state.hl()),
            Target::SP => Ok(self.state.sp),
            Target::IX => Ok(self.state.ix),
            Target::IY => Ok(self.state.iy),
            Target::Imm => ops.immediate16(mnemonic),
            _ => Err(CpuError::InvalidParameterType { mnemonic }),
        }
    }

    /// Write a 16-bit register pair.
    pub(crate) fn write16(
        &mut self,
        target: Target,
        mnemonic: &'static str,
        value: u16,
    ) -> Result<(), CpuError> {
        match target {
            Target::AF => self.state.set_af(value),
            Target::BC => self.state.set_bc(value),
            Target::DE => self.state.set_de(value),
            Target::HL => self.state.set_hl(value),
            Target::SP => self.state.sp = value,
            Target::IX => self.state.ix = value,
            Target::IY => self.state.iy = value,
            _ => return Err(CpuError::InvalidParameterType { mnemonic }),
        }
        Ok(())
    }
}

impl CpuStateTrait for Z80 {
    type Snapshot = Z80State;

    fn snapshot(&self) -> Z80State {
        let s = &self.state;
        Z80State {
            a: s.a,
            f: s.flags.packed(),
            b: s.b,
            c: s.c,
            d: s.d,
            e: s.e,
            h: s.h,
            l: s.l,
            a_prime: s.a_prime,
            f_prime: s.flags_prime.packed(),
            b_prime: s.b_prime,
            c_prime: s.c_prime,
            d_prime: s.d_prime,
            e_prime: s.e_prime,
            h_prime: s.h_prime,
            l_prime: s.l_prime,
            ix: s.ix,
            iy: s.iy,
            sp: s.sp,
            pc: s.pc,
            i: s.i,
            r: s.r,
            iff1: s.iff1,
            iff2: s.iff2,
            im: s.im,
            halted: s.halted,
            nmi_pending: s.nmi_pending,
            irq_pending: s.irq_pending,
            cycles: s.cycles,
        }
    }
}
