//! The mutable CPU state: registers, shadow set, flags, interrupt latches.

use crate::cpu::z80::Z80Config;
use crate::cpu::z80::flags::Flags;

/// Every CPU-visible mutable field lives here. Register pairs are derived
/// views over the 8-bit halves; the pair accessors never cache a value.
#[derive(Clone, Debug)]
pub struct CpuState {
    // Registers
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub flags: Flags,
    // Shadow registers
    pub a_prime: u8,
    pub b_prime: u8,
    pub c_prime: u8,
    pub d_prime: u8,
    pub e_prime: u8,
    pub h_prime: u8,
    pub l_prime: u8,
    pub flags_prime: Flags,
    // Index & special registers
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,
    pub nmi_pending: bool,
    pub irq_pending: bool,

    /// Total T-states since reset. Monotonically increasing.
    pub cycles: u64,
}

impl CpuState {
    pub fn new(config: &Z80Config) -> Self {
        Self {
            a: 0xFF,
            b: 0xFF,
            c: 0xFF,
            d: 0xFF,
            e: 0xFF,
            h: 0xFF,
            l: 0xFF,
            flags: Flags::from_packed(0xFF),
            a_prime: 0xFF,
            b_prime: 0xFF,
            c_prime: 0xFF,
            d_prime: 0xFF,
            e_prime: 0xFF,
            h_prime: 0xFF,
            l_prime: 0xFF,
            flags_prime: Flags::from_packed(0xFF),
            ix: 0xFFFF,
            iy: 0xFFFF,
            sp: config.initial_sp,
            pc: config.initial_pc,
            i: 0,
            r: 0,
            iff1: false,
            iff2: false,
            im: 0,
            halted: false,
            nmi_pending: false,
            irq_pending: false,
            cycles: 0,
        }
    }

    // Helpers for 16-bit register access
    pub fn bc(&self) -> u16 {
        ((self.b as u16) << 8) | self.c as u16
    }
    pub fn set_bc(&mut self, val: u16) {
        self.b = (val >> 8) as u8;
        self.c = val as u8;
    }

    pub fn de(&self) -> u16 {
        ((self.d as u16) << 8) | self.e as u16
    }
    pub fn set_de(&mut self, val: u16) {
        self.d = (val >> 8) as u8;
        self.e = val as u8;
    }

    pub fn hl(&self) -> u16 {
        ((self.h as u16) << 8) | self.l as u16
    }
    pub fn set_hl(&mut self, val: u16) {
        self.h = (val >> 8) as u8;
        self.l = val as u8;
    }

    pub fn af(&self) -> u16 {
        ((self.a as u16) << 8) | self.flags.packed() as u16
    }
    pub fn set_af(&mut self, val: u16) {
        self.a = (val >> 8) as u8;
        self.flags.set_packed(val as u8);
    }

    /// R auto-increment: low 7 bits count M1 fetches, bit 7 is preserved.
    pub fn bump_r(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }

    // Exchanges

    pub fn ex_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_prime);
        std::mem::swap(&mut self.flags, &mut self.flags_prime);
    }

    pub fn exx(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_prime);
        std::mem::swap(&mut self.c, &mut self.c_prime);
        std::mem::swap(&mut self.d, &mut self.d_prime);
        std::mem::swap(&mut self.e, &mut self.e_prime);
        std::mem::swap(&mut self.h, &mut self.h_prime);
        std::mem::swap(&mut self.l, &mut self.l_prime);
    }

    pub fn ex_de_hl(&mut self) {
        std::mem::swap(&mut self.d, &mut self.h);
        std::mem::swap(&mut self.e, &mut self.l);
    }
}
