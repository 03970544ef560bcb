//! CPU state snapshot types and traits

/// Trait for CPU types that can provide state snapshots
pub trait CpuStateTrait {
    type Snapshot;
    fn snapshot(&self) -> Self::Snapshot;
}

/// Z80 CPU state snapshot: a plain read-only copy of every CPU-visible
/// field, for save-states, debuggers, and test assertions. Flag bytes are
/// the packed form (C=bit0 ... S=bit7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Z80State {
    pub a: u8,       // Accumulator
    pub f: u8,       // Flags register (packed)
    pub b: u8,       // Register B
    pub c: u8,       // Register C
    pub d: u8,       // Register D
    pub e: u8,       // Register E
    pub h: u8,       // Register H
    pub l: u8,       // Register L
    pub a_prime: u8, // Shadow accumulator
    pub f_prime: u8, // Shadow flags (packed)
    pub b_prime: u8, // Shadow B
    pub c_prime: u8, // Shadow C
    pub d_prime: u8, // Shadow D
    pub e_prime: u8, // Shadow E
    pub h_prime: u8, // Shadow H
    pub l_prime: u8, // Shadow L
    pub ix: u16,     // Index register X
    pub iy: u16,     // Index register Y
    pub sp: u16,     // Stack pointer
    pub pc: u16,     // Program counter
    pub i: u8,       // Interrupt vector register
    pub r: u8,       // Memory refresh register
    pub iff1: bool,  // Interrupt flip-flop 1
    pub iff2: bool,  // Interrupt flip-flop 2
    pub im: u8,      // Interrupt mode (0, 1, 2)
    pub halted: bool,
    pub nmi_pending: bool,
    pub irq_pending: bool,
    pub cycles: u64, // Total T-states since reset
}
