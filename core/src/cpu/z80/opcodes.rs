//! Static opcode tables: one 256-entry table per prefix space.
//!
//! Every concrete opcode byte owns its own slot carrying explicit
//! source/destination register identifiers, so two opcodes sharing an
//! (operation, addressing-mode) pair never need a secondary lookup to tell
//! apart. Tables are built in const context and shared by every CPU
//! instance. Mnemonics for the pattern-filled blocks are pattern-level
//! ("LD r,r'"); the concrete operands live in `dst`/`src`.
//!
//! The DD/FD tables are derived from the unprefixed table by rewriting
//! H/L/HL/(HL) references to the index-register forms with the standard
//! timing adjustments. DD/FD in front of an instruction with no HL
//! reference acts as a 4T prefix no-op and is kept as an undocumented
//! entry. The DD/FD+CB forms are looked up in the CB table; the step loop
//! applies their special sizes and timings.

use crate::cpu::z80::error::CpuError;

/// Opcode-byte context selecting which 256-entry table a byte is looked
/// up in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prefix {
    None,
    Cb,
    Ed,
    Dd,
    Fd,
}

impl std::fmt::Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Cb => write!(f, "CB "),
            Self::Ed => write!(f, "ED "),
            Self::Dd => write!(f, "DD "),
            Self::Fd => write!(f, "FD "),
        }
    }
}

/// Operand-location strategy for an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Implied,
    Register,
    Immediate,
    Extended,
    Indirect,
    Relative,
    Bit,
    Port,
}

/// Register-or-immediate-or-indirect operand identifier baked into each
/// table slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    None,
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    I,
    R,
    // Undocumented index-register halves
    IxH,
    IxL,
    IyH,
    IyL,
    // 16-bit pairs
    AF,
    BC,
    DE,
    HL,
    SP,
    IX,
    IY,
    // Register-indirect memory operands
    IndBC,
    IndDE,
    IndHL,
    IndSP,
    IndIX,
    IndIY,
    /// Value comes from the resolved immediate operand.
    Imm,
}

/// Condition codes for conditional control transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cond {
    Always,
    NZ,
    Z,
    NC,
    C,
    PO,
    PE,
    P,
    M,
}

/// 8-bit accumulator ALU operations (opcode bits 5-3 in the 0x80-0xBF
/// block and the 0xC6-family immediates).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alu8Op {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

/// CB-space rotate/shift operations (opcode bits 5-3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Sll,
    Srl,
}

/// Operation tag dispatched by an exhaustive match in the execution
/// engine. Payload variants carry decode-time constants (condition code,
/// RST vector, IM argument).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Nop,
    Halt,
    Ld8,
    Ld16,
    Push,
    Pop,
    ExAf,
    Exx,
    ExDeHl,
    ExSp,
    Alu8(Alu8Op),
    Inc8,
    Dec8,
    Add16,
    Adc16,
    Sbc16,
    Inc16,
    Dec16,
    Daa,
    Cpl,
    Neg,
    Scf,
    Ccf,
    Rlca,
    Rrca,
    Rla,
    Rra,
    Rot(RotOp),
    Bit,
    Res,
    Set,
    Rld,
    Rrd,
    Jp(Cond),
    JpInd,
    Jr(Cond),
    Djnz,
    Call(Cond),
    Ret(Cond),
    Reti,
    Retn,
    Rst(u8),
    In8,
    Out8,
    Ldi,
    Ldd,
    Ldir,
    Lddr,
    Cpi,
    Cpd,
    Cpir,
    Cpdr,
    Ini,
    Ind,
    Inir,
    Indr,
    Outi,
    Outd,
    Otir,
    Otdr,
    Di,
    Ei,
    Im(u8),
}

/// Immutable per-opcode descriptor. `size` counts every instruction byte
/// including prefixes; `cycles` is the base (not-taken) T-state count and
/// `cycles_taken` the taken-branch / repeat-iteration count (equal to
/// `cycles` when timing is not data-dependent).
#[derive(Clone, Copy, Debug)]
pub struct InstructionDescriptor {
    pub mnemonic: &'static str,
    pub operation: Operation,
    pub mode: Mode,
    pub size: u8,
    pub cycles: u32,
    pub cycles_taken: u32,
    pub dst: Target,
    pub src: Target,
    pub undocumented: bool,
}

/// O(1) descriptor lookup. Fails only for a genuinely empty slot.
pub fn lookup(prefix: Prefix, opcode: u8) -> Result<&'static InstructionDescriptor, CpuError> {
    let table: &[Option<InstructionDescriptor>; 256] = match prefix {
        Prefix::None => &MAIN_TABLE,
        Prefix::Cb => &CB_TABLE,
        Prefix::Ed => &ED_TABLE,
        Prefix::Dd => &DD_TABLE,
        Prefix::Fd => &FD_TABLE,
    };
    table[opcode as usize]
        .as_ref()
        .ok_or(CpuError::UnsupportedOpcode { prefix, opcode })
}

pub static MAIN_TABLE: [Option<InstructionDescriptor>; 256] = build_main();
pub static CB_TABLE: [Option<InstructionDescriptor>; 256] = build_cb();
pub static ED_TABLE: [Option<InstructionDescriptor>; 256] = build_ed();
pub static DD_TABLE: [Option<InstructionDescriptor>; 256] = build_index(false);
pub static FD_TABLE: [Option<InstructionDescriptor>; 256] = build_index(true);

// ---------------------------------------------------------------------------
// Const construction helpers
// ---------------------------------------------------------------------------

const fn desc(
    mnemonic: &'static str,
    operation: Operation,
    mode: Mode,
    size: u8,
    cycles: u32,
    dst: Target,
    src: Target,
) -> Option<InstructionDescriptor> {
    Some(InstructionDescriptor {
        mnemonic,
        operation,
        mode,
        size,
        cycles,
        cycles_taken: cycles,
        dst,
        src,
        undocumented: false,
    })
}

/// Descriptor with distinct taken/not-taken timing.
const fn desc_br(
    mnemonic: &'static str,
    operation: Operation,
    mode: Mode,
    size: u8,
    cycles: u32,
    cycles_taken: u32,
    dst: Target,
    src: Target,
) -> Option<InstructionDescriptor> {
    Some(InstructionDescriptor {
        mnemonic,
        operation,
        mode,
        size,
        cycles,
        cycles_taken,
        dst,
        src,
        undocumented: false,
    })
}

const fn undoc(entry: Option<InstructionDescriptor>) -> Option<InstructionDescriptor> {
    match entry {
        Some(mut d) => {
            d.undocumented = true;
            Some(d)
        }
        None => None,
    }
}

/// 8-bit register from an opcode octal digit (6 = (HL)).
const fn reg_target(i: u8) -> Target {
    match i {
        0 => Target::B,
        1 => Target::C,
        2 => Target::D,
        3 => Target::E,
        4 => Target::H,
        5 => Target::L,
        6 => Target::IndHL,
        _ => Target::A,
    }
}

/// Register pair from opcode bits 5-4 (SP variant).
const fn rp_target(i: u8) -> Target {
    match i {
        0 => Target::BC,
        1 => Target::DE,
        2 => Target::HL,
        _ => Target::SP,
    }
}

/// Register pair from opcode bits 5-4 (AF variant, for PUSH/POP).
const fn rp_af_target(i: u8) -> Target {
    match i {
        0 => Target::BC,
        1 => Target::DE,
        2 => Target::HL,
        _ => Target::AF,
    }
}

/// Condition code from opcode bits 5-3.
const fn cond_code(i: u8) -> Cond {
    match i {
        0 => Cond::NZ,
        1 => Cond::Z,
        2 => Cond::NC,
        3 => Cond::C,
        4 => Cond::PO,
        5 => Cond::PE,
        6 => Cond::P,
        _ => Cond::M,
    }
}

const fn alu_op(i: u8) -> Alu8Op {
    match i {
        0 => Alu8Op::Add,
        1 => Alu8Op::Adc,
        2 => Alu8Op::Sub,
        3 => Alu8Op::Sbc,
        4 => Alu8Op::And,
        5 => Alu8Op::Xor,
        6 => Alu8Op::Or,
        _ => Alu8Op::Cp,
    }
}

const fn alu_reg_mnemonic(i: u8) -> &'static str {
    match i {
        0 => "ADD A,r",
        1 => "ADC A,r",
        2 => "SUB r",
        3 => "SBC A,r",
        4 => "AND r",
        5 => "XOR r",
        6 => "OR r",
        _ => "CP r",
    }
}

const fn alu_imm_mnemonic(i: u8) -> &'static str {
    match i {
        0 => "ADD A,n",
        1 => "ADC A,n",
        2 => "SUB n",
        3 => "SBC A,n",
        4 => "AND n",
        5 => "XOR n",
        6 => "OR n",
        _ => "CP n",
    }
}

const fn rot_op(i: u8) -> RotOp {
    match i {
        0 => RotOp::Rlc,
        1 => RotOp::Rrc,
        2 => RotOp::Rl,
        3 => RotOp::Rr,
        4 => RotOp::Sla,
        5 => RotOp::Sra,
        6 => RotOp::Sll,
        _ => RotOp::Srl,
    }
}

const fn rot_mnemonic(i: u8) -> &'static str {
    match i {
        0 => "RLC r",
        1 => "RRC r",
        2 => "RL r",
        3 => "RR r",
        4 => "SLA r",
        5 => "SRA r",
        6 => "SLL r",
        _ => "SRL r",
    }
}

// ---------------------------------------------------------------------------
// Unprefixed table
// ---------------------------------------------------------------------------

const fn build_main() -> [Option<InstructionDescriptor>; 256] {
    let mut t: [Option<InstructionDescriptor>; 256] = [None; 256];

    // LD r,r' block (0x40-0x7F; 0x76 is HALT, patched below)
    let mut i = 0x40usize;
    while i < 0x80 {
        let byte = i as u8;
        let dst = reg_target((byte >> 3) & 0x07);
        let src = reg_target(byte & 0x07);
        t[i] = if matches!(src, Target::IndHL) {
            desc("LD r,(HL)", Operation::Ld8, Mode::Indirect, 1, 7, dst, src)
        } else if matches!(dst, Target::IndHL) {
            desc("LD (HL),r", Operation::Ld8, Mode::Indirect, 1, 7, dst, src)
        } else {
            desc("LD r,r'", Operation::Ld8, Mode::Register, 1, 4, dst, src)
        };
        i += 1;
    }

    // ALU A,r block (0x80-0xBF)
    let mut i = 0x80usize;
    while i < 0xC0 {
        let byte = i as u8;
        let op = (byte >> 3) & 0x07;
        let src = reg_target(byte & 0x07);
        let (mode, cycles) = if matches!(src, Target::IndHL) {
            (Mode::Indirect, 7)
        } else {
            (Mode::Register, 4)
        };
        t[i] = desc(
            alu_reg_mnemonic(op),
            Operation::Alu8(alu_op(op)),
            mode,
            1,
            cycles,
            Target::A,
            src,
        );
        i += 1;
    }

    // INC r / DEC r / LD r,n (one of each per octal row)
    let mut r = 0u8;
    while r < 8 {
        let target = reg_target(r);
        let hl = matches!(target, Target::IndHL);
        let mode = if hl { Mode::Indirect } else { Mode::Register };
        t[((r << 3) | 0x04) as usize] = desc(
            if hl { "INC (HL)" } else { "INC r" },
            Operation::Inc8,
            mode,
            1,
            if hl { 11 } else { 4 },
            target,
            Target::None,
        );
        t[((r << 3) | 0x05) as usize] = desc(
            if hl { "DEC (HL)" } else { "DEC r" },
            Operation::Dec8,
            mode,
            1,
            if hl { 11 } else { 4 },
            target,
            Target::None,
        );
        t[((r << 3) | 0x06) as usize] = desc(
            if hl { "LD (HL),n" } else { "LD r,n" },
            Operation::Ld8,
            Mode::Immediate,
            2,
            if hl { 10 } else { 7 },
            target,
            Target::Imm,
        );
        r += 1;
    }

    // Register-pair rows
    let mut p = 0u8;
    while p < 4 {
        let rp = rp_target(p);
        let rp_af = rp_af_target(p);
        t[((p << 4) | 0x01) as usize] = desc(
            "LD rr,nn",
            Operation::Ld16,
            Mode::Immediate,
            3,
            10,
            rp,
            Target::Imm,
        );
        t[((p << 4) | 0x03) as usize] =
            desc("INC rr", Operation::Inc16, Mode::Register, 1, 6, rp, Target::None);
        t[((p << 4) | 0x09) as usize] =
            desc("ADD HL,rr", Operation::Add16, Mode::Register, 1, 11, Target::HL, rp);
        t[((p << 4) | 0x0B) as usize] =
            desc("DEC rr", Operation::Dec16, Mode::Register, 1, 6, rp, Target::None);
        t[(0xC5 | (p << 4)) as usize] =
            desc("PUSH rr", Operation::Push, Mode::Register, 1, 11, Target::None, rp_af);
        t[(0xC1 | (p << 4)) as usize] =
            desc("POP rr", Operation::Pop, Mode::Register, 1, 10, rp_af, Target::None);
        p += 1;
    }

    // Condition-code rows
    let mut cc = 0u8;
    while cc < 8 {
        let cond = cond_code(cc);
        t[(0xC0 | (cc << 3)) as usize] = desc_br(
            "RET cc",
            Operation::Ret(cond),
            Mode::Implied,
            1,
            5,
            11,
            Target::None,
            Target::None,
        );
        t[(0xC2 | (cc << 3)) as usize] = desc(
            "JP cc,nn",
            Operation::Jp(cond),
            Mode::Extended,
            3,
            10,
            Target::None,
            Target::Imm,
        );
        t[(0xC4 | (cc << 3)) as usize] = desc_br(
            "CALL cc,nn",
            Operation::Call(cond),
            Mode::Extended,
            3,
            10,
            17,
            Target::None,
            Target::Imm,
        );
        t[(0xC6 | (cc << 3)) as usize] = desc(
            alu_imm_mnemonic(cc),
            Operation::Alu8(alu_op(cc)),
            Mode::Immediate,
            2,
            7,
            Target::A,
            Target::Imm,
        );
        t[(0xC7 | (cc << 3)) as usize] = desc(
            "RST p",
            Operation::Rst(cc << 3),
            Mode::Implied,
            1,
            11,
            Target::None,
            Target::None,
        );
        cc += 1;
    }

    // JR cc,e (NZ/Z/NC/C only)
    let mut cc = 0u8;
    while cc < 4 {
        t[(0x20 | (cc << 3)) as usize] = desc_br(
            "JR cc,e",
            Operation::Jr(cond_code(cc)),
            Mode::Relative,
            2,
            7,
            12,
            Target::None,
            Target::Imm,
        );
        cc += 1;
    }

    // Singles
    t[0x00] = desc("NOP", Operation::Nop, Mode::Implied, 1, 4, Target::None, Target::None);
    t[0x02] = desc("LD (BC),A", Operation::Ld8, Mode::Indirect, 1, 7, Target::IndBC, Target::A);
    t[0x07] = desc("RLCA", Operation::Rlca, Mode::Implied, 1, 4, Target::A, Target::None);
    t[0x08] = desc("EX AF,AF'", Operation::ExAf, Mode::Implied, 1, 4, Target::None, Target::None);
    t[0x0A] = desc("LD A,(BC)", Operation::Ld8, Mode::Indirect, 1, 7, Target::A, Target::IndBC);
    t[0x0F] = desc("RRCA", Operation::Rrca, Mode::Implied, 1, 4, Target::A, Target::None);
    t[0x10] = desc_br(
        "DJNZ e",
        Operation::Djnz,
        Mode::Relative,
        2,
        8,
        13,
        Target::B,
        Target::Imm,
    );
    t[0x12] = desc("LD (DE),A", Operation::Ld8, Mode::Indirect, 1, 7, Target::IndDE, Target::A);
    t[0x17] = desc("RLA", Operation::Rla, Mode::Implied, 1, 4, Target::A, Target::None);
    t[0x18] = desc(
        "JR e",
        Operation::Jr(Cond::Always),
        Mode::Relative,
        2,
        12,
        Target::None,
        Target::Imm,
    );
    t[0x1A] = desc("LD A,(DE)", Operation::Ld8, Mode::Indirect, 1, 7, Target::A, Target::IndDE);
    t[0x1F] = desc("RRA", Operation::Rra, Mode::Implied, 1, 4, Target::A, Target::None);
    t[0x22] = desc(
        "LD (nn),HL",
        Operation::Ld16,
        Mode::Extended,
        3,
        16,
        Target::None,
        Target::HL,
    );
    t[0x27] = desc("DAA", Operation::Daa, Mode::Implied, 1, 4, Target::A, Target::None);
    t[0x2A] = desc(
        "LD HL,(nn)",
        Operation::Ld16,
        Mode::Extended,
        3,
        16,
        Target::HL,
        Target::None,
    );
    t[0x2F] = desc("CPL", Operation::Cpl, Mode::Implied, 1, 4, Target::A, Target::None);
    t[0x32] = desc(
        "LD (nn),A",
        Operation::Ld8,
        Mode::Extended,
        3,
        13,
        Target::None,
        Target::A,
    );
    t[0x37] = desc("SCF", Operation::Scf, Mode::Implied, 1, 4, Target::None, Target::None);
    t[0x3A] = desc(
        "LD A,(nn)",
        Operation::Ld8,
        Mode::Extended,
        3,
        13,
        Target::A,
        Target::None,
    );
    t[0x3F] = desc("CCF", Operation::Ccf, Mode::Implied, 1, 4, Target::None, Target::None);
    t[0x76] = desc("HALT", Operation::Halt, Mode::Implied, 1, 4, Target::None, Target::None);
    t[0xC3] = desc(
        "JP nn",
        Operation::Jp(Cond::Always),
        Mode::Extended,
        3,
        10,
        Target::None,
        Target::Imm,
    );
    t[0xC9] = desc(
        "RET",
        Operation::Ret(Cond::Always),
        Mode::Implied,
        1,
        10,
        Target::None,
        Target::None,
    );
    t[0xCD] = desc(
        "CALL nn",
        Operation::Call(Cond::Always),
        Mode::Extended,
        3,
        17,
        Target::None,
        Target::Imm,
    );
    t[0xD3] = desc("OUT (n),A", Operation::Out8, Mode::Port, 2, 11, Target::Imm, Target::A);
    t[0xD9] = desc("EXX", Operation::Exx, Mode::Implied, 1, 4, Target::None, Target::None);
    t[0xDB] = desc("IN A,(n)", Operation::In8, Mode::Port, 2, 11, Target::A, Target::Imm);
    t[0xE3] = desc(
        "EX (SP),HL",
        Operation::ExSp,
        Mode::Indirect,
        1,
        19,
        Target::IndSP,
        Target::HL,
    );
    t[0xE9] = desc("JP (HL)", Operation::JpInd, Mode::Register, 1, 4, Target::None, Target::HL);
    t[0xEB] = desc(
        "EX DE,HL",
        Operation::ExDeHl,
        Mode::Implied,
        1,
        4,
        Target::None,
        Target::None,
    );
    t[0xF3] = desc("DI", Operation::Di, Mode::Implied, 1, 4, Target::None, Target::None);
    t[0xF9] = desc("LD SP,HL", Operation::Ld16, Mode::Register, 1, 6, Target::SP, Target::HL);
    t[0xFB] = desc("EI", Operation::Ei, Mode::Implied, 1, 4, Target::None, Target::None);

    // Prefix bytes are consumed by the step loop, never looked up here.
    t[0xCB] = None;
    t[0xDD] = None;
    t[0xED] = None;
    t[0xFD] = None;

    t
}

// ---------------------------------------------------------------------------
// CB table (fully regular)
// ---------------------------------------------------------------------------

const fn build_cb() -> [Option<InstructionDescriptor>; 256] {
    let mut t: [Option<InstructionDescriptor>; 256] = [None; 256];
    let mut i = 0usize;
    while i < 256 {
        let byte = i as u8;
        let group = byte >> 6; // 0=rot/shift, 1=BIT, 2=RES, 3=SET
        let y = (byte >> 3) & 0x07; // shift op or bit number
        let target = reg_target(byte & 0x07);
        let hl = matches!(target, Target::IndHL);
        t[i] = match group {
            0 => {
                let entry = desc(
                    rot_mnemonic(y),
                    Operation::Rot(rot_op(y)),
                    if hl { Mode::Indirect } else { Mode::Register },
                    2,
                    if hl { 15 } else { 8 },
                    target,
                    Target::None,
                );
                // SLL is the undocumented shift
                if y == 6 { undoc(entry) } else { entry }
            }
            1 => desc(
                if hl { "BIT b,(HL)" } else { "BIT b,r" },
                Operation::Bit,
                Mode::Bit,
                2,
                if hl { 12 } else { 8 },
                Target::None,
                target,
            ),
            2 => desc(
                if hl { "RES b,(HL)" } else { "RES b,r" },
                Operation::Res,
                Mode::Bit,
                2,
                if hl { 15 } else { 8 },
                target,
                Target::None,
            ),
            _ => desc(
                if hl { "SET b,(HL)" } else { "SET b,r" },
                Operation::Set,
                Mode::Bit,
                2,
                if hl { 15 } else { 8 },
                target,
                Target::None,
            ),
        };
        i += 1;
    }
    t
}

// ---------------------------------------------------------------------------
// ED table (sparse; undefined slots stay None)
// ---------------------------------------------------------------------------

const fn build_ed() -> [Option<InstructionDescriptor>; 256] {
    let mut t: [Option<InstructionDescriptor>; 256] = [None; 256];

    // IN r,(C) / OUT (C),r / SBC HL / ADC HL / LD (nn),rr / LD rr,(nn) /
    // NEG / RETN / RETI / IM across the 0x40-0x7F block.
    let mut y = 0u8;
    while y < 8 {
        let reg = reg_target(y);
        // IN r,(C); r=6 sets flags without storing (undocumented IN F,(C))
        t[(0x40 | (y << 3)) as usize] = if y == 6 {
            undoc(desc(
                "IN F,(C)",
                Operation::In8,
                Mode::Port,
                2,
                12,
                Target::None,
                Target::C,
            ))
        } else {
            desc("IN r,(C)", Operation::In8, Mode::Port, 2, 12, reg, Target::C)
        };
        // OUT (C),r; r=6 outputs 0 (undocumented)
        t[(0x41 | (y << 3)) as usize] = if y == 6 {
            undoc(desc(
                "OUT (C),0",
                Operation::Out8,
                Mode::Port,
                2,
                12,
                Target::C,
                Target::None,
            ))
        } else {
            desc("OUT (C),r", Operation::Out8, Mode::Port, 2, 12, Target::C, reg)
        };
        // NEG at 0x44 with undocumented mirrors
        let neg = desc("NEG", Operation::Neg, Mode::Implied, 2, 8, Target::A, Target::None);
        t[(0x44 | (y << 3)) as usize] = if y == 0 { neg } else { undoc(neg) };
        // RETN at 0x45, RETI at 0x4D; other slots are undocumented mirrors
        // that behave as RETN
        let slot_45 = 0x45 | (y << 3);
        if slot_45 == 0x4D || slot_45 == 0x5D || slot_45 == 0x6D || slot_45 == 0x7D {
            let reti = desc(
                "RETI",
                Operation::Reti,
                Mode::Implied,
                2,
                14,
                Target::None,
                Target::None,
            );
            t[slot_45 as usize] = if slot_45 == 0x4D { reti } else { undoc(reti) };
        } else {
            let retn = desc(
                "RETN",
                Operation::Retn,
                Mode::Implied,
                2,
                14,
                Target::None,
                Target::None,
            );
            t[slot_45 as usize] = if slot_45 == 0x45 { retn } else { undoc(retn) };
        }
        // IM: bits 4-3 map 0|1 -> IM 0, 2 -> IM 1, 3 -> IM 2
        let im_mode = match y & 0x03 {
            0 | 1 => 0,
            2 => 1,
            _ => 2,
        };
        let im = desc(
            "IM 0/1/2",
            Operation::Im(im_mode),
            Mode::Implied,
            2,
            8,
            Target::None,
            Target::None,
        );
        t[(0x46 | (y << 3)) as usize] = if y == 0 || y == 2 || y == 3 { im } else { undoc(im) };
        y += 1;
    }

    let mut p = 0u8;
    while p < 4 {
        let rp = rp_target(p);
        t[(0x42 | (p << 4)) as usize] =
            desc("SBC HL,rr", Operation::Sbc16, Mode::Register, 2, 15, Target::HL, rp);
        t[(0x43 | (p << 4)) as usize] =
            desc("LD (nn),rr", Operation::Ld16, Mode::Extended, 4, 20, Target::None, rp);
        t[(0x4A | (p << 4)) as usize] =
            desc("ADC HL,rr", Operation::Adc16, Mode::Register, 2, 15, Target::HL, rp);
        t[(0x4B | (p << 4)) as usize] =
            desc("LD rr,(nn)", Operation::Ld16, Mode::Extended, 4, 20, rp, Target::None);
        p += 1;
    }

    t[0x47] = desc("LD I,A", Operation::Ld8, Mode::Register, 2, 9, Target::I, Target::A);
    t[0x4F] = desc("LD R,A", Operation::Ld8, Mode::Register, 2, 9, Target::R, Target::A);
    t[0x57] = desc("LD A,I", Operation::Ld8, Mode::Register, 2, 9, Target::A, Target::I);
    t[0x5F] = desc("LD A,R", Operation::Ld8, Mode::Register, 2, 9, Target::A, Target::R);
    t[0x67] = desc("RRD", Operation::Rrd, Mode::Indirect, 2, 18, Target::A, Target::IndHL);
    t[0x6F] = desc("RLD", Operation::Rld, Mode::Indirect, 2, 18, Target::A, Target::IndHL);

    // Block transfer / compare / I/O
    t[0xA0] = desc("LDI", Operation::Ldi, Mode::Implied, 2, 16, Target::None, Target::None);
    t[0xA1] = desc("CPI", Operation::Cpi, Mode::Implied, 2, 16, Target::None, Target::None);
    t[0xA2] = desc("INI", Operation::Ini, Mode::Implied, 2, 16, Target::None, Target::None);
    t[0xA3] = desc("OUTI", Operation::Outi, Mode::Implied, 2, 16, Target::None, Target::None);
    t[0xA8] = desc("LDD", Operation::Ldd, Mode::Implied, 2, 16, Target::None, Target::None);
    t[0xA9] = desc("CPD", Operation::Cpd, Mode::Implied, 2, 16, Target::None, Target::None);
    t[0xAA] = desc("IND", Operation::Ind, Mode::Implied, 2, 16, Target::None, Target::None);
    t[0xAB] = desc("OUTD", Operation::Outd, Mode::Implied, 2, 16, Target::None, Target::None);
    t[0xB0] = desc_br("LDIR", Operation::Ldir, Mode::Implied, 2, 16, 21, Target::None, Target::None);
    t[0xB1] = desc_br("CPIR", Operation::Cpir, Mode::Implied, 2, 16, 21, Target::None, Target::None);
    t[0xB2] = desc_br("INIR", Operation::Inir, Mode::Implied, 2, 16, 21, Target::None, Target::None);
    t[0xB3] = desc_br("OTIR", Operation::Otir, Mode::Implied, 2, 16, 21, Target::None, Target::None);
    t[0xB8] = desc_br("LDDR", Operation::Lddr, Mode::Implied, 2, 16, 21, Target::None, Target::None);
    t[0xB9] = desc_br("CPDR", Operation::Cpdr, Mode::Implied, 2, 16, 21, Target::None, Target::None);
    t[0xBA] = desc_br("INDR", Operation::Indr, Mode::Implied, 2, 16, 21, Target::None, Target::None);
    t[0xBB] = desc_br("OTDR", Operation::Otdr, Mode::Implied, 2, 16, 21, Target::None, Target::None);

    t
}

// ---------------------------------------------------------------------------
// DD/FD tables, derived from the unprefixed table
// ---------------------------------------------------------------------------

const fn is_hl_half(t: Target) -> bool {
    matches!(t, Target::H | Target::L)
}

const fn touches_hl(t: Target) -> bool {
    matches!(t, Target::H | Target::L | Target::HL)
}

/// Rewrite H/L/HL to the index-register forms.
const fn remap_reg(t: Target, iy: bool) -> Target {
    match t {
        Target::H => {
            if iy {
                Target::IyH
            } else {
                Target::IxH
            }
        }
        Target::L => {
            if iy {
                Target::IyL
            } else {
                Target::IxL
            }
        }
        Target::HL => {
            if iy {
                Target::IY
            } else {
                Target::IX
            }
        }
        other => other,
    }
}

/// Rewrite only the (HL) indirection, leaving H/L untouched (LD H,(IX+d)
/// keeps H as the register operand).
const fn remap_ind(t: Target, iy: bool) -> Target {
    match t {
        Target::IndHL => {
            if iy {
                Target::IndIY
            } else {
                Target::IndIX
            }
        }
        other => other,
    }
}

const fn build_index(iy: bool) -> [Option<InstructionDescriptor>; 256] {
    let main = build_main();
    let mut t: [Option<InstructionDescriptor>; 256] = [None; 256];
    let mut i = 0usize;
    while i < 256 {
        t[i] = match main[i] {
            None => None,
            Some(base) => {
                let mut d = base;
                let indirect =
                    matches!(d.dst, Target::IndHL) || matches!(d.src, Target::IndHL);
                if i == 0xEB {
                    // EX DE,HL is exempt from index remapping; the prefix
                    // just burns 4T
                    d.size += 1;
                    d.cycles += 4;
                    d.cycles_taken += 4;
                    d.undocumented = true;
                } else if indirect {
                    d.dst = remap_ind(d.dst, iy);
                    d.src = remap_ind(d.src, iy);
                    d.size += 2; // prefix + displacement
                    d.cycles += 12;
                    d.cycles_taken += 12;
                } else if touches_hl(d.dst) || touches_hl(d.src) {
                    let half = is_hl_half(d.dst) || is_hl_half(d.src);
                    d.dst = remap_reg(d.dst, iy);
                    d.src = remap_reg(d.src, iy);
                    d.size += 1;
                    d.cycles += 4;
                    d.cycles_taken += 4;
                    if half {
                        d.undocumented = true;
                    }
                } else {
                    // No HL reference: the prefix is a 4T no-op in front of
                    // the unprefixed instruction
                    d.size += 1;
                    d.cycles += 4;
                    d.cycles_taken += 4;
                    d.undocumented = true;
                }
                Some(d)
            }
        };
        i += 1;
    }

    // LD (IX+d),n overlaps the immediate fetch with the displacement read
    if let Some(d) = &mut t[0x36] {
        d.cycles = 19;
        d.cycles_taken = 19;
    }

    t
}
