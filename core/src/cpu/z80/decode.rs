//! Operand fetch and typed access.
//!
//! `resolve_operands` reads the bytes following an opcode according to the
//! descriptor's addressing mode and packs them into an [`Operands`] set.
//! Execution code then pulls values out through the typed accessors, which
//! turn a shape mismatch into a [`CpuError`] instead of a panic.

use crate::core::Bus;
use crate::cpu::z80::error::CpuError;
use crate::cpu::z80::opcodes::{InstructionDescriptor, Mode, Prefix, Target};

/// A single decoded operand value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Immediate8(u8),
    Immediate16(u16),
    Address(u16),
    Displacement(i8),
    BitIndex(u8),
    Port(u8),
}

/// Up to two operands decoded for one instruction, in fetch order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Operands {
    slots: [Option<Operand>; 2],
}

impl Operands {
    pub(crate) fn push(&mut self, op: Operand) {
        if self.slots[0].is_none() {
            self.slots[0] = Some(op);
        } else {
            self.slots[1] = Some(op);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    pub fn immediate8(&self, mnemonic: &'static str) -> Result<u8, CpuError> {
        for slot in self.slots.iter().flatten() {
            if let Operand::Immediate8(v) = slot {
                return Ok(*v);
            }
        }
        Err(self.missing(mnemonic))
    }

    pub fn immediate16(&self, mnemonic: &'static str) -> Result<u16, CpuError> {
        for slot in self.slots.iter().flatten() {
            if let Operand::Immediate16(v) = slot {
                return Ok(*v);
            }
        }
        Err(self.missing(mnemonic))
    }

    pub fn address(&self, mnemonic: &'static str) -> Result<u16, CpuError> {
        for slot in self.slots.iter().flatten() {
            if let Operand::Address(v) = slot {
                return Ok(*v);
            }
        }
        Err(self.missing(mnemonic))
    }

    pub fn displacement(&self, mnemonic: &'static str) -> Result<i8, CpuError> {
        for slot in self.slots.iter().flatten() {
            if let Operand::Displacement(v) = slot {
                return Ok(*v);
            }
        }
        Err(self.missing(mnemonic))
    }

    pub fn bit_index(&self, mnemonic: &'static str) -> Result<u8, CpuError> {
        for slot in self.slots.iter().flatten() {
            if let Operand::BitIndex(v) = slot {
                return if *v < 8 {
                    Ok(*v)
                } else {
                    Err(CpuError::InvalidBitNumber(*v))
                };
            }
        }
        Err(self.missing(mnemonic))
    }

    pub fn port(&self, mnemonic: &'static str) -> Result<u8, CpuError> {
        for slot in self.slots.iter().flatten() {
            if let Operand::Port(v) = slot {
                return Ok(*v);
            }
        }
        Err(self.missing(mnemonic))
    }

    /// A slot exists but none matched the requested shape.
    fn missing(&self, mnemonic: &'static str) -> CpuError {
        if self.is_empty() {
            CpuError::MissingParameter { mnemonic }
        } else {
            CpuError::InvalidParameterType { mnemonic }
        }
    }
}

const fn is_pair(t: Target) -> bool {
    matches!(
        t,
        Target::AF | Target::BC | Target::DE | Target::HL | Target::SP | Target::IX | Target::IY
    )
}

const fn is_indexed(t: Target) -> bool {
    matches!(t, Target::IndIX | Target::IndIY)
}

/// Read the operand bytes for `desc`. `pc` is the address of the first
/// instruction byte (the prefix, when there is one); operand bytes start
/// after the opcode proper. For DD/FD+CB the displacement sits between
/// the CB byte and the final opcode byte, handled by the `Bit`-mode arm.
pub fn resolve_operands<B: Bus>(
    bus: &mut B,
    desc: &InstructionDescriptor,
    pc: u16,
    prefix: Prefix,
    opcode: u8,
) -> Operands {
    let mut ops = Operands::default();
    let operand_pc = match prefix {
        Prefix::None => pc.wrapping_add(1),
        _ => pc.wrapping_add(2),
    };
    let indexed = is_indexed(desc.dst) || is_indexed(desc.src);

    match desc.mode {
        Mode::Implied | Mode::Register => {}
        Mode::Immediate => {
            let mut at = operand_pc;
            if indexed {
                ops.push(Operand::Displacement(bus.read(at) as i8));
                at = at.wrapping_add(1);
            }
            if is_pair(desc.dst) || is_pair(desc.src) {
                ops.push(Operand::Immediate16(bus.read_word(at)));
            } else {
                ops.push(Operand::Immediate8(bus.read(at)));
            }
        }
        Mode::Extended => {
            ops.push(Operand::Address(bus.read_word(operand_pc)));
        }
        Mode::Indirect => {
            if indexed {
                ops.push(Operand::Displacement(bus.read(operand_pc) as i8));
            }
        }
        Mode::Relative => {
            ops.push(Operand::Displacement(bus.read(operand_pc) as i8));
        }
        Mode::Bit => {
            // Bit number is encoded in the final opcode byte; indexed forms
            // additionally carry a displacement ahead of it.
            if indexed {
                ops.push(Operand::Displacement(bus.read(operand_pc) as i8));
            }
            ops.push(Operand::BitIndex((opcode >> 3) & 0x07));
        }
        Mode::Port => {
            // Only the immediate-port forms (IN A,(n) / OUT (n),A) carry an
            // operand byte; the (C) forms take the port from register C.
            if matches!(desc.dst, Target::Imm) || matches!(desc.src, Target::Imm) {
                ops.push(Operand::Port(bus.read(operand_pc)));
            }
        }
    }

    ops
}
