use crate::cpu::z80::opcodes::Prefix;

/// Errors surfaced by decode and execution.
///
/// `UnsupportedOpcode` is the only one a well-formed program can hit at
/// runtime; the parameter errors indicate a table/resolver inconsistency
/// and should be treated as assertion failures, not recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    /// Decode hit an opcode byte with no table entry (or an undocumented
    /// entry while undocumented opcodes are disabled).
    UnsupportedOpcode { prefix: Prefix, opcode: u8 },

    /// An execution routine needed an operand the resolver did not produce.
    MissingParameter { mnemonic: &'static str },

    /// An execution routine got an operand of the wrong shape.
    InvalidParameterType { mnemonic: &'static str },

    /// A bit operation carried a bit number outside 0-7.
    InvalidBitNumber(u8),

    /// The host requested an interrupt mode above 2.
    InvalidInterruptMode(u8),
}

impl std::fmt::Display for CpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedOpcode { prefix, opcode } => {
                write!(f, "unsupported opcode {prefix}0x{opcode:02X}")
            }
            Self::MissingParameter { mnemonic } => {
                write!(f, "{mnemonic}: missing operand")
            }
            Self::InvalidParameterType { mnemonic } => {
                write!(f, "{mnemonic}: operand has the wrong type")
            }
            Self::InvalidBitNumber(bit) => write!(f, "invalid bit number {bit}"),
            Self::InvalidInterruptMode(mode) => {
                write!(f, "invalid interrupt mode {mode} (must be 0-2)")
            }
        }
    }
}

impl std::error::Error for CpuError {}
