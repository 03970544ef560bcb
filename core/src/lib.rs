pub mod core;
pub mod cpu;

pub mod prelude {
    pub use crate::core::Bus;
    pub use crate::cpu::state::CpuStateTrait;
    pub use crate::cpu::z80::{CpuError, Z80, Z80Config};
}
