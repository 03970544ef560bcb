//! A minimal Z80 machine: flat 64KB RAM and 256 latched I/O ports.
//!
//! Useful as a test harness and as the smallest possible integration
//! example. Port writes land in a latch array that subsequent port reads
//! return, so a program can talk to "hardware" without any device model.

use ferrite_core::core::Bus;
use ferrite_core::cpu::state::Z80State;
use ferrite_core::cpu::z80::{CpuError, Z80, Z80Config};
use ferrite_core::cpu::CpuStateTrait;

/// 64KB RAM plus port latches. Unwritten ports read as 0xFF, matching a
/// floating data bus.
pub struct SimpleBus {
    ram: Box<[u8; 0x10000]>,
    ports: [u8; 256],
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
            ports: [0xFF; 256],
        }
    }

    pub fn load(&mut self, offset: usize, data: &[u8]) {
        if offset + data.len() <= self.ram.len() {
            self.ram[offset..offset + data.len()].copy_from_slice(data);
        }
    }

    /// Preload a port latch, e.g. to stage input for IN instructions.
    pub fn set_port(&mut self, port: u8, value: u8) {
        self.ports[port as usize] = value;
    }

    pub fn port(&self, port: u8) -> u8 {
        self.ports[port as usize]
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.ram[addr as usize] = data;
    }

    fn read_port(&mut self, port: u8) -> u8 {
        self.ports[port as usize]
    }

    fn write_port(&mut self, port: u8, data: u8) {
        self.ports[port as usize] = data;
    }
}

pub struct SimpleZ80System {
    pub cpu: Z80,
    pub bus: SimpleBus,
}

impl Default for SimpleZ80System {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleZ80System {
    /// Power-on profile: execution starts at 0x0000 with SP at 0xFFFF.
    pub fn new() -> Self {
        Self {
            cpu: Z80::new(),
            bus: SimpleBus::new(),
        }
    }

    /// CP/M-style profile: programs load at 0x0100 and the stack sits
    /// just below the top of memory.
    pub fn cpm() -> Self {
        Self {
            cpu: Z80::with_config(Z80Config {
                initial_pc: 0x0100,
                initial_sp: 0xFFFE,
                ..Z80Config::default()
            }),
            bus: SimpleBus::new(),
        }
    }

    pub fn load_program(&mut self, offset: usize, data: &[u8]) {
        self.bus.load(offset, data);
    }

    /// Run one instruction, returning its T-state cost.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        self.cpu.step(&mut self.bus)
    }

    /// Run `count` instructions, returning the total T-states.
    pub fn run_steps(&mut self, count: usize) -> Result<u64, CpuError> {
        let mut total = 0u64;
        for _ in 0..count {
            total += self.step()? as u64;
        }
        Ok(total)
    }

    pub fn get_cpu_state(&self) -> Z80State {
        self.cpu.snapshot()
    }
}
