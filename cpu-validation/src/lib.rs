//! Test-vector infrastructure for the Z80 core: a bus that records every
//! access, and the serde types for the generated JSON vectors.

use ferrite_core::core::Bus;
use serde::{Deserialize, Serialize};

// --- TracingBus: flat 64KB memory with access recording ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusOp {
    Read,
    Write,
    PortRead,
    PortWrite,
}

#[derive(Clone, Debug)]
pub struct BusCycle {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

/// Flat memory plus port latches; every access is appended to `cycles`
/// in order, so a test can reconstruct exactly what an instruction
/// touched.
pub struct TracingBus {
    pub memory: Box<[u8; 0x10000]>,
    pub ports: [u8; 256],
    pub cycles: Vec<BusCycle>,
}

impl TracingBus {
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
            ports: [0; 256],
            cycles: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn clear_cycles(&mut self) {
        self.cycles.clear();
    }
}

impl Default for TracingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for TracingBus {
    fn read(&mut self, addr: u16) -> u8 {
        let data = self.memory[addr as usize];
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Read,
        });
        data
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Write,
        });
    }

    fn read_port(&mut self, port: u8) -> u8 {
        let data = self.ports[port as usize];
        self.cycles.push(BusCycle {
            addr: port as u16,
            data,
            op: BusOp::PortRead,
        });
        data
    }

    fn write_port(&mut self, port: u8, data: u8) {
        self.ports[port as usize] = data;
        self.cycles.push(BusCycle {
            addr: port as u16,
            data,
            op: BusOp::PortWrite,
        });
    }
}

// --- Z80 JSON test vector types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Z80TestCase {
    /// Hex bytes of the instruction, e.g. "dd 36 05 2a".
    pub name: String,
    pub initial: Z80RegState,
    #[serde(rename = "final")]
    pub final_state: Z80RegState,
    /// Total T-states for the instruction.
    pub cycles: u32,
    /// Port traffic as (port, data, "r" | "w"), in order. Reads are
    /// staged into the latch before execution; writes are verified after.
    pub ports: Vec<(u8, u8, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Z80RegState {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    // Shadow registers as 16-bit pairs
    pub af_prime: u16,
    pub bc_prime: u16,
    pub de_prime: u16,
    pub hl_prime: u16,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,
    pub iff1: u8,
    pub iff2: u8,
    pub im: u8,
    /// Sparse memory as (address, value), covering every touched byte.
    pub ram: Vec<(u16, u8)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_bus_records_accesses_in_order() {
        let mut bus = TracingBus::new();
        bus.load(0x0100, &[0xAB]);
        let val = bus.read(0x0100);
        bus.write(0x0200, 0x12);
        bus.write_port(0x42, 0x99);

        assert_eq!(val, 0xAB);
        assert_eq!(bus.cycles.len(), 3);
        assert_eq!(bus.cycles[0].op, BusOp::Read);
        assert_eq!(bus.cycles[1].op, BusOp::Write);
        assert_eq!(bus.cycles[1].addr, 0x0200);
        assert_eq!(bus.cycles[2].op, BusOp::PortWrite);
        assert_eq!(bus.ports[0x42], 0x99);
    }
}
