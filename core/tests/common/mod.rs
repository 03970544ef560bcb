use ferrite_core::core::Bus;

/// Minimal bus for testing: flat 64KB memory, port latches, and a
/// programmable IM 2 vector byte.
pub struct TestBus {
    pub memory: [u8; 0x10000],
    pub ports: [u8; 256],
    pub port_writes: Vec<(u8, u8)>,
    pub vector: u8,
    pub eoi_count: u32,
}

#[allow(dead_code)]
impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            ports: [0; 256],
            port_writes: Vec::new(),
            vector: 0xFF,
            eoi_count: 0,
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }

    fn read_port(&mut self, port: u8) -> u8 {
        self.ports[port as usize]
    }

    fn write_port(&mut self, port: u8, data: u8) {
        self.ports[port as usize] = data;
        self.port_writes.push((port, data));
    }

    fn irq_vector(&mut self) -> u8 {
        self.vector
    }

    fn end_of_interrupt(&mut self) {
        self.eoi_count += 1;
    }
}
