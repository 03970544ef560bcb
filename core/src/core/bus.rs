/// Memory and port I/O interface implemented by the host system.
///
/// The CPU core never assumes a flat 64KB array behind this trait; banking,
/// mirroring, and memory-mapped devices are entirely the host's concern.
/// Port I/O and the interrupt-acknowledge hooks have defaults matching an
/// unconnected bus, so a memory-only host implements just `read`/`write`.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Read a little-endian word from `addr` and `addr + 1` (wrapping).
    fn read_word(&mut self, addr: u16) -> u16 {
        let low = self.read(addr);
        let high = self.read(addr.wrapping_add(1));
        ((high as u16) << 8) | low as u16
    }

    /// Write a little-endian word to `addr` and `addr + 1` (wrapping).
    fn write_word(&mut self, addr: u16, data: u16) {
        self.write(addr, data as u8);
        self.write(addr.wrapping_add(1), (data >> 8) as u8);
    }

    /// Read from the I/O port address space (separate from memory on Z80).
    /// Default: floating bus, reads 0xFF.
    fn read_port(&mut self, _port: u8) -> u8 {
        0xFF
    }

    /// Write to the I/O port address space. Default: discarded.
    fn write_port(&mut self, _port: u8, _data: u8) {}

    /// Vector byte placed on the data bus during an IM 2 interrupt
    /// acknowledge. Default: the byte at memory address 0xFFFF, matching
    /// hosts that leave the data bus tied to the last memory read.
    fn irq_vector(&mut self) -> u8 {
        self.read(0xFFFF)
    }

    /// Notification that the CPU executed RETI, for daisy-chained
    /// peripherals that track end-of-interrupt. Default: ignored.
    fn end_of_interrupt(&mut self) {}
}
