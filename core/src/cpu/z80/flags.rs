//! Individual flag bits and the packed flag-byte view.

/// Bit positions of the packed F register.
pub const FLAG_C: u8 = 0x01; // Carry
pub const FLAG_N: u8 = 0x02; // Add/Subtract
pub const FLAG_PV: u8 = 0x04; // Parity/Overflow
pub const FLAG_X: u8 = 0x08; // Unused (copy of result bit 3)
pub const FLAG_H: u8 = 0x10; // Half Carry
pub const FLAG_Y: u8 = 0x20; // Unused (copy of result bit 5)
pub const FLAG_Z: u8 = 0x40; // Zero
pub const FLAG_S: u8 = 0x80; // Sign

/// The eight flags as individual bits. The packed byte is a derived view
/// built by `packed()`; nothing caches it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub c: bool,
    pub n: bool,
    pub pv: bool,
    pub x: bool,
    pub h: bool,
    pub y: bool,
    pub z: bool,
    pub s: bool,
}

impl Flags {
    /// Marshal to the standard Z80 flag-byte order (C=bit0 ... S=bit7).
    pub fn packed(&self) -> u8 {
        let mut f = 0;
        if self.c {
            f |= FLAG_C;
        }
        if self.n {
            f |= FLAG_N;
        }
        if self.pv {
            f |= FLAG_PV;
        }
        if self.x {
            f |= FLAG_X;
        }
        if self.h {
            f |= FLAG_H;
        }
        if self.y {
            f |= FLAG_Y;
        }
        if self.z {
            f |= FLAG_Z;
        }
        if self.s {
            f |= FLAG_S;
        }
        f
    }

    pub fn set_packed(&mut self, f: u8) {
        self.c = f & FLAG_C != 0;
        self.n = f & FLAG_N != 0;
        self.pv = f & FLAG_PV != 0;
        self.x = f & FLAG_X != 0;
        self.h = f & FLAG_H != 0;
        self.y = f & FLAG_Y != 0;
        self.z = f & FLAG_Z != 0;
        self.s = f & FLAG_S != 0;
    }

    pub fn from_packed(f: u8) -> Self {
        let mut flags = Self::default();
        flags.set_packed(f);
        flags
    }

    /// S/Z from an 8-bit result plus the undocumented X/Y result mirrors.
    pub fn set_szxy(&mut self, result: u8) {
        self.s = result & 0x80 != 0;
        self.z = result == 0;
        self.set_xy(result);
    }

    /// Undocumented X/Y: copies of bits 3 and 5 of a result (or, for a few
    /// instructions, of another internal value).
    pub fn set_xy(&mut self, value: u8) {
        self.x = value & FLAG_X != 0;
        self.y = value & FLAG_Y != 0;
    }
}

/// True when `val` has an even number of set bits.
pub const fn parity(val: u8) -> bool {
    val.count_ones() % 2 == 0
}
