use ferrite_core::cpu::z80::Z80;
mod common;
use common::TestBus;

// ============================================================
// LDI
// ============================================================

#[test]
fn test_ldi() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.set_hl(0x1000); // source
    cpu.state.set_de(0x2000); // dest
    cpu.state.set_bc(0x0003); // count
    cpu.state.flags.set_packed(0x01); // C set
    bus.load(0, &[0xED, 0xA0]); // LDI
    bus.memory[0x1000] = 0x42;

    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 16, "LDI should be 16 T-states");
    assert_eq!(bus.memory[0x2000], 0x42, "Byte should be transferred");
    assert_eq!(cpu.state.hl(), 0x1001, "HL should be incremented");
    assert_eq!(cpu.state.de(), 0x2001, "DE should be incremented");
    assert_eq!(cpu.state.bc(), 0x0002, "BC should be decremented");
    assert!(cpu.state.flags.pv, "PV should be set (BC != 0)");
    assert!(!cpu.state.flags.n, "N should be clear");
    assert!(!cpu.state.flags.h, "H should be clear");
    assert!(cpu.state.flags.c, "C should be preserved");
}

#[test]
fn test_ldi_bc_reaches_zero() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.set_hl(0x1000);
    cpu.state.set_de(0x2000);
    cpu.state.set_bc(0x0001); // BC = 1, will become 0
    bus.load(0, &[0xED, 0xA0]);
    bus.memory[0x1000] = 0x55;

    cpu.step(&mut bus).expect("step");
    assert_eq!(cpu.state.bc(), 0x0000);
    assert!(!cpu.state.flags.pv, "PV should be clear (BC == 0)");
}

#[test]
fn test_ldi_xy_from_val_plus_a() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.a = 0x20;
    cpu.state.set_hl(0x1000);
    cpu.state.set_de(0x2000);
    cpu.state.set_bc(0x0002);
    bus.load(0, &[0xED, 0xA0]);
    bus.memory[0x1000] = 0x0A; // val + A = 0x2A: bits 3 and 1 set

    cpu.step(&mut bus).expect("step");
    assert!(cpu.state.flags.x, "X should be bit 3 of val + A");
    assert!(cpu.state.flags.y, "Y should be bit 1 of val + A");
}

// ============================================================
// LDD
// ============================================================

#[test]
fn test_ldd() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.set_hl(0x1005);
    cpu.state.set_de(0x2005);
    cpu.state.set_bc(0x0003);
    bus.load(0, &[0xED, 0xA8]); // LDD
    bus.memory[0x1005] = 0x77;

    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 16);
    assert_eq!(bus.memory[0x2005], 0x77);
    assert_eq!(cpu.state.hl(), 0x1004, "HL should be decremented");
    assert_eq!(cpu.state.de(), 0x2004, "DE should be decremented");
    assert_eq!(cpu.state.bc(), 0x0002);
}

// ============================================================
// LDIR
// ============================================================

#[test]
fn test_ldir() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.set_hl(0x1000);
    cpu.state.set_de(0x2000);
    cpu.state.set_bc(0x0003);
    cpu.state.flags.set_packed(0x01);
    bus.load(0, &[0xED, 0xB0]); // LDIR
    bus.memory[0x1000] = 0xAA;
    bus.memory[0x1001] = 0xBB;
    bus.memory[0x1002] = 0xCC;

    // The whole transfer completes in one step: 21T per repeating
    // iteration plus 16T for the final one.
    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 21 + 21 + 16, "LDIR with BC=3 should be 58 T-states");
    assert_eq!(bus.memory[0x2000], 0xAA);
    assert_eq!(bus.memory[0x2001], 0xBB);
    assert_eq!(bus.memory[0x2002], 0xCC);
    assert_eq!(cpu.state.hl(), 0x1003);
    assert_eq!(cpu.state.de(), 0x2003);
    assert_eq!(cpu.state.bc(), 0x0000);
    assert!(!cpu.state.flags.pv, "PV should be clear after LDIR completes");
    assert!(cpu.state.flags.c, "C should be preserved");
    assert_eq!(cpu.state.pc, 2, "PC should be past the LDIR");
}

#[test]
fn test_ldir_single_byte() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.set_hl(0x1000);
    cpu.state.set_de(0x2000);
    cpu.state.set_bc(0x0001);
    bus.load(0, &[0xED, 0xB0]);
    bus.memory[0x1000] = 0x99;

    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 16, "LDIR with BC=1 runs one 16T iteration");
    assert_eq!(bus.memory[0x2000], 0x99);
}

// ============================================================
// LDDR
// ============================================================

#[test]
fn test_lddr() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.set_hl(0x1002);
    cpu.state.set_de(0x2002);
    cpu.state.set_bc(0x0003);
    bus.load(0, &[0xED, 0xB8]); // LDDR
    bus.memory[0x1000] = 0x11;
    bus.memory[0x1001] = 0x22;
    bus.memory[0x1002] = 0x33;

    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 58);
    assert_eq!(bus.memory[0x2000], 0x11);
    assert_eq!(bus.memory[0x2001], 0x22);
    assert_eq!(bus.memory[0x2002], 0x33);
    assert_eq!(cpu.state.hl(), 0x0FFF);
    assert_eq!(cpu.state.de(), 0x1FFF);
    assert_eq!(cpu.state.bc(), 0x0000);
}

// ============================================================
// CPI
// ============================================================

#[test]
fn test_cpi_match() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.a = 0x42;
    cpu.state.set_hl(0x1000);
    cpu.state.set_bc(0x0003);
    cpu.state.flags.set_packed(0x01); // C set
    bus.load(0, &[0xED, 0xA1]); // CPI
    bus.memory[0x1000] = 0x42; // Match

    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 16, "CPI should be 16 T-states");
    assert!(cpu.state.flags.z, "Z should be set (match)");
    assert!(cpu.state.flags.n, "N should be set");
    assert!(cpu.state.flags.c, "C should be preserved");
    assert!(cpu.state.flags.pv, "PV should be set (BC != 0)");
    assert_eq!(cpu.state.hl(), 0x1001, "HL should be incremented");
    assert_eq!(cpu.state.bc(), 0x0002);
    assert_eq!(cpu.state.a, 0x42, "A should be unchanged");
}

#[test]
fn test_cpi_no_match() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.a = 0x42;
    cpu.state.set_hl(0x1000);
    cpu.state.set_bc(0x0001);
    bus.load(0, &[0xED, 0xA1]);
    bus.memory[0x1000] = 0x43; // No match

    cpu.step(&mut bus).expect("step");
    assert!(!cpu.state.flags.z, "Z should be clear (no match)");
    assert!(!cpu.state.flags.pv, "PV should be clear (BC == 0)");
}

// ============================================================
// CPD
// ============================================================

#[test]
fn test_cpd() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.a = 0x42;
    cpu.state.set_hl(0x1005);
    cpu.state.set_bc(0x0003);
    bus.load(0, &[0xED, 0xA9]); // CPD
    bus.memory[0x1005] = 0x42; // Match

    cpu.step(&mut bus).expect("step");
    assert!(cpu.state.flags.z, "Z should be set (match)");
    assert_eq!(cpu.state.hl(), 0x1004, "HL should be decremented");
    assert_eq!(cpu.state.bc(), 0x0002);
}

// ============================================================
// CPIR
// ============================================================

#[test]
fn test_cpir_find() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.a = 0x42;
    cpu.state.set_hl(0x1000);
    cpu.state.set_bc(0x0005);
    bus.load(0, &[0xED, 0xB1]); // CPIR
    bus.memory[0x1000] = 0x00;
    bus.memory[0x1001] = 0x00;
    bus.memory[0x1002] = 0x42; // Match at [0x1002]

    // Two repeating iterations plus the matching one.
    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 21 + 21 + 16, "CPIR stops on the match");
    assert!(cpu.state.flags.z, "Z should be set (match found)");
    assert_eq!(cpu.state.hl(), 0x1003);
    assert_eq!(cpu.state.bc(), 0x0002, "BC still nonzero at the match");
    assert!(cpu.state.flags.pv, "PV should be set (BC != 0)");
}

#[test]
fn test_cpir_exhausts_bc() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.a = 0x42;
    cpu.state.set_hl(0x1000);
    cpu.state.set_bc(0x0003);
    bus.load(0, &[0xED, 0xB1]);
    // No 0x42 anywhere in the scanned range.

    cpu.step(&mut bus).expect("step");
    assert!(!cpu.state.flags.z, "Z should be clear (no match)");
    assert_eq!(cpu.state.bc(), 0x0000);
    assert!(!cpu.state.flags.pv, "PV should be clear (BC == 0)");
}

// ============================================================
// CPDR
// ============================================================

#[test]
fn test_cpdr_find() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.a = 0x42;
    cpu.state.set_hl(0x1002);
    cpu.state.set_bc(0x0005);
    bus.load(0, &[0xED, 0xB9]); // CPDR
    bus.memory[0x1002] = 0x00;
    bus.memory[0x1001] = 0x42; // Match at [0x1001]

    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 21 + 16);
    assert!(cpu.state.flags.z, "Z should be set");
    assert_eq!(cpu.state.hl(), 0x1000);
}

// ============================================================
// INI / IND
// ============================================================

#[test]
fn test_ini() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.b = 0x03;
    cpu.state.c = 0x10;
    cpu.state.set_hl(0x2000);
    cpu.state.flags.set_packed(0x00);
    bus.ports[0x10] = 0x5A;
    bus.load(0, &[0xED, 0xA2]); // INI

    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 16, "INI should be 16 T-states");
    assert_eq!(cpu.state.b, 0x02, "B should be decremented");
    assert_eq!(bus.memory[0x2000], 0x5A, "port byte lands at (HL)");
    assert_eq!(cpu.state.hl(), 0x2001, "HL should be incremented");
    assert!(!cpu.state.flags.z, "Z should be clear (B != 0)");
    assert!(cpu.state.flags.pv, "PV should be set (B != 0)");
    assert!(cpu.state.flags.n, "N should be set");
}

#[test]
fn test_ind() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.b = 0x01;
    cpu.state.c = 0x20;
    cpu.state.set_hl(0x3000);
    bus.ports[0x20] = 0x77;
    bus.load(0, &[0xED, 0xAA]); // IND

    cpu.step(&mut bus).expect("step");
    assert_eq!(bus.memory[0x3000], 0x77);
    assert_eq!(cpu.state.hl(), 0x2FFF, "HL should be decremented");
    assert!(cpu.state.flags.z, "Z should be set (B == 0)");
    assert!(!cpu.state.flags.pv, "PV should be clear (B == 0)");
}

// ============================================================
// OUTI / OUTD
// ============================================================

#[test]
fn test_outi() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.b = 0x01;
    cpu.state.c = 0x10;
    cpu.state.set_hl(0x2000);
    bus.load(0, &[0xED, 0xA3]); // OUTI
    bus.memory[0x2000] = 0x42;

    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 16, "OUTI should be 16 T-states");
    assert_eq!(cpu.state.b, 0x00, "B should be decremented");
    assert_eq!(bus.port_writes, vec![(0x10, 0x42)]);
    assert_eq!(cpu.state.hl(), 0x2001, "HL should be incremented");
    assert!(cpu.state.flags.z, "Z should be set (B == 0)");
    assert!(!cpu.state.flags.pv, "PV should be clear (B == 0)");
}

#[test]
fn test_outd() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.b = 0x02;
    cpu.state.c = 0x30;
    cpu.state.set_hl(0x2005);
    bus.load(0, &[0xED, 0xAB]); // OUTD
    bus.memory[0x2005] = 0x99;

    cpu.step(&mut bus).expect("step");
    assert_eq!(bus.port_writes, vec![(0x30, 0x99)]);
    assert_eq!(cpu.state.hl(), 0x2004, "HL should be decremented");
    assert!(!cpu.state.flags.z, "Z should be clear (B != 0)");
    assert!(cpu.state.flags.pv, "PV should be set (B != 0)");
}

// ============================================================
// INIR / OTIR
// ============================================================

#[test]
fn test_inir() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.b = 0x03;
    cpu.state.c = 0x10;
    cpu.state.set_hl(0x2000);
    bus.ports[0x10] = 0xAB;
    bus.load(0, &[0xED, 0xB2]); // INIR

    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 21 + 21 + 16, "INIR with B=3 should be 58 T-states");
    assert_eq!(cpu.state.b, 0x00);
    assert_eq!(bus.memory[0x2000], 0xAB);
    assert_eq!(bus.memory[0x2001], 0xAB);
    assert_eq!(bus.memory[0x2002], 0xAB);
    assert_eq!(cpu.state.hl(), 0x2003);
    assert!(cpu.state.flags.z, "Z should be set (B == 0)");
    assert!(!cpu.state.flags.pv, "PV should be clear once B runs out");
    assert_eq!(cpu.state.pc, 2);
}

#[test]
fn test_otir() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.state.b = 0x02;
    cpu.state.c = 0x40;
    cpu.state.set_hl(0x2000);
    bus.load(0, &[0xED, 0xB3]); // OTIR
    bus.memory[0x2000] = 0x11;
    bus.memory[0x2001] = 0x22;

    let cycles = cpu.step(&mut bus).expect("step");
    assert_eq!(cycles, 21 + 16);
    assert_eq!(bus.port_writes, vec![(0x40, 0x11), (0x40, 0x22)]);
    assert_eq!(cpu.state.b, 0x00);
    assert!(cpu.state.flags.z, "Z should be set (B == 0)");
}
