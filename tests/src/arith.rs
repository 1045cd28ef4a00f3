use common::asm::Reg;
use common::{arith_ins, not_ins, trap_ins};

use crate::util::{emu_with, run};

#[test]
fn add_imm() {
    let words = [
        arith_ins!(Add, R0, R1, imm 5).encode(),
        trap_ins!(Halt).encode(),
    ];

    let (mut emu, _console) = emu_with(&words);
    emu.reg_write(Reg::R1, 10);
    emu.run().unwrap();
    assert_eq!(emu.reg_read(Reg::R0), 15);
    assert!(emu.flags().is_positive());
}

#[test]
fn add_imm_negative() {
    let words = [
        arith_ins!(Add, R0, R1, imm -1).encode(),
        trap_ins!(Halt).encode(),
    ];

    let (mut emu, _console) = emu_with(&words);
    emu.reg_write(Reg::R1, 0);
    emu.run().unwrap();
    assert_eq!(emu.reg_read(Reg::R0), 0xffff);
    assert!(emu.flags().is_negative());
}

#[test]
fn add_reg() {
    let words = [
        arith_ins!(Add, R0, R1, R2).encode(),
        trap_ins!(Halt).encode(),
    ];

    let (mut emu, _console) = emu_with(&words);
    emu.reg_write(Reg::R1, 3);
    emu.reg_write(Reg::R2, 4);
    emu.run().unwrap();
    assert_eq!(emu.reg_read(Reg::R0), 7);
}

// Overflow wraps silently; there is no fault path in the arithmetic.
#[test]
fn add_wraps() {
    let words = [
        arith_ins!(Add, R0, R1, imm 1).encode(),
        trap_ins!(Halt).encode(),
    ];

    let (mut emu, _console) = emu_with(&words);
    emu.reg_write(Reg::R1, 0x7fff);
    emu.run().unwrap();
    assert_eq!(emu.reg_read(Reg::R0), 0x8000);
    assert!(emu.flags().is_negative());
}

#[test]
fn and_imm_clears() {
    let words = [
        arith_ins!(And, R0, R0, imm 0).encode(),
        trap_ins!(Halt).encode(),
    ];

    let (mut emu, _console) = emu_with(&words);
    emu.reg_write(Reg::R0, 0xabcd);
    emu.run().unwrap();
    assert_eq!(emu.reg_read(Reg::R0), 0);
    assert!(emu.flags().is_zero());
}

#[test]
fn and_reg() {
    let words = [
        arith_ins!(And, R0, R1, R2).encode(),
        trap_ins!(Halt).encode(),
    ];

    let (mut emu, _console) = emu_with(&words);
    emu.reg_write(Reg::R1, 0xf0f0);
    emu.reg_write(Reg::R2, 0x0ff0);
    emu.run().unwrap();
    assert_eq!(emu.reg_read(Reg::R0), 0x00f0);
    assert!(emu.flags().is_positive());
}

#[test]
fn not() {
    let words = [
        not_ins!(R0, R1).encode(),
        trap_ins!(Halt).encode(),
    ];

    let (mut emu, _console) = emu_with(&words);
    emu.reg_write(Reg::R1, 0x00ff);
    emu.run().unwrap();
    assert_eq!(emu.reg_read(Reg::R0), 0xff00);
    assert!(emu.flags().is_negative());
}

#[test]
fn not_all_ones_gives_zero() {
    let words = [
        not_ins!(R0, R1).encode(),
        trap_ins!(Halt).encode(),
    ];

    let (mut emu, _console) = emu_with(&words);
    emu.reg_write(Reg::R1, 0xffff);
    emu.run().unwrap();
    assert_eq!(emu.reg_read(Reg::R0), 0);
    assert!(emu.flags().is_zero());
}

// After any flag-setting instruction, exactly one flag is up, and it
// matches the sign of the value as stored.
#[test]
fn one_flag_at_a_time() {
    for val in [0u16, 1, 0x7fff, 0x8000, 0xffff] {
        let words = [
            arith_ins!(Add, R0, R1, imm 0).encode(),
            trap_ins!(Halt).encode(),
        ];

        let (mut emu, _console) = emu_with(&words);
        emu.reg_write(Reg::R1, val);
        emu.run().unwrap();

        let flags = emu.flags();
        assert_eq!(flags.mask().count_ones(), 1, "val {val:#06x}");
        assert_eq!(flags.is_zero(), val == 0, "val {val:#06x}");
        assert_eq!(flags.is_negative(), val >> 15 == 1, "val {val:#06x}");
        assert_eq!(flags.is_positive(), val != 0 && val >> 15 == 0, "val {val:#06x}");
    }
}

// Flags are initialized with only ZRO set.
#[test]
fn initial_flags() {
    let emu = run(&[trap_ins!(Halt).encode()]);
    assert!(emu.flags().is_zero());
}
