use common::asm::{FL_NEG, FL_POS, FL_ZRO, Reg};
use common::{arith_ins, branch_ins, trap_ins};

use crate::util::emu_with;

// Sets the flags from `val`, then branches over a marker instruction.
fn run_branch(cond: u16, val: u16, should_take: bool) {
    let words = [
        arith_ins!(Add, R1, R1, imm 0).encode(),
        branch_ins!(cond, 1).encode(),
        arith_ins!(Add, R0, R0, imm 1).encode(),
        trap_ins!(Halt).encode(),
    ];

    let (mut emu, _console) = emu_with(&words);
    emu.reg_write(Reg::R1, val);
    emu.run().unwrap();

    let taken = emu.reg_read(Reg::R0) == 0;
    assert_eq!(taken, should_take, "cond {cond:#x} val {val:#06x}");
}

const POS_VAL: u16 = 5;
const ZRO_VAL: u16 = 0;
const NEG_VAL: u16 = 0x8000;

#[test]
fn brp() {
    run_branch(FL_POS, POS_VAL, true);
    run_branch(FL_POS, ZRO_VAL, false);
    run_branch(FL_POS, NEG_VAL, false);
}

#[test]
fn brz() {
    run_branch(FL_ZRO, POS_VAL, false);
    run_branch(FL_ZRO, ZRO_VAL, true);
    run_branch(FL_ZRO, NEG_VAL, false);
}

#[test]
fn brn() {
    run_branch(FL_NEG, POS_VAL, false);
    run_branch(FL_NEG, ZRO_VAL, false);
    run_branch(FL_NEG, NEG_VAL, true);
}

#[test]
fn brzp() {
    run_branch(FL_ZRO | FL_POS, POS_VAL, true);
    run_branch(FL_ZRO | FL_POS, ZRO_VAL, true);
    run_branch(FL_ZRO | FL_POS, NEG_VAL, false);
}

#[test]
fn brnzp() {
    run_branch(FL_NEG | FL_ZRO | FL_POS, POS_VAL, true);
    run_branch(FL_NEG | FL_ZRO | FL_POS, ZRO_VAL, true);
    run_branch(FL_NEG | FL_ZRO | FL_POS, NEG_VAL, true);
}

// An empty condition field never branches.
#[test]
fn br_never() {
    run_branch(0, POS_VAL, false);
    run_branch(0, ZRO_VAL, false);
    run_branch(0, NEG_VAL, false);
}

// Count down with a backward branch.
#[test]
fn backward() {
    let words = [
        arith_ins!(And, R0, R0, imm 0).encode(),
        arith_ins!(Add, R0, R0, imm 7).encode(),

        arith_ins!(Add, R0, R0, imm -1).encode(),
        branch_ins!(FL_POS, -2).encode(),

        trap_ins!(Halt).encode(),
    ];

    let (mut emu, _console) = emu_with(&words);
    emu.run().unwrap();
    assert_eq!(emu.reg_read(Reg::R0), 0);
    assert!(emu.flags().is_zero());
}
