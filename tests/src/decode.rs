use common::asm::*;
use common::decoder::{decode, sign_extend};

#[test]
fn sign_extend_positive_unchanged() {
    assert_eq!(sign_extend(0x000f, 5), 0x000f);
    assert_eq!(sign_extend(0x001f, 6), 0x001f);
    assert_eq!(sign_extend(0x00ff, 9), 0x00ff);
    assert_eq!(sign_extend(0x03ff, 11), 0x03ff);
}

#[test]
fn sign_extend_negative_fills_high_bits() {
    assert_eq!(sign_extend(0x001f, 5), 0xffff);
    assert_eq!(sign_extend(0x0010, 5), 0xfff0);
    assert_eq!(sign_extend(0x0020, 6), 0xffe0);
    assert_eq!(sign_extend(0x003f, 6), 0xffff);
    assert_eq!(sign_extend(0x0100, 9), 0xff00);
    assert_eq!(sign_extend(0x01ff, 9), 0xffff);
    assert_eq!(sign_extend(0x0400, 11), 0xfc00);
    assert_eq!(sign_extend(0x07ff, 11), 0xffff);
}

#[test]
fn add_imm() {
    let Ins::Arith(ins) = decode(0x1025) else {
        panic!("wrong format");
    };
    assert_eq!(ins.op, ArithOpcode::Add);
    assert_eq!(ins.dst, Reg::R0);
    assert_eq!(ins.src, Reg::R0);
    assert!(ins.src2.is_imm());
    assert_eq!(ins.src2.unwrap_imm(), 5);
}

// imm5 of 0x1f is -1 after extension.
#[test]
fn add_imm_negative() {
    let Ins::Arith(ins) = decode(0x103f) else {
        panic!("wrong format");
    };
    assert_eq!(ins.src2.unwrap_imm(), 0xffff);
}

#[test]
fn and_reg() {
    let Ins::Arith(ins) = decode(0x5042) else {
        panic!("wrong format");
    };
    assert_eq!(ins.op, ArithOpcode::And);
    assert_eq!(ins.dst, Reg::R0);
    assert_eq!(ins.src, Reg::R1);
    assert_eq!(ins.src2.unwrap_reg(), Reg::R2);
}

#[test]
fn not() {
    let Ins::Not(ins) = decode(0x907f) else {
        panic!("wrong format");
    };
    assert_eq!(ins.dst, Reg::R0);
    assert_eq!(ins.src, Reg::R1);
}

#[test]
fn branch() {
    let Ins::Branch(ins) = decode(0x0a05) else {
        panic!("wrong format");
    };
    assert_eq!(ins.cond, FL_NEG | FL_POS);
    assert_eq!(ins.offset, 5);
}

#[test]
fn jsr_long() {
    let Ins::Jsr(ins) = decode(0x4801) else {
        panic!("wrong format");
    };
    assert_eq!(ins.target.unwrap_rel(), 1);

    let Ins::Jsr(ins) = decode(0x4fff) else {
        panic!("wrong format");
    };
    assert_eq!(ins.target.unwrap_rel(), 0xffff);
}

#[test]
fn jsrr() {
    let Ins::Jsr(ins) = decode(0x40c0) else {
        panic!("wrong format");
    };
    assert_eq!(ins.target.unwrap_reg(), Reg::R3);
}

#[test]
fn ldr_negative_offset() {
    let Ins::BaseOffset(ins) = decode(0x663e) else {
        panic!("wrong format");
    };
    assert_eq!(ins.op, BaseOffsetOpcode::Ldr);
    assert_eq!(ins.reg, Reg::R3);
    assert_eq!(ins.base, Reg::R0);
    assert_eq!(ins.offset, 0xfffe);
}

#[test]
fn trap() {
    let Ins::Trap(ins) = decode(0xf025) else {
        panic!("wrong format");
    };
    assert_eq!(ins.vector, 0x25);
}

#[test]
fn reserved() {
    let Ins::Reserved(ins) = decode(0x8000) else {
        panic!("wrong format");
    };
    assert_eq!(ins.op, ReservedOpcode::Rti);

    let Ins::Reserved(ins) = decode(0xd000) else {
        panic!("wrong format");
    };
    assert_eq!(ins.op, ReservedOpcode::Res);
}

// Words whose don't-care bits follow the defined encodings come back out
// of encode() unchanged.
#[test]
fn encode_round_trip() {
    let words = [
        0x1025, 0x103f, 0x5042, 0x907f, 0x0a05, 0x4801, 0x40c0, 0x2a05,
        0x3a05, 0xba05, 0x6642, 0x7441, 0xc1c0, 0xe3ff, 0xf025, 0x0000,
        0x8000, 0xd000,
    ];
    for word in words {
        assert_eq!(decode(word).encode(), word, "word {word:#06x}");
    }
}
