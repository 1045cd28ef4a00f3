
use num_traits::FromPrimitive;

use super::asm::*;

// Widen an n-bit two's-complement field to 16 bits. The sign-bit test
// keeps its explicit grouping: `& 1 == 1` parses as `& (1 == 1)`.
pub fn sign_extend(x: u16, bit_count: usize) -> u16 {
    if ((x >> (bit_count - 1)) & 1) == 1 {
        x | (0xffffu16 << bit_count)
    } else {
        x
    }
}

fn decode_reg(input: u16, shift: usize) -> Reg {
    Reg::from_u16((input >> shift) & Reg::MASK).unwrap()
}


fn decode_arith_ins(input: u16) -> Option<Ins> {
    let op = ArithIns::decode_opcode(input)?;

    let dst = decode_reg(input, ArithIns::DST_SHIFT);
    let src = decode_reg(input, ArithIns::SRC_SHIFT);
    let src2 = if input & ArithIns::IMM_FLAG != 0 {
        Source::Imm(sign_extend(input & ArithIns::IMM_MASK, ArithIns::IMM_BITS))
    } else {
        Source::Reg(decode_reg(input, 0))
    };

    Some(Ins::Arith(ArithIns{op, dst, src, src2}))
}

fn decode_not_ins(input: u16) -> Option<Ins> {
    let op = NotIns::decode_opcode(input)?;
    let dst = decode_reg(input, NotIns::DST_SHIFT);
    let src = decode_reg(input, NotIns::SRC_SHIFT);
    Some(Ins::Not(NotIns{op, dst, src}))
}

fn decode_branch_ins(input: u16) -> Option<Ins> {
    let op = BranchIns::decode_opcode(input)?;
    let cond = (input >> BranchIns::COND_SHIFT) & BranchIns::COND_MASK;
    let offset = sign_extend(input & BranchIns::OFFSET_MASK, BranchIns::OFFSET_BITS);
    Some(Ins::Branch(BranchIns{op, cond, offset}))
}

fn decode_jmp_ins(input: u16) -> Option<Ins> {
    let op = JmpIns::decode_opcode(input)?;
    let base = decode_reg(input, JmpIns::BASE_SHIFT);
    Some(Ins::Jmp(JmpIns{op, base}))
}

fn decode_jsr_ins(input: u16) -> Option<Ins> {
    let op = JsrIns::decode_opcode(input)?;
    let target = if input & JsrIns::LONG_FLAG != 0 {
        JsrTarget::Rel(sign_extend(input & JsrIns::OFFSET_MASK, JsrIns::OFFSET_BITS))
    } else {
        JsrTarget::Reg(decode_reg(input, JsrIns::BASE_SHIFT))
    };
    Some(Ins::Jsr(JsrIns{op, target}))
}

fn decode_pc_rel_ins(input: u16) -> Option<Ins> {
    let op = PcRelIns::decode_opcode(input)?;
    let reg = decode_reg(input, PcRelIns::REG_SHIFT);
    let offset = sign_extend(input & PcRelIns::OFFSET_MASK, PcRelIns::OFFSET_BITS);
    Some(Ins::PcRel(PcRelIns{op, reg, offset}))
}

fn decode_base_offset_ins(input: u16) -> Option<Ins> {
    let op = BaseOffsetIns::decode_opcode(input)?;
    let reg = decode_reg(input, BaseOffsetIns::REG_SHIFT);
    let base = decode_reg(input, BaseOffsetIns::BASE_SHIFT);
    let offset = sign_extend(input & BaseOffsetIns::OFFSET_MASK, BaseOffsetIns::OFFSET_BITS);
    Some(Ins::BaseOffset(BaseOffsetIns{op, reg, base, offset}))
}

fn decode_trap_ins(input: u16) -> Option<Ins> {
    let op = TrapIns::decode_opcode(input)?;
    let vector = input & TrapIns::VECTOR_MASK;
    Some(Ins::Trap(TrapIns{op, vector}))
}

fn decode_reserved_ins(input: u16) -> Option<Ins> {
    let op = ReservedIns::decode_opcode(input)?;
    Some(Ins::Reserved(ReservedIns{op}))
}

type Decoder = fn(u16) -> Option<Ins>;

const DECODERS: &[Decoder] = &[
    decode_arith_ins,
    decode_not_ins,
    decode_branch_ins,
    decode_jmp_ins,
    decode_jsr_ins,
    decode_pc_rel_ins,
    decode_base_offset_ins,
    decode_trap_ins,
    decode_reserved_ins,
];


// Total: the format decoders cover all sixteen opcode values, with RTI and
// the reserved opcode landing in Ins::Reserved for the executor to fault on.
pub fn decode(input: u16) -> Ins {
    for decoder in DECODERS {
        if let Some(ins) = decoder(input) {
            return ins;
        }
    }

    unreachable!("opcode {:#x} has no decoder", input >> 12);
}
