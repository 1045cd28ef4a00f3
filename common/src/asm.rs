
use std::fmt;

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use derive_more::{IsVariant, Unwrap};
use delegate::delegate;


pub trait InstrVariant<Opcode: FromPrimitive> {
    const OPCODE_BITS: usize = 4;
    const LOWER_BITS: usize = (u16::BITS as usize) - Self::OPCODE_BITS;

    fn decode_opcode(input: u16) -> Option<Opcode> {
        let op = input >> Self::LOWER_BITS;
        Opcode::from_u16(op)
    }
}


////////////////////////////////////////////////////////////////////////////////


#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum Reg {
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

pub const NUM_REGS: usize = 8;

impl Reg {
    pub const NUM_BITS: usize = 3;
    pub const MASK: u16 = (1u16 << Self::NUM_BITS) - 1;
}


// Condition flag bits, shared by the processor flags and the BR condition
// field (bit 2 = n, bit 1 = z, bit 0 = p).
pub const FL_POS: u16 = 1 << 0;
pub const FL_ZRO: u16 = 1 << 1;
pub const FL_NEG: u16 = 1 << 2;


// The second source of ADD and AND, selected by the immediate-mode bit.
// Immediates are stored already sign-extended to 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant, Unwrap)]
pub enum Source {
    Reg(Reg),
    Imm(u16),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Source::Reg(reg) => write!(f, "{reg}"),
            Source::Imm(imm) => write!(f, "#{}", *imm as i16),
        }
    }
}


////////////////////////////////////////////////////////////////////////////////


#[macro_export]
macro_rules! arith_ins {
    ($op:ident, $dst:ident, $src:ident, imm $imm:expr) => {
        $crate::asm::Ins::Arith($crate::asm::ArithIns{
            op: $crate::asm::ArithOpcode::$op,
            dst: $crate::asm::Reg::$dst,
            src: $crate::asm::Reg::$src,
            src2: $crate::asm::Source::Imm((($imm) as i16) as u16),
        })
    };
    ($op:ident, $dst:ident, $src:ident, $src2:ident) => {
        $crate::asm::Ins::Arith($crate::asm::ArithIns{
            op: $crate::asm::ArithOpcode::$op,
            dst: $crate::asm::Reg::$dst,
            src: $crate::asm::Reg::$src,
            src2: $crate::asm::Source::Reg($crate::asm::Reg::$src2),
        })
    };
}

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum ArithOpcode {
    Add = 1,
    And = 5,
}

impl fmt::Display for ArithOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct ArithIns {
    pub op: ArithOpcode,
    pub dst: Reg,
    pub src: Reg,
    pub src2: Source,
}

impl ArithIns {
    pub const DST_SHIFT: usize = 9;
    pub const SRC_SHIFT: usize = 6;
    pub const IMM_FLAG: u16 = 1 << 5;
    pub const IMM_BITS: usize = 5;
    pub const IMM_MASK: u16 = (1u16 << Self::IMM_BITS) - 1;

    pub fn encode(&self) -> u16 {
        let bin = (self.op.to_u16().unwrap() << Self::LOWER_BITS)
            | (self.dst.to_u16().unwrap() << Self::DST_SHIFT)
            | (self.src.to_u16().unwrap() << Self::SRC_SHIFT);
        match self.src2 {
            Source::Reg(reg) => bin | reg.to_u16().unwrap(),
            Source::Imm(imm) => bin | Self::IMM_FLAG | (imm & Self::IMM_MASK),
        }
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, _pc: u16) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl InstrVariant<ArithOpcode> for ArithIns {}

impl fmt::Display for ArithIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}, {}, {}", self.op, self.dst, self.src, self.src2)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[macro_export]
macro_rules! not_ins {
    ($dst:ident, $src:ident) => {
        $crate::asm::Ins::Not($crate::asm::NotIns{
            op: $crate::asm::NotOpcode::Not,
            dst: $crate::asm::Reg::$dst,
            src: $crate::asm::Reg::$src,
        })
    };
}

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum NotOpcode {
    Not = 9,
}

impl fmt::Display for NotOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct NotIns {
    pub op: NotOpcode,
    pub dst: Reg,
    pub src: Reg,
}

impl NotIns {
    pub const DST_SHIFT: usize = 9;
    pub const SRC_SHIFT: usize = 6;
    // The low six bits are all ones in the defined encoding.
    pub const TRAILING: u16 = (1u16 << 6) - 1;

    pub fn encode(&self) -> u16 {
        (self.op.to_u16().unwrap() << Self::LOWER_BITS)
            | (self.dst.to_u16().unwrap() << Self::DST_SHIFT)
            | (self.src.to_u16().unwrap() << Self::SRC_SHIFT)
            | Self::TRAILING
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, _pc: u16) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl InstrVariant<NotOpcode> for NotIns {}

impl fmt::Display for NotIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}, {}", self.op, self.dst, self.src)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[macro_export]
macro_rules! branch_ins {
    ($cond:expr, $offset:expr) => {
        $crate::asm::Ins::Branch($crate::asm::BranchIns{
            op: $crate::asm::BranchOpcode::Br,
            cond: $cond,
            offset: (($offset) as i16) as u16,
        })
    };
}

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum BranchOpcode {
    Br = 0,
}

impl fmt::Display for BranchOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct BranchIns {
    pub op: BranchOpcode,
    pub cond: u16,
    pub offset: u16,
}

impl BranchIns {
    pub const COND_SHIFT: usize = 9;
    pub const COND_MASK: u16 = 0x7;
    pub const OFFSET_BITS: usize = 9;
    pub const OFFSET_MASK: u16 = (1u16 << Self::OFFSET_BITS) - 1;

    pub fn encode(&self) -> u16 {
        (self.op.to_u16().unwrap() << Self::LOWER_BITS)
            | ((self.cond & Self::COND_MASK) << Self::COND_SHIFT)
            | (self.offset & Self::OFFSET_MASK)
    }

    fn fmt_cond(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.op)?;
        if self.cond & FL_NEG != 0 {
            write!(f, "n")?;
        }
        if self.cond & FL_ZRO != 0 {
            write!(f, "z")?;
        }
        if self.cond & FL_POS != 0 {
            write!(f, "p")?;
        }
        Ok(())
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, pc: u16) -> fmt::Result {
        self.fmt_cond(f)?;
        write!(f, "\t{:#06x}", pc.wrapping_add(1).wrapping_add(self.offset))
    }
}

impl InstrVariant<BranchOpcode> for BranchIns {}

impl fmt::Display for BranchIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_cond(f)?;
        write!(f, "\t. + #{}", (self.offset as i16).wrapping_add(1))
    }
}

////////////////////////////////////////////////////////////////////////////////

#[macro_export]
macro_rules! jmp_ins {
    ($base:ident) => {
        $crate::asm::Ins::Jmp($crate::asm::JmpIns{
            op: $crate::asm::JmpOpcode::Jmp,
            base: $crate::asm::Reg::$base,
        })
    };
}

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum JmpOpcode {
    Jmp = 12,
}

impl fmt::Display for JmpOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct JmpIns {
    pub op: JmpOpcode,
    pub base: Reg,
}

impl JmpIns {
    pub const BASE_SHIFT: usize = 6;

    pub fn encode(&self) -> u16 {
        (self.op.to_u16().unwrap() << Self::LOWER_BITS)
            | (self.base.to_u16().unwrap() << Self::BASE_SHIFT)
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, _pc: u16) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl InstrVariant<JmpOpcode> for JmpIns {}

impl fmt::Display for JmpIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Jumping through r7 is the return idiom.
        if self.base == Reg::R7 {
            write!(f, "ret")
        } else {
            write!(f, "{}\t{}", self.op, self.base)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

#[macro_export]
macro_rules! jsr_ins {
    (rel $offset:expr) => {
        $crate::asm::Ins::Jsr($crate::asm::JsrIns{
            op: $crate::asm::JsrOpcode::Jsr,
            target: $crate::asm::JsrTarget::Rel((($offset) as i16) as u16),
        })
    };
    (reg $base:ident) => {
        $crate::asm::Ins::Jsr($crate::asm::JsrIns{
            op: $crate::asm::JsrOpcode::Jsr,
            target: $crate::asm::JsrTarget::Reg($crate::asm::Reg::$base),
        })
    };
}

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum JsrOpcode {
    Jsr = 4,
}

impl fmt::Display for JsrOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant, Unwrap)]
pub enum JsrTarget {
    Rel(u16),
    Reg(Reg),
}

#[derive(Debug, Clone)]
pub struct JsrIns {
    pub op: JsrOpcode,
    pub target: JsrTarget,
}

impl JsrIns {
    pub const LONG_FLAG: u16 = 1 << 11;
    pub const BASE_SHIFT: usize = 6;
    pub const OFFSET_BITS: usize = 11;
    pub const OFFSET_MASK: u16 = (1u16 << Self::OFFSET_BITS) - 1;

    pub fn encode(&self) -> u16 {
        let bin = self.op.to_u16().unwrap() << Self::LOWER_BITS;
        match self.target {
            JsrTarget::Rel(offset) => bin | Self::LONG_FLAG | (offset & Self::OFFSET_MASK),
            JsrTarget::Reg(base) => bin | (base.to_u16().unwrap() << Self::BASE_SHIFT),
        }
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, pc: u16) -> fmt::Result {
        match self.target {
            JsrTarget::Rel(offset) => {
                write!(f, "{}\t{:#06x}", self.op, pc.wrapping_add(1).wrapping_add(offset))
            }
            JsrTarget::Reg(_) => write!(f, "{}", self),
        }
    }
}

impl InstrVariant<JsrOpcode> for JsrIns {}

impl fmt::Display for JsrIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.target {
            JsrTarget::Rel(offset) => {
                write!(f, "{}\t. + #{}", self.op, (offset as i16).wrapping_add(1))
            }
            JsrTarget::Reg(base) => write!(f, "jsrr\t{base}"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

#[macro_export]
macro_rules! pc_rel_ins {
    ($op:ident, $reg:ident, $offset:expr) => {
        $crate::asm::Ins::PcRel($crate::asm::PcRelIns{
            op: $crate::asm::PcRelOpcode::$op,
            reg: $crate::asm::Reg::$reg,
            offset: (($offset) as i16) as u16,
        })
    };
}

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum PcRelOpcode {
    Ld = 2,
    St = 3,
    Ldi = 10,
    Sti = 11,
    Lea = 14,
}

impl fmt::Display for PcRelOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

// LD/LDI/LEA/ST/STI share one layout: a register and a 9-bit offset from
// the incremented PC.
#[derive(Debug, Clone)]
pub struct PcRelIns {
    pub op: PcRelOpcode,
    pub reg: Reg,
    pub offset: u16,
}

impl PcRelIns {
    pub const REG_SHIFT: usize = 9;
    pub const OFFSET_BITS: usize = 9;
    pub const OFFSET_MASK: u16 = (1u16 << Self::OFFSET_BITS) - 1;

    pub fn encode(&self) -> u16 {
        (self.op.to_u16().unwrap() << Self::LOWER_BITS)
            | (self.reg.to_u16().unwrap() << Self::REG_SHIFT)
            | (self.offset & Self::OFFSET_MASK)
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, pc: u16) -> fmt::Result {
        let target = pc.wrapping_add(1).wrapping_add(self.offset);
        write!(f, "{}\t{}, {target:#06x}", self.op, self.reg)
    }
}

impl InstrVariant<PcRelOpcode> for PcRelIns {}

impl fmt::Display for PcRelIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}, . + #{}", self.op, self.reg, (self.offset as i16).wrapping_add(1))
    }
}

////////////////////////////////////////////////////////////////////////////////

#[macro_export]
macro_rules! base_offset_ins {
    ($op:ident, $reg:ident, $base:ident, $offset:expr) => {
        $crate::asm::Ins::BaseOffset($crate::asm::BaseOffsetIns{
            op: $crate::asm::BaseOffsetOpcode::$op,
            reg: $crate::asm::Reg::$reg,
            base: $crate::asm::Reg::$base,
            offset: (($offset) as i16) as u16,
        })
    };
}

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum BaseOffsetOpcode {
    Ldr = 6,
    Str = 7,
}

impl fmt::Display for BaseOffsetOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct BaseOffsetIns {
    pub op: BaseOffsetOpcode,
    pub reg: Reg,
    pub base: Reg,
    pub offset: u16,
}

impl BaseOffsetIns {
    pub const REG_SHIFT: usize = 9;
    pub const BASE_SHIFT: usize = 6;
    pub const OFFSET_BITS: usize = 6;
    pub const OFFSET_MASK: u16 = (1u16 << Self::OFFSET_BITS) - 1;

    pub fn encode(&self) -> u16 {
        (self.op.to_u16().unwrap() << Self::LOWER_BITS)
            | (self.reg.to_u16().unwrap() << Self::REG_SHIFT)
            | (self.base.to_u16().unwrap() << Self::BASE_SHIFT)
            | (self.offset & Self::OFFSET_MASK)
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, _pc: u16) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl InstrVariant<BaseOffsetOpcode> for BaseOffsetIns {}

impl fmt::Display for BaseOffsetIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}, {}, #{}", self.op, self.reg, self.base, self.offset as i16)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[macro_export]
macro_rules! trap_ins {
    ($vector:ident) => {
        $crate::asm::Ins::Trap($crate::asm::TrapIns{
            op: $crate::asm::TrapOpcode::Trap,
            vector: $crate::asm::TrapVector::$vector as u16,
        })
    };
    (vector $vector:expr) => {
        $crate::asm::Ins::Trap($crate::asm::TrapIns{
            op: $crate::asm::TrapOpcode::Trap,
            vector: $vector,
        })
    };
}

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum TrapOpcode {
    Trap = 15,
}

impl fmt::Display for TrapOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

// The service routines this machine provides in place of an operating
// system.
#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum TrapVector {
    Getc = 0x20,
    Out,
    Puts,
    In,
    Putsp,
    Halt,
}

#[derive(Debug, Clone)]
pub struct TrapIns {
    pub op: TrapOpcode,
    pub vector: u16,
}

impl TrapIns {
    pub const VECTOR_BITS: usize = 8;
    pub const VECTOR_MASK: u16 = (1u16 << Self::VECTOR_BITS) - 1;

    pub fn encode(&self) -> u16 {
        (self.op.to_u16().unwrap() << Self::LOWER_BITS) | (self.vector & Self::VECTOR_MASK)
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, _pc: u16) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl InstrVariant<TrapOpcode> for TrapIns {}

impl fmt::Display for TrapIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match TrapVector::from_u16(self.vector) {
            Some(vector) => write!(f, "{}", format!("{vector:?}").to_lowercase()),
            None => write!(f, "{}\t{:#04x}", self.op, self.vector),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

#[macro_export]
macro_rules! reserved_ins {
    ($op:ident) => {
        $crate::asm::Ins::Reserved($crate::asm::ReservedIns{
            op: $crate::asm::ReservedOpcode::$op,
        })
    };
}

// RTI and the reserved opcode exist in the encoding but have no defined
// behavior in this subset; executing either is a fault.
#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum ReservedOpcode {
    Rti = 8,
    Res = 13,
}

impl fmt::Display for ReservedOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct ReservedIns {
    pub op: ReservedOpcode,
}

impl ReservedIns {
    pub fn encode(&self) -> u16 {
        self.op.to_u16().unwrap() << Self::LOWER_BITS
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, _pc: u16) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl InstrVariant<ReservedOpcode> for ReservedIns {}

impl fmt::Display for ReservedIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.op)
    }
}

////////////////////////////////////////////////////////////////////////////////


#[derive(Debug, Clone)]
pub enum Ins {
    Arith(ArithIns),
    Not(NotIns),
    Branch(BranchIns),
    Jmp(JmpIns),
    Jsr(JsrIns),
    PcRel(PcRelIns),
    BaseOffset(BaseOffsetIns),
    Trap(TrapIns),
    Reserved(ReservedIns),
}

impl Ins {
    delegate! {
        to match self {
            Ins::Arith(x) => x,
            Ins::Not(x) => x,
            Ins::Branch(x) => x,
            Ins::Jmp(x) => x,
            Ins::Jsr(x) => x,
            Ins::PcRel(x) => x,
            Ins::BaseOffset(x) => x,
            Ins::Trap(x) => x,
            Ins::Reserved(x) => x,
        } {
            pub fn encode(&self) -> u16;
            pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, pc: u16) -> fmt::Result;
        }
    }

    pub fn display_with_pc(&self, pc: u16) -> InsWithPc {
        InsWithPc(self, pc)
    }
}

impl fmt::Display for Ins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Ins::Arith(ins) => write!(f, "{ins}"),
            Ins::Not(ins) => write!(f, "{ins}"),
            Ins::Branch(ins) => write!(f, "{ins}"),
            Ins::Jmp(ins) => write!(f, "{ins}"),
            Ins::Jsr(ins) => write!(f, "{ins}"),
            Ins::PcRel(ins) => write!(f, "{ins}"),
            Ins::BaseOffset(ins) => write!(f, "{ins}"),
            Ins::Trap(ins) => write!(f, "{ins}"),
            Ins::Reserved(ins) => write!(f, "{ins}"),
        }
    }
}

// Just for formatting, like Path::Display()
pub struct InsWithPc<'a>(&'a Ins, u16);

impl<'a> fmt::Display for InsWithPc<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt_with_pc(f, self.1)
    }
}
