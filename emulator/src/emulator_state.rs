use common::asm::{FL_NEG, FL_POS, FL_ZRO, NUM_REGS, Reg};
use common::constants::{MEM_SIZE, PC_START};

use log::trace;
use num_traits::ToPrimitive;

// Exactly one of POS/ZRO/NEG is set at any time; every constructor and
// update maintains that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CondFlags(u16);

impl CondFlags {
    pub fn new() -> CondFlags {
        CondFlags(FL_ZRO)
    }

    pub fn of_value(val: u16) -> CondFlags {
        if val == 0 {
            CondFlags(FL_ZRO)
        } else if val >> 15 == 1 {
            CondFlags(FL_NEG)
        } else {
            CondFlags(FL_POS)
        }
    }

    pub fn mask(self) -> u16 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 == FL_POS
    }

    pub fn is_zero(self) -> bool {
        self.0 == FL_ZRO
    }

    pub fn is_negative(self) -> bool {
        self.0 == FL_NEG
    }
}

impl Default for CondFlags {
    fn default() -> Self {
        Self::new()
    }
}

// This is separate so a mutable borrow can be passed to the MMIO handlers.
pub struct EmulatorState {
    mem: Vec<u16>,
    regs: [u16; NUM_REGS],
    pc: u16,
    flags: CondFlags,
}

impl EmulatorState {
    pub fn new() -> Self {
        EmulatorState {
            mem: vec![0; MEM_SIZE],
            regs: [0; NUM_REGS],
            pc: PC_START,
            flags: CondFlags::new(),
        }
    }

    pub fn mem_read(&self, addr: u16) -> u16 {
        self.mem[addr as usize]
    }

    pub fn mem_write(&mut self, addr: u16, val: u16) {
        trace!("Mem: writing {val:#06x} to {addr:#06x}");
        self.mem[addr as usize] = val;
    }

    pub fn reg_read(&self, reg: Reg) -> u16 {
        self.regs[reg.to_usize().unwrap()]
    }

    pub fn reg_write(&mut self, reg: Reg, val: u16) {
        trace!("Reg: writing {val:#06x} to {reg}");
        self.regs[reg.to_usize().unwrap()] = val;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    pub fn flags(&self) -> CondFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: CondFlags) {
        self.flags = flags;
    }

    // The flag-setting instructions examine the value as stored in the
    // destination register, after the write.
    pub fn update_flags(&mut self, reg: Reg) {
        let val = self.reg_read(reg);
        self.flags = CondFlags::of_value(val);
        trace!("Flags: {:?} from {reg} = {val:#06x}", self.flags);
    }
}

impl Default for EmulatorState {
    fn default() -> Self {
        Self::new()
    }
}
