
use common::asm::*;
use common::constants::MEM_SIZE;
use common::decoder::decode;
use crate::EmulatorState;
use crate::emulator_state::CondFlags;
use crate::io::MMIOHandler;
use crate::io::console::{Console, TermConsole};
use crate::io::keyboard::Keyboard;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use delegate::delegate;
use log::debug;
use num_traits::FromPrimitive;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecRet {
    Ok,
    Halt,
}

// This subset of the architecture has no supervisor to vector to, so every
// fault is fatal to the run.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("illegal instruction {op} at {pc:#06x}")]
    IllegalInstruction { op: ReservedOpcode, pc: u16 },

    #[error("unknown trap vector {vector:#04x} at {pc:#06x}")]
    UnknownTrap { vector: u16, pc: u16 },
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("image is too short to contain an origin word")]
    NoOrigin,
}


pub struct Emulator {
    state: EmulatorState,
    mmio_handlers: HashMap<u16, Arc<Mutex<dyn MMIOHandler>>>,
    console: Arc<dyn Console>,
}

impl Emulator {
    pub fn new(console: Arc<dyn Console>) -> Emulator {
        let mut emu = Emulator {
            state: EmulatorState::new(),
            mmio_handlers: HashMap::new(),
            console: console.clone(),
        };
        emu.set_mmio_handler(Keyboard::new(console));
        emu
    }

    // Run until a halt.
    pub fn run(&mut self) -> Result<(), Fault> {
        while self.run_ins()? != ExecRet::Halt {}
        Ok(())
    }

    // Fetch, increment PC, decode, dispatch. Every PC-relative computation
    // downstream sees the incremented PC.
    pub fn run_ins(&mut self) -> Result<ExecRet, Fault> {
        let pc = self.state.pc();
        let word = self.mem_read_word(pc);
        self.state.set_pc(pc.wrapping_add(1));

        let ins = decode(word);
        debug!("PC {pc:#06x}: {}", ins.display_with_pc(pc));
        self.exec(&ins)
    }

    pub fn run_at(&mut self, pc: u16) -> Result<(), Fault> {
        self.state.set_pc(pc);
        self.run()
    }

    // First word is the origin; the rest load upward from there until the
    // image ends or the address space runs out. A trailing odd byte is
    // ignored, as the hardware loader's word reads would leave it.
    pub fn load_image(&mut self, image: &[u8]) -> Result<u16, ImageError> {
        let mut words = image
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        let origin = words.next().ok_or(ImageError::NoOrigin)?;

        for (addr, word) in (origin as usize..MEM_SIZE).zip(words) {
            self.state.mem_write(addr as u16, word);
        }
        Ok(origin)
    }

    pub fn load_image_file(&mut self, path: impl AsRef<Path>) -> Result<u16, ImageError> {
        let image = fs::read(path)?;
        self.load_image(&image)
    }

    pub fn set_mmio_handler(&mut self, handler: impl MMIOHandler + 'static) {
        let handler = Arc::new(Mutex::new(handler));
        for addr in handler.lock().unwrap().default_addrs() {
            self.register_handler(handler.clone(), *addr);
        }
    }

    fn register_handler(&mut self, handler: Arc<Mutex<dyn MMIOHandler>>, addr: u16) {
        let prev = self.mmio_handlers.insert(addr, handler);
        assert!(prev.is_none(), "Duplicate MMIOHandler for {addr:#06x}");
    }


    ///////////////////////////////////////////////////////////////////////////


    pub fn mem_read_word(&mut self, addr: u16) -> u16 {
        if let Some(handler) = self.mmio_handlers.get_mut(&addr) {
            return handler.lock().unwrap().read_word(&mut self.state, addr);
        }
        self.state.mem_read(addr)
    }

    pub fn mem_write_word(&mut self, addr: u16, val: u16) {
        if let Some(handler) = self.mmio_handlers.get_mut(&addr) {
            handler.lock().unwrap().write_word(&mut self.state, addr, val);
            return;
        }
        self.state.mem_write(addr, val);
    }

    pub fn get_state(&self) -> &EmulatorState {
        &self.state
    }

    pub fn get_state_mut(&mut self) -> &mut EmulatorState {
        &mut self.state
    }

    delegate! {
        to self.state {
            pub fn reg_read(&self, reg: Reg) -> u16;
            pub fn reg_write(&mut self, reg: Reg, val: u16);
            pub fn pc(&self) -> u16;
            pub fn flags(&self) -> CondFlags;
            pub fn set_flags(&mut self, flags: CondFlags);
        }
    }


    ///////////////////////////////////////////////////////////////////////////
    // Execute
    ///////////////////////////////////////////////////////////////////////////

    fn exec_arith_ins(&mut self, ins: &ArithIns) {
        let lhs = self.state.reg_read(ins.src);
        let rhs = match ins.src2 {
            Source::Reg(reg) => self.state.reg_read(reg),
            Source::Imm(imm) => imm,
        };
        let res = match ins.op {
            ArithOpcode::Add => lhs.wrapping_add(rhs),
            ArithOpcode::And => lhs & rhs,
        };
        self.state.reg_write(ins.dst, res);
        self.state.update_flags(ins.dst);
    }

    fn exec_not_ins(&mut self, ins: &NotIns) {
        let val = self.state.reg_read(ins.src);
        self.state.reg_write(ins.dst, !val);
        self.state.update_flags(ins.dst);
    }

    fn exec_branch_ins(&mut self, ins: &BranchIns) {
        if ins.cond & self.state.flags().mask() != 0 {
            let pc = self.state.pc().wrapping_add(ins.offset);
            self.state.set_pc(pc);
        }
    }

    fn exec_jmp_ins(&mut self, ins: &JmpIns) {
        // Through r7 this is RET; no special case needed.
        self.state.set_pc(self.state.reg_read(ins.base));
    }

    fn exec_jsr_ins(&mut self, ins: &JsrIns) {
        // r7 gets the address of the following instruction. The link is
        // written before the base register is read, so `jsrr r7` jumps to
        // the saved address.
        self.state.reg_write(Reg::R7, self.state.pc());
        let pc = match ins.target {
            JsrTarget::Rel(offset) => self.state.pc().wrapping_add(offset),
            JsrTarget::Reg(base) => self.state.reg_read(base),
        };
        self.state.set_pc(pc);
    }

    fn exec_pc_rel_ins(&mut self, ins: &PcRelIns) {
        let addr = self.state.pc().wrapping_add(ins.offset);
        match ins.op {
            PcRelOpcode::Ld => {
                let val = self.mem_read_word(addr);
                self.state.reg_write(ins.reg, val);
                self.state.update_flags(ins.reg);
            }
            PcRelOpcode::Ldi => {
                let indirect = self.mem_read_word(addr);
                let val = self.mem_read_word(indirect);
                self.state.reg_write(ins.reg, val);
                self.state.update_flags(ins.reg);
            }
            PcRelOpcode::Lea => {
                self.state.reg_write(ins.reg, addr);
                self.state.update_flags(ins.reg);
            }
            PcRelOpcode::St => {
                let val = self.state.reg_read(ins.reg);
                self.mem_write_word(addr, val);
            }
            PcRelOpcode::Sti => {
                let indirect = self.mem_read_word(addr);
                let val = self.state.reg_read(ins.reg);
                self.mem_write_word(indirect, val);
            }
        }
    }

    fn exec_base_offset_ins(&mut self, ins: &BaseOffsetIns) {
        let base = self.state.reg_read(ins.base);
        let addr = base.wrapping_add(ins.offset);
        match ins.op {
            BaseOffsetOpcode::Ldr => {
                let val = self.mem_read_word(addr);
                self.state.reg_write(ins.reg, val);
                self.state.update_flags(ins.reg);
            }
            BaseOffsetOpcode::Str => {
                let val = self.state.reg_read(ins.reg);
                self.mem_write_word(addr, val);
            }
        }
    }

    fn exec_trap_ins(&mut self, ins: &TrapIns) -> Result<ExecRet, Fault> {
        let Some(vector) = TrapVector::from_u16(ins.vector) else {
            return Err(Fault::UnknownTrap {
                vector: ins.vector,
                pc: self.state.pc().wrapping_sub(1),
            });
        };

        match vector {
            TrapVector::Getc => {
                let byte = self.console.read_blocking();
                self.state.reg_write(Reg::R0, byte as u16);
                self.state.update_flags(Reg::R0);
            }
            TrapVector::Out => {
                self.console.write_byte(self.state.reg_read(Reg::R0) as u8);
                self.console.flush();
            }
            TrapVector::Puts => {
                self.write_str_at(self.state.reg_read(Reg::R0));
                self.console.flush();
            }
            TrapVector::In => {
                self.write_str("Enter a character: ");
                self.console.flush();
                let byte = self.console.read_blocking();
                self.console.write_byte(byte);
                self.console.flush();
                self.state.reg_write(Reg::R0, byte as u16);
                self.state.update_flags(Reg::R0);
            }
            TrapVector::Putsp => {
                self.write_packed_str_at(self.state.reg_read(Reg::R0));
                self.console.flush();
            }
            TrapVector::Halt => {
                self.write_str("HALT\n");
                self.console.flush();
                return Ok(ExecRet::Halt);
            }
        }

        Ok(ExecRet::Ok)
    }

    // One character per word, terminated by a zero word.
    fn write_str_at(&self, mut addr: u16) {
        loop {
            let word = self.state.mem_read(addr);
            if word == 0 {
                break;
            }
            self.console.write_byte(word as u8);
            addr = addr.wrapping_add(1);
        }
    }

    // Two characters per word, low byte first; a zero high byte ends its
    // word and a zero word ends the string.
    fn write_packed_str_at(&self, mut addr: u16) {
        loop {
            let word = self.state.mem_read(addr);
            if word == 0 {
                break;
            }
            self.console.write_byte(word as u8);
            let high = (word >> 8) as u8;
            if high != 0 {
                self.console.write_byte(high);
            }
            addr = addr.wrapping_add(1);
        }
    }

    fn write_str(&self, s: &str) {
        for byte in s.bytes() {
            self.console.write_byte(byte);
        }
    }

    fn exec(&mut self, ins: &Ins) -> Result<ExecRet, Fault> {
        match ins {
            Ins::Arith(ins) => self.exec_arith_ins(ins),
            Ins::Not(ins) => self.exec_not_ins(ins),
            Ins::Branch(ins) => self.exec_branch_ins(ins),
            Ins::Jmp(ins) => self.exec_jmp_ins(ins),
            Ins::Jsr(ins) => self.exec_jsr_ins(ins),
            Ins::PcRel(ins) => self.exec_pc_rel_ins(ins),
            Ins::BaseOffset(ins) => self.exec_base_offset_ins(ins),
            Ins::Trap(ins) => {
                return self.exec_trap_ins(ins);
            }
            Ins::Reserved(ins) => {
                return Err(Fault::IllegalInstruction {
                    op: ins.op,
                    pc: self.state.pc().wrapping_sub(1),
                });
            }
        }

        Ok(ExecRet::Ok)
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(Arc::new(TermConsole::new()))
    }
}
