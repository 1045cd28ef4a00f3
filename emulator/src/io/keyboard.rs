
use std::sync::Arc;

use crate::EmulatorState;
use crate::io::MMIOHandler;
use crate::io::console::Console;

use common::constants::{KB_READY, MMIO_KBDR, MMIO_KBSR};

// The polling keyboard. Only the status register is intercepted; the data
// register is ordinary storage that the handler fills in, which keeps the
// device state visible in the memory array the way the hardware keeps it.
pub struct Keyboard {
    console: Arc<dyn Console>,
}

impl Keyboard {
    pub fn new(console: Arc<dyn Console>) -> Keyboard {
        Keyboard { console }
    }
}

impl MMIOHandler for Keyboard {
    // Runs on every read of the status register, no matter which path
    // issued it: LD/LDI/LDR, or instruction fetch if the PC wanders here.
    fn read_word(&mut self, state: &mut EmulatorState, addr: u16) -> u16 {
        match addr {
            MMIO_KBSR => {
                if let Some(byte) = self.console.poll_input() {
                    state.mem_write(MMIO_KBSR, KB_READY);
                    state.mem_write(MMIO_KBDR, byte as u16);
                } else {
                    state.mem_write(MMIO_KBSR, 0);
                }
                state.mem_read(addr)
            }
            _ => panic!("Keyboard doesn't handle address {addr:#06x}"),
        }
    }

    // The status register is ordinary storage on the write side.
    fn write_word(&mut self, state: &mut EmulatorState, addr: u16, val: u16) {
        state.mem_write(addr, val);
    }

    fn default_addrs(&self) -> &[u16] {
        &[MMIO_KBSR]
    }
}
