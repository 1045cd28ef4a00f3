
use std::io::{self, Write};
use std::process;

use crossterm::terminal;
use log::warn;

// Exit status for an externally interrupted run, distinguishing it from a
// normal HALT (0) and a startup failure (1 or 2).
pub const INTERRUPT_STATUS: i32 = 130;

// Holds the terminal in raw mode; restores it when dropped, whichever way
// the scope unwinds.
pub struct RawModeGuard(());

impl RawModeGuard {
    pub fn enable() -> io::Result<RawModeGuard> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to restore terminal mode: {e}");
        }
    }
}

pub fn install_interrupt_handler() {
    if let Err(e) = ctrlc::set_handler(|| interrupt_exit()) {
        warn!("failed to install interrupt handler: {e}");
    }
}

// Shared by the SIGINT handler and the raw-mode ctrl-c key path: the
// terminal must be restored on every way out of the process.
pub fn interrupt_exit() -> ! {
    let _ = terminal::disable_raw_mode();
    let mut out = io::stdout();
    let _ = out.write_all(b"\n");
    let _ = out.flush();
    process::exit(INTERRUPT_STATUS);
}
