
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::warn;

use common::constants::PC_START;
use emu_lib::Emulator;
use emu_lib::io::console::TermConsole;
use emu_lib::terminal::{self, RawModeGuard};


/// LC-3 virtual machine
#[derive(Parser)]
struct Args {
    /// Program images to load, in order
    #[arg(required = true)]
    images: Vec<PathBuf>,
}


fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let mut emu = Emulator::new(Arc::new(TermConsole::new()));
    for path in &args.images {
        if let Err(e) = emu.load_image_file(path) {
            eprintln!("failed to load image {}: {e}", path.display());
            return ExitCode::from(1);
        }
    }

    terminal::install_interrupt_handler();
    let _guard = match RawModeGuard::enable() {
        Ok(guard) => Some(guard),
        Err(e) => {
            // Not fatal: stdin may be a pipe. Character input degrades, but
            // execution can proceed.
            warn!("failed to enter raw terminal mode: {e}");
            None
        }
    };

    match emu.run_at(PC_START) {
        Ok(()) => ExitCode::SUCCESS,
        Err(fault) => {
            eprintln!("\r\nfatal: {fault}");
            ExitCode::from(1)
        }
    }
}
