use std::sync::Arc;

use common::constants::PC_START;
use common::misc::image_bytes;
use emu_lib::Emulator;
use emu_lib::io::console::PipeConsole;

// Load `words` at the default start address, ready to run.
pub fn emu_with(words: &[u16]) -> (Emulator, Arc<PipeConsole>) {
    let console = Arc::new(PipeConsole::default());
    let mut emu = Emulator::new(console.clone());
    emu.load_image(&image_bytes(PC_START, words)).unwrap();
    (emu, console)
}

// Assumes the program reaches a proper halt.
pub fn run(words: &[u16]) -> Emulator {
    let (mut emu, _console) = emu_with(words);
    emu.run().unwrap();
    emu
}

pub fn output_string(console: &PipeConsole) -> String {
    let mut buf = console.take_output();
    buf.make_contiguous();
    String::from_utf8_lossy(buf.as_slices().0).into_owned()
}
