pub mod emulator;
pub mod emulator_state;
pub mod io;
pub mod terminal;

pub use emulator::{Emulator, ExecRet, Fault, ImageError};
pub use emulator_state::{CondFlags, EmulatorState};
pub use io::MMIOHandler;
