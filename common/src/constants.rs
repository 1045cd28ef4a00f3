pub const MEM_SIZE: usize = 1 << 16; // Words

// Default load/start address for user programs.
pub const PC_START: u16 = 0x3000;

// Keyboard status and data registers.
pub const MMIO_KBSR: u16 = 0xfe00;
pub const MMIO_KBDR: u16 = 0xfe02;

// Set in the status register when a character is waiting.
pub const KB_READY: u16 = 1 << 15;
