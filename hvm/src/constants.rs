//! Central configuration and constants for the Hack emulator

// Memory layout
pub const RAM_SIZE: usize = 32768;
pub const ROM_SIZE: usize = hack_asm::ROM_SIZE;

// Virtual registers of the VM calling convention
pub const SP: u16 = 0;
pub const LCL: u16 = 1;
pub const ARG: u16 = 2;
pub const THIS: u16 = 3;
pub const THAT: u16 = 4;

// Run limits
pub const DEFAULT_MAX_STEPS: u64 = 10_000_000;
