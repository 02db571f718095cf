//! Emulator for the Hack CPU

mod state;
mod execution;

pub use state::VMState;

use crate::constants::*;
use hack_asm::AsmError;
use log::debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("VM not initialized")]
    NotLoaded,

    #[error("Program too large: {0} words (ROM holds 32768)")]
    ProgramTooLarge(usize),

    #[error("Assembly failed: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Assembly(Vec<AsmError>),

    #[error("Memory access out of bounds at address {addr} (pc={pc})")]
    MemoryOutOfBounds { addr: u16, pc: u16 },

    #[error("Illegal instruction {word:#06x} at pc={pc}")]
    IllegalInstruction { word: u16, pc: u16 },

    #[error("Step limit of {0} reached before halting")]
    StepLimit(u64),
}

/// The Hack computer: instruction ROM, data RAM and the A/D/PC registers
pub struct VM {
    pub rom: Vec<u16>,
    pub ram: Vec<u16>,
    pub a: u16,
    pub d: u16,
    pub pc: u16,
    pub state: VMState,
    /// Instructions executed since load
    pub steps: u64,
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl VM {
    pub fn new() -> Self {
        VM {
            rom: Vec::new(),
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
            state: VMState::Setup,
            steps: 0,
        }
    }

    /// Assemble `source` and load the result
    pub fn from_assembly(source: &str) -> Result<Self, VmError> {
        let program = hack_asm::assemble(source).map_err(VmError::Assembly)?;
        let mut vm = Self::new();
        vm.load_program(&program.words)?;
        Ok(vm)
    }

    pub fn load_program(&mut self, words: &[u16]) -> Result<(), VmError> {
        if words.len() > ROM_SIZE {
            return Err(VmError::ProgramTooLarge(words.len()));
        }
        self.rom = words.to_vec();
        self.reset();
        debug!("Loaded {} words", words.len());
        Ok(())
    }

    /// Reset registers, keeping ROM and RAM contents
    pub fn reset(&mut self) {
        self.a = 0;
        self.d = 0;
        self.pc = 0;
        self.steps = 0;
        self.state = VMState::Running;
    }

    pub fn peek(&self, addr: u16) -> u16 {
        self.ram.get(addr as usize).copied().unwrap_or(0)
    }

    pub fn poke(&mut self, addr: u16, value: u16) {
        if let Some(cell) = self.ram.get_mut(addr as usize) {
            *cell = value;
        }
    }

    /// Contents of the stack from `base` up to (excluding) `RAM[SP]`
    pub fn stack(&self, base: u16) -> &[u16] {
        let sp = (self.peek(SP) as usize).min(RAM_SIZE);
        let base = (base as usize).min(sp);
        &self.ram[base..sp]
    }

    /// Execute one instruction
    pub fn step(&mut self) -> Result<(), VmError> {
        match self.state {
            VMState::Running => {}
            VMState::Halted => return Ok(()),
            VMState::Setup => return Err(VmError::NotLoaded),
        }

        let Some(&word) = self.rom.get(self.pc as usize) else {
            debug!("PC {} left ROM after {} steps", self.pc, self.steps);
            self.state = VMState::Halted;
            return Ok(());
        };

        self.execute_instruction(word)?;
        self.steps += 1;
        Ok(())
    }

    /// Run until halt; returns the number of instructions executed
    pub fn run(&mut self, max_steps: u64) -> Result<u64, VmError> {
        let start = self.steps;
        while self.state == VMState::Running {
            if self.steps - start >= max_steps {
                return Err(VmError::StepLimit(max_steps));
            }
            self.step()?;
        }
        Ok(self.steps - start)
    }
}
