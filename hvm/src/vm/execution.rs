use super::{VMState, VmError, VM};
use crate::constants::RAM_SIZE;
use log::{debug, trace};

// C-instruction control bits
const A_BIT: u16 = 1 << 12;
const ZX: u16 = 1 << 11;
const NX: u16 = 1 << 10;
const ZY: u16 = 1 << 9;
const NY: u16 = 1 << 8;
const F: u16 = 1 << 7;
const NO: u16 = 1 << 6;
const DEST_A: u16 = 1 << 5;
const DEST_D: u16 = 1 << 4;
const DEST_M: u16 = 1 << 3;
const JLT: u16 = 1 << 2;
const JEQ: u16 = 1 << 1;
const JGT: u16 = 1;
const JMP: u16 = JLT | JEQ | JGT;

/// The Hack ALU: x is D, y is A or M
pub(super) fn alu(x: u16, y: u16, control: u16) -> u16 {
    let mut x = if control & ZX != 0 { 0 } else { x };
    if control & NX != 0 {
        x = !x;
    }
    let mut y = if control & ZY != 0 { 0 } else { y };
    if control & NY != 0 {
        y = !y;
    }
    let out = if control & F != 0 { x.wrapping_add(y) } else { x & y };
    if control & NO != 0 { !out } else { out }
}

impl VM {
    pub(super) fn execute_instruction(&mut self, word: u16) -> Result<(), VmError> {
        let pc = self.pc;

        // A-instruction
        if word & 0x8000 == 0 {
            self.a = word;
            self.pc = pc.wrapping_add(1);
            return Ok(());
        }

        if word & 0x6000 != 0x6000 {
            return Err(VmError::IllegalInstruction { word, pc });
        }

        let addr = self.a;
        let y = if word & A_BIT != 0 {
            self.read(addr, pc)?
        } else {
            self.a
        };
        let out = alu(self.d, y, word);

        // M is written at the address A held before this instruction
        if word & DEST_M != 0 {
            self.write(addr, out, pc)?;
        }
        if word & DEST_A != 0 {
            self.a = out;
        }
        if word & DEST_D != 0 {
            self.d = out;
        }

        let signed = out as i16;
        let jump = (word & JLT != 0 && signed < 0)
            || (word & JEQ != 0 && signed == 0)
            || (word & JGT != 0 && signed > 0);

        if jump {
            trace!("pc={} jump -> {}", pc, addr);
            if word & JMP == JMP && self.is_halt_loop(pc, addr) {
                debug!("Halt loop at {} after {} steps", addr, self.steps + 1);
                self.state = VMState::Halted;
            }
            self.pc = addr;
        } else {
            self.pc = pc.wrapping_add(1);
        }
        Ok(())
    }

    /// `(X) @X 0;JMP`: an unconditional jump back onto the A-instruction
    /// that loaded its own address
    fn is_halt_loop(&self, pc: u16, target: u16) -> bool {
        pc > 0 && target == pc - 1 && self.rom.get(target as usize) == Some(&target)
    }

    fn read(&self, addr: u16, pc: u16) -> Result<u16, VmError> {
        self.ram
            .get(addr as usize)
            .copied()
            .ok_or(VmError::MemoryOutOfBounds { addr, pc })
    }

    fn write(&mut self, addr: u16, value: u16, pc: u16) -> Result<(), VmError> {
        if addr as usize >= RAM_SIZE {
            return Err(VmError::MemoryOutOfBounds { addr, pc });
        }
        self.ram[addr as usize] = value;
        Ok(())
    }
}
