use crate::types::{Comp, Dest, Instruction, Jump};

/// Marks a C-instruction (the three leading ones)
const COMPUTE_PREFIX: u16 = 0b111 << 13;

pub struct InstructionEncoder;

impl InstructionEncoder {
    pub fn encode(inst: &Instruction) -> u16 {
        match inst {
            Instruction::Address(value) => value & 0x7FFF,
            Instruction::Compute { dest, comp, jump } => {
                COMPUTE_PREFIX
                    | (comp.bits() << 6)
                    | (dest.map_or(0, |d| d.bits()) << 3)
                    | jump.map_or(0, |j| j.bits())
            }
        }
    }

    /// Decode a word back into an instruction. Returns `None` for a
    /// C-instruction whose comp field is not one of the defined computations.
    pub fn decode(word: u16) -> Option<Instruction> {
        if word & 0x8000 == 0 {
            return Some(Instruction::Address(word));
        }
        let comp = Comp::from_bits((word >> 6) & 0x7F)?;
        Some(Instruction::Compute {
            dest: Dest::from_bits((word >> 3) & 0b111),
            comp,
            jump: Jump::from_bits(word & 0b111),
        })
    }
}
