use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Largest value an A-instruction can load (15 bits)
pub const MAX_CONSTANT: u16 = 0x7FFF;
/// First RAM address handed out to assembler variables
pub const VARIABLE_BASE: u16 = 16;
/// Instruction memory size in words
pub const ROM_SIZE: usize = 32768;

pub const PREDEFINED_SYMBOLS: [(&str, u16); 23] = [
    ("SP", 0), ("LCL", 1), ("ARG", 2), ("THIS", 3), ("THAT", 4),
    ("R0", 0), ("R1", 1), ("R2", 2), ("R3", 3), ("R4", 4), ("R5", 5),
    ("R6", 6), ("R7", 7), ("R8", 8), ("R9", 9), ("R10", 10), ("R11", 11),
    ("R12", 12), ("R13", 13), ("R14", 14), ("R15", 15),
    ("SCREEN", 16384), ("KBD", 24576),
];

/// ALU computation of a C-instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comp {
    Zero,
    One,
    MinusOne,
    D,
    A,
    M,
    NotD,
    NotA,
    NotM,
    NegD,
    NegA,
    NegM,
    DPlusOne,
    APlusOne,
    MPlusOne,
    DMinusOne,
    AMinusOne,
    MMinusOne,
    DPlusA,
    DPlusM,
    DMinusA,
    DMinusM,
    AMinusD,
    MMinusD,
    DAndA,
    DAndM,
    DOrA,
    DOrM,
}

impl Comp {
    pub const ALL: [Comp; 28] = [
        Comp::Zero, Comp::One, Comp::MinusOne, Comp::D, Comp::A, Comp::M,
        Comp::NotD, Comp::NotA, Comp::NotM, Comp::NegD, Comp::NegA, Comp::NegM,
        Comp::DPlusOne, Comp::APlusOne, Comp::MPlusOne,
        Comp::DMinusOne, Comp::AMinusOne, Comp::MMinusOne,
        Comp::DPlusA, Comp::DPlusM, Comp::DMinusA, Comp::DMinusM,
        Comp::AMinusD, Comp::MMinusD, Comp::DAndA, Comp::DAndM, Comp::DOrA, Comp::DOrM,
    ];

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        // Commutative spellings
        let canonical = match s {
            "1+D" => "D+1",
            "1+A" => "A+1",
            "1+M" => "M+1",
            "A+D" => "D+A",
            "M+D" => "D+M",
            "A&D" => "D&A",
            "M&D" => "D&M",
            "A|D" => "D|A",
            "M|D" => "D|M",
            other => other,
        };
        Self::ALL.iter().copied().find(|comp| comp.as_str() == canonical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comp::Zero => "0",
            Comp::One => "1",
            Comp::MinusOne => "-1",
            Comp::D => "D",
            Comp::A => "A",
            Comp::M => "M",
            Comp::NotD => "!D",
            Comp::NotA => "!A",
            Comp::NotM => "!M",
            Comp::NegD => "-D",
            Comp::NegA => "-A",
            Comp::NegM => "-M",
            Comp::DPlusOne => "D+1",
            Comp::APlusOne => "A+1",
            Comp::MPlusOne => "M+1",
            Comp::DMinusOne => "D-1",
            Comp::AMinusOne => "A-1",
            Comp::MMinusOne => "M-1",
            Comp::DPlusA => "D+A",
            Comp::DPlusM => "D+M",
            Comp::DMinusA => "D-A",
            Comp::DMinusM => "D-M",
            Comp::AMinusD => "A-D",
            Comp::MMinusD => "M-D",
            Comp::DAndA => "D&A",
            Comp::DAndM => "D&M",
            Comp::DOrA => "D|A",
            Comp::DOrM => "D|M",
        }
    }

    /// The `a c1..c6` field (7 bits)
    pub fn bits(&self) -> u16 {
        match self {
            Comp::Zero => 0b0101010,
            Comp::One => 0b0111111,
            Comp::MinusOne => 0b0111010,
            Comp::D => 0b0001100,
            Comp::A => 0b0110000,
            Comp::M => 0b1110000,
            Comp::NotD => 0b0001101,
            Comp::NotA => 0b0110001,
            Comp::NotM => 0b1110001,
            Comp::NegD => 0b0001111,
            Comp::NegA => 0b0110011,
            Comp::NegM => 0b1110011,
            Comp::DPlusOne => 0b0011111,
            Comp::APlusOne => 0b0110111,
            Comp::MPlusOne => 0b1110111,
            Comp::DMinusOne => 0b0001110,
            Comp::AMinusOne => 0b0110010,
            Comp::MMinusOne => 0b1110010,
            Comp::DPlusA => 0b0000010,
            Comp::DPlusM => 0b1000010,
            Comp::DMinusA => 0b0010011,
            Comp::DMinusM => 0b1010011,
            Comp::AMinusD => 0b0000111,
            Comp::MMinusD => 0b1000111,
            Comp::DAndA => 0b0000000,
            Comp::DAndM => 0b1000000,
            Comp::DOrA => 0b0010101,
            Comp::DOrM => 0b1010101,
        }
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|comp| comp.bits() == bits)
    }

    /// Reads the memory cell addressed by A
    pub fn reads_memory(&self) -> bool {
        self.bits() & 0b1000000 != 0
    }
}

impl fmt::Display for Comp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Destination registers of a C-instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dest {
    M,
    D,
    MD,
    A,
    AM,
    AD,
    AMD,
}

impl Dest {
    /// Accepts the destination letters in any order (`MD` and `DM` are the same)
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > 3 {
            return None;
        }
        let mut bits = 0u16;
        for ch in s.chars() {
            let bit = match ch {
                'A' => 0b100,
                'D' => 0b010,
                'M' => 0b001,
                _ => return None,
            };
            if bits & bit != 0 {
                return None;
            }
            bits |= bit;
        }
        Self::from_bits(bits)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dest::M => "M",
            Dest::D => "D",
            Dest::MD => "MD",
            Dest::A => "A",
            Dest::AM => "AM",
            Dest::AD => "AD",
            Dest::AMD => "AMD",
        }
    }

    /// The `d1 d2 d3` field (A, D, M)
    pub fn bits(&self) -> u16 {
        match self {
            Dest::M => 0b001,
            Dest::D => 0b010,
            Dest::MD => 0b011,
            Dest::A => 0b100,
            Dest::AM => 0b101,
            Dest::AD => 0b110,
            Dest::AMD => 0b111,
        }
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0b001 => Some(Dest::M),
            0b010 => Some(Dest::D),
            0b011 => Some(Dest::MD),
            0b100 => Some(Dest::A),
            0b101 => Some(Dest::AM),
            0b110 => Some(Dest::AD),
            0b111 => Some(Dest::AMD),
            _ => None,
        }
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Jump condition of a C-instruction, tested against the ALU output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jump {
    JGT,
    JEQ,
    JGE,
    JLT,
    JNE,
    JLE,
    JMP,
}

impl Jump {
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        match s {
            "JGT" => Some(Jump::JGT),
            "JEQ" => Some(Jump::JEQ),
            "JGE" => Some(Jump::JGE),
            "JLT" => Some(Jump::JLT),
            "JNE" => Some(Jump::JNE),
            "JLE" => Some(Jump::JLE),
            "JMP" => Some(Jump::JMP),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Jump::JGT => "JGT",
            Jump::JEQ => "JEQ",
            Jump::JGE => "JGE",
            Jump::JLT => "JLT",
            Jump::JNE => "JNE",
            Jump::JLE => "JLE",
            Jump::JMP => "JMP",
        }
    }

    /// The `j1 j2 j3` field (lt, eq, gt)
    pub fn bits(&self) -> u16 {
        match self {
            Jump::JGT => 0b001,
            Jump::JEQ => 0b010,
            Jump::JGE => 0b011,
            Jump::JLT => 0b100,
            Jump::JNE => 0b101,
            Jump::JLE => 0b110,
            Jump::JMP => 0b111,
        }
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0b001 => Some(Jump::JGT),
            0b010 => Some(Jump::JEQ),
            0b011 => Some(Jump::JGE),
            0b100 => Some(Jump::JLT),
            0b101 => Some(Jump::JNE),
            0b110 => Some(Jump::JLE),
            0b111 => Some(Jump::JMP),
            _ => None,
        }
    }
}

impl fmt::Display for Jump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved machine instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// `@value`
    Address(u16),
    /// `dest=comp;jump`
    Compute {
        dest: Option<Dest>,
        comp: Comp,
        jump: Option<Jump>,
    },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Address(value) => write!(f, "@{}", value),
            Instruction::Compute { dest, comp, jump } => {
                if let Some(dest) = dest {
                    write!(f, "{}=", dest)?;
                }
                write!(f, "{}", comp)?;
                if let Some(jump) = jump {
                    write!(f, ";{}", jump)?;
                }
                Ok(())
            }
        }
    }
}

/// What a single source line holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// `(NAME)`
    Label(String),
    /// `@123`
    AddressValue(u16),
    /// `@name`
    AddressSymbol(String),
    Compute {
        dest: Option<Dest>,
        comp: Comp,
        jump: Option<Jump>,
    },
}

#[derive(Debug, Clone)]
pub struct ParsedLine {
    pub kind: LineKind,
    pub line_number: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("Line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Line {line}: duplicate label '{label}'")]
    DuplicateLabel { line: usize, label: String },

    #[error("Program too large: {0} instructions")]
    ProgramTooLarge(usize),
}

/// Assembled program
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub words: Vec<u16>,
    /// Labels (ROM addresses) and variables (RAM addresses)
    pub symbols: HashMap<String, u16>,
}

impl Program {
    pub fn symbol(&self, name: &str) -> Option<u16> {
        self.symbols.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
