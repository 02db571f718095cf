//! Hack Assembly Instruction Definitions
//!
//! This module defines the assembly lines the code generator emits. The
//! computation, destination and jump fields reuse the assembler's types so
//! every emitted line is one the assembler accepts.

use hack_asm::{Comp, Dest, Jump};
use std::fmt;

/// Operand of an A-instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Value(u16),
    Symbol(String),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Value(value) => write!(f, "{}", value),
            Address::Symbol(name) => write!(f, "{}", name),
        }
    }
}

/// Hack Assembly Lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmInst {
    /// `@value` / `@symbol`
    At(Address),
    /// `dest=comp;jump`
    Compute {
        dest: Option<Dest>,
        comp: Comp,
        jump: Option<Jump>,
    },
    /// `(name)`
    Label(String),
    /// `// text`
    Comment(String),
}

impl AsmInst {
    pub fn at(value: u16) -> Self {
        AsmInst::At(Address::Value(value))
    }

    pub fn at_symbol(name: impl Into<String>) -> Self {
        AsmInst::At(Address::Symbol(name.into()))
    }

    /// `dest=comp`
    pub fn assign(dest: Dest, comp: Comp) -> Self {
        AsmInst::Compute { dest: Some(dest), comp, jump: None }
    }

    /// `comp;jump`
    pub fn branch(comp: Comp, jump: Jump) -> Self {
        AsmInst::Compute { dest: None, comp, jump: Some(jump) }
    }

    /// `0;JMP`
    pub fn goto() -> Self {
        Self::branch(Comp::Zero, Jump::JMP)
    }

    pub fn label(name: impl Into<String>) -> Self {
        AsmInst::Label(name.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        AsmInst::Comment(text.into())
    }

    /// Occupies a ROM word once assembled
    pub fn is_instruction(&self) -> bool {
        matches!(self, AsmInst::At(_) | AsmInst::Compute { .. })
    }
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmInst::At(addr) => write!(f, "@{}", addr),
            AsmInst::Compute { dest, comp, jump } => {
                if let Some(dest) = dest {
                    write!(f, "{}=", dest)?;
                }
                write!(f, "{}", comp)?;
                if let Some(jump) = jump {
                    write!(f, ";{}", jump)?;
                }
                Ok(())
            }
            AsmInst::Label(name) => write!(f, "({})", name),
            AsmInst::Comment(text) => write!(f, "// {}", text),
        }
    }
}
