//! Source location tracking for error reporting
//!
//! VM source is line oriented, so a location is a unit file name plus a
//! 1-based line number. The line number doubles as the strictly increasing
//! position the reader attaches to every instruction.

use crate::types::Instruction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in a VM source file (line is 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(filename: &str, line: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}

/// An instruction paired with where the reader found it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInstruction {
    pub instruction: Instruction,
    pub location: SourceLocation,
}

impl SourceInstruction {
    pub fn new(instruction: Instruction, location: SourceLocation) -> Self {
        Self { instruction, location }
    }

    /// Wrap instructions with consecutive line numbers, as if read from `filename`
    pub fn sequence(filename: &str, instructions: Vec<Instruction>) -> Vec<Self> {
        instructions
            .into_iter()
            .zip(1u32..)
            .map(|(instruction, line)| Self::new(instruction, SourceLocation::new(filename, line)))
            .collect()
    }
}

impl fmt::Display for SourceInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.instruction, self.location)
    }
}
