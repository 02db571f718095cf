//! VM instruction model
//!
//! This module defines the closed instruction set of the stack machine:
//! memory segments, arithmetic/logical operations and the instruction
//! variants handed from the reader to the code generator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base register holding the address of a frame-relative segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseRegister {
    Lcl,
    Arg,
    This,
    That,
}

impl BaseRegister {
    /// Assembly symbol naming the register cell
    pub fn symbol(&self) -> &'static str {
        match self {
            BaseRegister::Lcl => "LCL",
            BaseRegister::Arg => "ARG",
            BaseRegister::This => "THIS",
            BaseRegister::That => "THAT",
        }
    }
}

impl fmt::Display for BaseRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// How a segment index is turned into a memory cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Addressing {
    /// The index itself is the value; no memory access
    Immediate,
    /// Per-unit global cell named after the unit and index
    Static,
    /// Address is `*base + index`
    Indirect(BaseRegister),
    /// Address is `base + index` with a fixed base address
    Direct(u16),
}

/// Named memory segments of the VM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Argument,
    Local,
    This,
    That,
    Constant,
    Static,
    Pointer,
    Temp,
}

impl Segment {
    /// Fixed base address of the `pointer` segment
    pub const POINTER_BASE: u16 = 3;
    /// Fixed base address of the `temp` segment
    pub const TEMP_BASE: u16 = 5;

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "argument" => Some(Segment::Argument),
            "local" => Some(Segment::Local),
            "this" => Some(Segment::This),
            "that" => Some(Segment::That),
            "constant" => Some(Segment::Constant),
            "static" => Some(Segment::Static),
            "pointer" => Some(Segment::Pointer),
            "temp" => Some(Segment::Temp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Constant => "constant",
            Segment::Static => "static",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }

    /// Resolution rule for this segment. Total over every segment.
    pub fn addressing(&self) -> Addressing {
        match self {
            Segment::Argument => Addressing::Indirect(BaseRegister::Arg),
            Segment::Local => Addressing::Indirect(BaseRegister::Lcl),
            Segment::This => Addressing::Indirect(BaseRegister::This),
            Segment::That => Addressing::Indirect(BaseRegister::That),
            Segment::Pointer => Addressing::Direct(Self::POINTER_BASE),
            Segment::Temp => Addressing::Direct(Self::TEMP_BASE),
            Segment::Constant => Addressing::Immediate,
            Segment::Static => Addressing::Static,
        }
    }

    /// Number of cells in fixed-size segments
    pub fn capacity(&self) -> Option<u16> {
        match self {
            Segment::Pointer => Some(2),
            Segment::Temp => Some(8),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Arithmetic, logical and comparison operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "add" => Some(ArithmeticOp::Add),
            "sub" => Some(ArithmeticOp::Sub),
            "neg" => Some(ArithmeticOp::Neg),
            "eq" => Some(ArithmeticOp::Eq),
            "gt" => Some(ArithmeticOp::Gt),
            "lt" => Some(ArithmeticOp::Lt),
            "and" => Some(ArithmeticOp::And),
            "or" => Some(ArithmeticOp::Or),
            "not" => Some(ArithmeticOp::Not),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }

    /// Operates on the top of stack in place
    pub fn is_unary(&self) -> bool {
        matches!(self, ArithmeticOp::Neg | ArithmeticOp::Not)
    }

    /// Net change of the stack height
    pub fn stack_effect(&self) -> i16 {
        if self.is_unary() { 0 } else { -1 }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified VM instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Arithmetic(ArithmeticOp),
    Label(String),
    Goto(String),
    IfGoto(String),
    /// Function entry with its number of locals
    Function { name: String, locals: u16 },
    /// Call with the number of arguments already pushed
    Call { name: String, args: u16 },
    Return,
}

impl Instruction {
    pub fn push(segment: Segment, index: u16) -> Self {
        Instruction::Push { segment, index }
    }

    pub fn pop(segment: Segment, index: u16) -> Self {
        Instruction::Pop { segment, index }
    }

    pub fn function(name: &str, locals: u16) -> Self {
        Instruction::Function { name: name.to_string(), locals }
    }

    pub fn call(name: &str, args: u16) -> Self {
        Instruction::Call { name: name.to_string(), args }
    }

    /// Command word as written in VM source
    pub fn command(&self) -> &'static str {
        match self {
            Instruction::Push { .. } => "push",
            Instruction::Pop { .. } => "pop",
            Instruction::Arithmetic(op) => op.as_str(),
            Instruction::Label(_) => "label",
            Instruction::Goto(_) => "goto",
            Instruction::IfGoto(_) => "if-goto",
            Instruction::Function { .. } => "function",
            Instruction::Call { .. } => "call",
            Instruction::Return => "return",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push { segment, index } | Instruction::Pop { segment, index } => {
                write!(f, "{} {} {}", self.command(), segment, index)
            }
            Instruction::Arithmetic(op) => write!(f, "{}", op),
            Instruction::Label(name) | Instruction::Goto(name) | Instruction::IfGoto(name) => {
                write!(f, "{} {}", self.command(), name)
            }
            Instruction::Function { name, locals } => write!(f, "function {} {}", name, locals),
            Instruction::Call { name, args } => write!(f, "call {} {}", name, args),
            Instruction::Return => write!(f, "return"),
        }
    }
}
