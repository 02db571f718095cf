pub mod types;
pub mod parser;
pub mod encoder;
pub mod assembler;

pub use types::{
    Comp, Dest, Jump, Instruction, ParsedLine, LineKind, Program, AsmError,
    PREDEFINED_SYMBOLS, VARIABLE_BASE, MAX_CONSTANT, ROM_SIZE,
};

pub use parser::Parser;
pub use encoder::InstructionEncoder;
pub use assembler::HackAssembler;

// Re-export for convenience
pub fn assemble(source: &str) -> Result<Program, Vec<AsmError>> {
    HackAssembler::new().assemble(source)
}

/// Render a program as text, one 16-character binary word per line
pub fn format_binary(program: &Program) -> String {
    let mut out = String::with_capacity(program.words.len() * 17);
    for word in &program.words {
        out.push_str(&format!("{:016b}\n", word));
    }
    out
}
