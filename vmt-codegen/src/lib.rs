//! Hack VM Translator - Code Generation Engine
//!
//! This crate lowers stack-machine VM instructions to Hack assembly. It includes:
//!
//! - The assembly line model
//! - ABI implementation (memory layout, call/return protocol, bootstrap)
//! - Generated symbol naming
//! - The per-instruction engine and text emission

pub mod asm;
pub mod abi;
pub mod emit;
pub mod naming;

pub use asm::{Address, AsmInst};
pub use abi::CallingConvention;
pub use emit::{emit_instructions, render, CodeWriter, CodegenError};
pub use naming::NameGenerator;

use log::debug;
use serde::{Deserialize, Serialize};
use vmt_common::{Instruction, SourceInstruction};

/// Engine settings; every field has a default so partial config files work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorOptions {
    /// Initial value of SP set by the bootstrap
    pub stack_base: u16,
    /// Function called by the bootstrap
    pub entry_point: String,
    /// Prefix each fragment with a `// <instruction> (file:line)` comment
    pub annotate: bool,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            stack_base: CallingConvention::DEFAULT_STACK_BASE,
            entry_point: "Sys.init".to_string(),
            annotate: true,
        }
    }
}

/// The instructions of one source file; `name` is the static namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub name: String,
    pub instructions: Vec<SourceInstruction>,
}

impl TranslationUnit {
    pub fn new(name: &str, instructions: Vec<SourceInstruction>) -> Self {
        Self {
            name: name.to_string(),
            instructions,
        }
    }

    /// Whether the unit contains `function name ...`
    pub fn declares(&self, name: &str) -> bool {
        self.instructions.iter().any(|inst| {
            matches!(&inst.instruction, Instruction::Function { name: declared, .. } if declared == name)
        })
    }
}

/// Translate units in order with a single engine, so generated labels stay
/// unique across all of them
pub fn translate_program(
    units: &[TranslationUnit],
    options: &TranslatorOptions,
    bootstrap: bool,
) -> Vec<AsmInst> {
    let first = units.first().map(|unit| unit.name.as_str()).unwrap_or("Bootstrap");
    let mut writer = CodeWriter::new(first, options.clone());
    let mut code = Vec::new();

    if bootstrap {
        code.extend(writer.write_bootstrap());
    }

    for unit in units {
        writer.set_unit(&unit.name);
        for inst in &unit.instructions {
            code.extend(writer.translate(inst));
        }
    }

    debug!(
        "Translated {} units into {} assembly lines",
        units.len(),
        code.len()
    );
    code
}

/// Main entry point for code generation
pub fn generate_assembly(
    units: &[TranslationUnit],
    options: &TranslatorOptions,
    bootstrap: bool,
) -> String {
    render(&translate_program(units, options, bootstrap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vmt_common::Segment;

    fn unit(name: &str, instructions: Vec<Instruction>) -> TranslationUnit {
        TranslationUnit::new(name, SourceInstruction::sequence(&format!("{}.vm", name), instructions))
    }

    #[test]
    fn test_basic_code_generation() {
        let units = vec![unit(
            "Main",
            vec![
                Instruction::push(Segment::Constant, 7),
                Instruction::push(Segment::Constant, 8),
                Instruction::Arithmetic(vmt_common::ArithmeticOp::Add),
            ],
        )];

        let asm = generate_assembly(&units, &TranslatorOptions::default(), false);
        assert!(asm.contains("// push constant 7 (Main.vm:1)"));
        assert!(asm.contains("@8\nD=A"));
        assert!(asm.contains("M=D+M"));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: TranslatorOptions = serde_json::from_str(r#"{ "annotate": false }"#).unwrap();
        assert_eq!(
            options,
            TranslatorOptions {
                annotate: false,
                ..TranslatorOptions::default()
            }
        );
    }

    #[test]
    fn test_bootstrap_comes_first_and_once() {
        let units = vec![
            unit("Main", vec![Instruction::Return]),
            unit("Sys", vec![Instruction::function("Sys.init", 0)]),
        ];
        let options = TranslatorOptions {
            annotate: false,
            ..TranslatorOptions::default()
        };
        let code = translate_program(&units, &options, true);
        assert_eq!(code[0].to_string(), "@256");
        let bootstrap_calls = code
            .iter()
            .filter(|inst| inst.to_string() == "(Sys.init$ret.0)")
            .count();
        assert_eq!(bootstrap_calls, 1);
    }

    #[test]
    fn test_declares() {
        let sys = unit("Sys", vec![Instruction::function("Sys.init", 0), Instruction::Return]);
        assert!(sys.declares("Sys.init"));
        assert!(!sys.declares("Main.main"));
    }

    #[test]
    fn test_statics_follow_unit() {
        let units = vec![
            unit("A", vec![Instruction::push(Segment::Static, 0)]),
            unit("B", vec![Instruction::push(Segment::Static, 0)]),
        ];
        let asm = generate_assembly(
            &units,
            &TranslatorOptions { annotate: false, ..TranslatorOptions::default() },
            false,
        );
        assert!(asm.contains("@A.0"));
        assert!(asm.contains("@B.0"));
    }
}
