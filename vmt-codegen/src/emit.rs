//! Code Generation Engine
//!
//! `CodeWriter` turns one VM instruction at a time into a fragment of Hack
//! assembly. Apart from the options it holds only the name generator, whose
//! position counter keeps generated labels unique.

use crate::abi::CallingConvention;
use crate::asm::AsmInst;
use crate::naming::NameGenerator;
use crate::TranslatorOptions;
use hack_asm::{Comp, Dest, Jump};
use log::{debug, trace, warn};
use std::io::Write;
use thiserror::Error;
use vmt_common::{Addressing, ArithmeticOp, Instruction, Segment, SourceInstruction};

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("IO error while writing assembly: {0}")]
    Io(#[from] std::io::Error),
}

pub struct CodeWriter {
    options: TranslatorOptions,
    names: NameGenerator,
}

impl CodeWriter {
    pub fn new(unit: &str, options: TranslatorOptions) -> Self {
        Self {
            options,
            names: NameGenerator::new(unit),
        }
    }

    /// Start translating another unit; statics switch namespace
    pub fn set_unit(&mut self, unit: &str) {
        debug!("Translating unit {}", unit);
        self.names.set_unit(unit);
    }

    /// Stack initialisation followed by a call to the entry function
    pub fn write_bootstrap(&mut self) -> Vec<AsmInst> {
        let position = self.names.next_position();
        let return_label = self.names.return_label(&self.options.entry_point, position);
        debug!(
            "Bootstrap: SP={} call {}",
            self.options.stack_base, self.options.entry_point
        );

        let mut code = Vec::new();
        if self.options.annotate {
            code.push(AsmInst::comment(format!(
                "bootstrap: SP = {}, call {} 0",
                self.options.stack_base, self.options.entry_point
            )));
        }
        code.extend(CallingConvention::gen_bootstrap(
            self.options.stack_base,
            &self.options.entry_point,
            &return_label,
        ));
        code
    }

    /// Translate a located instruction, prefixing a source comment when annotating
    pub fn translate(&mut self, inst: &SourceInstruction) -> Vec<AsmInst> {
        let mut code = Vec::new();
        if self.options.annotate {
            code.push(AsmInst::comment(inst.to_string()));
        }
        code.extend(self.translate_instruction(&inst.instruction));
        code
    }

    /// Translate one instruction into its fragment
    pub fn translate_instruction(&mut self, inst: &Instruction) -> Vec<AsmInst> {
        let position = self.names.next_position();
        trace!("{} @{}", inst, position);

        match inst {
            Instruction::Push { segment, index } => self.translate_push(*segment, *index),
            Instruction::Pop { segment, index } => self.translate_pop(*segment, *index),
            Instruction::Arithmetic(op) => self.translate_arithmetic(*op, position),
            Instruction::Label(name) => vec![AsmInst::label(name.as_str())],
            Instruction::Goto(name) => vec![AsmInst::at_symbol(name.as_str()), AsmInst::goto()],
            Instruction::IfGoto(name) => self.translate_if_goto(name),
            Instruction::Function { name, locals } => self.translate_function(name, *locals),
            Instruction::Call { name, args } => {
                let return_label = self.names.return_label(name, position);
                CallingConvention::gen_call(name, *args, &return_label)
            }
            Instruction::Return => CallingConvention::gen_return(),
        }
    }

    // ===== Memory access =====

    fn translate_push(&self, segment: Segment, index: u16) -> Vec<AsmInst> {
        let mut code = match segment.addressing() {
            Addressing::Immediate => vec![
                AsmInst::at(index),
                AsmInst::assign(Dest::D, Comp::A),
            ],
            Addressing::Static => vec![
                AsmInst::at_symbol(self.names.static_symbol(index)),
                AsmInst::assign(Dest::D, Comp::M),
            ],
            Addressing::Indirect(base) => {
                let mut code = CallingConvention::segment_address(base, index, Dest::A);
                code.push(AsmInst::assign(Dest::D, Comp::M));
                code
            }
            Addressing::Direct(base) => vec![
                AsmInst::at(base.wrapping_add(index)),
                AsmInst::assign(Dest::D, Comp::M),
            ],
        };
        code.extend(CallingConvention::push_d());
        code
    }

    fn translate_pop(&self, segment: Segment, index: u16) -> Vec<AsmInst> {
        match segment.addressing() {
            Addressing::Immediate => {
                // The reader rejects this; drop the value to keep SP consistent
                warn!("pop constant {}: value discarded", index);
                vec![
                    AsmInst::at_symbol(CallingConvention::STACK_POINTER),
                    AsmInst::assign(Dest::M, Comp::MMinusOne),
                ]
            }
            Addressing::Static => {
                let mut code = CallingConvention::pop_d();
                code.push(AsmInst::at_symbol(self.names.static_symbol(index)));
                code.push(AsmInst::assign(Dest::M, Comp::D));
                code
            }
            Addressing::Indirect(base) => {
                // Resolve the target before SP moves, park it in R13
                let mut code = CallingConvention::segment_address(base, index, Dest::D);
                code.push(AsmInst::at_symbol(CallingConvention::SCRATCH));
                code.push(AsmInst::assign(Dest::M, Comp::D));
                code.extend(CallingConvention::pop_d());
                code.push(AsmInst::at_symbol(CallingConvention::SCRATCH));
                code.push(AsmInst::assign(Dest::A, Comp::M));
                code.push(AsmInst::assign(Dest::M, Comp::D));
                code
            }
            Addressing::Direct(base) => {
                let mut code = CallingConvention::pop_d();
                code.push(AsmInst::at(base.wrapping_add(index)));
                code.push(AsmInst::assign(Dest::M, Comp::D));
                code
            }
        }
    }

    // ===== Arithmetic =====

    fn translate_arithmetic(&self, op: ArithmeticOp, position: u32) -> Vec<AsmInst> {
        let sp = || AsmInst::at_symbol(CallingConvention::STACK_POINTER);

        let binary = |comp: Comp| {
            vec![
                sp(),
                AsmInst::assign(Dest::AM, Comp::MMinusOne),
                AsmInst::assign(Dest::D, Comp::M),
                AsmInst::assign(Dest::A, Comp::AMinusOne),
                AsmInst::assign(Dest::M, comp),
            ]
        };
        let unary = |comp: Comp| {
            vec![
                sp(),
                AsmInst::assign(Dest::A, Comp::MMinusOne),
                AsmInst::assign(Dest::M, comp),
            ]
        };

        match op {
            ArithmeticOp::Add => binary(Comp::DPlusM),
            ArithmeticOp::Sub => binary(Comp::MMinusD),
            ArithmeticOp::And => binary(Comp::DAndM),
            ArithmeticOp::Or => binary(Comp::DOrM),
            ArithmeticOp::Neg => unary(Comp::NegM),
            ArithmeticOp::Not => unary(Comp::NotM),
            ArithmeticOp::Eq => self.translate_comparison(op, Jump::JEQ, position),
            ArithmeticOp::Gt => self.translate_comparison(op, Jump::JGT, position),
            ArithmeticOp::Lt => self.translate_comparison(op, Jump::JLT, position),
        }
    }

    /// `left - right`, then write -1 (true) or 0 (false) over the left operand
    fn translate_comparison(&self, op: ArithmeticOp, condition: Jump, position: u32) -> Vec<AsmInst> {
        let (true_label, end_label) = self.names.comparison_labels(op, position);
        let sp = || AsmInst::at_symbol(CallingConvention::STACK_POINTER);

        vec![
            sp(),
            AsmInst::assign(Dest::AM, Comp::MMinusOne),
            AsmInst::assign(Dest::D, Comp::M),
            AsmInst::assign(Dest::A, Comp::AMinusOne),
            AsmInst::assign(Dest::D, Comp::MMinusD),
            AsmInst::at_symbol(true_label.as_str()),
            AsmInst::branch(Comp::D, condition),
            // false
            sp(),
            AsmInst::assign(Dest::A, Comp::MMinusOne),
            AsmInst::assign(Dest::M, Comp::Zero),
            AsmInst::at_symbol(end_label.as_str()),
            AsmInst::goto(),
            // true
            AsmInst::label(true_label),
            sp(),
            AsmInst::assign(Dest::A, Comp::MMinusOne),
            AsmInst::assign(Dest::M, Comp::MinusOne),
            AsmInst::label(end_label),
        ]
    }

    // ===== Program flow =====

    /// Pop and jump when the value is non-zero; true is all ones, so `JGT` would miss it
    fn translate_if_goto(&self, label: &str) -> Vec<AsmInst> {
        let mut code = CallingConvention::pop_d();
        code.push(AsmInst::at_symbol(label));
        code.push(AsmInst::branch(Comp::D, Jump::JNE));
        code
    }

    // ===== Functions =====

    /// Entry label, then one synthetic `push constant 0` per local.
    /// At entry SP == LCL, so push i lands in local i and SP ends at LCL + k.
    fn translate_function(&mut self, name: &str, locals: u16) -> Vec<AsmInst> {
        let mut code = vec![AsmInst::label(name)];
        for _ in 0..locals {
            self.names.next_position();
            code.extend(self.translate_push(Segment::Constant, 0));
        }
        code
    }
}

/// Write instructions as assembly text, one per line
pub fn emit_instructions<W: Write>(instructions: &[AsmInst], out: &mut W) -> Result<(), CodegenError> {
    for inst in instructions {
        writeln!(out, "{}", inst)?;
    }
    Ok(())
}

/// Render instructions as assembly text
pub fn render(instructions: &[AsmInst]) -> String {
    let mut text = String::new();
    for inst in instructions {
        text.push_str(&inst.to_string());
        text.push('\n');
    }
    text
}
