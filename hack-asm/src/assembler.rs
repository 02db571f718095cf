use crate::encoder::InstructionEncoder;
use crate::parser::Parser;
use crate::types::*;
use log::{debug, trace};
use std::collections::HashMap;

pub struct HackAssembler {
    parser: Parser,
}

impl Default for HackAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl HackAssembler {
    pub fn new() -> Self {
        Self { parser: Parser::new() }
    }

    pub fn assemble(&self, source: &str) -> Result<Program, Vec<AsmError>> {
        let lines = self.parser.parse_source(source)?;

        let mut symbols: HashMap<String, u16> = PREDEFINED_SYMBOLS
            .iter()
            .map(|(name, addr)| (name.to_string(), *addr))
            .collect();

        let labels = self.first_pass(&lines, &mut symbols)?;
        let program = self.second_pass(&lines, symbols);

        debug!(
            "Assembled {} instructions ({} labels)",
            program.words.len(),
            labels
        );
        Ok(program)
    }

    /// Bind every label to the ROM address of the instruction following it
    fn first_pass(
        &self,
        lines: &[ParsedLine],
        symbols: &mut HashMap<String, u16>,
    ) -> Result<usize, Vec<AsmError>> {
        let mut errors = Vec::new();
        let mut rom_address = 0usize;
        let mut labels = 0;

        for line in lines {
            match &line.kind {
                LineKind::Label(name) => {
                    if symbols.contains_key(name) {
                        errors.push(AsmError::DuplicateLabel {
                            line: line.line_number,
                            label: name.clone(),
                        });
                        continue;
                    }
                    trace!("label {} -> {}", name, rom_address);
                    symbols.insert(name.clone(), rom_address as u16);
                    labels += 1;
                }
                _ => rom_address += 1,
            }
        }

        if rom_address > ROM_SIZE {
            errors.push(AsmError::ProgramTooLarge(rom_address));
        }

        if errors.is_empty() {
            Ok(labels)
        } else {
            Err(errors)
        }
    }

    /// Encode instructions, allocating unknown symbols as variables
    fn second_pass(&self, lines: &[ParsedLine], mut symbols: HashMap<String, u16>) -> Program {
        let mut words = Vec::with_capacity(lines.len());
        let mut next_variable = VARIABLE_BASE;

        for line in lines {
            let inst = match &line.kind {
                LineKind::Label(_) => continue,
                LineKind::AddressValue(value) => Instruction::Address(*value),
                LineKind::AddressSymbol(name) => {
                    let addr = *symbols.entry(name.clone()).or_insert_with(|| {
                        trace!("variable {} -> {}", name, next_variable);
                        let addr = next_variable;
                        next_variable += 1;
                        addr
                    });
                    Instruction::Address(addr)
                }
                LineKind::Compute { dest, comp, jump } => Instruction::Compute {
                    dest: *dest,
                    comp: *comp,
                    jump: *jump,
                },
            };
            words.push(InstructionEncoder::encode(&inst));
        }

        // Only program-defined names are worth exposing
        for (name, _) in PREDEFINED_SYMBOLS {
            symbols.remove(name);
        }

        Program { words, symbols }
    }
}
