//! VM Instruction Reader
//!
//! Reads `.vm` text one line at a time and classifies each line into an
//! `Instruction`. Operands are checked at this boundary so the code
//! generator only ever sees instructions it has a translation rule for.
//! Every error of a unit is collected before giving up on it.
//!
//! Labels are scoped to the enclosing function: inside `function Main.f`,
//! `label LOOP` becomes `Main.f$LOOP`. Labels before the first function
//! keep their name.

use hack_asm::parser::is_symbol;
use log::{debug, trace};
use vmt_common::{ArithmeticOp, Instruction, Segment, SourceInstruction, SourceLocation, TranslatorError};

/// Largest value an A-instruction can load
pub const MAX_CONSTANT: u16 = 0x7FFF;

pub struct Parser {
    filename: String,
    /// Function whose body is being read
    function: Option<String>,
}

impl Parser {
    /// `filename` is recorded in every location the parser produces
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            function: None,
        }
    }

    pub fn parse_source(&mut self, source: &str) -> Result<Vec<SourceInstruction>, Vec<TranslatorError>> {
        let mut instructions = Vec::new();
        let mut errors = Vec::new();
        self.function = None;

        for (line_number, line) in (1u32..).zip(source.lines()) {
            let location = SourceLocation::new(&self.filename, line_number);
            match self.parse_line(line, &location) {
                Ok(Some(instruction)) => {
                    trace!("{}: {}", location, instruction);
                    instructions.push(SourceInstruction::new(instruction, location));
                }
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            debug!("{}: {} instructions", self.filename, instructions.len());
            Ok(instructions)
        } else {
            debug!("{}: {} errors", self.filename, errors.len());
            Err(errors)
        }
    }

    /// Classify one line; blank and comment-only lines yield `None`
    pub fn parse_line(
        &mut self,
        line: &str,
        location: &SourceLocation,
    ) -> Result<Option<Instruction>, TranslatorError> {
        let line = match line.find("//") {
            Some(pos) => &line[..pos],
            None => line,
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, operands)) = words.split_first() else {
            return Ok(None);
        };

        let parse_error = |message: String| TranslatorError::parse_error(message, location.clone());

        let expect_operands = |count: usize| {
            if operands.len() == count {
                Ok(())
            } else {
                Err(parse_error(format!(
                    "'{}' takes {} operand{}, found {}",
                    command,
                    count,
                    if count == 1 { "" } else { "s" },
                    operands.len()
                )))
            }
        };

        if let Some(op) = ArithmeticOp::from_name(command) {
            expect_operands(0)?;
            return Ok(Some(Instruction::Arithmetic(op)));
        }

        let instruction = match command {
            "push" | "pop" => {
                expect_operands(2)?;
                let segment = Segment::from_name(operands[0])
                    .ok_or_else(|| parse_error(format!("unknown segment '{}'", operands[0])))?;
                let index = self.parse_number(operands[1], location)?;
                if command == "push" {
                    self.check_capacity(segment, index, location)?;
                    Instruction::Push { segment, index }
                } else {
                    self.check_pop(segment, index, location)?;
                    Instruction::Pop { segment, index }
                }
            }
            "label" | "goto" | "if-goto" => {
                expect_operands(1)?;
                let name = self.scoped(self.parse_name(operands[0], location)?);
                match command {
                    "label" => Instruction::Label(name),
                    "goto" => Instruction::Goto(name),
                    _ => Instruction::IfGoto(name),
                }
            }
            "function" | "call" => {
                expect_operands(2)?;
                let name = self.parse_name(operands[0], location)?;
                let count = self.parse_number(operands[1], location)?;
                if command == "function" {
                    self.function = Some(name.clone());
                    Instruction::Function { name, locals: count }
                } else {
                    Instruction::Call { name, args: count }
                }
            }
            "return" => {
                expect_operands(0)?;
                Instruction::Return
            }
            _ => return Err(parse_error(format!("unknown command '{}'", command))),
        };

        Ok(Some(instruction))
    }

    /// Indices and counts end up in A-instructions, so they share the constant limit
    fn parse_number(&self, text: &str, location: &SourceLocation) -> Result<u16, TranslatorError> {
        let value = text.parse::<u16>().map_err(|_| {
            let message = if text.starts_with('-') && text.len() > 1 {
                format!("negative index '{}'", text)
            } else if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
                format!("index '{}' out of range", text)
            } else {
                format!("expected a number, found '{}'", text)
            };
            TranslatorError::parse_error(message, location.clone())
        })?;

        if value > MAX_CONSTANT {
            return Err(TranslatorError::operand_error(
                format!("{} exceeds {}", value, MAX_CONSTANT),
                location.clone(),
            ));
        }
        Ok(value)
    }

    fn scoped(&self, label: String) -> String {
        match &self.function {
            Some(function) => format!("{}${}", function, label),
            None => label,
        }
    }

    fn parse_name(&self, text: &str, location: &SourceLocation) -> Result<String, TranslatorError> {
        if is_symbol(text) {
            Ok(text.to_string())
        } else {
            Err(TranslatorError::parse_error(
                format!("invalid name '{}'", text),
                location.clone(),
            ))
        }
    }

    fn check_pop(&self, segment: Segment, index: u16, location: &SourceLocation) -> Result<(), TranslatorError> {
        if segment == Segment::Constant {
            return Err(TranslatorError::operand_error(
                "cannot pop into the constant segment".to_string(),
                location.clone(),
            ));
        }
        self.check_capacity(segment, index, location)
    }

    fn check_capacity(&self, segment: Segment, index: u16, location: &SourceLocation) -> Result<(), TranslatorError> {
        match segment.capacity() {
            Some(capacity) if index >= capacity => Err(TranslatorError::operand_error(
                format!("{} index {} out of range 0..{}", segment, index, capacity - 1),
                location.clone(),
            )),
            _ => Ok(()),
        }
    }
}
