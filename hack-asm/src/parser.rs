use crate::types::{AsmError, Comp, Dest, Jump, LineKind, ParsedLine, MAX_CONSTANT};

pub struct Parser;

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Parse every line, collecting all syntax errors
    pub fn parse_source(&self, source: &str) -> Result<Vec<ParsedLine>, Vec<AsmError>> {
        let mut parsed = Vec::new();
        let mut errors = Vec::new();

        for (i, line) in source.lines().enumerate() {
            match self.parse_line(line, i + 1) {
                Ok(Some(parsed_line)) => parsed.push(parsed_line),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(parsed)
        } else {
            Err(errors)
        }
    }

    fn parse_line(&self, line: &str, line_number: usize) -> Result<Option<ParsedLine>, AsmError> {
        // Remove comments
        let line = match line.find("//") {
            Some(pos) => &line[..pos],
            None => line,
        };

        let text: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        if text.is_empty() {
            return Ok(None);
        }

        let syntax = |message: String| AsmError::Syntax { line: line_number, message };

        let kind = if let Some(rest) = text.strip_prefix('(') {
            let name = rest
                .strip_suffix(')')
                .ok_or_else(|| syntax(format!("unterminated label '{}'", text)))?;
            if !is_symbol(name) {
                return Err(syntax(format!("invalid label name '{}'", name)));
            }
            LineKind::Label(name.to_string())
        } else if let Some(operand) = text.strip_prefix('@') {
            if operand.chars().all(|c| c.is_ascii_digit()) && !operand.is_empty() {
                let value: u32 = operand
                    .parse()
                    .map_err(|_| syntax(format!("invalid constant '{}'", operand)))?;
                if value > MAX_CONSTANT as u32 {
                    return Err(syntax(format!(
                        "constant {} exceeds {}",
                        value, MAX_CONSTANT
                    )));
                }
                LineKind::AddressValue(value as u16)
            } else if is_symbol(operand) {
                LineKind::AddressSymbol(operand.to_string())
            } else {
                return Err(syntax(format!("invalid symbol '{}'", operand)));
            }
        } else {
            self.parse_compute(&text).map_err(syntax)?
        };

        Ok(Some(ParsedLine { kind, line_number }))
    }

    fn parse_compute(&self, text: &str) -> Result<LineKind, String> {
        let (dest, rest) = match text.split_once('=') {
            Some((dest, rest)) => {
                let dest = Dest::from_mnemonic(dest)
                    .ok_or_else(|| format!("invalid destination '{}'", dest))?;
                (Some(dest), rest)
            }
            None => (None, text),
        };

        let (comp, jump) = match rest.split_once(';') {
            Some((comp, jump)) => {
                let jump = Jump::from_mnemonic(jump)
                    .ok_or_else(|| format!("invalid jump '{}'", jump))?;
                (comp, Some(jump))
            }
            None => (rest, None),
        };

        let comp = Comp::from_mnemonic(comp).ok_or_else(|| format!("invalid computation '{}'", comp))?;
        Ok(LineKind::Compute { dest, comp, jump })
    }
}

/// Symbols are letters, digits, `_`, `.`, `$`, `:` and may not start with a digit
pub fn is_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || "_.$:".contains(first) => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || "_.$:".contains(c))
}
