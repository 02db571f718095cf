//! Hack VM Translator - Frontend
//!
//! This crate reads VM source text into located, validated instructions
//! for the code generator.

pub mod parser;

pub use parser::{Parser, MAX_CONSTANT};

use std::path::Path;
use vmt_common::{SourceInstruction, TranslatorError};

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Parse VM source; locations carry `filename`
    pub fn parse_source(
        filename: &str,
        source: &str,
    ) -> Result<Vec<SourceInstruction>, Vec<TranslatorError>> {
        Parser::new(filename).parse_source(source)
    }

    /// Read and parse a `.vm` file
    pub fn parse_file(path: &Path) -> Result<Vec<SourceInstruction>, Vec<TranslatorError>> {
        let source = std::fs::read_to_string(path).map_err(|e| vec![TranslatorError::from(e)])?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse_source(&filename, &source)
    }

    /// Static namespace of a source file: its file stem
    pub fn unit_name(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Main".to_string())
    }
}
