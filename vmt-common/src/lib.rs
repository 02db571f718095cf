//! Hack VM Translator - Common Types and Utilities
//! 
//! This crate contains the VM instruction model, error definitions, and
//! source location tracking shared by the reader, the code generator and
//! the driver.

pub mod error;
pub mod types;
pub mod source_loc;

pub use error::{Diagnostic, ErrorReporter, Severity, TranslatorError};
pub use types::*;
pub use source_loc::{SourceInstruction, SourceLocation};
