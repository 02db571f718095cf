//! Centralized naming for generated symbols
//!
//! Every label the engine invents is derived from a position counter owned
//! by the generator. The counter only moves forward, once per translated
//! instruction (including synthetic ones), and is never reset when the
//! translation unit changes, so generated labels are unique for the whole
//! program.

use log::trace;
use vmt_common::ArithmeticOp;

/// Name generator for one translation run
#[derive(Debug)]
pub struct NameGenerator {
    /// Namespace of the unit currently being translated
    unit: String,

    /// Next position to hand out
    next_position: u32,
}

impl NameGenerator {
    pub fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            next_position: 0,
        }
    }

    /// Switch the static namespace; the position counter carries on
    pub fn set_unit(&mut self, unit: &str) {
        self.unit = unit.to_string();
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Get the next position and advance the counter
    pub fn next_position(&mut self) -> u32 {
        let position = self.next_position;
        self.next_position += 1;
        trace!("position {} ({})", position, self.unit);
        position
    }

    /// Positions handed out so far
    pub fn positions_used(&self) -> u32 {
        self.next_position
    }

    // ===== Label naming =====

    /// Branch targets of a comparison: (true target, end target)
    pub fn comparison_labels(&self, op: ArithmeticOp, position: u32) -> (String, String) {
        let kind = op.as_str().to_uppercase();
        (
            format!("{}.{}_TRUE.{}", self.unit, kind, position),
            format!("{}.{}_END.{}", self.unit, kind, position),
        )
    }

    /// Label placed right after the jump of a call
    pub fn return_label(&self, callee: &str, position: u32) -> String {
        format!("{}$ret.{}", callee, position)
    }

    // ===== Static naming =====

    /// Assembler variable backing `static index` of the current unit
    pub fn static_symbol(&self, index: u16) -> String {
        format!("{}.{}", self.unit, index)
    }
}
