//! Hack VM ABI Implementation
//!
//! This module implements the memory layout and calling convention of the
//! stack machine on the Hack CPU: stack access fragments, segment address
//! resolution, and the call / return / bootstrap sequences.

use crate::asm::AsmInst;
use hack_asm::{Comp, Dest};
use vmt_common::BaseRegister;

/// Hack VM Calling Convention
///
/// RAM layout:
/// - 0: SP, stack pointer (next free cell)
/// - 1-4: LCL, ARG, THIS, THAT base registers
/// - 5-12: temp segment
/// - 13-15: scratch cells for generated code
/// - 16-255: static variables
/// - 256-: stack
///
/// Frame pushed by a call, growing upward:
/// ```text
/// ARG ->  argument 0 .. argument n-1
///         return address
///         saved LCL
///         saved ARG
///         saved THIS
///         saved THAT
/// LCL ->  local 0 .. local k-1
/// ```
pub struct CallingConvention;

impl CallingConvention {
    pub const STACK_POINTER: &'static str = "SP";

    /// First cell of the stack
    pub const DEFAULT_STACK_BASE: u16 = 256;

    /// Holds a pop target address, and the end-frame during return
    pub const SCRATCH: &'static str = "R13";

    /// Holds the return address during return
    pub const RETURN_SCRATCH: &'static str = "R14";

    /// Saved words per frame: return address plus four registers
    pub const FRAME_WORDS: u16 = 5;

    /// Distance below the end-frame of the saved return address
    pub const RETURN_ADDRESS_OFFSET: u16 = 5;

    /// Registers saved by a call, in push order
    pub const SAVED_REGISTERS: [BaseRegister; 4] = [
        BaseRegister::Lcl,
        BaseRegister::Arg,
        BaseRegister::This,
        BaseRegister::That,
    ];

    /// Registers restored by a return with their distance below the
    /// end-frame. Offsets are read from the captured end-frame in R13,
    /// never from the live LCL.
    pub const RESTORE_ORDER: [(BaseRegister, u16); 4] = [
        (BaseRegister::That, 1),
        (BaseRegister::This, 2),
        (BaseRegister::Arg, 3),
        (BaseRegister::Lcl, 4),
    ];

    /// `*SP = D; SP++`
    pub fn push_d() -> Vec<AsmInst> {
        vec![
            AsmInst::at_symbol(Self::STACK_POINTER),
            AsmInst::assign(Dest::A, Comp::M),
            AsmInst::assign(Dest::M, Comp::D),
            AsmInst::at_symbol(Self::STACK_POINTER),
            AsmInst::assign(Dest::M, Comp::MPlusOne),
        ]
    }

    /// `SP--; D = *SP`
    pub fn pop_d() -> Vec<AsmInst> {
        vec![
            AsmInst::at_symbol(Self::STACK_POINTER),
            AsmInst::assign(Dest::AM, Comp::MMinusOne),
            AsmInst::assign(Dest::D, Comp::M),
        ]
    }

    /// Compute `*base + index` into `into` (A to address the cell, D to hold it)
    pub fn segment_address(base: BaseRegister, index: u16, into: Dest) -> Vec<AsmInst> {
        vec![
            AsmInst::at_symbol(base.symbol()),
            AsmInst::assign(Dest::D, Comp::M),
            AsmInst::at(index),
            AsmInst::assign(into, Comp::DPlusA),
        ]
    }

    /// Call sequence for `call target args`; the arguments are already on the stack
    pub fn gen_call(target: &str, args: u16, return_label: &str) -> Vec<AsmInst> {
        let mut code = Vec::new();

        // push return-address
        code.push(AsmInst::at_symbol(return_label));
        code.push(AsmInst::assign(Dest::D, Comp::A));
        code.extend(Self::push_d());

        // push LCL, ARG, THIS, THAT
        for reg in Self::SAVED_REGISTERS {
            code.push(AsmInst::at_symbol(reg.symbol()));
            code.push(AsmInst::assign(Dest::D, Comp::M));
            code.extend(Self::push_d());
        }

        // ARG = SP - 5 - args, in two steps so each constant fits an A-instruction
        code.push(AsmInst::at_symbol(Self::STACK_POINTER));
        code.push(AsmInst::assign(Dest::D, Comp::M));
        code.push(AsmInst::at(Self::FRAME_WORDS));
        code.push(AsmInst::assign(Dest::D, Comp::DMinusA));
        code.push(AsmInst::at(args));
        code.push(AsmInst::assign(Dest::D, Comp::DMinusA));
        code.push(AsmInst::at_symbol(BaseRegister::Arg.symbol()));
        code.push(AsmInst::assign(Dest::M, Comp::D));

        // LCL = SP
        code.push(AsmInst::at_symbol(Self::STACK_POINTER));
        code.push(AsmInst::assign(Dest::D, Comp::M));
        code.push(AsmInst::at_symbol(BaseRegister::Lcl.symbol()));
        code.push(AsmInst::assign(Dest::M, Comp::D));

        // goto target
        code.push(AsmInst::at_symbol(target));
        code.push(AsmInst::goto());

        code.push(AsmInst::label(return_label));
        code
    }

    /// Return sequence
    ///
    /// The return address is captured before the return value is stored:
    /// for a callee without arguments `ARG[0]` is the return-address slot.
    pub fn gen_return() -> Vec<AsmInst> {
        let mut code = Vec::new();

        // endFrame = LCL
        code.push(AsmInst::at_symbol(BaseRegister::Lcl.symbol()));
        code.push(AsmInst::assign(Dest::D, Comp::M));
        code.push(AsmInst::at_symbol(Self::SCRATCH));
        code.push(AsmInst::assign(Dest::M, Comp::D));

        // retAddr = *(endFrame - 5)
        code.push(AsmInst::at(Self::RETURN_ADDRESS_OFFSET));
        code.push(AsmInst::assign(Dest::A, Comp::DMinusA));
        code.push(AsmInst::assign(Dest::D, Comp::M));
        code.push(AsmInst::at_symbol(Self::RETURN_SCRATCH));
        code.push(AsmInst::assign(Dest::M, Comp::D));

        // *ARG = pop()
        code.extend(Self::pop_d());
        code.push(AsmInst::at_symbol(BaseRegister::Arg.symbol()));
        code.push(AsmInst::assign(Dest::A, Comp::M));
        code.push(AsmInst::assign(Dest::M, Comp::D));

        // SP = ARG + 1
        code.push(AsmInst::at_symbol(BaseRegister::Arg.symbol()));
        code.push(AsmInst::assign(Dest::D, Comp::MPlusOne));
        code.push(AsmInst::at_symbol(Self::STACK_POINTER));
        code.push(AsmInst::assign(Dest::M, Comp::D));

        // THAT, THIS, ARG, LCL = *(endFrame - 1..4)
        for (reg, offset) in Self::RESTORE_ORDER {
            code.push(AsmInst::at_symbol(Self::SCRATCH));
            code.push(AsmInst::assign(Dest::D, Comp::M));
            code.push(AsmInst::at(offset));
            code.push(AsmInst::assign(Dest::A, Comp::DMinusA));
            code.push(AsmInst::assign(Dest::D, Comp::M));
            code.push(AsmInst::at_symbol(reg.symbol()));
            code.push(AsmInst::assign(Dest::M, Comp::D));
        }

        // goto retAddr
        code.push(AsmInst::at_symbol(Self::RETURN_SCRATCH));
        code.push(AsmInst::assign(Dest::A, Comp::M));
        code.push(AsmInst::goto());

        code
    }

    /// `SP = stack_base`, then `call entry 0`
    pub fn gen_bootstrap(stack_base: u16, entry: &str, return_label: &str) -> Vec<AsmInst> {
        let mut code = vec![
            AsmInst::at(stack_base),
            AsmInst::assign(Dest::D, Comp::A),
            AsmInst::at_symbol(Self::STACK_POINTER),
            AsmInst::assign(Dest::M, Comp::D),
        ];
        code.extend(Self::gen_call(entry, 0, return_label));
        code
    }
}
