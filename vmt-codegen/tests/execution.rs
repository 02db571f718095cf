//! Translated programs executed on the Hack emulator

use hvm::constants::{ARG, LCL, SP, THAT, THIS};
use hvm::VM;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use vmt_codegen::{generate_assembly, TranslationUnit, TranslatorOptions};
use vmt_common::ArithmeticOp;
use vmt_frontend::Frontend;

const STEPS: u64 = 200_000;

fn translate(units: &[(&str, &str)], bootstrap: bool) -> String {
    let units: Vec<TranslationUnit> = units
        .iter()
        .map(|(name, source)| {
            let instructions = Frontend::parse_source(&format!("{}.vm", name), source)
                .expect("source should parse");
            TranslationUnit::new(name, instructions)
        })
        .collect();
    generate_assembly(&units, &TranslatorOptions::default(), bootstrap)
}

/// Run a bootstrap-less snippet with the segment registers preset
fn run_snippet(source: &str) -> VM {
    let asm = translate(&[("Test", source)], false);
    let mut vm = VM::from_assembly(&asm).expect("generated assembly should assemble");
    vm.poke(SP, 256);
    vm.poke(LCL, 300);
    vm.poke(ARG, 400);
    vm.poke(THIS, 3000);
    vm.poke(THAT, 3010);
    vm.run(STEPS).expect("snippet should run off the end of ROM");
    vm
}

fn run_program(units: &[(&str, &str)]) -> VM {
    let asm = translate(units, true);
    let mut vm = VM::from_assembly(&asm).expect("generated assembly should assemble");
    vm.run(STEPS).expect("program should reach its halt loop");
    vm
}

fn top(vm: &VM) -> i16 {
    vm.peek(vm.peek(SP) - 1) as i16
}

#[test]
fn test_push_pop_round_trip() {
    let vm = run_snippet(
        "push constant 42\n\
         pop local 3\n\
         push local 3\n\
         push constant 9\n\
         pop argument 1\n\
         push constant 8\n\
         pop that 2\n\
         push constant 11\n\
         pop temp 6\n\
         push temp 6",
    );
    assert_eq!(vm.peek(303), 42);
    assert_eq!(vm.peek(401), 9);
    assert_eq!(vm.peek(3012), 8);
    assert_eq!(vm.peek(11), 11);
    assert_eq!(vm.stack(256), &[42, 11]);
    assert_eq!(vm.peek(SP), 258);
}

#[test]
fn test_arithmetic_and_logic() {
    let cases = [
        ("push constant 10\npush constant 3\nsub", 7),
        ("push constant 10\npush constant 3\nadd", 13),
        ("push constant 12\npush constant 10\nand", 8),
        ("push constant 12\npush constant 10\nor", 14),
        ("push constant 5\nneg", -5),
        ("push constant 0\nnot", -1),
        ("push constant 32767\npush constant 1\nadd", -32768),
        ("push constant 0\npush constant 32767\nsub\npush constant 2\nsub", 32767),
    ];
    for (source, expected) in cases {
        let vm = run_snippet(source);
        assert_eq!(top(&vm), expected, "{}", source);
        assert_eq!(vm.peek(SP), 257, "{}", source);
    }
}

#[test]
fn test_comparisons_produce_canonical_booleans() {
    let cases = [
        ("push constant 5\npush constant 5\neq", -1),
        ("push constant 5\npush constant 6\neq", 0),
        ("push constant 7\npush constant 3\ngt", -1),
        ("push constant 3\npush constant 7\ngt", 0),
        ("push constant 3\npush constant 7\nlt", -1),
        ("push constant 7\npush constant 7\nlt", 0),
        ("push constant 5\nneg\npush constant 3\nlt", -1),
        ("push constant 5\nneg\npush constant 3\ngt", 0),
    ];
    for (source, expected) in cases {
        let vm = run_snippet(source);
        assert_eq!(top(&vm), expected, "{}", source);
        assert_eq!(vm.peek(SP), 257, "{}", source);
    }
}

#[test]
fn test_stack_pointer_moves_by_stack_effect() {
    let ops = [
        ArithmeticOp::Add,
        ArithmeticOp::Sub,
        ArithmeticOp::Neg,
        ArithmeticOp::Eq,
        ArithmeticOp::Gt,
        ArithmeticOp::Lt,
        ArithmeticOp::And,
        ArithmeticOp::Or,
        ArithmeticOp::Not,
    ];
    for op in ops {
        let vm = run_snippet(&format!("push constant 6\npush constant 2\n{}", op));
        let expected = (258 + op.stack_effect()) as u16;
        assert_eq!(vm.peek(SP), expected, "{}", op);
    }
}

#[test]
fn test_pointer_round_trip_is_a_no_op() {
    let vm = run_snippet("push pointer 0\npop pointer 0\npush pointer 1\npop pointer 1");
    assert_eq!(vm.peek(THIS), 3000);
    assert_eq!(vm.peek(THAT), 3010);
    assert_eq!(vm.peek(SP), 256);
}

#[test]
fn test_pointer_retargets_this_and_that() {
    let vm = run_snippet("push constant 5000\npop pointer 1\npush constant 77\npop that 0\npush that 0");
    assert_eq!(vm.peek(THAT), 5000);
    assert_eq!(vm.peek(5000), 77);
    assert_eq!(vm.stack(256), &[77]);
}

#[test]
fn test_if_goto_branches_on_true() {
    let program = |condition: &str| {
        format!(
            "{}\nif-goto TAKEN\npush constant 111\ngoto DONE\nlabel TAKEN\npush constant 222\nlabel DONE",
            condition
        )
    };

    let taken = run_snippet(&program("push constant 1\npush constant 1\neq"));
    assert_eq!(taken.stack(256), &[222]);

    let not_taken = run_snippet(&program("push constant 1\npush constant 2\neq"));
    assert_eq!(not_taken.stack(256), &[111]);

    // any non-zero value counts as true
    let non_canonical = run_snippet(&program("push constant 5"));
    assert_eq!(non_canonical.stack(256), &[222]);
}

#[test]
fn test_counting_loop() {
    let vm = run_snippet(
        "push constant 0\n\
         pop local 0\n\
         push constant 5\n\
         pop local 1\n\
         label LOOP\n\
         push local 1\n\
         push local 0\n\
         add\n\
         pop local 0\n\
         push local 1\n\
         push constant 1\n\
         sub\n\
         pop local 1\n\
         push local 1\n\
         if-goto LOOP\n\
         push local 0",
    );
    assert_eq!(vm.stack(256), &[15]);
}

#[test]
fn test_generated_labels_are_unique_across_units() {
    let asm = translate(
        &[
            ("A", "push constant 1\npush constant 1\neq\npush constant 1\npush constant 2\nlt\ncall B.f 0\neq"),
            ("B", "function B.f 0\npush constant 1\npush constant 1\neq\ncall B.f 0\nreturn"),
        ],
        true,
    );
    let labels: Vec<&str> = asm.lines().filter(|line| line.starts_with('(')).collect();
    let unique: HashSet<&str> = labels.iter().copied().collect();
    assert_eq!(labels.len(), unique.len());
    assert!(hack_asm::assemble(&asm).is_ok());
}

#[test]
fn test_call_and_return_restore_the_caller() {
    let vm = run_program(&[
        (
            "Sys",
            "function Sys.init 0\n\
             push constant 3000\n\
             pop pointer 0\n\
             push constant 4000\n\
             pop pointer 1\n\
             push constant 3\n\
             push constant 4\n\
             call Math.add 2\n\
             label END\n\
             goto END",
        ),
        (
            "Math",
            "function Math.add 1\n\
             push constant 1\n\
             pop pointer 0\n\
             push constant 2\n\
             pop pointer 1\n\
             push argument 0\n\
             push argument 1\n\
             add\n\
             return",
        ),
    ]);

    // Sys.init frame: ARG = 256, LCL = 261
    assert_eq!(vm.peek(SP), 262);
    assert_eq!(vm.stack(261), &[7]);
    assert_eq!(vm.peek(LCL), 261);
    assert_eq!(vm.peek(ARG), 256);
    assert_eq!(vm.peek(THIS), 3000);
    assert_eq!(vm.peek(THAT), 4000);
}

#[test]
fn test_return_from_function_without_arguments() {
    let vm = run_program(&[
        ("Sys", "function Sys.init 0\ncall Main.seven 0\nlabel HALT\ngoto HALT"),
        ("Main", "function Main.seven 0\npush constant 7\nreturn"),
    ]);
    assert_eq!(vm.peek(SP), 262);
    assert_eq!(vm.stack(261), &[7]);
}

#[test]
fn test_nested_calls() {
    let vm = run_program(&[
        (
            "Sys",
            "function Sys.init 0\npush constant 6\ncall Main.double 1\ncall Main.double 1\nlabel HALT\ngoto HALT",
        ),
        (
            "Main",
            "function Main.double 0\npush argument 0\ncall Main.identity 1\npush argument 0\nadd\nreturn\n\
             function Main.identity 0\npush argument 0\nreturn",
        ),
    ]);
    assert_eq!(vm.stack(261), &[24]);
}

#[test]
fn test_functions_may_reuse_label_names() {
    let asm = translate(
        &[
            ("Sys", "function Sys.init 0\npush constant 3\ncall P.f 1\npush constant 4\ncall P.g 1\nlabel LOOP\ngoto LOOP"),
            (
                "P",
                "function P.f 0\n\
                 push constant 0\n\
                 label LOOP\n\
                 push argument 0\n\
                 add\n\
                 push argument 0\n\
                 push constant 1\n\
                 sub\n\
                 pop argument 0\n\
                 push argument 0\n\
                 if-goto LOOP\n\
                 return\n\
                 function P.g 1\n\
                 push constant 1\n\
                 pop local 0\n\
                 label LOOP\n\
                 push local 0\n\
                 push local 0\n\
                 add\n\
                 pop local 0\n\
                 push argument 0\n\
                 push constant 1\n\
                 sub\n\
                 pop argument 0\n\
                 push argument 0\n\
                 if-goto LOOP\n\
                 push local 0\n\
                 return",
            ),
        ],
        true,
    );
    assert!(asm.contains("(P.f$LOOP)"));
    assert!(asm.contains("(P.g$LOOP)"));
    assert!(asm.contains("(Sys.init$LOOP)"));

    let mut vm = VM::from_assembly(&asm).expect("generated assembly should assemble");
    vm.run(STEPS).expect("program should reach its halt loop");
    // 3 + 2 + 1, then 1 doubled four times
    assert_eq!(vm.stack(261), &[6, 16]);
}

#[test]
fn test_function_locals_start_at_zero() {
    let asm = translate(
        &[
            ("Sys", "function Sys.init 0\ncall Main.spin 0"),
            ("Main", "function Main.spin 3\nlabel SPIN\ngoto SPIN"),
        ],
        true,
    );
    let mut vm = VM::from_assembly(&asm).expect("generated assembly should assemble");
    for addr in 256..400 {
        vm.poke(addr, 0xBEEF);
    }
    vm.run(STEPS).expect("program should reach its halt loop");

    let lcl = vm.peek(LCL);
    assert_eq!(lcl, 266);
    assert_eq!(vm.peek(SP), lcl + 3);
    assert_eq!(&vm.ram[266..269], &[0, 0, 0]);
    assert_eq!(vm.peek(269), 0xBEEF);
}

#[test]
fn test_statics_are_per_unit() {
    let asm = translate(
        &[
            ("A", "push constant 5\npop static 0\npush constant 6\npop static 1"),
            ("B", "push constant 7\npop static 0\npush static 0\npush static 1"),
        ],
        false,
    );
    let program = hack_asm::assemble(&asm).expect("generated assembly should assemble");
    let a0 = program.symbol("A.0").expect("A.0 allocated");
    let b0 = program.symbol("B.0").expect("B.0 allocated");
    assert_ne!(a0, b0);

    let mut vm = VM::new();
    vm.load_program(&program.words).expect("program fits in ROM");
    vm.poke(SP, 256);
    vm.run(STEPS).expect("program should run off the end of ROM");

    assert_eq!(vm.peek(a0), 5);
    assert_eq!(vm.peek(b0), 7);
    // B.1 was never written
    assert_eq!(vm.stack(256), &[7, 0]);
}

#[test]
fn test_bootstrap_prefix_is_deterministic() {
    let units = [("Sys", "function Sys.init 0\nlabel L\ngoto L")];
    let first = translate(&units, true);
    let second = translate(&units, true);
    assert_eq!(first, second);

    let prefix: Vec<&str> = first
        .lines()
        .filter(|line| !line.starts_with("//"))
        .take(4)
        .collect();
    assert_eq!(prefix, vec!["@256", "D=A", "@SP", "M=D"]);
}
