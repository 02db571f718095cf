use hack_asm::{assemble, format_binary, AsmError, HackAssembler, InstructionEncoder};
use pretty_assertions::assert_eq;

#[test]
fn test_add_program() {
    // Computes RAM[0] = 2 + 3
    let source = r#"
        @2
        D=A
        @3
        D=D+A
        @0
        M=D
    "#;
    let program = assemble(source).unwrap();
    assert_eq!(
        format_binary(&program),
        concat!(
            "0000000000000010\n",
            "1110110000010000\n",
            "0000000000000011\n",
            "1110000010010000\n",
            "0000000000000000\n",
            "1110001100001000\n",
        )
    );
}

#[test]
fn test_loop_with_labels_and_variables() {
    let source = r#"
        @i
        M=1
    (LOOP)
        @i
        D=M
        @10
        D=D-A
        @END
        D;JGT
        @i
        M=M+1
        @LOOP
        0;JMP
    (END)
        @END
        0;JMP
    "#;
    let program = HackAssembler::new().assemble(source).unwrap();
    assert_eq!(program.symbol("LOOP"), Some(2));
    assert_eq!(program.symbol("END"), Some(12));
    assert_eq!(program.symbol("i"), Some(16));
    assert_eq!(program.len(), 14);
}

#[test]
fn test_every_word_decodes_back() {
    let source = "@SP\nAM=M-1\nD=M\nA=A-1\nM=D+M\n@LOOP\nD;JNE\n(LOOP)\nMD=!M\n";
    let program = assemble(source).unwrap();
    let text: Vec<String> = program
        .words
        .iter()
        .map(|w| InstructionEncoder::decode(*w).unwrap().to_string())
        .collect();
    assert_eq!(text, vec!["@0", "AM=M-1", "D=M", "A=A-1", "M=D+M", "@7", "D;JNE", "MD=!M"]);
}

#[test]
fn test_errors_carry_line_numbers() {
    let errors = assemble("@1\nD=D*A\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], AsmError::Syntax { line: 2, .. }));
}
