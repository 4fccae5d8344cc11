//! Tests for the assembler: encodings, operand syntax, errors and source maps.

use bank16::{assemble, assemble_line, Address, AssemblerError, ErrorType};

fn error(line: &str) -> AssemblerError {
    assemble_line(line).unwrap_err()
}

// ========== Encodings ==========

#[test]
fn test_register_forms() {
    assert_eq!(assemble_line("nop").unwrap(), vec![0x00]);
    assert_eq!(assemble_line("mov r0, r1").unwrap(), vec![0x01, 0x10, 0x11]);
    assert_eq!(assemble_line("clr r7").unwrap(), vec![0x10, 0x17]);
    assert_eq!(assemble_line("not exc").unwrap(), vec![0x20, 0x03]);
    assert_eq!(assemble_line("add pcb, rtib").unwrap(), vec![0x0A, 0x0B, 0x0D]);
}

#[test]
fn test_immediate_forms() {
    assert_eq!(assemble_line("imm.b r0, b 255").unwrap(), vec![0x02, 0x10, 0xFF]);
    assert_eq!(assemble_line("imm.w r1, w 4660").unwrap(), vec![0x03, 0x11, 0x34, 0x12]);
    assert_eq!(assemble_line("subi.w sp, w 0").unwrap(), vec![0x0D, 0x01, 0x00, 0x00]);
    assert_eq!(assemble_line("imm.b r0, b7").unwrap(), vec![0x02, 0x10, 0x07]);
}

#[test]
fn test_b_prefixed_register_is_not_an_immediate() {
    assert_eq!(assemble_line("mov bp, r0").unwrap(), vec![0x01, 0x02, 0x10]);
}

#[test]
fn test_absolute_memory_forms() {
    assert_eq!(
        assemble_line("lod.b r2, [42]").unwrap(),
        vec![0x04, 0x12, 0x80, 0x2A, 0x00]
    );
    assert_eq!(
        assemble_line("lod.b r2, [3: 4660]").unwrap(),
        vec![0x04, 0x12, 0x83, 0x34, 0x12]
    );
    assert_eq!(
        assemble_line("lod.w r2, [r4]").unwrap(),
        vec![0x05, 0x12, 0x00, 0x14]
    );
    assert_eq!(
        assemble_line("lod.w r2, [15: r4]").unwrap(),
        vec![0x05, 0x12, 0x0F, 0x14]
    );
    assert_eq!(
        assemble_line("lod.b r0, [sp]").unwrap(),
        vec![0x04, 0x10, 0x00, 0x01]
    );
}

#[test]
fn test_relative_memory_forms() {
    assert_eq!(
        assemble_line("sto.b [pc + 10], r7").unwrap(),
        vec![0x06, 0x90, 0x0A, 0x00, 0x17]
    );
    assert_eq!(
        assemble_line("sto.b [pc - 10], r7").unwrap(),
        vec![0x06, 0x91, 0x0A, 0x00, 0x17]
    );
    assert_eq!(
        assemble_line("lod.b r0, [sp - r1]").unwrap(),
        vec![0x04, 0x10, 0x21, 0x11]
    );
    assert_eq!(
        assemble_line("lod.b r0, [pt + 3]").unwrap(),
        vec![0x04, 0x10, 0xB0, 0x03, 0x00]
    );
    assert_eq!(
        assemble_line("lod.b r0, [it + r2]").unwrap(),
        vec![0x04, 0x10, 0x40, 0x12]
    );
}

#[test]
fn test_indexed_memory_forms() {
    assert_eq!(
        assemble_line("lod.b r0, [r5 + 300]").unwrap(),
        vec![0x04, 0x10, 0xD5, 0x2C, 0x01]
    );
    assert_eq!(
        assemble_line("sto.w [r0 + r6], r1").unwrap(),
        vec![0x07, 0x50, 0x16, 0x11]
    );
}

#[test]
fn test_bank_prefix_on_relative_forms_is_ignored() {
    assert_eq!(
        assemble_line("lod.b r0, [3: pc + 4]").unwrap(),
        assemble_line("lod.b r0, [pc + 4]").unwrap()
    );
    assert_eq!(
        assemble_line("lod.b r0, [3: pc + 4]").unwrap(),
        vec![0x04, 0x10, 0x90, 0x04, 0x00]
    );
    assert_eq!(
        assemble_line("lod.b r0, [2: r1 + 4]").unwrap(),
        vec![0x04, 0x10, 0xD1, 0x04, 0x00]
    );
    assert_eq!(
        assemble_line("sto.w [ 7 : sp - r1 ], r2").unwrap(),
        vec![0x07, 0x21, 0x11, 0x12]
    );
    assert_eq!(
        error("lod.b r0, [16: pc + 4]").error_type,
        ErrorType::InvalidMemoryOperand
    );
}

#[test]
fn test_reserved_opcodes_assemble() {
    assert_eq!(
        assemble_line("jmf [4096], b 2").unwrap(),
        vec![0x67, 0x80, 0x00, 0x10, 0x02]
    );
    assert_eq!(assemble_line("pshi.w w 513").unwrap(), vec![0x53, 0x01, 0x02]);
    assert_eq!(assemble_line("int b 3").unwrap(), vec![0x65, 0x03]);
    assert_eq!(assemble_line("rti").unwrap(), vec![0x66]);
}

#[test]
fn test_flexible_spacing() {
    let expected = vec![0x0A, 0x10, 0x11];
    assert_eq!(assemble_line("add r0, r1").unwrap(), expected);
    assert_eq!(assemble_line("  add   r0,r1  ").unwrap(), expected);
    assert_eq!(assemble_line("add r0 r1").unwrap(), expected);
    assert_eq!(assemble_line("\tadd r0 ,\tr1").unwrap(), expected);

    assert_eq!(
        assemble_line("lod.b r2, [ 3 :  16 ]").unwrap(),
        vec![0x04, 0x12, 0x83, 0x10, 0x00]
    );
    assert_eq!(
        assemble_line("lod.b r2, [pc+1]").unwrap(),
        vec![0x04, 0x12, 0x90, 0x01, 0x00]
    );
}

#[test]
fn test_comments() {
    assert_eq!(assemble_line("sez ; set zero").unwrap(), vec![0x13]);
    assert_eq!(assemble_line("clr r0;done").unwrap(), vec![0x10, 0x10]);
}

// ========== Errors ==========

#[test]
fn test_unknown_mnemonic() {
    let err = error("ADD r0, r1");
    assert_eq!(err.error_type, ErrorType::UnknownMnemonic);
    assert_eq!(err.column, 0);

    assert_eq!(error("").error_type, ErrorType::UnknownMnemonic);
    assert_eq!(error("   ; only a comment").error_type, ErrorType::UnknownMnemonic);
    assert_eq!(error("???").error_type, ErrorType::UnknownMnemonic);
}

#[test]
fn test_unknown_register() {
    let err = error("add r0, r8");
    assert_eq!(err.error_type, ErrorType::UnknownRegister);
    assert_eq!(err.column, 8);

    assert_eq!(error("clr x").error_type, ErrorType::UnknownRegister);
    assert_eq!(error("lod.b r0, [r8 + 1]").error_type, ErrorType::UnknownRegister);
}

#[test]
fn test_invalid_immediate() {
    let err = error("imm.b r0, b 256");
    assert_eq!(err.error_type, ErrorType::InvalidImmediate);
    assert_eq!(err.column, 12);

    assert_eq!(error("imm.w r0, w 65536").error_type, ErrorType::InvalidImmediate);
    assert_eq!(
        error("lod.b r0, [99999]").error_type,
        ErrorType::InvalidImmediate
    );
}

#[test]
fn test_operand_mismatch() {
    let err = error("imm.b r0, w 5");
    assert_eq!(err.error_type, ErrorType::OperandMismatch);
    assert_eq!(err.column, 10);

    assert_eq!(error("add r0").error_type, ErrorType::OperandMismatch);
    assert_eq!(error("lod.b [42], r0").error_type, ErrorType::OperandMismatch);
    assert_eq!(error("sto.b r0, [42]").error_type, ErrorType::OperandMismatch);
}

#[test]
fn test_invalid_offset_sign() {
    assert_eq!(error("lod.b r0, [pt - 1]").error_type, ErrorType::InvalidOffsetSign);
    assert_eq!(error("lod.b r0, [it - 1]").error_type, ErrorType::InvalidOffsetSign);
    assert_eq!(error("lod.b r0, [r1 - 1]").error_type, ErrorType::InvalidOffsetSign);
}

#[test]
fn test_invalid_memory_operand() {
    assert_eq!(error("lod.b r0, [16: 1]").error_type, ErrorType::InvalidMemoryOperand);
    assert_eq!(error("lod.b r0, [42").error_type, ErrorType::InvalidMemoryOperand);
    assert_eq!(error("lod.b r0, [pcb + 1]").error_type, ErrorType::InvalidMemoryOperand);
}

#[test]
fn test_trailing_input() {
    assert_eq!(error("add r0, r1, r2").error_type, ErrorType::TrailingInput);
    assert_eq!(error("sez r0").error_type, ErrorType::TrailingInput);
    assert_eq!(error("clr r0x").error_type, ErrorType::TrailingInput);
}

// ========== Programs ==========

#[test]
fn test_assemble_program() {
    let source = "\
; add two numbers
imm.b r0, b 5
imm.b r1, b 3

add r0, r1 ; r0 = 8
";
    let output = assemble(source, Address::new(0, 0x1000)).unwrap();

    assert_eq!(
        output.bytes,
        vec![0x02, 0x10, 0x05, 0x02, 0x11, 0x03, 0x0A, 0x10, 0x11]
    );
    assert_eq!(output.origin, Address::new(0, 0x1000));
    assert_eq!(output.source_map.len(), 3);
}

#[test]
fn test_source_map_lookups() {
    let output = assemble("nop\n\n  lod.b r2, [42]\nsez\n", Address::new(1, 0x2000)).unwrap();
    let map = &output.source_map;

    let range = map.get_address_range(3).unwrap();
    assert_eq!((range.start, range.end), (0x2001, 0x2006));

    for offset in 0x2001..0x2006 {
        assert_eq!(map.line_for_offset(offset), Some(3));
    }
    assert_eq!(map.line_for_offset(0x2000), Some(1));
    assert_eq!(map.line_for_offset(0x2006), Some(4));
    assert_eq!(map.line_for_offset(0x2007), None);
    assert_eq!(map.get_address_range(2), None);

    let location = map.get_source_location(0x2001).unwrap();
    assert_eq!((location.line, location.column, location.length), (3, 2, 14));
}

#[test]
fn test_assemble_reports_every_bad_line() {
    let errors = assemble("nop\nbogus r0\nimm.b r0, b 300\nsez\n", Address::new(0, 0)).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!((errors[0].line, errors[0].error_type), (2, ErrorType::UnknownMnemonic));
    assert_eq!((errors[1].line, errors[1].error_type), (3, ErrorType::InvalidImmediate));
    assert!(errors[1].to_string().starts_with("line 3, column 12:"));
}
