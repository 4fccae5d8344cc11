//! Fuzz target for the assembler.
//!
//! Feeds arbitrary text to the line and program assemblers. Neither may panic,
//! a failed line must leave the output buffer untouched, and anything that
//! assembles must decode back to the same instruction.

#![no_main]

use bank16::disassembler::decode_instruction;
use bank16::{assemble, assemble_line_into, Address};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);
    let _ = assemble(&source, Address::new(0, 0x1000));

    for line in source.lines() {
        let mut out = vec![0xAA];
        match assemble_line_into(line, &mut out) {
            Ok(()) => {
                let instr = decode_instruction(&out[1..], Address::new(0, 0))
                    .expect("assembled bytes must decode");
                assert_eq!(instr.size_bytes as usize, out.len() - 1);
            }
            Err(_) => assert_eq!(out, vec![0xAA]),
        }
    }
});
