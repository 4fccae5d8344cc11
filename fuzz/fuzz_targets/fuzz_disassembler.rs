//! Fuzz target for the disassembler.
//!
//! Feeds arbitrary byte sequences to the disassembler and checks that the
//! listing covers the input exactly and that every decoded instruction
//! re-encodes to the bytes it came from.

#![no_main]

use arbitrary::Arbitrary;
use bank16::assembler::encoder::encode;
use bank16::{disassemble, DisassemblyOptions};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    bytes: Vec<u8>,
    start_address: u16,
    bank: u8,
}

fuzz_target!(|input: FuzzInput| {
    if input.bytes.len() > 65536 {
        return;
    }

    let options = DisassemblyOptions::default()
        .with_start_address(input.start_address)
        .with_bank(input.bank);
    let instructions = disassemble(&input.bytes, options);

    let mut pos = 0usize;
    let mut expected = instructions.first().map(|i| i.address);
    for instr in &instructions {
        assert_eq!(Some(instr.address), expected);
        assert!((1..=5).contains(&instr.size_bytes));

        let original = &input.bytes[pos..pos + instr.size_bytes as usize];
        if !instr.is_raw_byte() {
            let encoded = encode(instr.mnemonic, &instr.operands).expect("decoded shape is valid");
            assert_eq!(encoded, original);
        }

        pos += instr.size_bytes as usize;
        expected = Some(instr.address.wrapping_add(instr.size_bytes as u16));
    }

    assert_eq!(pos, input.bytes.len());
});
