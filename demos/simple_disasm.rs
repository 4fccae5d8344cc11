//! Basic disassembler usage example

use bank16::disassembler::{disassemble, format_instruction, DisassemblyOptions};

fn main() {
    let code = &[
        0x02, 0x10, 0x2A, // imm.b r0, b 42
        0x06, 0x83, 0x00, 0x40, 0x10, // sto.b [3: 16384], r0
        0x04, 0x11, 0x91, 0x08, 0x00, // lod.b r1, [pc - 8]
        0x11, 0x11, // sl4 r1
        0x60, 0x80, 0x00, 0x10, // jmp [4096]
        0xFF, // not an opcode
    ];

    let options = DisassemblyOptions::default()
        .with_start_address(0x1000)
        .with_bank(2);

    println!("Disassembled code:");
    for instr in disassemble(code, options) {
        let note = if instr.implemented || instr.is_raw_byte() {
            ""
        } else {
            "  ; reserved"
        };
        println!("{}: {}{}", instr.address, format_instruction(&instr), note);
    }
}
