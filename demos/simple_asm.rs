//! Assemble a short program, then run it on a flat-memory CPU.

use bank16::{assemble, Address, FlatMemory, MemoryBus, Register, CPU};

fn main() {
    let source = r#"
        imm.b r0, b 5       ; r0 = 5
        imm.b r1, b 3
        add r0, r1          ; r0 = 8
        sto.b [8192], r0
        imm.b r3, b 3
        sl4 r3
        sl4 r3
        sl4 r3
        sl4 r3              ; r3 = 0x30000
    "#;

    let origin = Address::new(0, 0x1000);
    let output = match assemble(source, origin) {
        Ok(output) => output,
        Err(errors) => {
            eprintln!("Assembly failed:");
            for error in errors {
                eprintln!("  Line {}, column {}: {}", error.line, error.column, error.message);
            }
            return;
        }
    };

    println!("Assembled {} bytes at {}:", output.bytes.len(), output.origin);
    for (i, byte) in output.bytes.iter().enumerate() {
        print!("{:02X} ", byte);
        if (i + 1) % 8 == 0 {
            println!();
        }
    }
    println!("\n");

    let mut cpu = CPU::new(FlatMemory::new());
    cpu.load(output.origin, &output.bytes);

    let end = output.origin.offset + output.bytes.len() as u16;
    while cpu.pc() < end {
        if let Err(err) = cpu.step() {
            eprintln!("Execution stopped: {}", err);
            return;
        }
    }

    println!("Executed {} steps", cpu.steps());
    println!("  R0:       0x{:05X}", cpu.reg(Register::R0));
    println!("  R3:       0x{:05X}", cpu.reg(Register::R3));
    println!("  [0:2000]: 0x{:02X}", cpu.memory().read(0x2000, 0));
}
