//! Example demonstrating the standard memory map with the audio port and timer.
//!
//! Memory layout (bank 0):
//! - 0x0000-0x1FFF: RAM, the program is loaded at 0x1000
//! - 0x2000-0x2FFF: audio port (write-only, logged through a callback)
//! - 0x3000-0x3FFF: timer chip
//!
//! The program sets timer channel 0 to a 1 ms period raising interrupt 4, then
//! spins. The host advances time and the interrupt handler at 0:1800 takes over.

use bank16::{
    assemble, Address, InterruptEntry, MappedMemory, Register, TimerDevice, WritePort, CPU,
};

const PROGRAM: &str = "
    imm.b r0, b 64
    sto.b [8202], r0    ; audio register 0x0A
    imm.b r0, b 255
    sto.b [12288], r0   ; timer channel 0 length: 1 ms
    imm.b r0, b 4
    sto.b [12289], r0   ; channel 0 raises interrupt 4
    nop
    nop
    nop
";

fn main() {
    println!("bank16 Memory-Mapped System Example");
    println!("===================================\n");

    let mut audio = WritePort::new(4096);
    audio.set_write_callback(|register, value| {
        println!("  audio <- reg 0x{:02X} = 0x{:02X}", register, value);
    });

    let memory = MappedMemory::standard(Box::new(audio), Box::new(TimerDevice::new()))
        .expect("standard map is valid");
    let mut cpu = CPU::new(memory);

    let output = assemble(PROGRAM, Address::new(0, 0x1000)).expect("program assembles");
    cpu.load(output.origin, &output.bytes);

    // Interrupt table at 0:0200, handler for interrupt 4 at 0:1800
    let handler = InterruptEntry {
        target: Address::new(0, 0x1800),
        clear_int: true,
        clear_mmu: false,
    };
    cpu.load(Address::new(0, 0x0200 + 3 * 4), &handler.encode());
    cpu.set_reg(Register::IntP, 0x0200);
    cpu.set_reg(Register::IntL, 1);

    println!("Executing program...");
    let mut micros = 0;
    while cpu.pc() != 0x1800 && micros < 10_000 {
        if let Err(err) = cpu.step() {
            eprintln!("Execution stopped: {}", err);
            return;
        }
        println!("  step {:2}: PC={}", cpu.steps(), cpu.pc_address());

        cpu.memory_mut().tick(250);
        micros += 250;
    }

    println!("\nInterrupt taken after {} us of device time:", micros);
    println!("  PC:   {}", cpu.pc_address());
    println!("  RTIp: 0x{:04X}", cpu.reg(Register::RtiP));
    println!("  INTl: {}", cpu.reg(Register::IntL));
}
