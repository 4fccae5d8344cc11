//! WASM API for the simulator.
//!
//! Provides JavaScript-callable interfaces for CPU control, state inspection,
//! and assembly/disassembly. Writes to the audio and timer register pages are
//! forwarded to JavaScript callbacks as `(offset, value)`.

use crate::devices::{TimerDevice, WritePort};
use crate::disassembler::format_instruction;
use crate::{
    assemble, disassemble, Address, Device, DisassemblyOptions, MappedMemory, MemoryBus,
    Register, CPU,
};
use wasm_bindgen::prelude::*;

/// Calls a JS function with `(offset, value)`, ignoring exceptions it throws.
fn notify(callback: &js_sys::Function, offset: u16, value: u8) {
    let _ = callback.call2(
        &JsValue::NULL,
        &JsValue::from(offset),
        &JsValue::from(value),
    );
}

/// Timer chip whose register writes are also reported to JavaScript.
struct ObservedTimer {
    timer: TimerDevice,
    on_write: js_sys::Function,
}

impl Device for ObservedTimer {
    fn read(&self, offset: u16) -> u8 {
        self.timer.read(offset)
    }

    fn write(&mut self, offset: u16, value: u8) {
        self.timer.write(offset, value);
        notify(&self.on_write, offset, value);
    }

    fn size(&self) -> u32 {
        self.timer.size()
    }

    fn tick(&mut self, micros: u64) {
        self.timer.tick(micros);
    }

    fn take_interrupt(&mut self) -> Option<u8> {
        self.timer.take_interrupt()
    }
}

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

impl JsError {
    fn from_display(error: impl std::fmt::Display) -> Self {
        JsError::new(&error.to_string())
    }
}

/// Result of assembly operation
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    success: bool,
    machine_code: Vec<u8>,
    start_addr: u16,
    end_addr: u16,
    error_message: Option<String>,
    error_line: Option<usize>,
    error_column: Option<usize>,
}

#[wasm_bindgen]
impl AssemblyResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn machine_code(&self) -> Vec<u8> {
        self.machine_code.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn start_addr(&self) -> u16 {
        self.start_addr
    }

    #[wasm_bindgen(getter)]
    pub fn end_addr(&self) -> u16 {
        self.end_addr
    }

    #[wasm_bindgen(getter)]
    pub fn error_message(&self) -> Option<String> {
        self.error_message.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error_line(&self) -> Option<usize> {
        self.error_line
    }

    #[wasm_bindgen(getter)]
    pub fn error_column(&self) -> Option<usize> {
        self.error_column
    }
}

/// One line of disassembly
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct DisassemblyLine {
    bank: u8,
    offset: u16,
    bytes: Vec<u8>,
    text: String,
}

#[wasm_bindgen]
impl DisassemblyLine {
    #[wasm_bindgen(getter)]
    pub fn bank(&self) -> u8 {
        self.bank
    }

    #[wasm_bindgen(getter)]
    pub fn offset(&self) -> u16 {
        self.offset
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.text.clone()
    }
}

/// Main emulator interface for JavaScript
#[wasm_bindgen]
pub struct Emulator {
    cpu: CPU<MappedMemory>,
}

#[wasm_bindgen]
impl Emulator {
    /// Create an emulator with the standard memory map.
    ///
    /// `on_audio_write` and `on_timer_write` receive `(offset, value)` for every
    /// store into the audio page (0x2000) and timer page (0x3000).
    #[wasm_bindgen(constructor)]
    pub fn new(
        on_audio_write: js_sys::Function,
        on_timer_write: js_sys::Function,
    ) -> Result<Emulator, JsError> {
        let mut audio = WritePort::new(crate::memory::PAGE_SIZE);
        audio.set_write_callback(move |offset, value| notify(&on_audio_write, offset, value));

        let timer = ObservedTimer {
            timer: TimerDevice::new(),
            on_write: on_timer_write,
        };

        let memory = MappedMemory::standard(Box::new(audio), Box::new(timer))
            .map_err(JsError::from_display)?;

        Ok(Emulator {
            cpu: CPU::new(memory),
        })
    }

    /// Execute a single instruction
    pub fn step(&mut self) -> Result<(), JsError> {
        self.cpu.step().map_err(JsError::from_display)
    }

    /// Execute up to `max_steps` instructions and return how many ran
    pub fn run(&mut self, max_steps: u32) -> Result<u32, JsError> {
        self.cpu
            .run(max_steps as u64)
            .map(|steps| steps as u32)
            .map_err(JsError::from_display)
    }

    /// Advance device time (timer channels) by `micros` microseconds
    pub fn tick(&mut self, micros: f64) {
        self.cpu.memory_mut().tick(micros.max(0.0) as u64);
    }

    /// Reset the control registers; memory and general registers are kept
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Dispatch interrupt `kind` through the interrupt table
    pub fn trigger_interrupt(&mut self, kind: u8) {
        self.cpu.trigger_interrupt(kind);
    }

    // Register getters
    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u16 {
        self.cpu.pc()
    }

    #[wasm_bindgen(getter)]
    pub fn pc_bank(&self) -> u8 {
        self.cpu.pc_bank()
    }

    #[wasm_bindgen(getter)]
    pub fn sp(&self) -> u16 {
        self.cpu.sp()
    }

    #[wasm_bindgen(getter)]
    pub fn exc(&self) -> u32 {
        self.cpu.reg(Register::Exc)
    }

    #[wasm_bindgen(getter)]
    pub fn flag_zero(&self) -> bool {
        self.cpu.flag_zero()
    }

    #[wasm_bindgen(getter)]
    pub fn steps(&self) -> f64 {
        self.cpu.steps() as f64
    }

    /// Read any register slot by its encoded byte
    pub fn register(&self, index: u8) -> u32 {
        self.cpu.registers().get(index)
    }

    /// Write any register slot directly (no lock checks)
    pub fn set_register(&mut self, index: u8, value: u32) {
        self.cpu.registers_mut().set(index, value);
    }

    // Memory access methods

    pub fn read_memory(&self, bank: u8, offset: u16) -> u8 {
        self.cpu.memory().read(offset, bank)
    }

    pub fn write_memory(&mut self, bank: u8, offset: u16, value: u8) {
        self.cpu.memory_mut().write(offset, bank, value);
    }

    /// Read one 4096-byte page (for display)
    pub fn get_memory_page(&self, bank: u8, page: u8) -> Vec<u8> {
        let start = crate::memory::page(page as u16 & 0x0F);
        (0..crate::memory::PAGE_SIZE as u16)
            .map(|i| self.cpu.memory().read(start + i, bank))
            .collect()
    }

    /// Load a program and point PCb:PC at it
    pub fn load_program(&mut self, program: &[u8], bank: u8, offset: u16) {
        let start = Address::new(bank, offset);
        self.cpu.load(start, program);
        self.cpu.set_reg(Register::Pcb, start.bank as u32);
        self.cpu.set_reg(Register::Pc, start.offset as u32);
    }

    /// Assemble source text for loading at `bank:offset`
    pub fn assemble(&self, source: String, bank: u8, offset: u16) -> AssemblyResult {
        match assemble(&source, Address::new(bank, offset)) {
            Ok(output) => AssemblyResult {
                success: true,
                end_addr: offset.wrapping_add(output.bytes.len() as u16),
                machine_code: output.bytes,
                start_addr: offset,
                error_message: None,
                error_line: None,
                error_column: None,
            },
            Err(errors) => {
                let first = errors.first();
                AssemblyResult {
                    success: false,
                    machine_code: Vec::new(),
                    start_addr: offset,
                    end_addr: offset,
                    error_message: first.map(|e| e.message.clone()),
                    error_line: first.map(|e| e.line),
                    error_column: first.map(|e| e.column),
                }
            }
        }
    }

    /// Assemble and load program in one step
    pub fn assemble_and_load(&mut self, source: String, bank: u8, offset: u16) -> AssemblyResult {
        let result = self.assemble(source, bank, offset);
        if result.success {
            self.load_program(&result.machine_code, bank, offset);
        }
        result
    }

    /// Disassemble `count` instructions starting at `bank:offset`
    pub fn disassemble(&self, bank: u8, offset: u16, count: u32) -> Vec<JsValue> {
        // Longest instruction is 5 bytes
        let start = Address::new(bank, offset);
        let window: Vec<u8> = (0..count.saturating_mul(5).min(0x1_0000))
            .map(|i| {
                let at = start.wrapping_add(i as u16);
                self.cpu.memory().read(at.offset, at.bank)
            })
            .collect();

        let options = DisassemblyOptions::default()
            .with_start_address(offset)
            .with_bank(bank);

        let mut pos = 0;
        disassemble(&window, options)
            .iter()
            .take(count as usize)
            .map(|instr| {
                let size = instr.size_bytes as usize;
                let line = DisassemblyLine {
                    bank: instr.address.bank,
                    offset: instr.address.offset,
                    bytes: window[pos..pos + size].to_vec(),
                    text: format_instruction(instr),
                };
                pos += size;
                JsValue::from(line)
            })
            .collect()
    }
}
