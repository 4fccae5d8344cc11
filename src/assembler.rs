//! # Assembler
//!
//! Converts assembly text into machine code, one instruction per line:
//!
//! ```text
//! mnemonic operand, operand, ...
//! ```
//!
//! - Registers by name: `pcp sp bp exc mmub mmup mmue intb intp inte fl pcb rtip rtib r0..r7`
//! - Immediates: `b <decimal>` (8-bit) and `w <decimal>` (16-bit)
//! - Memory operands: `[src]`, `[bank: src]`, `[pc ± src]`, `[sp ± src]`,
//!   `[pt + src]`, `[it + src]`, `[r<n> + src]`, where `src` is a register
//!   name or a decimal offset
//!
//! The operand shapes come from `OPCODE_TABLE`, so anything the assembler emits
//! decodes back to the same mnemonic and operands.

pub mod encoder;
pub mod parser;
pub mod source_map;

use thiserror::Error;
use tracing::debug;

use crate::memory::Address;
use source_map::{AddressRange, SourceLocation, SourceMap};

/// Complete output from assembling a multi-line program
#[derive(Debug, Clone)]
pub struct AssemblerOutput {
    /// Assembled machine code bytes
    pub bytes: Vec<u8>,

    /// Address the first byte is meant to be loaded at
    pub origin: Address,

    /// Source map for debugging
    pub source_map: SourceMap,
}

/// An error encountered during assembly
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct AssemblerError {
    /// Error type classification
    pub error_type: ErrorType,

    /// Line number where error occurred (1-indexed)
    pub line: usize,

    /// Column number where error starts (0-indexed)
    pub column: usize,

    /// Human-readable error message
    pub message: String,
}

impl AssemblerError {
    pub(crate) fn new(error_type: ErrorType, column: usize, message: impl Into<String>) -> Self {
        Self {
            error_type,
            line: 1,
            column,
            message: message.into(),
        }
    }
}

/// Classification of assembly errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// The mnemonic is missing or not in the opcode table
    UnknownMnemonic,

    /// No register name matches
    UnknownRegister,

    /// A `[ ... ]` operand is malformed or its bank is out of range
    InvalidMemoryOperand,

    /// `-` used where only `+` is allowed (`pt`, `it`, indexed)
    InvalidOffsetSign,

    /// Missing digits or a value too large for its width
    InvalidImmediate,

    /// Wrong operand kind or count for the mnemonic
    OperandMismatch,

    /// Unexpected text after an operand or after the last operand
    TrailingInput,
}

/// Assembles one line into a new byte vector.
///
/// # Examples
///
/// ```
/// use bank16::assemble_line;
///
/// assert_eq!(assemble_line("imm.w r1, w 4660").unwrap(), vec![0x03, 0x11, 0x34, 0x12]);
/// assert_eq!(assemble_line("lod.b r2, [42]").unwrap(), vec![0x04, 0x12, 0x80, 0x2A, 0x00]);
/// assert!(assemble_line("frobnicate r0").is_err());
/// ```
pub fn assemble_line(line: &str) -> Result<Vec<u8>, AssemblerError> {
    let mut out = Vec::new();
    assemble_line_into(line, &mut out)?;
    Ok(out)
}

/// Assembles one line, appending the bytes to `out`.
///
/// On error `out` is left exactly as it was.
pub fn assemble_line_into(line: &str, out: &mut Vec<u8>) -> Result<(), AssemblerError> {
    let start = out.len();
    let result = parser::parse_line(line)
        .and_then(|parsed| encoder::encode_instruction(parsed.opcode, &parsed.operands, out));

    if result.is_err() {
        out.truncate(start);
    }
    result
}

/// Assembles a multi-line program.
///
/// Blank lines and `;` comments are skipped. Every failing line contributes
/// one error, reported with its 1-based line number; no output is produced
/// unless all lines assemble.
///
/// # Examples
///
/// ```
/// use bank16::{assemble, Address};
///
/// let source = "; add two numbers\nimm.b r0, b 5\nimm.b r1, b 3\nadd r0, r1\n";
/// let output = assemble(source, Address::new(0, 0x1000)).unwrap();
///
/// assert_eq!(output.bytes.len(), 9);
/// let range = output.source_map.get_address_range(4).unwrap();
/// assert_eq!((range.start, range.end), (0x1006, 0x1009));
/// ```
pub fn assemble(source: &str, origin: Address) -> Result<AssemblerOutput, Vec<AssemblerError>> {
    let mut bytes = Vec::new();
    let mut source_map = SourceMap::new();
    let mut errors = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;
        let code = parser::strip_comment(line);
        let trimmed = code.trim_start();
        if trimmed.trim_end().is_empty() {
            continue;
        }

        let start = bytes.len();
        match assemble_line_into(code, &mut bytes) {
            Ok(()) => {
                let location = SourceLocation {
                    line: line_number,
                    column: code.len() - trimmed.len(),
                    length: trimmed.trim_end().len(),
                };
                let range = AddressRange {
                    start: origin.offset.wrapping_add(start as u16),
                    end: origin.offset.wrapping_add(bytes.len() as u16),
                };
                source_map.add_instruction(location, range);
            }
            Err(mut error) => {
                error.line = line_number;
                errors.push(error);
            }
        }
    }

    if !errors.is_empty() {
        debug!(count = errors.len(), "assembly failed");
        return Err(errors);
    }

    source_map.finalize();
    Ok(AssemblerOutput {
        bytes,
        origin,
        source_map,
    })
}
