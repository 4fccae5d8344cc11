//! Assembly source parser
//!
//! Parsing walks a remaining-input cursor over one line. Each operand is parsed
//! by its syntax alone and then checked against the opcode's operand shape.

use crate::assembler::{AssemblerError, ErrorType};
use crate::disassembler::{MemoryOperand, MemorySource, Operand};
use crate::opcodes::{find_opcode, OPCODE_TABLE};
use crate::registers::REGISTER_NAMES;

/// A parsed line of assembly source
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine<'a> {
    /// Mnemonic text as written
    pub mnemonic: &'a str,

    /// Opcode byte for the mnemonic
    pub opcode: u8,

    /// Operands in source order
    pub operands: Vec<Operand>,
}

/// Returns `line` up to (not including) the first `;`.
pub fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(at) => &line[..at],
        None => line,
    }
}

/// Parse one line into its opcode and operands.
///
/// # Examples
///
/// ```
/// use bank16::assembler::parser::parse_line;
/// use bank16::Operand;
///
/// let parsed = parse_line("addi.b r0 b 7").unwrap();
/// assert_eq!(parsed.opcode, 0x08);
/// assert_eq!(parsed.operands, vec![Operand::Register(0x10), Operand::Imm8(7)]);
/// ```
pub fn parse_line(line: &str) -> Result<ParsedLine<'_>, AssemblerError> {
    let mut cursor = Cursor::new(strip_comment(line));
    cursor.skip_spaces();

    let mnemonic_column = cursor.column();
    let mnemonic = cursor.take_while(|c| !c.is_whitespace());
    if mnemonic.is_empty() {
        return Err(cursor.error(ErrorType::UnknownMnemonic, "missing mnemonic"));
    }
    let opcode = find_opcode(mnemonic).ok_or_else(|| {
        AssemblerError::new(
            ErrorType::UnknownMnemonic,
            mnemonic_column,
            format!("unknown mnemonic '{}'", mnemonic),
        )
    })?;

    let shape = OPCODE_TABLE[opcode as usize].operands;
    let mut operands = Vec::with_capacity(shape.len());

    for (position, expected) in shape.iter().enumerate() {
        cursor.skip_separators();
        if cursor.is_empty() {
            return Err(cursor.error(
                ErrorType::OperandMismatch,
                format!(
                    "'{}' takes {} operand(s), found {}",
                    mnemonic,
                    shape.len(),
                    position
                ),
            ));
        }

        let column = cursor.column();
        let operand = parse_operand(&mut cursor)?;
        if operand.kind() != *expected {
            return Err(AssemblerError::new(
                ErrorType::OperandMismatch,
                column,
                format!(
                    "operand {} of '{}' must be {:?}, found {:?}",
                    position + 1,
                    mnemonic,
                    expected,
                    operand.kind()
                ),
            ));
        }
        cursor.expect_operand_end()?;
        operands.push(operand);
    }

    cursor.skip_separators();
    if !cursor.is_empty() {
        return Err(cursor.error(
            ErrorType::TrailingInput,
            format!("unexpected input '{}'", cursor.rest.trim_end()),
        ));
    }

    Ok(ParsedLine {
        mnemonic,
        opcode,
        operands,
    })
}

/// Parse any operand by its syntax: `[..]`, `b N`, `w N` or a register name.
pub fn parse_operand(cursor: &mut Cursor<'_>) -> Result<Operand, AssemblerError> {
    match cursor.peek() {
        Some('[') => parse_memory(cursor).map(Operand::Memory),
        Some('b') if cursor.is_immediate_prefix() => {
            cursor.advance(1);
            cursor.skip_spaces();
            let value = parse_decimal(cursor, u8::MAX as u32)?;
            Ok(Operand::Imm8(value as u8))
        }
        Some('w') if cursor.is_immediate_prefix() => {
            cursor.advance(1);
            cursor.skip_spaces();
            let value = parse_decimal(cursor, u16::MAX as u32)?;
            Ok(Operand::Imm16(value as u16))
        }
        _ => parse_register(cursor).map(Operand::Register),
    }
}

/// Match the longest register name that prefixes the input.
pub fn parse_register(cursor: &mut Cursor<'_>) -> Result<u8, AssemblerError> {
    let mut best: Option<(&str, u8)> = None;
    for &(name, reg) in REGISTER_NAMES.iter() {
        let longer = best.map_or(true, |(found, _)| name.len() > found.len());
        if longer && cursor.rest.starts_with(name) {
            best = Some((name, reg as u8));
        }
    }

    match best {
        Some((name, index)) => {
            cursor.advance(name.len());
            Ok(index)
        }
        None => {
            let word = cursor
                .rest
                .split(|c: char| c.is_whitespace() || matches!(c, ',' | ']' | '+' | '-'))
                .next()
                .unwrap_or_default();
            Err(cursor.error(
                ErrorType::UnknownRegister,
                format!("unknown register '{}'", word),
            ))
        }
    }
}

/// Parse an unsigned decimal no larger than `max`.
pub fn parse_decimal(cursor: &mut Cursor<'_>, max: u32) -> Result<u32, AssemblerError> {
    let column = cursor.column();
    let digits = cursor.take_while(|c| c.is_ascii_digit());
    if digits.is_empty() {
        return Err(cursor.error(ErrorType::InvalidImmediate, "expected a decimal number"));
    }

    match digits.parse::<u32>() {
        Ok(value) if value <= max => Ok(value),
        _ => Err(AssemblerError::new(
            ErrorType::InvalidImmediate,
            column,
            format!("{} does not fit in {} bits", digits, 32 - max.leading_zeros()),
        )),
    }
}

const RELATIVE_BASES: [&str; 4] = ["pc", "sp", "pt", "it"];

/// `[ bank: form ]`. The bank prefix only selects the bank of the absolute
/// form; relative and indexed forms accept it and ignore it.
fn parse_memory(cursor: &mut Cursor<'_>) -> Result<MemoryOperand, AssemblerError> {
    cursor.advance(1);
    cursor.skip_spaces();
    let bank = parse_bank_prefix(cursor)?;

    let operand = if let Some(base) = RELATIVE_BASES
        .iter()
        .copied()
        .find(|base| cursor.starts_with_then_sign(base))
    {
        cursor.advance(base.len());
        let negative = parse_sign(cursor)?;
        let source = parse_source(cursor)?;
        match base {
            "pc" => MemoryOperand::pc_relative(negative, source),
            "sp" => MemoryOperand::sp_relative(negative, source),
            "pt" => {
                reject_negative(cursor, negative, "pt")?;
                MemoryOperand::page_table(source)
            }
            _ => {
                reject_negative(cursor, negative, "it")?;
                MemoryOperand::interrupt_table(source)
            }
        }
    } else if let Some(index) = cursor.index_register() {
        let column = cursor.column();
        if index > 7 {
            return Err(cursor.error(
                ErrorType::UnknownRegister,
                format!("index register r{} does not exist", index),
            ));
        }
        cursor.advance(2);
        let negative = parse_sign(cursor)?;
        if negative {
            return Err(AssemblerError::new(
                ErrorType::InvalidOffsetSign,
                column,
                "indexed operands only take '+'",
            ));
        }
        MemoryOperand::indexed(index, parse_source(cursor)?)
    } else {
        MemoryOperand::absolute(bank.unwrap_or(0), parse_source(cursor)?)
    };

    cursor.skip_spaces();
    if !cursor.eat(']') {
        return Err(cursor.error(ErrorType::InvalidMemoryOperand, "expected ']'"));
    }
    Ok(operand)
}

/// Optional `N:` prefix, at most 15.
fn parse_bank_prefix(cursor: &mut Cursor<'_>) -> Result<Option<u8>, AssemblerError> {
    let mut ahead = *cursor;
    let column = ahead.column();
    let digits = ahead.take_while(|c| c.is_ascii_digit());
    ahead.skip_spaces();
    if digits.is_empty() || !ahead.eat(':') {
        return Ok(None);
    }

    match digits.parse::<u8>() {
        Ok(bank) if bank <= 15 => {
            ahead.skip_spaces();
            *cursor = ahead;
            Ok(Some(bank))
        }
        _ => Err(AssemblerError::new(
            ErrorType::InvalidMemoryOperand,
            column,
            format!("bank {} is out of range (0-15)", digits),
        )),
    }
}

fn parse_source(cursor: &mut Cursor<'_>) -> Result<MemorySource, AssemblerError> {
    cursor.skip_spaces();
    match cursor.peek() {
        Some(c) if c.is_ascii_digit() => {
            let value = parse_decimal(cursor, u16::MAX as u32)?;
            Ok(MemorySource::Immediate(value as u16))
        }
        Some(_) => parse_register(cursor).map(MemorySource::Register),
        None => Err(cursor.error(ErrorType::InvalidMemoryOperand, "missing address source")),
    }
}

/// Consumes `+` or `-` (with surrounding spaces); true for `-`.
fn parse_sign(cursor: &mut Cursor<'_>) -> Result<bool, AssemblerError> {
    cursor.skip_spaces();
    let negative = if cursor.eat('+') {
        false
    } else if cursor.eat('-') {
        true
    } else {
        return Err(cursor.error(ErrorType::InvalidMemoryOperand, "expected '+' or '-'"));
    };
    cursor.skip_spaces();
    Ok(negative)
}

fn reject_negative(cursor: &Cursor<'_>, negative: bool, base: &str) -> Result<(), AssemblerError> {
    if negative {
        return Err(cursor.error(
            ErrorType::InvalidOffsetSign,
            format!("'{}' operands only take '+'", base),
        ));
    }
    Ok(())
}

/// Remaining-input cursor over one source line.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    line: &'a str,
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { line, rest: line }
    }

    /// Byte column of the next unread character.
    pub fn column(&self) -> usize {
        self.line.len() - self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn advance(&mut self, bytes: usize) {
        self.rest = &self.rest[bytes..];
    }

    fn eat(&mut self, expected: char) -> bool {
        match self.rest.strip_prefix(expected) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map_or(self.rest.len(), |(at, _)| at);
        let (taken, rest) = self.rest.split_at(end);
        self.rest = rest;
        taken
    }

    fn skip_spaces(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn skip_separators(&mut self) {
        self.rest = self
            .rest
            .trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }

    /// After an operand only a separator or the end of the line may follow.
    fn expect_operand_end(&self) -> Result<(), AssemblerError> {
        match self.peek() {
            None => Ok(()),
            Some(c) if c.is_whitespace() || c == ',' => Ok(()),
            Some(c) => Err(self.error(
                ErrorType::TrailingInput,
                format!("unexpected '{}' after operand", c),
            )),
        }
    }

    /// `b`/`w` followed by optional spaces and a digit.
    fn is_immediate_prefix(&self) -> bool {
        self.rest[1..]
            .trim_start()
            .starts_with(|c: char| c.is_ascii_digit())
    }

    /// `word` followed by optional spaces and a sign.
    fn starts_with_then_sign(&self, word: &str) -> bool {
        self.rest
            .strip_prefix(word)
            .map(str::trim_start)
            .is_some_and(|after| after.starts_with(['+', '-']))
    }

    /// `r<digit>` followed by optional spaces and a sign.
    fn index_register(&self) -> Option<u8> {
        let mut chars = self.rest.chars();
        if chars.next() != Some('r') {
            return None;
        }
        let digit = chars.next()?.to_digit(10)?;
        self.starts_with_then_sign(&self.rest[..2])
            .then_some(digit as u8)
    }

    fn error(&self, error_type: ErrorType, message: impl Into<String>) -> AssemblerError {
        AssemblerError::new(error_type, self.column(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::AddressingMode;

    fn operand(text: &str) -> Result<Operand, AssemblerError> {
        parse_operand(&mut Cursor::new(text))
    }

    fn memory(text: &str) -> MemoryOperand {
        match operand(text).unwrap() {
            Operand::Memory(mem) => mem,
            other => panic!("expected memory operand, got {:?}", other),
        }
    }

    #[test]
    fn test_register_longest_match() {
        assert_eq!(operand("pcb").unwrap(), Operand::Register(0x0B));
        assert_eq!(operand("pcp").unwrap(), Operand::Register(0x00));
        assert_eq!(operand("mmue").unwrap(), Operand::Register(0x06));
        assert_eq!(operand("inte").unwrap(), Operand::Register(0x09));
    }

    #[test]
    fn test_bp_is_a_register() {
        assert_eq!(operand("bp").unwrap(), Operand::Register(0x02));
        assert_eq!(operand("b 12").unwrap(), Operand::Imm8(12));
        assert_eq!(operand("b12").unwrap(), Operand::Imm8(12));
    }

    #[test]
    fn test_immediate_ranges() {
        assert_eq!(operand("w 65535").unwrap(), Operand::Imm16(65535));
        assert_eq!(
            operand("b 256").unwrap_err().error_type,
            ErrorType::InvalidImmediate
        );
        assert_eq!(
            operand("w 99999999999").unwrap_err().error_type,
            ErrorType::InvalidImmediate
        );
    }

    #[test]
    fn test_unknown_register() {
        let err = operand("q7").unwrap_err();
        assert_eq!(err.error_type, ErrorType::UnknownRegister);
        assert_eq!(err.message, "unknown register 'q7'");
    }

    #[test]
    fn test_absolute_forms() {
        assert_eq!(
            memory("[4096]"),
            MemoryOperand::absolute(0, MemorySource::Immediate(4096))
        );
        assert_eq!(
            memory("[ 2 : 16 ]"),
            MemoryOperand::absolute(2, MemorySource::Immediate(16))
        );
        assert_eq!(
            memory("[15: r3]"),
            MemoryOperand::absolute(15, MemorySource::Register(0x13))
        );
        assert_eq!(
            memory("[r0]"),
            MemoryOperand::absolute(0, MemorySource::Register(0x10))
        );
        assert_eq!(
            memory("[sp]"),
            MemoryOperand::absolute(0, MemorySource::Register(0x01))
        );
    }

    #[test]
    fn test_bank_prefix_before_any_form() {
        assert_eq!(memory("[3: pc + 4]"), memory("[pc + 4]"));
        assert_eq!(memory("[2: r1 + 4]"), memory("[r1 + 4]"));
        assert_eq!(memory("[9:it+1]"), memory("[it + 1]"));
        assert_eq!(
            memory("[4: 12]"),
            MemoryOperand::absolute(4, MemorySource::Immediate(12))
        );
    }

    #[test]
    fn test_relative_forms() {
        let pc = memory("[pc - 8]");
        assert_eq!(pc.mode, AddressingMode::PcRelative);
        assert_eq!(pc.field, 1);

        assert_eq!(
            memory("[sp+r1]"),
            MemoryOperand::sp_relative(false, MemorySource::Register(0x11))
        );
        assert_eq!(
            memory("[pt + 3]"),
            MemoryOperand::page_table(MemorySource::Immediate(3))
        );
        assert_eq!(
            memory("[it + 6]"),
            MemoryOperand::interrupt_table(MemorySource::Immediate(6))
        );
        assert_eq!(
            memory("[r5 + 100]"),
            MemoryOperand::indexed(5, MemorySource::Immediate(100))
        );
    }

    #[test]
    fn test_memory_errors() {
        let kind = |text: &str| operand(text).unwrap_err().error_type;

        assert_eq!(kind("[16: 0]"), ErrorType::InvalidMemoryOperand);
        assert_eq!(kind("[pt - 1]"), ErrorType::InvalidOffsetSign);
        assert_eq!(kind("[it - 1]"), ErrorType::InvalidOffsetSign);
        assert_eq!(kind("[r2 - 1]"), ErrorType::InvalidOffsetSign);
        assert_eq!(kind("[r8 + 1]"), ErrorType::UnknownRegister);
        assert_eq!(kind("[12"), ErrorType::InvalidMemoryOperand);
        assert_eq!(kind("[pcb + 1]"), ErrorType::InvalidMemoryOperand);
        assert_eq!(kind("[]"), ErrorType::UnknownRegister);
        assert_eq!(kind("[70000]"), ErrorType::InvalidImmediate);
    }

    #[test]
    fn test_parse_line_separators() {
        let a = parse_line("sto.w [sp + 2], r1").unwrap();
        let b = parse_line("  sto.w [sp + 2] r1 ; comment").unwrap();
        assert_eq!(a.operands, b.operands);
        assert_eq!(a.mnemonic, "sto.w");
    }

    #[test]
    fn test_parse_line_errors() {
        let kind = |text: &str| parse_line(text).unwrap_err().error_type;

        assert_eq!(kind(""), ErrorType::UnknownMnemonic);
        assert_eq!(kind("ADD r0, r1"), ErrorType::UnknownMnemonic);
        assert_eq!(kind("add r0"), ErrorType::OperandMismatch);
        assert_eq!(kind("add r0, b 1"), ErrorType::OperandMismatch);
        assert_eq!(kind("nop r0"), ErrorType::TrailingInput);
        assert_eq!(kind("clr r10"), ErrorType::TrailingInput);
    }
}
