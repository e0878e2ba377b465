//! The intermediate text artifact between assembler and scheduler.
//!
//! One line per machine word:
//! `<source> --> [ binary: <fields>, hex: <HEX> ]`

use std::fmt;

use serde::Serialize;

use crate::encoder::Word;
use crate::error::{AsmError, LineError};

/// Text used for a synthesized NOP slot.
pub const NOP_LINE: &str = "binary: 00000000000000000000000000000000, hex: 00000000";

/// A word emitted by the assembler, with the source text that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Encoded {
    pub source: String,
    pub word: Word,
}

impl fmt::Display for Encoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> [ {} ]", self.source, self.word)
    }
}

pub fn render(words: &[Encoded]) -> String {
    words.iter().map(|e| format!("{e}\n")).collect()
}

/// A listing line as the scheduler sees it: the full line text and its word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub line: String,
    pub raw: u32,
}

impl Entry {
    pub fn hex(&self) -> String {
        format!("{:08X}", self.raw)
    }
}

/// Reads one word written as exactly 8 hex digits.
pub fn parse_word(hex: &str) -> Result<u32, AsmError> {
    const BAD: AsmError = AsmError::MalformedLine { reason: "`hex:` field must be 8 hex digits" };
    if hex.len() != 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(BAD);
    }
    u32::from_str_radix(hex, 16).map_err(|_| BAD)
}

pub fn parse_entry(line: &str) -> Result<Entry, AsmError> {
    let line = line.trim();
    let (_, after) = line
        .split_once("hex:")
        .ok_or(AsmError::MalformedLine { reason: "missing `hex:` field" })?;
    let raw = parse_word(after.split_whitespace().next().unwrap_or(""))?;
    Ok(Entry { line: line.to_string(), raw })
}

/// Parses a whole listing. Blank lines are skipped; anything else must carry a word.
pub fn parse(text: &str) -> Result<Vec<Entry>, LineError> {
    text.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| parse_entry(l).map_err(|e| LineError::new(i + 1, l.trim(), e)))
        .collect()
}
