use thiserror::Error;

/// Failure kinds shared by the assembler and the scheduler front-end.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("undefined label `{label}`")]
    UndefinedLabel { label: String },
    #[error("unknown mnemonic `{mnemonic}`")]
    UnknownMnemonic { mnemonic: String },
    #[error("invalid operand `{operand}`: {reason}")]
    InvalidOperand { operand: String, reason: &'static str },
    #[error("malformed line: {reason}")]
    MalformedLine { reason: &'static str },
}

impl AsmError {
    pub(crate) fn operand(operand: &str, reason: &'static str) -> Self {
        AsmError::InvalidOperand { operand: operand.to_string(), reason }
    }
}

/// An [`AsmError`] pinned to the input line that raised it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: `{text}`: {source}")]
pub struct LineError {
    /// 1-based line number in the input text.
    pub line: usize,
    pub text: String,
    #[source]
    pub source: AsmError,
}

impl LineError {
    pub fn new(line: usize, text: &str, source: AsmError) -> Self {
        Self { line, text: text.to_string(), source }
    }
}
