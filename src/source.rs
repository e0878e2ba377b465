use crate::error::AsmError;

/// One line of assembly source after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    Comment,
    Label(&'a str),
    Instr(Instr<'a>),
}

/// An instruction line with any trailing `#` comment removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instr<'a> {
    pub text: &'a str,
    pub mnemonic: &'a str,
    pub operands: Vec<&'a str>,
}

/// Splits `mnemonic op, op, op` on commas and whitespace.
pub fn split_instr(text: &str) -> Result<Instr<'_>, AsmError> {
    let mut tokens = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty());
    let mnemonic = tokens.next().ok_or(AsmError::MalformedLine { reason: "missing mnemonic" })?;
    Ok(Instr { text, mnemonic, operands: tokens.collect() })
}

pub fn classify(raw: &str) -> Result<Line<'_>, AsmError> {
    let line = raw.trim();
    if line.is_empty() {
        return Ok(Line::Blank);
    }
    if line.starts_with('#') {
        return Ok(Line::Comment);
    }
    let code = match line.find('#') {
        Some(p) => line[..p].trim_end(),
        None => line,
    };
    if let Some(name) = code.strip_suffix(':') {
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(AsmError::MalformedLine { reason: "bad label name" });
        }
        return Ok(Line::Label(name));
    }
    split_instr(code).map(Line::Instr)
}
