use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{AsmError, LineError};
use crate::isa::mips::Isa;
use crate::source::Line;

/// Label name to instruction-slot address. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    slots: HashMap<String, u32>,
}

impl LabelTable {
    pub fn get(&self, label: &str) -> Option<u32> {
        self.slots.get(label).copied()
    }

    pub fn resolve(&self, label: &str) -> Result<u32, AsmError> {
        self.get(label).ok_or_else(|| AsmError::UndefinedLabel { label: label.to_string() })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Moves the slot counter `by` slots forward.
pub(crate) fn advance(slot: u32, by: u32) -> Result<u32, AsmError> {
    slot.checked_add(by)
        .ok_or(AsmError::MalformedLine { reason: "slot address overflows 32 bits, origin too high" })
}

/// Single forward pass binding each label to the slot counter at its position.
///
/// Takes `(line number, line)` pairs. Labels, blank lines and comments do not
/// advance the counter. A lowered compare-and-branch advances it by two, every
/// other instruction by one; mnemonics the table does not know count as one
/// slot and fail later in the encoder. The counter must stay within `u32`
/// past the last instruction.
pub fn resolve<'a, 'src: 'a, I>(isa: &Isa, lines: I, origin: u32) -> Result<LabelTable, LineError>
where
    I: IntoIterator<Item = (usize, &'a Line<'src>)>,
{
    let mut table = LabelTable::default();
    let mut slot = origin;
    for (number, line) in lines {
        match line {
            Line::Blank | Line::Comment => {}
            Line::Label(name) => {
                debug!(label = %name, slot, "bind label");
                if let Some(prev) = table.slots.insert(name.to_string(), slot) {
                    warn!(label = %name, prev, slot, "label redefined, later definition wins");
                }
            }
            Line::Instr(instr) => {
                let width = isa.mnemonic(instr.mnemonic).map_or(1, |m| m.slots());
                slot = advance(slot, width).map_err(|e| LineError::new(number, instr.text, e))?;
            }
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::classify;

    fn table(src: &str) -> LabelTable {
        let isa = Isa::new();
        let lines: Vec<Line> = src.lines().map(|l| classify(l).unwrap()).collect();
        resolve(&isa, lines.iter().enumerate().map(|(i, l)| (i + 1, l)), 0).unwrap()
    }

    #[test]
    fn labels_bind_current_slot() {
        let t = table(
            "start:\n\
             # comment\n\
             \n\
             add $1, $2, $3\n\
             mid:\n\
             blt $1, $2, start\n\
             sw $1, 0($2) # trailing\n\
             end:\n",
        );
        assert_eq!(t.get("start"), Some(0));
        assert_eq!(t.get("mid"), Some(1));
        assert_eq!(t.get("end"), Some(4));
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn missing_label_is_reported() {
        let t = table("a:\nnop\n");
        assert_eq!(
            t.resolve("b"),
            Err(AsmError::UndefinedLabel { label: "b".into() })
        );
    }

    #[test]
    fn slot_counter_overflow_names_the_line() {
        let isa = Isa::new();
        let lines: Vec<Line> = ["top:", "add $1, $2, $3", "blt $1, $2, top"]
            .iter()
            .map(|l| classify(l).unwrap())
            .collect();
        let numbered = || lines.iter().enumerate().map(|(i, l)| (i + 1, l));

        // two slots fit below u32::MAX + 1; the compare-and-branch does not
        let err = resolve(&isa, numbered(), u32::MAX - 2).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.text, "blt $1, $2, top");
        assert!(matches!(err.source, AsmError::MalformedLine { .. }));

        let t = resolve(&isa, numbered(), u32::MAX - 3).unwrap();
        assert_eq!(t.get("top"), Some(u32::MAX - 3));
    }
}
