use tracing::{debug, info};

use crate::encoder::Encoder;
use crate::error::LineError;
use crate::isa::mips::{Isa, Mnemonic, Pseudo};
use crate::isa::regs::Reg;
use crate::labels::{self, LabelTable};
use crate::listing::Encoded;
use crate::source::{self, Line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsmConfig {
    /// Register clobbered by the `blt`/`bgt`/`ble`/`bge` lowering.
    pub scratch: Reg,
    /// Slot address of the first instruction.
    pub origin: u32,
}

impl Default for AsmConfig {
    fn default() -> Self {
        Self { scratch: Reg::T9, origin: 0 }
    }
}

/// Output of a successful assembly run.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub labels: LabelTable,
    pub words: Vec<Encoded>,
}

#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    isa: &'a Isa,
    cfg: AsmConfig,
}

impl<'a> Assembler<'a> {
    pub fn new(isa: &'a Isa, cfg: AsmConfig) -> Self {
        Self { isa, cfg }
    }

    /// Two passes over `text`: label resolution, then encoding.
    ///
    /// Stops at the first bad line.
    pub fn assemble(&self, text: &str) -> Result<Assembly, LineError> {
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, raw)| {
                source::classify(raw)
                    .map(|line| (i + 1, line))
                    .map_err(|e| LineError::new(i + 1, raw.trim(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let labels = labels::resolve(self.isa, lines.iter().map(|(n, l)| (*n, l)), self.cfg.origin)?;
        let encoder = Encoder::new(self.isa, &labels, self.cfg.scratch);

        let mut words = Vec::new();
        let mut address = self.cfg.origin;
        for (number, line) in &lines {
            let Line::Instr(instr) = line else { continue };
            // The branch half of a compare-and-branch sits one slot after the
            // compare, so its offset is taken from there. The counter still
            // advances by one below; this only holds while the lowering emits
            // exactly one extra word, placed before the branch.
            let at_line = |e| LineError::new(*number, instr.text, e);
            if let Some(Mnemonic::Pseudo(Pseudo::CmpBranch(_))) = self.isa.mnemonic(instr.mnemonic) {
                address = labels::advance(address, 1).map_err(at_line)?;
            }
            let encoded = encoder
                .encode(instr.mnemonic, &instr.operands, address)
                .map_err(at_line)?;
            for word in encoded {
                debug!(line = number, address, hex = %word.hex(), "{}", instr.text);
                words.push(Encoded { source: instr.text.to_string(), word });
            }
            address = labels::advance(address, 1).map_err(at_line)?;
        }
        info!(labels = labels.len(), words = words.len(), "assembled");
        Ok(Assembly { labels, words })
    }
}
