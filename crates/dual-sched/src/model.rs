use anyhow::{Context, Result};
use std::path::Path;

use dual_issue::{listing, AsmConfig, Assembler, Isa, Program};

/// Reads an assembler listing and decodes every entry from its `hex:` field.
pub fn load_listing(path: &Path, isa: &Isa) -> Result<Program> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let program = Program::from_listing(isa, &text).with_context(|| format!("parsing {}", path.display()))?;
    anyhow::ensure!(!program.entries.is_empty(), "no instructions found in {}", path.display());
    Ok(program)
}

/// Assembles `source`, writes the listing to `listing_out`, and returns the
/// program decoded back from that listing text.
pub fn assemble_file(source: &Path, listing_out: &Path, isa: &Isa, cfg: AsmConfig) -> Result<Program> {
    let text = std::fs::read_to_string(source).with_context(|| format!("reading {}", source.display()))?;
    let asm = Assembler::new(isa, cfg).assemble(&text)?;
    let rendered = listing::render(&asm.words);
    std::fs::write(listing_out, &rendered).with_context(|| format!("writing {}", listing_out.display()))?;
    Ok(Program::from_listing(isa, &rendered)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_listing_and_skips_blank_lines() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_listing.txt");
        std::fs::write(
            &path,
            "add $1, $2, $3 --> [ binary: 000000_00010_00011_00001_00000_100000, hex: 00430820 ]\n\n\
             nop --> [ binary: 00000000000000000000000000000000, hex: 00000000 ]\n",
        )
        .unwrap();
        let program = load_listing(&path, &Isa::new()).unwrap();
        assert_eq!(program.entries.len(), 2);
        assert_eq!(program.entries[0].raw, 0x0043_0820);
        assert!(program.decoded[1].is_nop());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_listing_is_an_error() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_empty_listing.txt");
        std::fs::write(&path, "\n\n").unwrap();
        assert!(load_listing(&path, &Isa::new()).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
