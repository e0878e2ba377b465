use std::fmt;

use crate::decoder::Decoded;
use crate::isa::regs::Reg;

/// A register dependency between an earlier instruction `a` and a later `b`.
///
/// Write-after-write is not tracked: two writers of the same register may
/// share a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    /// `b` reads a register `a` writes.
    ReadAfterWrite(Reg),
    /// `b` writes a register `a` reads.
    WriteAfterRead(Reg),
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hazard::ReadAfterWrite(r) => write!(f, "read-after-write on {r}"),
            Hazard::WriteAfterRead(r) => write!(f, "write-after-read on {r}"),
        }
    }
}

pub fn hazard(a: &Decoded, b: &Decoded) -> Option<Hazard> {
    if let Some(r) = a.writes.first_common(&b.reads) {
        return Some(Hazard::ReadAfterWrite(r));
    }
    b.writes.first_common(&a.reads).map(Hazard::WriteAfterRead)
}

/// True when `a` and `b` may issue in the same packet.
pub fn co_issue_safe(a: &Decoded, b: &Decoded) -> bool {
    hazard(a, b).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{Decoder, MipsDecoder};
    use crate::isa::mips::Isa;

    fn dec(raw: u32) -> Decoded {
        MipsDecoder::new(&Isa::new()).decode(raw)
    }

    // add $1,$2,$3 / add $4,$1,$5 / add $2,$6,$7 / add $1,$6,$7
    const ADD_1_2_3: u32 = 0x0043_0820;
    const ADD_4_1_5: u32 = 0x0025_2020;
    const ADD_2_6_7: u32 = 0x00C7_1020;
    const ADD_1_6_7: u32 = 0x00C7_0820;

    #[test]
    fn read_after_write_detected() {
        let h = hazard(&dec(ADD_1_2_3), &dec(ADD_4_1_5));
        assert_eq!(h, Some(Hazard::ReadAfterWrite(Reg::new(1).unwrap())));
    }

    #[test]
    fn write_after_read_detected() {
        let h = hazard(&dec(ADD_1_2_3), &dec(ADD_2_6_7));
        assert_eq!(h, Some(Hazard::WriteAfterRead(Reg::new(2).unwrap())));
    }

    #[test]
    fn write_after_write_is_not_a_hazard() {
        assert!(co_issue_safe(&dec(ADD_1_2_3), &dec(ADD_1_6_7)));
    }

    #[test]
    fn nop_is_always_safe() {
        assert!(co_issue_safe(&dec(0), &dec(ADD_1_2_3)));
        assert!(co_issue_safe(&dec(ADD_4_1_5), &dec(0)));
    }
}
