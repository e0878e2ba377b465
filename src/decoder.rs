use serde::Serialize;

use crate::error::AsmError;
use crate::isa::mips::{field, Class, Form, Format, Isa, OP_SPECIAL};
use crate::isa::regs::{Reg, RegSet};
use crate::listing;

/// Register usage and fields recovered from a single machine word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub format: Format,
    pub opcode: u8,
    /// Only set for R-type words.
    pub funct: Option<u8>,
    /// `None` for the NOP word and for encodings outside the table.
    pub mnemonic: Option<&'static str>,
    /// Operand form used to derive `reads`/`writes`; `None` only for NOP.
    pub form: Option<Form>,
    pub rs: Reg,
    pub rt: Reg,
    pub rd: Reg,
    pub shamt: u8,
    pub imm: u16,
    pub target: u32,
    pub reads: RegSet,
    pub writes: RegSet,
}

impl Decoded {
    /// Branches, jumps and memory accesses; these may only issue in slot 2.
    pub fn is_special(&self) -> bool {
        self.form.map_or(false, |f| f.class().intersects(Class::SPECIAL))
    }

    pub fn is_nop(&self) -> bool {
        self.format == Format::Nop
    }

    /// The 16-bit immediate as a signed value.
    pub fn simm(&self) -> i16 {
        self.imm as i16
    }
}

pub trait Decoder {
    fn decode(&self, raw32: u32) -> Decoded;
}

/// Decoder driven by the shared instruction table. Total: every word decodes.
#[derive(Debug, Clone, Copy)]
pub struct MipsDecoder<'a> {
    isa: &'a Isa,
}

impl<'a> MipsDecoder<'a> {
    pub fn new(isa: &'a Isa) -> Self {
        Self { isa }
    }

    /// Decodes an 8-digit hexadecimal word as written in the listing's `hex:` field.
    pub fn decode_hex(&self, hex: &str) -> Result<Decoded, AsmError> {
        listing::parse_word(hex.trim()).map(|raw| self.decode(raw))
    }
}

impl Decoder for MipsDecoder<'_> {
    fn decode(&self, raw32: u32) -> Decoded {
        let opcode = field::opcode(raw32);
        let funct = field::funct(raw32);
        let rs = Reg::from_field(raw32 >> field::RS_SHIFT);
        let rt = Reg::from_field(raw32 >> field::RT_SHIFT);
        let rd = Reg::from_field(raw32 >> field::RD_SHIFT);
        let mut d = Decoded {
            format: Format::Nop,
            opcode,
            funct: None,
            mnemonic: None,
            form: None,
            rs,
            rt,
            rd,
            shamt: ((raw32 >> field::SHAMT_SHIFT) & field::REG_MASK) as u8,
            imm: (raw32 & field::IMM_MASK) as u16,
            target: raw32 & field::ADDR_MASK,
            reads: RegSet::new(),
            writes: RegSet::new(),
        };
        if raw32 == 0 {
            return d;
        }

        let desc = self.isa.by_encoding(opcode, funct);
        // Unknown encodings fall back to the generic register-register or
        // register-immediate usage.
        let form = match desc {
            Some(desc) => desc.form,
            None if opcode == OP_SPECIAL => Form::Arith,
            None => Form::ArithImm,
        };
        d.mnemonic = desc.map(|desc| desc.mnemonic);
        d.form = Some(form);
        d.format = form.format();
        if d.format == Format::R {
            d.funct = Some(funct);
        }

        let (reads, writes) = match form {
            Form::Arith | Form::ShiftVar => (regs([rs, rt]), regs([rd])),
            Form::ShiftImm => (regs([rt]), regs([rd])),
            Form::JumpReg => (regs([rs]), RegSet::new()),
            Form::ArithImm | Form::Load => (regs([rs]), regs([rt])),
            Form::Store | Form::Branch => (regs([rs, rt]), RegSet::new()),
            Form::Jump => (RegSet::new(), RegSet::new()),
            Form::JumpLink => (RegSet::new(), regs([Reg::RA])),
        };
        d.reads = reads;
        d.writes = writes;
        d
    }
}

fn regs<const N: usize>(ids: [Reg; N]) -> RegSet {
    ids.into_iter().collect()
}
