use std::fmt;

use num_traits::Num;
use serde::Serialize;

use crate::error::AsmError;
use crate::isa::mips::{field, Cond, Form, Format, InsnDesc, Isa, Mnemonic, Pseudo};
use crate::isa::regs::Reg;
use crate::labels::LabelTable;

/// One 32-bit machine word together with the layout it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Word {
    pub raw: u32,
    pub format: Format,
}

impl Word {
    pub const NOP: Word = Word { raw: 0, format: Format::Nop };

    pub fn r(opcode: u8, rs: Reg, rt: Reg, rd: Reg, shamt: u32, funct: u8) -> Self {
        let raw = ((opcode as u32) << field::OPCODE_SHIFT)
            | ((rs.id() as u32) << field::RS_SHIFT)
            | ((rt.id() as u32) << field::RT_SHIFT)
            | ((rd.id() as u32) << field::RD_SHIFT)
            | ((shamt & field::REG_MASK) << field::SHAMT_SHIFT)
            | (funct as u32 & field::FUNCT_MASK);
        Self { raw, format: Format::R }
    }

    pub fn i(opcode: u8, rs: Reg, rt: Reg, imm: u32) -> Self {
        let raw = ((opcode as u32) << field::OPCODE_SHIFT)
            | ((rs.id() as u32) << field::RS_SHIFT)
            | ((rt.id() as u32) << field::RT_SHIFT)
            | (imm & field::IMM_MASK);
        Self { raw, format: Format::I }
    }

    pub fn j(opcode: u8, addr: u32) -> Self {
        let raw = ((opcode as u32) << field::OPCODE_SHIFT) | (addr & field::ADDR_MASK);
        Self { raw, format: Format::J }
    }

    /// Binary content split at field boundaries, e.g. `000000_00010_00011_00001_00000_100000`.
    pub fn fields(&self) -> String {
        let w = self.raw;
        match self.format {
            Format::R => format!(
                "{:06b}_{:05b}_{:05b}_{:05b}_{:05b}_{:06b}",
                w >> 26,
                (w >> 21) & 0x1F,
                (w >> 16) & 0x1F,
                (w >> 11) & 0x1F,
                (w >> 6) & 0x1F,
                w & 0x3F
            ),
            Format::I => format!(
                "{:06b}_{:05b}_{:05b}_{:016b}",
                w >> 26,
                (w >> 21) & 0x1F,
                (w >> 16) & 0x1F,
                w & 0xFFFF
            ),
            Format::J => format!("{:06b}_{:026b}", w >> 26, w & field::ADDR_MASK),
            Format::Nop => format!("{w:032b}"),
        }
    }

    pub fn hex(&self) -> String {
        format!("{:08X}", self.raw)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binary: {}, hex: {}", self.fields(), self.hex())
    }
}

/// Parses a decimal or `0x` hexadecimal literal with an optional sign.
pub fn parse_int<T: Num + std::ops::Neg<Output = T>>(s: &str) -> Option<T> {
    let t = s.trim();
    let (neg, body) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    let (digits, radix) = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };
    // from_str_radix would take a second sign
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let value = T::from_str_radix(digits, radix).ok()?;
    Some(if neg { -value } else { value })
}

/// Turns one source instruction into machine words.
///
/// Holds only borrowed, immutable tables: encoding has no side effects.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'a> {
    isa: &'a Isa,
    labels: &'a LabelTable,
    scratch: Reg,
}

impl<'a> Encoder<'a> {
    pub fn new(isa: &'a Isa, labels: &'a LabelTable, scratch: Reg) -> Self {
        Self { isa, labels, scratch }
    }

    /// Encodes `mnemonic operands` located at slot `address`.
    ///
    /// Returns one word, or two for a lowered compare-and-branch. Both halves of
    /// that pair compute their branch offset from `address`, so the caller
    /// passes the slot of the branch word, not the compare word.
    pub fn encode(&self, mnemonic: &str, operands: &[&str], address: u32) -> Result<Vec<Word>, AsmError> {
        let kind = self
            .isa
            .mnemonic(mnemonic)
            .ok_or_else(|| AsmError::UnknownMnemonic { mnemonic: mnemonic.to_string() })?;
        match kind {
            Mnemonic::Native(desc) => Ok(vec![self.native(desc, operands, address)?]),
            Mnemonic::Pseudo(p) => self.pseudo(p, operands, address),
        }
    }

    fn native(&self, desc: &InsnDesc, ops: &[&str], address: u32) -> Result<Word, AsmError> {
        let funct = desc.funct.unwrap_or(0);
        let word = match desc.form {
            Form::Arith => {
                let [rd, rs, rt] = arity::<3>(ops)?;
                Word::r(desc.opcode, self.reg(rs)?, self.reg(rt)?, self.reg(rd)?, 0, funct)
            }
            Form::ShiftImm => {
                let [rd, rt, sa] = arity::<3>(ops)?;
                let shamt = parse_int::<i64>(sa)
                    .ok_or_else(|| AsmError::operand(sa, "expected shift amount"))?;
                if !(0..32).contains(&shamt) {
                    return Err(AsmError::operand(sa, "shift amount out of range 0..31"));
                }
                Word::r(desc.opcode, Reg::ZERO, self.reg(rt)?, self.reg(rd)?, shamt as u32, funct)
            }
            Form::ShiftVar => {
                let [rd, rt, rs] = arity::<3>(ops)?;
                Word::r(desc.opcode, self.reg(rs)?, self.reg(rt)?, self.reg(rd)?, 0, funct)
            }
            Form::JumpReg => {
                let [rs] = arity::<1>(ops)?;
                Word::r(desc.opcode, self.reg(rs)?, Reg::ZERO, Reg::ZERO, 0, funct)
            }
            Form::ArithImm => {
                let [rt, rs, imm] = arity::<3>(ops)?;
                Word::i(desc.opcode, self.reg(rs)?, self.reg(rt)?, self.imm(imm)?)
            }
            Form::Load | Form::Store => {
                let [rt, mem] = arity::<2>(ops)?;
                let (offset, base) = self.mem(mem)?;
                Word::i(desc.opcode, base, self.reg(rt)?, offset)
            }
            Form::Branch => {
                let [rs, rt, target] = arity::<3>(ops)?;
                let offset = self.target(target)? as i64 - address as i64;
                Word::i(desc.opcode, self.reg(rs)?, self.reg(rt)?, offset as u32)
            }
            Form::Jump | Form::JumpLink => {
                let [target] = arity::<1>(ops)?;
                let addr = self.target(target)?;
                if addr > field::ADDR_MASK {
                    return Err(AsmError::operand(target, "jump target exceeds 26 bits"));
                }
                Word::j(desc.opcode, addr)
            }
        };
        Ok(word)
    }

    fn pseudo(&self, p: Pseudo, ops: &[&str], address: u32) -> Result<Vec<Word>, AsmError> {
        let words = match p {
            Pseudo::Nop => {
                arity::<0>(ops)?;
                vec![Word::NOP]
            }
            Pseudo::Move => {
                let [d, s] = arity::<2>(ops)?;
                vec![self.native(self.primitive("add")?, &[d, s, "$0"], address)?]
            }
            Pseudo::Li => {
                let [d, imm] = arity::<2>(ops)?;
                vec![self.native(self.primitive("addi")?, &[d, "$0", imm], address)?]
            }
            Pseudo::Sgt => {
                let [d, a, b] = arity::<3>(ops)?;
                vec![self.native(self.primitive("slt")?, &[d, b, a], address)?]
            }
            Pseudo::CmpBranch(cond) => {
                let [a, b, label] = arity::<3>(ops)?;
                let (lhs, rhs) = match cond {
                    Cond::Lt | Cond::Ge => (a, b),
                    Cond::Gt | Cond::Le => (b, a),
                };
                let branch = match cond {
                    Cond::Lt | Cond::Gt => "bne",
                    Cond::Le | Cond::Ge => "beq",
                };
                let scratch = self.scratch.to_string();
                let cmp = self.native(self.primitive("slt")?, &[scratch.as_str(), lhs, rhs], address)?;
                let br = self.native(self.primitive(branch)?, &[scratch.as_str(), "$0", label], address)?;
                vec![cmp, br]
            }
        };
        Ok(words)
    }

    fn primitive(&self, name: &str) -> Result<&'static InsnDesc, AsmError> {
        self.isa
            .native(name)
            .ok_or_else(|| AsmError::UnknownMnemonic { mnemonic: name.to_string() })
    }

    fn reg(&self, op: &str) -> Result<Reg, AsmError> {
        self.isa
            .registers()
            .get(op)
            .ok_or_else(|| AsmError::operand(op, "unknown register"))
    }

    /// Any integer literal, truncated to 16 bits.
    fn imm(&self, op: &str) -> Result<u32, AsmError> {
        parse_int::<i64>(op)
            .map(|v| (v as u32) & field::IMM_MASK)
            .ok_or_else(|| AsmError::operand(op, "expected integer immediate"))
    }

    /// `offset(base)`; an empty offset means zero.
    fn mem(&self, op: &str) -> Result<(u32, Reg), AsmError> {
        let (offset, rest) = op
            .split_once('(')
            .ok_or_else(|| AsmError::operand(op, "expected offset(base)"))?;
        let base = rest
            .strip_suffix(')')
            .ok_or_else(|| AsmError::operand(op, "expected offset(base)"))?;
        let offset = if offset.trim().is_empty() { 0 } else { self.imm(offset)? };
        Ok((offset, self.reg(base)?))
    }

    /// A label, or else a literal slot address.
    fn target(&self, op: &str) -> Result<u32, AsmError> {
        if let Some(slot) = self.labels.get(op) {
            return Ok(slot);
        }
        match parse_int::<i64>(op) {
            Some(v) if v >= 0 => Ok(v as u32),
            Some(_) => Err(AsmError::operand(op, "negative target address")),
            None => self.labels.resolve(op),
        }
    }
}

fn arity<'o, const N: usize>(ops: &[&'o str]) -> Result<[&'o str; N], AsmError> {
    ops.try_into().map_err(|_| AsmError::InvalidOperand {
        operand: ops.join(", "),
        reason: match N {
            0 => "expected no operands",
            1 => "expected 1 operand",
            2 => "expected 2 operands",
            _ => "expected 3 operands",
        },
    })
}
