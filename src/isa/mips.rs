//! Instruction formats for the supported MIPS subset.
//!
//! The encoder and the decoder both consult [`TABLE`], so the opcode/funct
//! assignments and the register usage of each operand form live in one place.

use std::collections::HashMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::regs::RegisterTable;

/// Machine word layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// opcode(6) | rs(5) | rt(5) | rd(5) | shamt(5) | funct(6)
    R,
    /// opcode(6) | rs(5) | rt(5) | imm(16)
    I,
    /// opcode(6) | address(26)
    J,
    /// The all-zero word.
    Nop,
}

/// Assembly operand shape, which also fixes which registers are read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Form {
    /// `op rd, rs, rt`
    Arith,
    /// `op rd, rt, shamt`
    ShiftImm,
    /// `op rd, rt, rs`
    ShiftVar,
    /// `jr rs`
    JumpReg,
    /// `op rt, rs, imm`
    ArithImm,
    /// `lw rt, off(rs)`
    Load,
    /// `sw rt, off(rs)`
    Store,
    /// `op rs, rt, target`
    Branch,
    /// `j target`
    Jump,
    /// `jal target`, links through `$31`
    JumpLink,
}

impl Form {
    pub fn format(self) -> Format {
        match self {
            Form::Arith | Form::ShiftImm | Form::ShiftVar | Form::JumpReg => Format::R,
            Form::ArithImm | Form::Load | Form::Store | Form::Branch => Format::I,
            Form::Jump | Form::JumpLink => Format::J,
        }
    }

    pub fn class(self) -> Class {
        match self {
            Form::Load | Form::Store => Class::MEMORY,
            Form::Branch => Class::BRANCH,
            Form::Jump | Form::JumpLink => Class::JUMP,
            _ => Class::empty(),
        }
    }
}

bitflags! {
    /// Scheduling class of an opcode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Class: u8 {
        const MEMORY = 1 << 0;
        const BRANCH = 1 << 1;
        const JUMP = 1 << 2;
        /// Restricted to the second issue slot.
        const SPECIAL = Self::MEMORY.bits() | Self::BRANCH.bits() | Self::JUMP.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsnDesc {
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub funct: Option<u8>,
    pub form: Form,
}

impl InsnDesc {
    pub fn format(&self) -> Format {
        self.form.format()
    }

    pub fn is_special(&self) -> bool {
        self.form.class().intersects(Class::SPECIAL)
    }
}

pub const OP_SPECIAL: u8 = 0x00;
pub const OP_J: u8 = 0x02;
pub const OP_JAL: u8 = 0x03;
pub const OP_BEQ: u8 = 0x04;
pub const OP_BNE: u8 = 0x05;
pub const OP_LW: u8 = 0x23;
pub const OP_SW: u8 = 0x2B;

const fn r(mnemonic: &'static str, funct: u8, form: Form) -> InsnDesc {
    InsnDesc { mnemonic, opcode: OP_SPECIAL, funct: Some(funct), form }
}

const fn i(mnemonic: &'static str, opcode: u8, form: Form) -> InsnDesc {
    InsnDesc { mnemonic, opcode, funct: None, form }
}

pub const TABLE: &[InsnDesc] = &[
    r("add", 0x20, Form::Arith),
    r("addu", 0x21, Form::Arith),
    r("sub", 0x22, Form::Arith),
    r("subu", 0x23, Form::Arith),
    r("and", 0x24, Form::Arith),
    r("or", 0x25, Form::Arith),
    r("xor", 0x26, Form::Arith),
    r("nor", 0x27, Form::Arith),
    r("slt", 0x2A, Form::Arith),
    r("sltu", 0x2B, Form::Arith),
    r("sll", 0x00, Form::ShiftImm),
    r("srl", 0x02, Form::ShiftImm),
    r("sra", 0x03, Form::ShiftImm),
    r("sllv", 0x04, Form::ShiftVar),
    r("srlv", 0x06, Form::ShiftVar),
    r("srav", 0x07, Form::ShiftVar),
    r("jr", 0x08, Form::JumpReg),
    i("addi", 0x08, Form::ArithImm),
    i("addiu", 0x09, Form::ArithImm),
    i("slti", 0x0A, Form::ArithImm),
    i("sltiu", 0x0B, Form::ArithImm),
    i("andi", 0x0C, Form::ArithImm),
    i("ori", 0x0D, Form::ArithImm),
    i("xori", 0x0E, Form::ArithImm),
    i("lw", OP_LW, Form::Load),
    i("sw", OP_SW, Form::Store),
    i("beq", OP_BEQ, Form::Branch),
    i("bne", OP_BNE, Form::Branch),
    i("j", OP_J, Form::Jump),
    i("jal", OP_JAL, Form::JumpLink),
];

/// Condition of a lowered compare-and-branch pseudo-instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pseudo {
    Nop,
    /// `move d, s` => `add d, s, $0`
    Move,
    /// `li d, imm` => `addi d, $0, imm`
    Li,
    /// `sgt d, a, b` => `slt d, b, a`
    Sgt,
    /// `slt` into the scratch register, then `bne`/`beq` against `$0`.
    CmpBranch(Cond),
}

impl Pseudo {
    /// Instruction slots the lowered form occupies.
    pub fn slots(self) -> u32 {
        match self {
            Pseudo::CmpBranch(_) => 2,
            _ => 1,
        }
    }
}

const PSEUDOS: &[(&str, Pseudo)] = &[
    ("nop", Pseudo::Nop),
    ("move", Pseudo::Move),
    ("li", Pseudo::Li),
    ("sgt", Pseudo::Sgt),
    ("blt", Pseudo::CmpBranch(Cond::Lt)),
    ("bgt", Pseudo::CmpBranch(Cond::Gt)),
    ("ble", Pseudo::CmpBranch(Cond::Le)),
    ("bge", Pseudo::CmpBranch(Cond::Ge)),
];

/// What an assembly mnemonic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Native(&'static InsnDesc),
    Pseudo(Pseudo),
}

impl Mnemonic {
    pub fn slots(self) -> u32 {
        match self {
            Mnemonic::Native(_) => 1,
            Mnemonic::Pseudo(p) => p.slots(),
        }
    }
}

/// Immutable lookup tables, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct Isa {
    mnemonics: HashMap<&'static str, Mnemonic>,
    by_funct: HashMap<u8, &'static InsnDesc>,
    by_opcode: HashMap<u8, &'static InsnDesc>,
    registers: RegisterTable,
}

impl Isa {
    pub fn new() -> Self {
        let mut mnemonics = HashMap::with_capacity(TABLE.len() + PSEUDOS.len());
        let mut by_funct = HashMap::new();
        let mut by_opcode = HashMap::new();
        for desc in TABLE {
            mnemonics.insert(desc.mnemonic, Mnemonic::Native(desc));
            match desc.funct {
                Some(funct) => by_funct.insert(funct, desc),
                None => by_opcode.insert(desc.opcode, desc),
            };
        }
        for &(name, pseudo) in PSEUDOS {
            mnemonics.insert(name, Mnemonic::Pseudo(pseudo));
        }
        Self { mnemonics, by_funct, by_opcode, registers: RegisterTable::new() }
    }

    /// Case-insensitive mnemonic lookup.
    pub fn mnemonic(&self, name: &str) -> Option<Mnemonic> {
        self.mnemonics.get(name.to_ascii_lowercase().as_str()).copied()
    }

    pub fn native(&self, name: &str) -> Option<&'static InsnDesc> {
        match self.mnemonic(name)? {
            Mnemonic::Native(desc) => Some(desc),
            Mnemonic::Pseudo(_) => None,
        }
    }

    /// Reverse lookup from the opcode (and funct for R-type words).
    pub fn by_encoding(&self, opcode: u8, funct: u8) -> Option<&'static InsnDesc> {
        if opcode == OP_SPECIAL {
            self.by_funct.get(&funct).copied()
        } else {
            self.by_opcode.get(&opcode).copied()
        }
    }

    pub fn registers(&self) -> &RegisterTable {
        &self.registers
    }
}

impl Default for Isa {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit positions shared by all three layouts.
pub mod field {
    pub const OPCODE_SHIFT: u32 = 26;
    pub const RS_SHIFT: u32 = 21;
    pub const RT_SHIFT: u32 = 16;
    pub const RD_SHIFT: u32 = 11;
    pub const SHAMT_SHIFT: u32 = 6;

    pub const OPCODE_MASK: u32 = 0x3F;
    pub const REG_MASK: u32 = 0x1F;
    pub const FUNCT_MASK: u32 = 0x3F;
    pub const IMM_MASK: u32 = 0xFFFF;
    pub const ADDR_MASK: u32 = 0x03FF_FFFF;

    pub fn opcode(raw: u32) -> u8 {
        ((raw >> OPCODE_SHIFT) & OPCODE_MASK) as u8
    }

    pub fn funct(raw: u32) -> u8 {
        (raw & FUNCT_MASK) as u8
    }
}
