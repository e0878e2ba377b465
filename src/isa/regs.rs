use std::collections::HashMap;
use std::fmt;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize, Serializer};

/// A general purpose register id, always in `0..32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reg(u8);

impl Reg {
    pub const ZERO: Reg = Reg(0);
    pub const T9: Reg = Reg(25);
    pub const RA: Reg = Reg(31);

    pub fn new(id: u8) -> Option<Self> {
        (id < 32).then_some(Self(id))
    }

    /// Extracts a 5-bit register field; only the low five bits are kept.
    pub fn from_field(bits: u32) -> Self {
        Self((bits & 0x1F) as u8)
    }

    pub fn id(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// A set of registers, one bit per register id.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct RegSet(u32);

impl RegSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn bits(&self) -> &BitSlice<u32, Lsb0> {
        self.0.view_bits::<Lsb0>()
    }

    pub fn insert(&mut self, reg: Reg) {
        self.0.view_bits_mut::<Lsb0>().set(reg.id() as usize, true);
    }

    pub fn contains(&self, reg: Reg) -> bool {
        self.bits()[reg.id() as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.bits().count_ones()
    }

    pub fn iter(&self) -> impl Iterator<Item = Reg> + '_ {
        self.bits().iter_ones().map(|id| Reg(id as u8))
    }

    /// Lowest register present in both sets.
    pub fn first_common(&self, other: &RegSet) -> Option<Reg> {
        self.iter().find(|&r| other.contains(r))
    }

    pub fn intersects(&self, other: &RegSet) -> bool {
        self.0 & other.0 != 0
    }
}

impl FromIterator<Reg> for RegSet {
    fn from_iter<I: IntoIterator<Item = Reg>>(iter: I) -> Self {
        let mut set = RegSet::new();
        for reg in iter {
            set.insert(reg);
        }
        set
    }
}

impl fmt::Debug for RegSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|r| r.id())).finish()
    }
}

impl Serialize for RegSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|r| r.id()))
    }
}

const ABI_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", //
    "t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7", //
    "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", //
    "t8", "t9", "k0", "k1", "gp", "sp", "fp", "ra",
];

/// Register name lookup. Accepts `$0`..`$31` and the conventional ABI names.
#[derive(Debug, Clone)]
pub struct RegisterTable {
    names: HashMap<String, Reg>,
}

impl RegisterTable {
    pub fn new() -> Self {
        let mut names = HashMap::with_capacity(64);
        for (id, abi) in ABI_NAMES.iter().enumerate() {
            let reg = Reg(id as u8);
            names.insert(format!("${id}"), reg);
            names.insert(format!("${abi}"), reg);
        }
        Self { names }
    }

    pub fn get(&self, name: &str) -> Option<Reg> {
        self.names.get(name.trim()).copied()
    }
}

impl Default for RegisterTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_abi_names() {
        let t = RegisterTable::new();
        assert_eq!(t.get("$0"), Some(Reg::ZERO));
        assert_eq!(t.get("$zero"), Some(Reg::ZERO));
        assert_eq!(t.get("$31"), Some(Reg::RA));
        assert_eq!(t.get("$ra"), Some(Reg::RA));
        assert_eq!(t.get("$t9"), Some(Reg::T9));
        assert_eq!(t.get("$32"), None);
        assert_eq!(t.get("5"), None);
        assert_eq!(t.get("$05"), None);
    }

    #[test]
    fn regset_intersection() {
        let a: RegSet = [Reg::ZERO, Reg::T9].into_iter().collect();
        let b: RegSet = [Reg::RA, Reg::T9].into_iter().collect();
        let c: RegSet = [Reg::RA].into_iter().collect();
        assert_eq!(a.first_common(&b), Some(Reg::T9));
        assert!(!a.intersects(&c));
        assert!(!RegSet::new().intersects(&a));
        assert_eq!(a.len(), 2);
        assert!(RegSet::new().is_empty());
    }
}
