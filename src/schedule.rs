//! Greedy two-wide packet scheduling.
//!
//! Instructions live in a flat arena addressed by index; an availability
//! bitmap records which ones already sit in a packet. Each unconsumed index,
//! in program order, anchors one packet and looks strictly forward for a
//! hazard-free companion, which lets a later independent instruction issue
//! ahead of earlier ones.

use bitvec::prelude::*;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::decoder::{Decoded, Decoder, MipsDecoder};
use crate::error::LineError;
use crate::hazard::{co_issue_safe, hazard};
use crate::isa::mips::Isa;
use crate::listing::{self, Entry, NOP_LINE};

/// One issue slot: an index into the scheduled instruction list, or a filler NOP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Slot {
    Nop,
    Insn(usize),
}

impl Slot {
    pub fn index(self) -> Option<usize> {
        match self {
            Slot::Nop => None,
            Slot::Insn(i) => Some(i),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Packet {
    pub slot1: Slot,
    pub slot2: Slot,
    /// Index whose turn produced this packet.
    pub anchor: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub instructions: usize,
    pub packets: usize,
    pub nop_slots: usize,
    /// Companions that skipped over at least one still-unissued instruction.
    pub pulled_forward: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub packets: Vec<Packet>,
    pub stats: Stats,
}

/// Packs `insns` into two-slot packets.
///
/// Special instructions (branch, jump, memory) always take slot 2 and accept
/// only a non-special companion in slot 1. Other instructions take slot 1 and
/// accept any companion in slot 2.
pub fn schedule(insns: &[Decoded]) -> Schedule {
    let n = insns.len();
    let mut used = bitvec![0; n];
    let mut packets = Vec::with_capacity(n);
    let mut stats = Stats { instructions: n, ..Stats::default() };

    for i in 0..n {
        if used[i] {
            continue;
        }
        let anchor = &insns[i];
        let special = anchor.is_special();
        let mut skipped = false;
        let mut companion = None;
        for j in i + 1..n {
            if used[j] {
                continue;
            }
            let cand = &insns[j];
            if special && cand.is_special() {
                skipped = true;
                continue;
            }
            if co_issue_safe(anchor, cand) {
                companion = Some(j);
                break;
            }
            trace!(anchor = i, candidate = j, hazard = ?hazard(anchor, cand), "rejected");
            skipped = true;
        }

        used.set(i, true);
        if let Some(j) = companion {
            used.set(j, true);
            if skipped {
                stats.pulled_forward += 1;
            }
        } else {
            stats.nop_slots += 1;
        }
        let other = companion.map_or(Slot::Nop, Slot::Insn);
        let packet = if special {
            Packet { slot1: other, slot2: Slot::Insn(i), anchor: i }
        } else {
            Packet { slot1: Slot::Insn(i), slot2: other, anchor: i }
        };
        debug!(n = packets.len() + 1, slot1 = ?packet.slot1, slot2 = ?packet.slot2, "issue");
        packets.push(packet);
    }

    stats.packets = packets.len();
    info!(
        instructions = stats.instructions,
        packets = stats.packets,
        nop_slots = stats.nop_slots,
        pulled_forward = stats.pulled_forward,
        "scheduled"
    );
    Schedule { packets, stats }
}

/// A parsed listing with every entry decoded from its serialized word.
#[derive(Debug, Clone)]
pub struct Program {
    pub entries: Vec<Entry>,
    pub decoded: Vec<Decoded>,
}

impl Program {
    pub fn from_listing(isa: &Isa, text: &str) -> Result<Self, LineError> {
        let entries = listing::parse(text)?;
        let decoder = MipsDecoder::new(isa);
        let decoded = entries.iter().map(|e| decoder.decode(e.raw)).collect();
        Ok(Self { entries, decoded })
    }

    pub fn schedule(&self) -> Schedule {
        schedule(&self.decoded)
    }

    pub fn slot_text(&self, slot: Slot) -> &str {
        match slot {
            Slot::Nop => NOP_LINE,
            Slot::Insn(i) => self.entries[i].line.as_str(),
        }
    }

    /// `Packet <n>:` blocks, numbered from 1.
    pub fn render(&self, packets: &[Packet]) -> String {
        let mut out = String::new();
        for (n, p) in packets.iter().enumerate() {
            out.push_str(&format!(
                "Packet {}:\n  Slot1: {}\n  Slot2: {}\n\n",
                n + 1,
                self.slot_text(p.slot1),
                self.slot_text(p.slot2)
            ));
        }
        out
    }
}
