use anyhow::{ensure, Result};
use serde::Serialize;

use dual_issue::hazard::hazard;
use dual_issue::schedule::Stats;
use dual_issue::{Program, Schedule, Slot};

#[derive(Debug, Clone, Serialize)]
pub struct SlotOut {
    /// Position in the input listing; absent for a filler NOP.
    pub index: Option<usize>,
    pub line: String,
    pub hex: String,
    pub mnemonic: Option<&'static str>,
    pub special: bool,
    pub reads: Vec<u8>,
    pub writes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PacketOut {
    pub number: usize,
    pub anchor: usize,
    pub slot1: SlotOut,
    pub slot2: SlotOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub stats: Stats,
    pub packets: Vec<PacketOut>,
}

fn slot_out(program: &Program, slot: Slot) -> SlotOut {
    match slot {
        Slot::Nop => SlotOut {
            index: None,
            line: program.slot_text(slot).to_string(),
            hex: "00000000".into(),
            mnemonic: None,
            special: false,
            reads: Vec::new(),
            writes: Vec::new(),
        },
        Slot::Insn(i) => {
            let d = &program.decoded[i];
            SlotOut {
                index: Some(i),
                line: program.entries[i].line.clone(),
                hex: program.entries[i].hex(),
                mnemonic: d.mnemonic,
                special: d.is_special(),
                reads: d.reads.iter().map(|r| r.id()).collect(),
                writes: d.writes.iter().map(|r| r.id()).collect(),
            }
        }
    }
}

pub fn build_report(program: &Program, schedule: &Schedule) -> Report {
    let packets = schedule
        .packets
        .iter()
        .enumerate()
        .map(|(n, p)| PacketOut {
            number: n + 1,
            anchor: p.anchor,
            slot1: slot_out(program, p.slot1),
            slot2: slot_out(program, p.slot2),
        })
        .collect();
    Report { stats: schedule.stats, packets }
}

/// Re-checks the packet invariants: each instruction issued exactly once,
/// no hazard inside a packet, and special instructions never in slot 1
/// next to a non-special partner.
pub fn verify(program: &Program, schedule: &Schedule) -> Result<()> {
    let n = program.decoded.len();
    let mut seen = vec![0usize; n];
    for (k, p) in schedule.packets.iter().enumerate() {
        let number = k + 1;
        for i in [p.slot1, p.slot2].into_iter().filter_map(Slot::index) {
            ensure!(i < n, "packet {number}: index {i} out of range");
            seen[i] += 1;
        }
        if let (Slot::Insn(a), Slot::Insn(b)) = (p.slot1, p.slot2) {
            let (da, db) = (&program.decoded[a], &program.decoded[b]);
            if let Some(h) = hazard(da, db) {
                anyhow::bail!("packet {number}: {h}");
            }
            ensure!(
                !da.is_special() || db.is_special(),
                "packet {number}: special instruction in slot 1"
            );
        }
    }
    if let Some(i) = seen.iter().position(|&c| c != 1) {
        anyhow::bail!("instruction {i} issued {} times", seen[i]);
    }
    Ok(())
}
