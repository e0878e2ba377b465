use dual_issue::{listing, AsmConfig, Assembler, Isa, Program};
use dual_sched::{build_report, verify};
use pretty_assertions::assert_eq;

#[test]
fn json_report_lists_packets_and_stats() {
    let isa = Isa::new();
    let asm = Assembler::new(&isa, AsmConfig::default())
        .assemble("lw $3, 0($2)\nadd $4, $5, $6\njal 0\n")
        .unwrap();
    let program = Program::from_listing(&isa, &listing::render(&asm.words)).unwrap();
    let schedule = program.schedule();
    verify(&program, &schedule).unwrap();

    let json = serde_json::to_value(build_report(&program, &schedule)).unwrap();
    assert_eq!(json["stats"]["instructions"], 3);
    assert_eq!(json["stats"]["packets"], 2);
    assert_eq!(json["stats"]["nop_slots"], 1);

    let first = &json["packets"][0];
    assert_eq!(first["number"], 1);
    assert_eq!(first["slot1"]["mnemonic"], "add");
    assert_eq!(first["slot1"]["reads"], serde_json::json!([5, 6]));
    assert_eq!(first["slot2"]["mnemonic"], "lw");
    assert_eq!(first["slot2"]["special"], true);

    let second = &json["packets"][1];
    assert_eq!(second["slot1"]["index"], serde_json::Value::Null);
    assert_eq!(second["slot2"]["hex"], "0C000000");
    assert_eq!(second["slot2"]["writes"], serde_json::json!([31]));
}
