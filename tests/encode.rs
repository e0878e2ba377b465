use dual_issue::encoder::{Encoder, Word};
use dual_issue::isa::regs::Reg;
use dual_issue::labels::LabelTable;
use dual_issue::{AsmError, Isa};
use pretty_assertions::assert_eq;

fn enc(line: &str) -> Result<Vec<Word>, AsmError> {
    enc_at(line, &LabelTable::default(), 0)
}

fn enc_at(line: &str, labels: &LabelTable, address: u32) -> Result<Vec<Word>, AsmError> {
    let isa = Isa::new();
    let instr = dual_issue::source::split_instr(line)?;
    Encoder::new(&isa, labels, Reg::T9).encode(instr.mnemonic, &instr.operands, address)
}

fn hex(line: &str) -> String {
    let words = enc(line).unwrap();
    assert_eq!(words.len(), 1, "{line}");
    words[0].hex()
}

#[test]
fn add_fields_and_hex() {
    let w = enc("add $1, $2, $3").unwrap();
    assert_eq!(w[0].fields(), "000000_00010_00011_00001_00000_100000");
    assert_eq!(w[0].hex(), "00430820");
}

#[test]
fn r_type_variants() {
    assert_eq!(hex("sll $4, $5, 3"), "000520C0");
    assert_eq!(hex("sllv $4, $5, $6"), "00C52004");
    assert_eq!(hex("jr $31"), "03E00008");
    assert_eq!(hex("jr $ra"), "03E00008");
    assert_eq!(hex("SLT $3, $5, $4"), "00A4182A");
}

#[test]
fn i_type_immediates_are_masked() {
    assert_eq!(hex("addi $5, $0, 10"), "2005000A");
    assert_eq!(hex("andi $1, $2, 0x0F"), "3041000F");
    assert_eq!(hex("addi $1, $2, -1"), "2041FFFF");
    assert_eq!(hex("ori $1, $2, 0x12345"), "34412345");
}

#[test]
fn memory_operands() {
    assert_eq!(hex("lw $3, -4($29)"), "8FA3FFFC");
    assert_eq!(hex("sw $1, 0x10($2)"), "AC410010");
    assert_eq!(hex("sw $1, ($2)"), "AC410000");
    assert!(matches!(enc("lw $3, 4"), Err(AsmError::InvalidOperand { .. })));
    assert!(matches!(enc("lw $3, 4($2"), Err(AsmError::InvalidOperand { .. })));
}

#[test]
fn pseudo_instructions_match_their_expansions() {
    assert_eq!(enc("li $5, 10").unwrap(), enc("addi $5, $0, 10").unwrap());
    assert_eq!(enc("move $3, $4").unwrap(), enc("add $3, $4, $0").unwrap());
    assert_eq!(enc("sgt $3, $4, $5").unwrap(), enc("slt $3, $5, $4").unwrap());
    assert_eq!(enc("nop").unwrap(), vec![Word::NOP]);
    assert_eq!(Word::NOP.fields(), "0".repeat(32));
}

#[test]
fn every_primitive_is_32_bits() {
    for line in [
        "add $1, $2, $3", "addu $1, $2, $3", "sub $1, $2, $3", "subu $1, $2, $3",
        "and $1, $2, $3", "or $1, $2, $3", "xor $1, $2, $3", "nor $1, $2, $3",
        "slt $1, $2, $3", "sltu $1, $2, $3", "sll $1, $2, 31", "srl $1, $2, 1",
        "sra $1, $2, 0", "sllv $1, $2, $3", "srlv $1, $2, $3", "srav $1, $2, $3",
        "jr $1", "addi $1, $2, 3", "addiu $1, $2, 3", "slti $1, $2, 3",
        "sltiu $1, $2, 3", "andi $1, $2, 3", "ori $1, $2, 3", "xori $1, $2, 3",
        "lw $1, 3($2)", "sw $1, 3($2)", "beq $1, $2, 7", "bne $1, $2, 7",
        "j 7", "jal 7",
    ] {
        let words = enc(line).unwrap();
        assert_eq!(words.len(), 1, "{line}");
        assert_eq!(words[0].fields().replace('_', "").len(), 32, "{line}");
    }
}

#[test]
fn compare_branches_lower_to_two_words() {
    let isa = Isa::new();
    let lines: Vec<_> = "top:\nnop\n"
        .lines()
        .map(|l| dual_issue::source::classify(l).unwrap())
        .collect();
    let labels = dual_issue::labels::resolve(&isa, lines.iter().enumerate().map(|(i, l)| (i + 1, l)), 0).unwrap();

    // branch word at slot 3 back to `top` at slot 0
    let blt = enc_at("blt $1, $2, top", &labels, 3).unwrap();
    assert_eq!(blt.len(), 2);
    assert_eq!(blt[0].hex(), "0022C82A"); // slt $25, $1, $2
    assert_eq!(blt[1].hex(), "1720FFFD"); // bne $25, $0, -3

    let bgt = enc_at("bgt $1, $2, top", &labels, 3).unwrap();
    assert_eq!(bgt[0].hex(), "0041C82A"); // slt $25, $2, $1
    assert_eq!(bgt[1].hex(), "1720FFFD");

    let ble = enc_at("ble $1, $2, top", &labels, 3).unwrap();
    assert_eq!(ble[0].hex(), "0041C82A");
    assert_eq!(ble[1].hex(), "1320FFFD"); // beq

    let bge = enc_at("bge $1, $2, top", &labels, 3).unwrap();
    assert_eq!(bge[0].hex(), "0022C82A");
    assert_eq!(bge[1].hex(), "1320FFFD");

    for w in blt.iter().chain(&bge) {
        assert_eq!(w.fields().replace('_', "").len(), 32);
    }
}

#[test]
fn jumps_use_slot_addresses() {
    assert_eq!(hex("j 2"), "08000002");
    assert_eq!(hex("jal 5"), "0C000005");
    assert_eq!(hex("j 0x3FFFFFF"), "0BFFFFFF");
}

#[test]
fn jump_targets_beyond_26_bits_are_rejected() {
    for line in ["j 67108864", "jal 0x4000000"] {
        assert!(
            matches!(enc(line), Err(AsmError::InvalidOperand { reason: "jump target exceeds 26 bits", .. })),
            "{line}"
        );
    }
}

#[test]
fn doubled_signs_are_not_immediates() {
    for line in ["addi $1, $2, --5", "addi $1, $2, -+5", "addi $1, $2, 0x-2", "addi $1, $2, 0x", "lw $1, +-4($2)"] {
        assert!(matches!(enc(line), Err(AsmError::InvalidOperand { .. })), "{line}");
    }
}

#[test]
fn errors_by_kind() {
    assert_eq!(
        enc("mul $1, $2, $3"),
        Err(AsmError::UnknownMnemonic { mnemonic: "mul".into() })
    );
    assert!(matches!(enc("add $1, $2, $32"), Err(AsmError::InvalidOperand { .. })));
    assert!(matches!(enc("add $1, $2"), Err(AsmError::InvalidOperand { .. })));
    assert!(matches!(enc("addi $1, $2, ten"), Err(AsmError::InvalidOperand { .. })));
    assert!(matches!(enc("sll $1, $2, 32"), Err(AsmError::InvalidOperand { .. })));
    assert_eq!(
        enc("beq $1, $2, nowhere"),
        Err(AsmError::UndefinedLabel { label: "nowhere".into() })
    );
    assert_eq!(
        enc("j nowhere"),
        Err(AsmError::UndefinedLabel { label: "nowhere".into() })
    );
}
