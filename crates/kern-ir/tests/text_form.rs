//! Integration tests for the text form and the verifier.

use filecheck::{CheckerBuilder, NO_VARIABLES};
use kern_ir::{
    parse_function, parse_unit, verify, BranchInst, Family, Function, Instruction, LoadInst,
    MemorySpace, Opcode, PointerSize, RegisterIndex, TupleIndex, Type, Value,
};

fn match_filecheck(actual: &str, directives: &str) {
    let mut builder = CheckerBuilder::new();
    for line in directives.lines().map(str::trim).filter(|l| !l.is_empty()) {
        builder
            .directive(line)
            .unwrap_or_else(|e| panic!("bad directive '{}': {}", line, e));
    }
    let checker = builder.finish();
    if !checker.check(actual, NO_VARIABLES).unwrap() {
        let (_, explain) = checker.explain(actual, NO_VARIABLES).unwrap();
        panic!("filecheck failed:\n{}", explain);
    }
}

const KERNEL: &str = r#"
; every instruction form once
function %all(%0, %1) -> (%2) {
    reg %0: qword
    reg %1: dword
    reg %2: dword
    reg %3: bool
    imm $0 = f32 3.14
    imm $1 = s64 -9
block0:
    mov.f32 %1, %0
    mad.f32 %2, %1, %1, %1
    cvt.s32.f32 %2, %1
    loadi.f32 %1, $0
    load.f32.global {%1, %2}, [%0]
    store.f32.local [%0], {%1, %2}
    bra %3, L0
block1:
    label L0
    tex {%1}, {%0, %2}
    fence.global
}
"#;

#[test]
fn test_parse_every_form() {
    let func = parse_function(KERNEL).unwrap();
    assert_eq!(func.name(), "all");
    assert_eq!(func.reg_num(), 4);
    assert_eq!(func.value_num(), 2);
    assert_eq!(func.get_value(kern_ir::ValueIndex::new(1)), Value::from(-9i64));
    assert_eq!(func.block_count(), 2);

    let opcodes: Vec<_> = func.insts().map(|inst| inst.opcode()).collect();
    assert_eq!(
        opcodes,
        [
            Opcode::Mov,
            Opcode::Mad,
            Opcode::Cvt,
            Opcode::LoadI,
            Opcode::Load,
            Opcode::Store,
            Opcode::Bra,
            Opcode::Label,
            Opcode::Tex,
            Opcode::Fence,
        ]
    );

    let load = func.insts().nth(4).unwrap();
    assert_eq!(load.cast::<LoadInst>().value(&func, 1), RegisterIndex::new(2));
    let bra = func.insts().nth(6).unwrap();
    assert_eq!(bra.cast::<BranchInst>().predicate(), Some(RegisterIndex::new(3)));
}

#[test]
fn test_verify_parsed_text() {
    let func = parse_function(KERNEL).unwrap();
    // `mov.f32 %1, %0` reads a qword as f32.
    let errors = verify(&func, PointerSize::Ptr64).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "mov.f32 %1, %0: register %0 is qword, expected dword"
    );
    assert_eq!(errors[0].location.as_deref(), Some("%all block0 inst0"));
}

#[test]
fn test_reprint_is_stable() {
    let func = parse_function(KERNEL).unwrap();
    let printed = format!("{}", func);
    let reparsed = parse_function(&printed).unwrap();
    assert_eq!(format!("{}", reparsed), printed);

    match_filecheck(
        &printed,
        r#"
        check: function %all(%0, %1) -> (%2) {
        check: imm $$0 = f32 3.14
        nextln: imm $$1 = s64 -9
        nextln: labels 1
        nextln: block0:
        nextln: mov.f32 %1, %0
        check: bra %3, L0
        nextln: block1:
        nextln: label L0
        nextln: tex {%1}, {%0, %2}
        "#,
    );
}

#[test]
fn test_unit_text() {
    let text = "unit ptr32 {\n\nfunction %a(%0) {\n    reg %0: dword\nblock0:\n    load.u8.private {%0}, [%0]\n}\n}\n";
    let unit = parse_unit(text).unwrap();
    assert_eq!(unit.pointer_size(), PointerSize::Ptr32);
    assert_eq!(format!("{}", unit), text);
    assert_eq!(kern_ir::verify_unit(&unit).map_err(|e| e.len()), Err(1));
}

#[test]
fn test_parse_errors_carry_position() {
    let text = "function %k() {\n    reg %0: dword\nblock0:\n    add.f32 %0, %0\n}";
    let err = parse_function(text).unwrap_err();
    assert!(err.position > 0 && err.position < text.len());
    assert!(err.to_string().starts_with("parse error at position"));

    let err = parse_function("function %k() {\n    imm $1 = u8 1\n}").unwrap_err();
    assert_eq!(err.message, "immediate $1 declared out of order, expected $0");
}

#[test]
fn test_verify_hand_assembled_function() {
    let mut func = Function::new("raw");
    let addr = func.new_register(Family::QWord);
    func.push_block();
    func.push_inst(Instruction::load(
        Type::F32,
        MemorySpace::Global,
        addr,
        TupleIndex::new(7),
        2,
    ));
    func.push_inst(Instruction::unary(
        Opcode::Cos,
        Type::S32,
        addr,
        addr,
    ));

    let errors = verify(&func, PointerSize::Ptr64).unwrap_err();
    let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "load.f32.global {t7:2}, [%0]: tuple t7 of length 2 out of range (0 tuple entries)",
            "cos.s32 %0, %0: cos does not accept type s32",
        ]
    );
}
