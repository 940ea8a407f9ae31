use super::*;
use tlc_binder::Binder;
use tlc_common::DiagnosticBag;
use tlc_parser::parse_file;

fn translate_one(src: &str) -> Vec<Fragment> {
    let (file, mut diags) = parse_file(src, "a.src", true);
    let file = file.expect("source should parse");
    let mut binder = Binder::new();
    let scope = binder.pass_a(&file, &mut diags);
    let imports = binder.resolve_imports(&file, &mut diags);
    binder.pass_b(&file, scope.top_level, &imports, &mut diags);
    assert!(!diags.errored(), "program should bind cleanly: {diags}");

    let mut types = TypeArena::new();
    check_file(&file, &binder, &mut types, &mut diags);
    assert!(!diags.errored(), "program should check cleanly: {diags}");

    translate_file(&file, &binder, &types, &mut diags)
}

fn text_fragment(fragments: &[Fragment], label_suffix: &str) -> &Fragment {
    fragments
        .iter()
        .find(|f| matches!(f, Fragment::Text { .. }) && f.label().ends_with(label_suffix))
        .unwrap_or_else(|| panic!("no Text fragment ending in {label_suffix:?} among {fragments:?}"))
}

#[test]
fn returning_a_constant_emits_a_move_into_the_return_slot_and_a_return() {
    let fragments = translate_one("module a; int f() { return 1; }");
    let Fragment::Text { entries, .. } = text_fragment(&fragments, "1f") else { unreachable!() };
    assert!(entries.iter().any(|e| e.op == IrOp::Const));
    assert!(entries.iter().any(|e| e.op == IrOp::Return));
}

#[test]
fn integer_addition_lowers_to_add() {
    let fragments = translate_one("module a; int f(int x, int y) { return x + y; }");
    let Fragment::Text { entries, .. } = text_fragment(&fragments, "1fsisi") else { unreachable!() };
    assert!(entries.iter().any(|e| e.op == IrOp::Add));
}

#[test]
fn float_addition_lowers_to_fp_add_not_add() {
    let fragments = translate_one("module a; double f(double x, double y) { return x + y; }");
    let Fragment::Text { entries, .. } = text_fragment(&fragments, "1fdd") else { unreachable!() };
    assert!(entries.iter().any(|e| e.op == IrOp::FpAdd));
    assert!(!entries.iter().any(|e| e.op == IrOp::Add));
}

#[test]
fn if_statement_lowers_to_a_conditional_jump_and_a_join_label() {
    let fragments = translate_one("module a; int f(int x) { if (x < 1) x = 1; return x; }");
    let Fragment::Text { entries, .. } = text_fragment(&fragments, "1fsi") else { unreachable!() };
    assert!(entries.iter().any(|e| matches!(e.op, IrOp::Jge | IrOp::Jl)));
    assert!(entries.iter().any(|e| e.op == IrOp::Label));
}

#[test]
fn while_loop_lowers_to_a_back_edge_jump() {
    let fragments = translate_one("module a; int f(int x) { while (x < 10) x = x + 1; return x; }");
    let Fragment::Text { entries, .. } = text_fragment(&fragments, "1fsi") else { unreachable!() };
    let jumps = entries.iter().filter(|e| e.op == IrOp::Jump).count();
    assert!(jumps >= 1, "expected at least one unconditional back edge jump");
}

#[test]
fn global_with_zero_initializer_goes_to_bss() {
    let fragments = translate_one("module a; int g = 0;");
    assert!(fragments.iter().any(|f| matches!(f, Fragment::Bss { label, .. } if label.ends_with("1g"))));
}

#[test]
fn uninitialized_global_goes_to_bss() {
    let fragments = translate_one("module a; int g;");
    assert!(fragments.iter().any(|f| matches!(f, Fragment::Bss { label, .. } if label.ends_with("1g"))));
}

#[test]
fn const_qualified_global_goes_to_rodata() {
    let fragments = translate_one("module a; const int g = 5;");
    assert!(fragments.iter().any(|f| matches!(f, Fragment::Rodata { label, .. } if label.ends_with("1g"))));
}

#[test]
fn non_const_nonzero_global_goes_to_data() {
    let fragments = translate_one("module a; int g = 5;");
    assert!(fragments.iter().any(|f| matches!(f, Fragment::Data { label, .. } if label.ends_with("1g"))));
}

#[test]
fn struct_field_access_computes_a_nonzero_offset_for_the_second_field() {
    let fragments = translate_one(
        "module a; struct Point { int x; int y; }; int f(Point p) { return p.y; }",
    );
    let text = fragments.iter().find(|f| matches!(f, Fragment::Text { .. })).unwrap();
    let Fragment::Text { entries, .. } = text else { unreachable!() };
    assert!(entries.iter().any(|e| e.op == IrOp::MemLoad || e.op == IrOp::StkLoad));
}

#[test]
fn calling_an_overload_mangles_in_the_selected_arg_types() {
    let fragments = translate_one(
        "module a; int f(int x) { return x; } int f(double x) { return 0; } int g() { return f(1); }",
    );
    let Fragment::Text { entries, .. } = text_fragment(&fragments, "1g") else { unreachable!() };
    let called = entries.iter().find(|e| e.op == IrOp::Call).expect("call should be emitted");
    let Some(Operand::Name { label }) = &called.arg1 else { panic!("call target should be a name operand") };
    assert!(label.ends_with("1fsi"), "call should target the int overload, got {label}");
}

#[test]
fn taking_the_address_of_a_local_forces_a_stack_backed_access() {
    let fragments = translate_one("module a; int f() { int x = 1; int* p = &x; return *p; }");
    let Fragment::Text { entries, .. } = text_fragment(&fragments, "1f") else { unreachable!() };
    assert!(entries.iter().any(|e| matches!(e.op, IrOp::StkStore | IrOp::StkLoad)));
}

#[test]
fn pre_increment_on_a_pointer_steps_by_the_pointees_size() {
    let fragments = translate_one("module a; int f(int* p) { ++p; return *p; }");
    let Fragment::Text { entries, .. } = text_fragment(&fragments, "1fPsi") else { unreachable!() };
    let add = entries.iter().find(|e| e.op == IrOp::Add).expect("pointer increment should emit ADD");
    let Some(Operand::Constant { bits, .. }) = &add.arg2 else { panic!("step operand should be a constant") };
    assert_eq!(*bits, 4, "int is 4 bytes, so ++p should step by 4");
}

#[test]
fn spaceship_compare_lowers_to_a_three_way_branch_and_join() {
    let fragments = translate_one("module a; int f(int x, int y) { return x <=> y; }");
    let Fragment::Text { entries, .. } = text_fragment(&fragments, "1fsisi") else { unreachable!() };
    let labels = entries.iter().filter(|e| e.op == IrOp::Label).count();
    assert!(labels >= 2, "spaceship lowering should join at least two branches");
}

#[test]
fn string_literal_initializer_hoists_into_its_own_rodata_fragment() {
    let fragments = translate_one(r#"module a; char* s = "hi";"#);
    let rodata_count = fragments.iter().filter(|f| matches!(f, Fragment::Rodata { .. })).count();
    assert!(rodata_count >= 1, "string literal should produce a rodata fragment");
    let has_string_bytes = fragments.iter().any(|f| {
        matches!(f, Fragment::Rodata { entries, .. } if entries.iter().any(|e| matches!(&e.arg1, Some(Operand::Str { .. }))))
    });
    assert!(has_string_bytes);
}
