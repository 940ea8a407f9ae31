use super::*;
use tlc_binder::Binder;
use tlc_common::DiagnosticBag;
use tlc_parser::ast::{ExprKind, StmtKind, TopDeclKind};
use tlc_parser::parse_file;
use tlc_types::Type;

fn check_one(src: &str) -> (tlc_parser::ast::File, TypeArena, DiagnosticBag) {
    let (file, mut diags) = parse_file(src, "a.src", true);
    let file = file.expect("source should parse");
    let mut binder = Binder::new();
    let scope = binder.pass_a(&file, &mut diags);
    let imports = binder.resolve_imports(&file, &mut diags);
    binder.pass_b(&file, scope.top_level, &imports, &mut diags);
    assert!(!diags.errored(), "program should bind cleanly: {diags}");

    let mut types = TypeArena::new();
    check_file(&file, &binder, &mut types, &mut diags);
    (file, types, diags)
}

#[test]
fn integer_arithmetic_promotes_to_the_wider_operand() {
    let (file, types, diags) = check_one("module a; int f() { return 1 + 2; }");
    assert!(diags.is_empty());
    let TopDeclKind::FunctionDef { body, .. } = &file.bodies[0].kind else { panic!() };
    let StmtKind::Compound { stmts, .. } = &body.kind else { panic!() };
    let StmtKind::Return { value: Some(expr) } = &stmts[0].kind else { panic!() };
    let ty = types.get(expr.result_type().unwrap());
    assert_eq!(ty.as_keyword(), Some(tlc_common::KeywordType::Ubyte));
}

#[test]
fn returning_a_value_from_a_void_function_is_rejected() {
    let (_file, _types, diags) = check_one("module a; void f() { return 1; }");
    assert!(diags.errored());
}

#[test]
fn missing_return_value_in_a_non_void_function_is_rejected() {
    let (_file, _types, diags) = check_one("module a; int f() { return; }");
    assert!(diags.errored());
}

#[test]
fn if_condition_must_be_bool_not_integer() {
    let (_file, _types, diags) = check_one("module a; int f(int x) { if (x) x = 1; return 0; }");
    assert!(diags.errored());
}

#[test]
fn if_condition_accepts_a_comparison() {
    let (_file, _types, diags) = check_one("module a; int f(int x) { if (x < 1) x = 1; return 0; }");
    assert!(diags.is_empty());
}

#[test]
fn overload_is_selected_by_argument_type() {
    let (file, types, diags) = check_one(
        "module a; int f(int x) { return x; } int f(double x) { return 0; } int g() { return f(1); }",
    );
    assert!(diags.is_empty());
    let TopDeclKind::FunctionDef { body, .. } = &file.bodies[2].kind else { panic!() };
    let StmtKind::Compound { stmts, .. } = &body.kind else { panic!() };
    let StmtKind::Return { value: Some(expr) } = &stmts[0].kind else { panic!() };
    let ExprKind::Call { args, .. } = &expr.kind else { panic!() };
    let _ = args;
    let ty = types.get(expr.result_type().unwrap());
    assert_eq!(ty.as_keyword(), Some(tlc_common::KeywordType::Int));
}

#[test]
fn call_with_no_matching_overload_is_an_error() {
    let (_file, _types, diags) =
        check_one("module a; int f(int x) { return x; } int g() { return f(); }");
    assert!(diags.errored());
}

#[test]
fn assignment_to_a_non_assignable_expression_is_rejected() {
    let (_file, _types, diags) = check_one("module a; int f() { 1 = 2; return 0; }");
    assert!(diags.errored());
}

#[test]
fn struct_member_access_resolves_to_the_fields_type() {
    let (file, types, diags) = check_one(
        "module a; struct Point { int x; int y; }; int f(Point p) { return p.x; }",
    );
    assert!(diags.is_empty());
    let TopDeclKind::FunctionDef { body, .. } = &file.bodies[1].kind else { panic!() };
    let StmtKind::Compound { stmts, .. } = &body.kind else { panic!() };
    let StmtKind::Return { value: Some(expr) } = &stmts[0].kind else { panic!() };
    let ty = types.get(expr.result_type().unwrap());
    assert_eq!(ty.as_keyword(), Some(tlc_common::KeywordType::Int));
}

#[test]
fn member_access_on_the_wrong_field_name_is_rejected() {
    let (_file, _types, diags) =
        check_one("module a; struct Point { int x; int y; }; int f(Point p) { return p.z; }");
    assert!(diags.errored());
}

#[test]
fn sizeof_expressions_and_types_are_always_ulong() {
    let (file, types, diags) = check_one("module a; int f() { return sizeof(int); }");
    assert!(!diags.errored());
    let TopDeclKind::FunctionDef { body, .. } = &file.bodies[0].kind else { panic!() };
    let StmtKind::Compound { stmts, .. } = &body.kind else { panic!() };
    let StmtKind::Return { value: Some(expr) } = &stmts[0].kind else { panic!() };
    let ty = types.get(expr.result_type().unwrap());
    assert!(matches!(ty, Type::Keyword(tlc_common::KeywordType::Ulong)));
}
