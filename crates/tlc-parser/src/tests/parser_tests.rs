use crate::ast::{StmtKind, TopDeclKind};
use crate::parser::parse_file;

#[test]
fn parses_empty_module() {
    let (file, diags) = parse_file("module a;", "a.src", true);
    assert!(diags.is_empty());
    let file = file.expect("empty module should still parse");
    assert_eq!(file.module.as_dotted(), "a");
    assert!(file.bodies.is_empty());
}

#[test]
fn parses_zero_init_global() {
    let (file, diags) = parse_file("module a; int x;", "a.src", true);
    assert!(diags.is_empty());
    let file = file.unwrap();
    assert_eq!(file.bodies.len(), 1);
    assert!(matches!(&file.bodies[0].kind, TopDeclKind::VarDef { names, .. } if names[0].name == "x"));
}

#[test]
fn parses_simple_function_with_return() {
    let (file, diags) = parse_file("module a; int f(int x) { return x + 1; }", "a.src", true);
    assert!(diags.is_empty());
    let file = file.unwrap();
    match &file.bodies[0].kind {
        TopDeclKind::FunctionDef { name, params, body, .. } => {
            assert_eq!(name.name, "f");
            assert_eq!(params.len(), 1);
            match &body.kind {
                StmtKind::Compound { stmts, .. } => {
                    assert_eq!(stmts.len(), 1);
                    assert!(matches!(stmts[0].kind, StmtKind::Return { value: Some(_) }));
                }
                _ => panic!("expected a compound body"),
            }
        }
        _ => panic!("expected a function definition"),
    }
}

#[test]
fn parses_overloaded_functions() {
    let (file, diags) = parse_file(
        "module a; int f(int x) { return x; } int f(double x) { return 0; }",
        "a.src",
        true,
    );
    assert!(diags.is_empty());
    assert_eq!(file.unwrap().bodies.len(), 2);
}

#[test]
fn parses_if_else() {
    let (file, diags) = parse_file(
        "module a; int f() { if (a < b) x = 1; else x = 2; return 0; }",
        "a.src",
        true,
    );
    assert!(diags.is_empty());
    let file = file.unwrap();
    let TopDeclKind::FunctionDef { body, .. } = &file.bodies[0].kind else {
        panic!("expected function");
    };
    let StmtKind::Compound { stmts, .. } = &body.kind else {
        panic!("expected compound");
    };
    assert!(matches!(stmts[0].kind, StmtKind::If { .. }));
}

#[test]
fn recovers_from_missing_semicolon_at_top_level() {
    let (file, diags) = parse_file("module a; int x int y;", "a.src", true);
    assert!(diags.errored());
    let file = file.expect("recovery should still produce a File node");
    assert_eq!(file.bodies.len(), 2);
}

#[test]
fn struct_with_zero_fields_is_syntactically_permitted_but_flagged_later() {
    // The parser itself accepts an empty body; the zero-fields rule is a
    // binder-level check (spec.md §4.1 attributes the error to the `{`,
    // captured here as `brace_span` and threaded into the binder).
    let (file, diags) = parse_file("module a; struct S { }; ", "a.src", true);
    assert!(diags.is_empty());
    let file = file.unwrap();
    assert!(matches!(&file.bodies[0].kind, TopDeclKind::StructDecl { fields, .. } if fields.is_empty()));
}

#[test]
fn parses_enum_with_explicit_and_implicit_values() {
    let (file, diags) = parse_file("module a; enum E { A = 5, B, C = 10 }; ", "a.src", true);
    assert!(diags.is_empty());
    let file = file.unwrap();
    match &file.bodies[0].kind {
        TopDeclKind::EnumDecl { constants, .. } => {
            assert_eq!(constants.len(), 3);
            assert_eq!(constants[0].initializer, Some(5));
            assert_eq!(constants[1].initializer, None);
            assert_eq!(constants[2].initializer, Some(10));
        }
        _ => panic!("expected an enum declaration"),
    }
}

#[test]
fn parses_scoped_identifier_in_expression() {
    let (file, diags) = parse_file("module a; int f() { return other::g(); }", "a.src", true);
    assert!(diags.is_empty());
    assert!(file.is_some());
}
