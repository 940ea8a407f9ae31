use super::*;
use tlc_common::DiagnosticBag;
use tlc_parser::parse_file;

fn bind_one(src: &str) -> (Binder, FileScope, DiagnosticBag) {
    let (file, mut diags) = parse_file(src, "a.src", true);
    let file = file.expect("source should parse");
    let mut binder = Binder::new();
    let scope = binder.pass_a(&file, &mut diags);
    let imports = binder.resolve_imports(&file, &mut diags);
    binder.pass_b(&file, scope.top_level, &imports, &mut diags);
    (binder, scope, diags)
}

#[test]
fn variable_declaration_is_visible_in_the_module_table() {
    let (binder, scope, diags) = bind_one("module a; int x;");
    assert!(diags.is_empty());
    let id = binder.tables.get(scope.top_level).get("x").expect("x should be bound");
    assert!(matches!(binder.symbols.get(id), SymbolEntry::Variable { .. }));
}

#[test]
fn duplicate_top_level_name_is_an_error() {
    let (_binder, _scope, diags) = bind_one("module a; int x; int x;");
    assert!(diags.errored());
}

#[test]
fn overloads_with_distinct_argument_lists_coexist() {
    let (binder, scope, diags) = bind_one("module a; int f(int x) { return x; } int f(double x) { return 0; }");
    assert!(diags.is_empty());
    let id = binder.tables.get(scope.top_level).get("f").unwrap();
    let SymbolEntry::FunctionGroup(overloads) = binder.symbols.get(id) else {
        panic!("expected a function group");
    };
    assert_eq!(overloads.len(), 2);
}

#[test]
fn duplicate_overload_signature_is_rejected() {
    let (_binder, _scope, diags) = bind_one("module a; int f(int x) { return x; } int f(int y) { return y; }");
    assert!(diags.errored());
}

#[test]
fn self_referential_struct_completes_the_forward_placeholder() {
    let (binder, scope, diags) = bind_one("module a; struct Node { Node* next; int value; };");
    assert!(diags.is_empty());
    let id = binder.tables.get(scope.top_level).get("Node").unwrap();
    match binder.symbols.get(id) {
        SymbolEntry::TypeDefinition(TypeDefKind::Struct { incomplete, fields }) => {
            assert!(!incomplete);
            assert_eq!(fields.len(), 2);
        }
        other => panic!("expected a completed struct, got {other:?}"),
    }
}

#[test]
fn zero_field_struct_is_rejected_with_the_error_attributed_to_its_brace() {
    let (_binder, _scope, diags) = bind_one("module a; struct Empty { };");
    assert!(diags.errored());
    let diagnostic = diags.iter().next().expect("a diagnostic should have been recorded");
    // "struct" starts at column 11; the error must point at the `{` (column 24),
    // not the keyword, per spec.md §4.1.
    assert_eq!(diagnostic.span.column, 24, "zero-field error should be attributed to the `{{`, not the struct keyword");
}

#[test]
fn enum_constants_default_to_previous_plus_one() {
    let (binder, scope, diags) = bind_one("module a; enum Color { Red, Green, Blue = 10, Purple };");
    assert!(diags.is_empty());
    let id = binder.tables.get(scope.top_level).get("Color").unwrap();
    let SymbolEntry::TypeDefinition(TypeDefKind::Enum { constant_values, .. }) = binder.symbols.get(id) else {
        panic!("expected an enum");
    };
    assert_eq!(constant_values, &[0, 1, 10, 11]);
}

#[test]
fn local_variable_shadows_an_outer_one_in_a_nested_scope() {
    let (_binder, _scope, diags) = bind_one(
        "module a; int f(int x) { { int x; x = 1; } return x; }",
    );
    assert!(diags.is_empty());
}

#[test]
fn identifier_in_function_body_resolves_to_its_parameter() {
    let (file, mut diags) = parse_file("module a; int f(int x) { return x; }", "a.src", true);
    let file = file.unwrap();
    let mut binder = Binder::new();
    let scope = binder.pass_a(&file, &mut diags);
    let imports = binder.resolve_imports(&file, &mut diags);
    binder.pass_b(&file, scope.top_level, &imports, &mut diags);
    assert!(diags.is_empty());

    let tlc_parser::ast::TopDeclKind::FunctionDef { body, .. } = &file.bodies[0].kind else {
        panic!("expected a function definition");
    };
    let tlc_parser::ast::StmtKind::Compound { stmts, .. } = &body.kind else {
        panic!("expected a compound body");
    };
    let tlc_parser::ast::StmtKind::Return { value: Some(expr) } = &stmts[0].kind else {
        panic!("expected a return statement");
    };
    let tlc_parser::ast::ExprKind::Identifier(ident) = &expr.kind else {
        panic!("expected an identifier expression");
    };
    assert!(ident.resolved.get().is_some());
}

#[test]
fn unknown_identifier_is_a_resolution_error() {
    let (_binder, _scope, diags) = bind_one("module a; int f() { return undeclared_name; }");
    assert!(diags.errored());
}
