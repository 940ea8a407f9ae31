use std::fs;
use tlc_cli::{run, CliArgs};

fn args(inputs: Vec<std::path::PathBuf>, out_dir: Option<std::path::PathBuf>) -> CliArgs {
    CliArgs { inputs, include: Vec::new(), out_dir, verbose: 0, dump_ast: false, dump_ir: false, json: false }
}

#[test]
fn a_clean_program_produces_no_diagnostics_and_full_ir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.t");
    fs::write(&path, "module main; int add(int x, int y) { return x + y; }").unwrap();

    let results = run(&args(vec![path.clone()], None)).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].diagnostics.is_empty());
    assert!(results[0].fragments.is_some());
}

#[test]
fn a_type_error_is_reported_and_translation_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.t");
    fs::write(&path, "module main; int f() { return; }").unwrap();

    let results = run(&args(vec![path], None)).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].diagnostics.errored());
    assert!(results[0].fragments.is_none());
}

#[test]
fn a_directory_of_files_is_discovered_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.t"), "module a; int f() { return 1; }").unwrap();
    fs::write(dir.path().join("b.t"), "module b; int g() { return 2; }").unwrap();
    fs::write(dir.path().join("readme.md"), "not a source file").unwrap();

    let results = run(&args(vec![dir.path().to_path_buf()], None)).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.diagnostics.is_empty()));
}

#[test]
fn a_cross_file_import_resolves_through_pass_a_before_pass_b() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("lib.t"), "module lib; int helper() { return 1; }").unwrap();
    fs::write(
        dir.path().join("main.t"),
        "module main; import lib; int f() { return lib::helper(); }",
    )
    .unwrap();

    let results = run(&args(vec![dir.path().to_path_buf()], None)).unwrap();
    assert_eq!(results.len(), 2);
    assert!(
        results.iter().all(|r| r.diagnostics.is_empty()),
        "cross-file import should resolve cleanly: {:?}",
        results.iter().map(|r| r.diagnostics.to_string()).collect::<Vec<_>>()
    );
}

#[test]
fn dump_ir_writes_a_json_fragment_file_per_module() {
    let src_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    fs::write(src_dir.path().join("main.t"), "module main; int f() { return 1; }").unwrap();

    let mut cli_args = args(vec![src_dir.path().to_path_buf()], Some(out_dir.path().to_path_buf()));
    cli_args.dump_ir = true;
    cli_args.json = true;
    run(&cli_args).unwrap();

    let dumped = fs::read_to_string(out_dir.path().join("main.ir.json")).unwrap();
    assert!(dumped.contains("Text"), "IR dump should contain the function fragment: {dumped}");
}
