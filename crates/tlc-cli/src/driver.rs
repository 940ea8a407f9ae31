//! The pipeline driver (SPEC_FULL.md's CLI surface): discovers source
//! files, runs Pass A over all of them before Pass B over any of them (spec.md
//! §4.2's scheduling model), then checks and translates each file whose
//! binding succeeded.

use crate::args::CliArgs;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tlc_binder::Binder;
use tlc_checker::{check_file, TypeArena};
use tlc_common::DiagnosticBag;
use tlc_ir::{translate_file, Fragment};
use tlc_parser::ast::File as AstFile;
use tlc_parser::parse_file;
use tracing::{debug, info, span, Level};

const SOURCE_EXTENSION: &str = "t";

/// One discovered source file, read but not yet parsed.
struct SourceFile {
    path: PathBuf,
    text: String,
}

/// Per-file outcome carried through the pipeline for reporting and output.
pub struct FileResult {
    pub path: PathBuf,
    pub diagnostics: DiagnosticBag,
    pub ast: Option<AstFile>,
    pub fragments: Option<Vec<Fragment>>,
}

pub fn run(args: &CliArgs) -> Result<Vec<FileResult>> {
    let sources = discover_sources(args)?;
    info!(count = sources.len(), "discovered source files");

    let mut diags_by_file: Vec<DiagnosticBag> = Vec::with_capacity(sources.len());
    let mut asts: Vec<Option<AstFile>> = Vec::with_capacity(sources.len());

    {
        let _span = span!(Level::DEBUG, "parse").entered();
        for source in &sources {
            let (file, diags) = parse_file(&source.text, source.path.display().to_string(), true);
            debug!(file = %source.path.display(), errors = diags.len(), "parsed");
            asts.push(file);
            diags_by_file.push(diags);
        }
    }

    let mut binder = Binder::new();
    let mut scopes = Vec::with_capacity(sources.len());
    {
        // spec.md §4.2: "Pass A for all files, then Pass B for all files" --
        // every file's top-level table must exist before any file's Pass B
        // runs, since imports may be resolved out of dependency order.
        let _span = span!(Level::DEBUG, "bind_pass_a").entered();
        for (i, ast) in asts.iter().enumerate() {
            let scope = ast.as_ref().map(|file| binder.pass_a(file, &mut diags_by_file[i]));
            scopes.push(scope);
        }
    }

    {
        let _span = span!(Level::DEBUG, "bind_pass_b").entered();
        for (i, ast) in asts.iter().enumerate() {
            let (Some(file), Some(scope)) = (ast, &scopes[i]) else { continue };
            let imports = binder.resolve_imports(file, &mut diags_by_file[i]);
            binder.pass_b(file, scope.top_level, &imports, &mut diags_by_file[i]);
        }
    }

    let mut results = Vec::with_capacity(sources.len());
    let mut types = TypeArena::new();
    for (i, source) in sources.into_iter().enumerate() {
        let ast = asts[i].take();
        let mut diags = std::mem::take(&mut diags_by_file[i]);
        let mut fragments = None;

        if let Some(file) = &ast {
            if !diags.errored() {
                let _span = span!(Level::DEBUG, "check", file = %source.path.display()).entered();
                check_file(file, &binder, &mut types, &mut diags);
            }
            if !diags.errored() {
                let _span = span!(Level::DEBUG, "translate", file = %source.path.display()).entered();
                fragments = Some(translate_file(file, &binder, &types, &mut diags));
            }
        }

        results.push(FileResult { path: source.path, diagnostics: diags, ast, fragments });
    }

    if args.dump_ast || args.dump_ir {
        write_dumps(args, &results)?;
    }

    Ok(results)
}

fn discover_sources(args: &CliArgs) -> Result<Vec<SourceFile>> {
    let mut paths = Vec::new();
    for root in args.inputs.iter().chain(args.include.iter()) {
        collect_paths(root, &mut paths)
            .with_context(|| format!("failed to discover source files under {}", root.display()))?;
    }
    paths.sort();
    paths.dedup();

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
        sources.push(SourceFile { path, text });
    }
    Ok(sources)
}

fn collect_paths(root: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if root.is_file() {
        out.push(root.to_path_buf());
        return Ok(());
    }
    for entry in walkdir::WalkDir::new(root).into_iter() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION) {
            out.push(entry.path().to_path_buf());
        }
    }
    Ok(())
}

fn write_dumps(args: &CliArgs, results: &[FileResult]) -> Result<()> {
    let out_dir = args.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;

    for result in results {
        let stem = result.path.file_stem().and_then(|s| s.to_str()).unwrap_or("out");

        if args.dump_ast {
            if let Some(ast) = &result.ast {
                let dest = out_dir.join(format!("{stem}.ast.txt"));
                fs::write(&dest, format!("{ast:#?}")).with_context(|| format!("failed to write {}", dest.display()))?;
            }
        }
        if args.dump_ir {
            if let Some(fragments) = &result.fragments {
                let (ext, rendered) = if args.json {
                    ("ir.json", serde_json::to_string_pretty(fragments)?)
                } else {
                    ("ir.txt", fragments.iter().map(ToString::to_string).collect())
                };
                let dest = out_dir.join(format!("{stem}.{ext}"));
                fs::write(&dest, rendered).with_context(|| format!("failed to write {}", dest.display()))?;
            }
        }
    }
    Ok(())
}
