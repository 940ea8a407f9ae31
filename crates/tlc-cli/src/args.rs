use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the `tlc` compiler driver (SPEC_FULL.md's
/// ambient CLI surface).
#[derive(Parser, Debug)]
#[command(name = "tlc", version, about = "The tlc compiler")]
pub struct CliArgs {
    /// Source files and directories to compile. Directories are searched
    /// recursively for `.t` files.
    #[arg(value_name = "PATH", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Additional module search directories, searched the same way as the
    /// inputs, for files reachable only via `import`.
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    pub include: Vec<PathBuf>,

    /// Directory to write `--dump-ast`/`--dump-ir` artifacts into.
    #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Increase log verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Dump each file's parsed syntax tree to `<out-dir>/<module>.ast.txt`.
    #[arg(long = "dump-ast")]
    pub dump_ast: bool,

    /// Dump each file's translated IR fragments to `<out-dir>/<module>.ir.txt`.
    #[arg(long = "dump-ir")]
    pub dump_ir: bool,

    /// Emit diagnostics and `--dump-ir` output as JSON instead of plain text.
    #[arg(long = "json")]
    pub json: bool,
}
