//! The `tlc` command-line driver: file discovery, argument parsing, and
//! running the lex/parse/bind/check/translate pipeline over a module graph
//! (SPEC_FULL.md's CLI surface).

pub mod args;
pub mod driver;

pub use args::CliArgs;
pub use driver::{run, FileResult};
