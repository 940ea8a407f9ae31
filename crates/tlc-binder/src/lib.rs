//! The symbol table (spec.md §3.4) and the two-pass name/scope resolver
//! (spec.md §4.2).

mod arena;
mod entry;
mod pass_b;
mod resolve;
#[cfg(test)]
#[path = "tests/binder_tests.rs"]
mod tests;

pub use arena::{SymbolArena, SymbolTable, TableArena};
pub use entry::{Member, Overload, SymbolEntry, TypeDefKind};
pub use pass_b::ImportResolution;
pub use resolve::{Binder, FileScope, LookupContext, ResolveError};
