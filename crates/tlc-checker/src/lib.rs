//! The type checker (spec.md §4.3): per-expression `resultType` annotation,
//! built on `tlc-binder`'s resolved symbol tables and `tlc-types`'s
//! convertibility rules.

mod arena;
mod checker;
#[cfg(test)]
#[path = "tests/checker_tests.rs"]
mod tests;

pub use arena::TypeArena;
pub use checker::check_file;
