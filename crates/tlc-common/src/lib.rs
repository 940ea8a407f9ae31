//! Common types and utilities shared by every tlc crate.
//!
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`Span`, `Spanned`)
//! - Diagnostic accumulation (`Diagnostic`, `DiagnosticBag`)
//! - The target size/alignment/limit table (`limits`)
//! - The internal-compiler-error helper (`ice!`)

pub mod diagnostics;
pub mod ice;
pub mod ids;
pub mod interner;
pub mod keyword;
pub mod limits;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticBag, Severity};
pub use ids::{SymbolId, TableId, TypeId};
pub use interner::{Atom, Interner};
pub use keyword::KeywordType;
pub use span::{Span, Spanned};
