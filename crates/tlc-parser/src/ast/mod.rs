//! The syntax tree (spec.md §3.2).
//!
//! Each node owns its children exclusively; destroying a node (in Rust,
//! dropping it) destroys its children exactly once, via ordinary `Box`/`Vec`
//! ownership — there is no reference counting in the tree itself. Resolved
//! identifiers and result types are stored as indices into arenas owned
//! elsewhere (`tlc-binder`, `tlc-types`), never as raw pointers into them.

pub mod decl;
pub mod expr;
pub mod ident;
pub mod stmt;
pub mod types;

pub use decl::{EnumConstant, FieldDecl, File, Import, Param, TopDecl, TopDeclKind};
pub use expr::{AssignOp, BinOp, CmpOp, Expr, ExprKind, LiteralValue, UnOp};
pub use ident::{Identifier, ModulePath, ScopedId};
pub use stmt::{Stmt, StmtKind, SwitchCase, SwitchDefault};
pub use tlc_common::KeywordType;
pub use types::TypeExpr;
