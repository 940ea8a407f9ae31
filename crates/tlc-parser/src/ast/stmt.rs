//! Statement syntax tree nodes (spec.md §3.2).

use crate::ast::expr::Expr;
use crate::ast::ident::Identifier;
use crate::ast::types::TypeExpr;
use std::cell::Cell;
use tlc_common::{Span, TableId};

/// One `case` clause: one or more matched literal values sharing a body.
#[derive(Clone, Debug)]
pub struct SwitchCase {
    pub values: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SwitchDefault {
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    Compound {
        stmts: Vec<Stmt>,
        symbols: Cell<Option<TableId>>,
    },
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
        symbols: Cell<Option<TableId>>,
    },
    Switch {
        scrutinee: Expr,
        cases: Vec<SwitchCase>,
        default: Option<SwitchDefault>,
        symbols: Cell<Option<TableId>>,
    },
    Break,
    Continue,
    Return {
        value: Option<Expr>,
    },
    Asm {
        code: String,
    },
    Expr(Expr),
    Null,
    VarDecl {
        ty: TypeExpr,
        names: Vec<Identifier>,
        initializers: Vec<Option<Expr>>,
    },
}

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    #[must_use]
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}
