//! Top-level declarations and the file root (spec.md §3.2).

use crate::ast::ident::{Identifier, ModulePath};
use crate::ast::stmt::Stmt;
use crate::ast::types::TypeExpr;
use crate::ast::expr::Expr;
use std::cell::Cell;
use tlc_common::{Span, TableId};

#[derive(Clone, Debug)]
pub struct Param {
    pub ty: TypeExpr,
    pub name: Option<Identifier>,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct EnumConstant {
    pub name: Identifier,
    pub initializer: Option<i64>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub ty: TypeExpr,
    pub name: Identifier,
}

#[derive(Clone, Debug)]
pub enum TopDeclKind {
    FunctionDef {
        return_type: TypeExpr,
        name: Identifier,
        params: Vec<Param>,
        body: Box<Stmt>,
        local_symbols: Cell<Option<TableId>>,
    },
    FunctionDecl {
        return_type: TypeExpr,
        name: Identifier,
        params: Vec<Param>,
    },
    VarDef {
        ty: TypeExpr,
        names: Vec<Identifier>,
        initializers: Vec<Option<Expr>>,
    },
    Opaque {
        name: Identifier,
    },
    StructDecl {
        name: Identifier,
        fields: Vec<FieldDecl>,
        brace_span: Span,
    },
    UnionDecl {
        name: Identifier,
        options: Vec<FieldDecl>,
        brace_span: Span,
    },
    EnumDecl {
        name: Identifier,
        constants: Vec<EnumConstant>,
    },
    TypedefDecl {
        target: TypeExpr,
        name: Identifier,
    },
}

#[derive(Clone, Debug)]
pub struct TopDecl {
    pub kind: TopDeclKind,
    pub span: Span,
}

impl TopDecl {
    #[must_use]
    pub fn new(kind: TopDeclKind, span: Span) -> Self {
        TopDecl { kind, span }
    }

    #[must_use]
    pub fn name(&self) -> &Identifier {
        match &self.kind {
            TopDeclKind::FunctionDef { name, .. }
            | TopDeclKind::FunctionDecl { name, .. }
            | TopDeclKind::Opaque { name, .. }
            | TopDeclKind::StructDecl { name, .. }
            | TopDeclKind::UnionDecl { name, .. }
            | TopDeclKind::EnumDecl { name, .. }
            | TopDeclKind::TypedefDecl { name, .. } => name,
            TopDeclKind::VarDef { names, .. } => {
                names.first().expect("variable declaration always names at least one variable")
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Import {
    pub path: ModulePath,
    pub span: Span,
}

/// The root of one file's syntax tree.
pub struct File {
    pub module: ModulePath,
    pub imports: Vec<Import>,
    pub bodies: Vec<TopDecl>,
    pub symbols: Cell<Option<TableId>>,
    pub filename: String,
}
