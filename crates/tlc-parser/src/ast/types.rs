//! Syntactic types (spec.md §3.2, §3.1).

use crate::ast::ident::ScopedId;
use tlc_common::{KeywordType, Span};

/// A type as written in source, before resolution. Named references are
/// resolved to struct/union/enum/typedef entries by the binder and checker,
/// not here.
#[derive(Clone, Debug)]
pub enum TypeExpr {
    Keyword {
        kind: KeywordType,
        span: Span,
    },
    Qualified {
        base: Box<TypeExpr>,
        is_const: bool,
        is_volatile: bool,
        span: Span,
    },
    Pointer {
        base: Box<TypeExpr>,
        span: Span,
    },
    Array {
        length: u64,
        element: Box<TypeExpr>,
        span: Span,
    },
    FunPtr {
        return_type: Box<TypeExpr>,
        arg_types: Vec<TypeExpr>,
        span: Span,
    },
    Named(ScopedId),
}

impl TypeExpr {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Keyword { span, .. }
            | TypeExpr::Qualified { span, .. }
            | TypeExpr::Pointer { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::FunPtr { span, .. } => *span,
            TypeExpr::Named(scoped) => scoped.span,
        }
    }
}
