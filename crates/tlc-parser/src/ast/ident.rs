//! Identifiers and scoped (`::`-qualified) names (spec.md §3.2).

use std::cell::Cell;
use tlc_common::{Span, SymbolId};

/// A raw name together with its resolved symbol, filled in by the binder.
/// Identity of the resolved symbol (not the name) is what later stages rely
/// on, per spec.md §3.3's `Reference` type.
#[derive(Clone, Debug)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
    pub resolved: Cell<Option<SymbolId>>,
}

impl Identifier {
    #[must_use]
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Identifier {
            name: name.into(),
            span,
            resolved: Cell::new(None),
        }
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A `::`-separated path, e.g. `mymodule::MyEnum::Variant`.
#[derive(Clone, Debug)]
pub struct ScopedId {
    pub segments: Vec<Identifier>,
    pub span: Span,
}

impl ScopedId {
    #[must_use]
    pub fn simple(ident: Identifier) -> Self {
        ScopedId {
            span: ident.span,
            segments: vec![ident],
        }
    }

    #[must_use]
    pub fn last(&self) -> &Identifier {
        self.segments.last().expect("ScopedId is never empty")
    }
}

/// A dot-separated module path, e.g. `a.b.c` (distinct from `ScopedId`'s
/// `::` syntax; used only for `module`/`import` declarations).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModulePath {
    pub segments: Vec<String>,
}

impl ModulePath {
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        ModulePath { segments }
    }

    #[must_use]
    pub fn as_dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl std::fmt::Display for ModulePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_dotted())
    }
}
