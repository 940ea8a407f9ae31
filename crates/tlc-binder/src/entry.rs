//! Symbol table entries (spec.md §3.4).

use tlc_types::Type;

/// One field of a struct, or one option of a union.
#[derive(Clone, Debug)]
pub struct Member {
    pub name: String,
    pub ty: Type,
}

#[derive(Clone, Debug)]
pub enum TypeDefKind {
    Struct {
        incomplete: bool,
        fields: Vec<Member>,
    },
    Union {
        incomplete: bool,
        options: Vec<Member>,
    },
    /// Declared with the `opaque` keyword: deliberately never completed, used
    /// only behind a pointer (spec.md §3.2's `Opaque` top-level form). Kept
    /// distinct from a forward-declared `Struct`/`Union` so that an
    /// incomplete opaque type is not mistaken for an unfinished forward
    /// declaration when checking spec.md §3.4's "no entry is incomplete
    /// after pass 2" invariant.
    Opaque,
    Enum {
        incomplete: bool,
        constant_names: Vec<String>,
        constant_values: Vec<i64>,
    },
    Typedef {
        target: Type,
    },
}

impl TypeDefKind {
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        match self {
            TypeDefKind::Struct { incomplete, .. } | TypeDefKind::Union { incomplete, .. } | TypeDefKind::Enum { incomplete, .. } => *incomplete,
            TypeDefKind::Opaque | TypeDefKind::Typedef { .. } => false,
        }
    }
}

/// One overload of a function group (spec.md §3.4).
#[derive(Clone, Debug)]
pub struct Overload {
    pub return_type: Type,
    pub arg_types: Vec<Type>,
    pub has_body: bool,
}

/// One entry in a symbol table (spec.md §3.4).
#[derive(Clone, Debug)]
pub enum SymbolEntry {
    Variable {
        ty: Type,
        /// Whether this variable's address is observed (via `&x` or being
        /// passed by reference), which the frame uses to decide whether a
        /// local may live entirely in a register (spec.md §4.5's
        /// `allocLocal(type, escapes)`).
        escapes: bool,
    },
    TypeDefinition(TypeDefKind),
    /// An overload set sharing one unqualified name (spec.md §3.4: "two
    /// entries with the same name must not coexist... except inside a
    /// function group").
    FunctionGroup(Vec<Overload>),
}

impl SymbolEntry {
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, SymbolEntry::TypeDefinition(kind) if kind.is_incomplete())
    }

    #[must_use]
    pub fn as_type_definition(&self) -> Option<&TypeDefKind> {
        match self {
            SymbolEntry::TypeDefinition(kind) => Some(kind),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_function_group(&self) -> Option<&[Overload]> {
        match self {
            SymbolEntry::FunctionGroup(overloads) => Some(overloads),
            _ => None,
        }
    }
}
