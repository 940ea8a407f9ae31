//! The semantic type system (spec.md §3.3).

use serde::{Deserialize, Serialize};
use tlc_common::KeywordType;
use tlc_common::SymbolId;

/// A resolved, semantic type. Unlike [`tlc_parser`'s syntactic `TypeExpr`],
/// this carries no source location and resolves named references to a
/// symbol table entry by index rather than by name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Type {
    Keyword(KeywordType),
    Qualified {
        base: Box<Type>,
        is_const: bool,
        is_volatile: bool,
    },
    Pointer(Box<Type>),
    Array {
        length: u64,
        element: Box<Type>,
    },
    FunPtr {
        return_type: Box<Type>,
        arg_types: Vec<Type>,
    },
    /// Produced only by the type checker, for an untyped `{ e1, ..., en }`
    /// literal before it is matched against a target struct/array type.
    AggregateInit(Vec<Type>),
    /// A struct/union/enum/typedef name, resolved by entry identity
    /// (spec.md §3.3). `name` is carried only for diagnostics.
    Reference { symbol: SymbolId, name: String },
    /// The type of the `null` literal (spec.md §4.3): implicitly converts
    /// to and from any pointer type, and only a pointer type.
    NullPointer,
}

impl Type {
    /// Constructs a qualified type, flattening nested qualifiers so that
    /// `qualified(qualified(T, c1, v1), c2, v2)` collapses to a single
    /// qualified node over `T` (spec.md §3.3: "qualifiers never nest").
    #[must_use]
    pub fn qualified(base: Type, is_const: bool, is_volatile: bool) -> Type {
        match base {
            Type::Qualified {
                base: inner,
                is_const: c,
                is_volatile: v,
            } => Type::Qualified {
                base: inner,
                is_const: is_const || c,
                is_volatile: is_volatile || v,
            },
            other => Type::Qualified {
                base: Box::new(other),
                is_const,
                is_volatile,
            },
        }
    }

    #[must_use]
    pub fn pointer(base: Type) -> Type {
        Type::Pointer(Box::new(base))
    }

    /// Strips any outer qualifier, exposing the underlying shape.
    #[must_use]
    pub fn unqualified(&self) -> &Type {
        match self {
            Type::Qualified { base, .. } => base.unqualified(),
            other => other,
        }
    }

    #[must_use]
    pub fn is_const(&self) -> bool {
        matches!(self, Type::Qualified { is_const: true, .. })
    }

    #[must_use]
    pub fn as_keyword(&self) -> Option<KeywordType> {
        match self.unqualified() {
            Type::Keyword(k) => Some(*k),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.as_keyword().is_some_and(KeywordType::is_integer)
    }

    #[must_use]
    pub fn is_float(&self) -> bool {
        self.as_keyword().is_some_and(KeywordType::is_float)
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    #[must_use]
    pub fn is_pointer(&self) -> bool {
        matches!(self.unqualified(), Type::Pointer(_) | Type::NullPointer)
    }

    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self.as_keyword(), Some(KeywordType::Bool))
    }
}

/// Structural equality (spec.md §3.3): congruence modulo qualifiers;
/// references compare by entry identity; function-pointer argument lists
/// pointwise; arrays include length.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        use Type::*;
        match (self, other) {
            (Keyword(a), Keyword(b)) => a == b,
            (
                Qualified {
                    base: ba,
                    is_const: ca,
                    is_volatile: va,
                },
                Qualified {
                    base: bb,
                    is_const: cb,
                    is_volatile: vb,
                },
            ) => ca == cb && va == vb && ba == bb,
            (Pointer(a), Pointer(b)) => a == b,
            (
                Array {
                    length: la,
                    element: ea,
                },
                Array {
                    length: lb,
                    element: eb,
                },
            ) => la == lb && ea == eb,
            (
                FunPtr {
                    return_type: ra,
                    arg_types: aa,
                },
                FunPtr {
                    return_type: rb,
                    arg_types: ab,
                },
            ) => ra == rb && aa == ab,
            (AggregateInit(a), AggregateInit(b)) => a == b,
            (Reference { symbol: a, .. }, Reference { symbol: b, .. }) => a == b,
            (NullPointer, NullPointer) => true,
            _ => false,
        }
    }
}
impl Eq for Type {}

impl Type {
    /// Named alias for the `PartialEq` impl, matching spec.md's `equal(a,b)`.
    #[must_use]
    pub fn equal(&self, other: &Type) -> bool {
        self == other
    }
}
