//! `sizeOf`/`alignOf`/`kindOf` (spec.md §3.3), driven by the target-size
//! table in `tlc_common::limits`.

use crate::ty::Type;
use serde::{Deserialize, Serialize};
use tlc_common::{limits, KeywordType, SymbolId};

/// One of the three allocation hints the IR uses when picking a temp's
/// storage class (spec.md §3.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    GeneralPurpose,
    FloatingPoint,
    Memory,
}

/// A `Type::Reference` only carries a `SymbolId`; resolving its size,
/// alignment, and allocation kind requires the struct/union/enum/typedef
/// definition that lives in `tlc-binder`'s symbol arena. This trait is the
/// seam: `tlc-types` depends only on it, and `tlc-binder` is the (sole,
/// expected) implementor, which avoids a `tlc-types` <-> `tlc-binder`
/// circular crate dependency (spec.md §9's arena-and-indices design note).
pub trait ReferenceLookup {
    fn size_of(&self, symbol: SymbolId) -> u64;
    fn align_of(&self, symbol: SymbolId) -> u64;
    fn kind_of(&self, symbol: SymbolId) -> TypeKind;
}

impl Type {
    #[must_use]
    pub fn size_of(&self, lookup: &dyn ReferenceLookup) -> u64 {
        match self {
            Type::Keyword(k) => keyword_width(*k),
            Type::Qualified { base, .. } => base.size_of(lookup),
            Type::Pointer(_) | Type::NullPointer => limits::POINTER_WIDTH,
            Type::Array { length, element } => length * element.size_of(lookup),
            Type::FunPtr { .. } => limits::POINTER_WIDTH,
            Type::AggregateInit(elements) => elements.iter().map(|e| e.size_of(lookup)).sum(),
            Type::Reference { symbol, .. } => lookup.size_of(*symbol),
        }
    }

    #[must_use]
    pub fn align_of(&self, lookup: &dyn ReferenceLookup) -> u64 {
        match self {
            Type::Keyword(k) => keyword_width(*k),
            Type::Qualified { base, .. } => base.align_of(lookup),
            Type::Pointer(_) | Type::NullPointer => limits::POINTER_WIDTH,
            Type::Array { element, .. } => element.align_of(lookup),
            Type::FunPtr { .. } => limits::POINTER_WIDTH,
            Type::AggregateInit(elements) => {
                elements.iter().map(|e| e.align_of(lookup)).max().unwrap_or(1)
            }
            Type::Reference { symbol, .. } => lookup.align_of(*symbol),
        }
    }

    #[must_use]
    pub fn kind_of(&self, lookup: &dyn ReferenceLookup) -> TypeKind {
        match self {
            Type::Keyword(k) if k.is_float() => TypeKind::FloatingPoint,
            Type::Keyword(_) | Type::Pointer(_) | Type::NullPointer | Type::FunPtr { .. } => {
                TypeKind::GeneralPurpose
            }
            Type::Qualified { base, .. } => base.kind_of(lookup),
            Type::Array { .. } | Type::AggregateInit(_) => TypeKind::Memory,
            Type::Reference { symbol, .. } => lookup.kind_of(*symbol),
        }
    }
}

fn keyword_width(k: KeywordType) -> u64 {
    match k {
        KeywordType::Void => 0,
        KeywordType::Ubyte | KeywordType::Byte => limits::BYTE_WIDTH,
        KeywordType::Char => limits::CHAR_WIDTH,
        KeywordType::Ushort | KeywordType::Short => limits::SHORT_WIDTH,
        KeywordType::Uint | KeywordType::Int => limits::INT_WIDTH,
        KeywordType::Wchar => limits::WCHAR_WIDTH,
        KeywordType::Ulong | KeywordType::Long => limits::LONG_WIDTH,
        KeywordType::Float => limits::FLOAT_WIDTH,
        KeywordType::Double => limits::DOUBLE_WIDTH,
        KeywordType::Bool => limits::BOOL_WIDTH,
    }
}
