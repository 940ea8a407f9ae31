//! Name mangling (spec.md §4.4), grounded directly on
//! `original_source/src/main/translate/translate.c`'s `mangleModuleName`/
//! `mangleType`/`mangleVarName`/`mangleFunctionName` family, which this
//! implementation follows opcode-for-opcode in its encoding table.

use tlc_common::KeywordType;
use tlc_types::Type;

/// `__Z` followed by, for each dot-separated module segment, its length and
/// text.
#[must_use]
pub fn mangle_module(module: &str) -> String {
    let mut out = String::from("__Z");
    for segment in module.split('.').filter(|s| !s.is_empty()) {
        out.push_str(&segment.len().to_string());
        out.push_str(segment);
    }
    out
}

/// The mangled name of a global variable: module prefix, then the
/// identifier's length and text.
#[must_use]
pub fn mangle_variable(module: &str, name: &str) -> String {
    format!("{}{}{}", mangle_module(module), name.len(), name)
}

/// The mangled name of one overload: module prefix, identifier, then the
/// compact encoding of its argument types (spec.md §4.4's table).
#[must_use]
pub fn mangle_function(module: &str, name: &str, arg_types: &[Type]) -> String {
    let mut out = mangle_variable(module, name);
    for ty in arg_types {
        out.push_str(&mangle_type(ty));
    }
    out
}

/// Encodes one type per spec.md §4.4's table. `Type::Reference` does not
/// carry its defining module (spec.md's `Type` is module-agnostic by
/// design), so named types mangle by identifier text alone rather than a
/// fully module-qualified name; see DESIGN.md.
#[must_use]
pub fn mangle_type(ty: &Type) -> String {
    match ty {
        Type::Keyword(k) => keyword_encoding(*k).to_string(),
        Type::Qualified { base, is_const: true, .. } => format!("C{}", mangle_type(base)),
        Type::Qualified { base, .. } => mangle_type(base),
        Type::Array { length, element } => format!("A{}{}", length, mangle_type(element)),
        Type::Pointer(inner) => format!("P{}", mangle_type(inner)),
        Type::FunPtr { return_type, arg_types } => {
            let args: String = arg_types.iter().map(mangle_type).collect();
            format!("F{}{args}", mangle_type(return_type))
        }
        Type::Reference { name, .. } => format!("T{}{}", name.len(), name),
        Type::NullPointer | Type::AggregateInit(_) => {
            tlc_common::ice!(tlc_common::Span::synthetic(), "attempted to mangle an unexpressable type ({ty:?})")
        }
    }
}

fn keyword_encoding(k: KeywordType) -> &'static str {
    match k {
        KeywordType::Void => "v",
        KeywordType::Ubyte => "ub",
        KeywordType::Byte => "sb",
        KeywordType::Char => "c",
        KeywordType::Ushort => "us",
        KeywordType::Short => "ss",
        KeywordType::Uint => "ui",
        KeywordType::Int => "si",
        KeywordType::Wchar => "w",
        KeywordType::Ulong => "ul",
        KeywordType::Long => "sl",
        KeywordType::Float => "f",
        KeywordType::Double => "d",
        KeywordType::Bool => "B",
    }
}
