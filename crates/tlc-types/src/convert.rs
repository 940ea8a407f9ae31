//! Implicit and explicit convertibility (spec.md §4.3).

use crate::ty::Type;
use tlc_common::KeywordType;

/// Silent conversions usable anywhere a value of type `to` is expected.
///
/// Identity; same-sign integer widening; unsigned→signed of strictly larger
/// width; any integer to any float (widening); float widening; any pointer
/// to/from the generic null; `T` to `const T`; `T*` to `const T*`;
/// aggregate-init to matching struct/array. No implicit narrowing.
#[must_use]
pub fn implicitly_convertible(from: &Type, to: &Type) -> bool {
    if from == to {
        return true;
    }

    // T -> const T / volatile T (qualifier gain only).
    if let Type::Qualified {
        base,
        is_const,
        is_volatile,
    } = to
    {
        let unqualified_from = from.unqualified();
        if unqualified_from == base.as_ref() {
            let from_const = from.is_const();
            let from_volatile = matches!(from, Type::Qualified { is_volatile: true, .. });
            if (*is_const || !from_const) && (*is_volatile || !from_volatile) {
                return true;
            }
        }
        if implicitly_convertible(from, base) {
            return true;
        }
    }

    match (from.unqualified(), to.unqualified()) {
        (Type::NullPointer, Type::Pointer(_)) | (Type::Pointer(_), Type::NullPointer) => true,
        (Type::Pointer(from_base), Type::Pointer(to_base)) => {
            // T* -> const T*
            if let Type::Qualified { base, is_const: true, is_volatile: false } = to_base.as_ref() {
                from_base.unqualified() == base.as_ref() || from_base.as_ref() == base.as_ref()
            } else {
                from_base == to_base
            }
        }
        (Type::Keyword(from_kw), Type::Keyword(to_kw)) => keyword_convertible(*from_kw, *to_kw),
        (Type::AggregateInit(elements), Type::Array { length, element }) => {
            elements.len() as u64 == *length && elements.iter().all(|e| implicitly_convertible(e, element))
        }
        _ => false,
    }
}

fn keyword_convertible(from: KeywordType, to: KeywordType) -> bool {
    if from == to {
        return true;
    }
    if from.is_integer() && to.is_float() {
        return true;
    }
    if from.is_float() && to.is_float() {
        return matches!((from, to), (KeywordType::Float, KeywordType::Double));
    }
    if from.is_integer() && to.is_integer() {
        let same_sign_widen = from.is_signed() == to.is_signed() && to.integer_rank() > from.integer_rank();
        let unsigned_to_wider_signed =
            !from.is_signed() && to.is_signed() && to.integer_rank() > from.integer_rank();
        return same_sign_widen || unsigned_to_wider_signed;
    }
    false
}

/// Explicit conversions (`cast(T) e`): a superset of implicit convertibility
/// that also allows numeric narrowing and pointer/pointer and
/// integer/pointer conversions.
#[must_use]
pub fn explicitly_convertible(from: &Type, to: &Type) -> bool {
    if implicitly_convertible(from, to) {
        return true;
    }
    match (from.unqualified(), to.unqualified()) {
        (Type::Keyword(a), Type::Keyword(b)) => a.is_integer() || a.is_float() || b.is_integer() || b.is_float(),
        (Type::Pointer(_), Type::Pointer(_)) => true,
        (Type::Pointer(_), Type::Keyword(k)) | (Type::Keyword(k), Type::Pointer(_)) => k.is_integer(),
        (Type::NullPointer, _) | (_, Type::NullPointer) => true,
        _ => false,
    }
}

/// The common type of two numeric operands in an arithmetic binary op
/// (spec.md §4.3): if either side is floating, widen to the widest float;
/// otherwise widen to the larger integer width, preserving signedness when
/// equal width and preferring unsigned on ties.
#[must_use]
pub fn common_type(a: &Type, b: &Type) -> Option<Type> {
    let (ka, kb) = (a.as_keyword()?, b.as_keyword()?);
    if ka.is_float() || kb.is_float() {
        let widest = match (ka.is_float(), kb.is_float()) {
            (true, true) => {
                if ka.integer_rank() >= kb.integer_rank() {
                    ka
                } else {
                    kb
                }
            }
            (true, false) => ka,
            (false, true) => kb,
            (false, false) => unreachable!(),
        };
        return Some(Type::Keyword(widest));
    }
    if !ka.is_integer() || !kb.is_integer() {
        return None;
    }
    let result = if ka.integer_rank() > kb.integer_rank() {
        ka
    } else if kb.integer_rank() > ka.integer_rank() {
        kb
    } else if ka.is_signed() == kb.is_signed() {
        ka
    } else if ka.is_signed() {
        kb
    } else {
        ka
    };
    Some(Type::Keyword(result))
}
