use super::*;
use tlc_common::{KeywordType, SymbolId};

struct NoReferences;
impl ReferenceLookup for NoReferences {
    fn size_of(&self, _symbol: SymbolId) -> u64 {
        unreachable!("tests in this module never construct a Reference type")
    }
    fn align_of(&self, _symbol: SymbolId) -> u64 {
        unreachable!()
    }
    fn kind_of(&self, _symbol: SymbolId) -> TypeKind {
        unreachable!()
    }
}

#[test]
fn qualified_size_and_align_match_the_base_type() {
    let lookup = NoReferences;
    let base = Type::Keyword(KeywordType::Int);
    let qualified = Type::qualified(base.clone(), true, false);
    assert_eq!(base.size_of(&lookup), qualified.size_of(&lookup));
    assert_eq!(base.align_of(&lookup), qualified.align_of(&lookup));
}

#[test]
fn qualifiers_never_nest() {
    let inner = Type::qualified(Type::Keyword(KeywordType::Int), true, false);
    let outer = Type::qualified(inner, false, true);
    match outer {
        Type::Qualified { base, is_const, is_volatile } => {
            assert!(is_const);
            assert!(is_volatile);
            assert!(matches!(*base, Type::Keyword(KeywordType::Int)));
        }
        _ => panic!("expected a single flattened Qualified node"),
    }
}

#[test]
fn equal_is_reflexive_symmetric_and_transitive() {
    let a = Type::qualified(Type::Keyword(KeywordType::Int), true, false);
    let b = Type::qualified(Type::Keyword(KeywordType::Int), true, false);
    let c = Type::qualified(Type::Keyword(KeywordType::Int), true, false);
    assert!(a.equal(&a));
    assert!(a.equal(&b) == b.equal(&a));
    assert!(a.equal(&b) && b.equal(&c) && a.equal(&c));
}

#[test]
fn implicit_convertibility_is_reflexive() {
    let t = Type::Pointer(Box::new(Type::Keyword(KeywordType::Char)));
    assert!(implicitly_convertible(&t, &t));
}

#[test]
fn unsigned_to_wider_signed_is_implicit() {
    assert!(implicitly_convertible(
        &Type::Keyword(KeywordType::Ubyte),
        &Type::Keyword(KeywordType::Int)
    ));
}

#[test]
fn narrowing_is_never_implicit() {
    assert!(!implicitly_convertible(
        &Type::Keyword(KeywordType::Int),
        &Type::Keyword(KeywordType::Short)
    ));
    assert!(explicitly_convertible(
        &Type::Keyword(KeywordType::Int),
        &Type::Keyword(KeywordType::Short)
    ));
}

#[test]
fn null_converts_to_and_from_any_pointer() {
    let p = Type::Pointer(Box::new(Type::Keyword(KeywordType::Int)));
    assert!(implicitly_convertible(&Type::NullPointer, &p));
    assert!(implicitly_convertible(&p, &Type::NullPointer));
}

#[test]
fn plain_to_const_pointer_is_implicit_but_not_reverse() {
    let mut_ptr = Type::Pointer(Box::new(Type::Keyword(KeywordType::Int)));
    let const_ptr = Type::Pointer(Box::new(Type::qualified(Type::Keyword(KeywordType::Int), true, false)));
    assert!(implicitly_convertible(&mut_ptr, &const_ptr));
    assert!(!implicitly_convertible(&const_ptr, &mut_ptr));
}

#[test]
fn common_type_prefers_unsigned_on_equal_width_ties() {
    let ty = common_type(&Type::Keyword(KeywordType::Int), &Type::Keyword(KeywordType::Uint)).unwrap();
    assert_eq!(ty, Type::Keyword(KeywordType::Uint));
}

#[test]
fn common_type_widens_to_float_when_either_operand_is_floating() {
    let ty = common_type(&Type::Keyword(KeywordType::Int), &Type::Keyword(KeywordType::Float)).unwrap();
    assert_eq!(ty, Type::Keyword(KeywordType::Float));
}
