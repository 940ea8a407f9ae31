//! Owns every semantic [`Type`] the checker produces, handing out the
//! `TypeId`s that expression nodes' `resultType` cells carry (spec.md §3.2).

use tlc_common::TypeId;
use tlc_types::Type;

#[derive(Default)]
pub struct TypeArena {
    types: Vec<Type>,
}

impl TypeArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, ty: Type) -> TypeId {
        let id = TypeId::from(self.types.len());
        self.types.push(ty);
        id
    }

    #[must_use]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }
}
