//! Arenas owning symbol entries and scope tables by stable index (spec.md
//! §9: "prefer an arena that owns every symbol entry and hand out stable
//! indices").

use crate::entry::SymbolEntry;
use rustc_hash::FxHashMap;
use tlc_common::{SymbolId, TableId};
use tlc_types::{ReferenceLookup, TypeKind};

#[derive(Default)]
pub struct SymbolArena {
    entries: Vec<SymbolEntry>,
}

impl SymbolArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, entry: SymbolEntry) -> SymbolId {
        let id = SymbolId::from(self.entries.len());
        self.entries.push(entry);
        id
    }

    #[must_use]
    pub fn get(&self, id: SymbolId) -> &SymbolEntry {
        &self.entries[id.index()]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut SymbolEntry {
        &mut self.entries[id.index()]
    }
}

impl ReferenceLookup for SymbolArena {
    fn size_of(&self, symbol: SymbolId) -> u64 {
        use crate::entry::TypeDefKind::*;
        match self.get(symbol).as_type_definition() {
            Some(Struct { fields, .. }) => {
                let mut total = 0u64;
                for field in fields {
                    let align = field.ty.align_of(self);
                    if align > 0 {
                        total = total.div_ceil(align) * align;
                    }
                    total += field.ty.size_of(self);
                }
                let align = self.align_of(symbol).max(1);
                total.div_ceil(align) * align
            }
            Some(Union { options, .. }) => options.iter().map(|o| o.ty.size_of(self)).max().unwrap_or(0),
            Some(Opaque) => 0,
            Some(Enum { .. }) => tlc_common::limits::INT_WIDTH,
            Some(Typedef { target }) => target.size_of(self),
            None => 0,
        }
    }

    fn align_of(&self, symbol: SymbolId) -> u64 {
        use crate::entry::TypeDefKind::*;
        match self.get(symbol).as_type_definition() {
            Some(Struct { fields, .. }) => fields.iter().map(|f| f.ty.align_of(self)).max().unwrap_or(1),
            Some(Union { options, .. }) => options.iter().map(|o| o.ty.align_of(self)).max().unwrap_or(1),
            Some(Opaque) => 1,
            Some(Enum { .. }) => tlc_common::limits::INT_WIDTH,
            Some(Typedef { target }) => target.align_of(self),
            None => 1,
        }
    }

    fn kind_of(&self, symbol: SymbolId) -> TypeKind {
        use crate::entry::TypeDefKind::*;
        match self.get(symbol).as_type_definition() {
            Some(Struct { .. } | Union { .. } | Opaque) => TypeKind::Memory,
            Some(Enum { .. }) => TypeKind::GeneralPurpose,
            Some(Typedef { target }) => target.kind_of(self),
            None => TypeKind::GeneralPurpose,
        }
    }
}

/// One lexical scope: a name map plus a link to its enclosing scope.
#[derive(Default)]
pub struct SymbolTable {
    names: FxHashMap<String, SymbolId>,
    pub parent: Option<TableId>,
}

impl SymbolTable {
    #[must_use]
    pub fn with_parent(parent: Option<TableId>) -> Self {
        SymbolTable {
            names: FxHashMap::default(),
            parent,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, id: SymbolId) -> Option<SymbolId> {
        self.names.insert(name.into(), id)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.names.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = (&str, SymbolId)> {
        self.names.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[derive(Default)]
pub struct TableArena {
    tables: Vec<SymbolTable>,
}

impl TableArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, table: SymbolTable) -> TableId {
        let id = TableId::from(self.tables.len());
        self.tables.push(table);
        id
    }

    #[must_use]
    pub fn get(&self, id: TableId) -> &SymbolTable {
        &self.tables[id.index()]
    }

    pub fn get_mut(&mut self, id: TableId) -> &mut SymbolTable {
        &mut self.tables[id.index()]
    }
}
