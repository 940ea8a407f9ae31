//! Opaque index types shared across crate boundaries.
//!
//! The syntax tree (in `tlc-parser`) needs to hold "this identifier resolved
//! to symbol N" and "this expression has type N" without depending on
//! `tlc-binder`/`tlc-types`, which themselves depend on the syntax tree. A
//! `(arena, index)` style pair breaks the cycle: these are just newtyped
//! integers, and the owning arena lives in the crate that understands what
//! they index into (see spec.md §9, "prefer an arena... references are
//! `(tableId, index)` pairs rather than naked pointers").

use serde::{Deserialize, Serialize};

macro_rules! index_newtype {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            #[must_use]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                $name(value as u32)
            }
        }
    };
}

index_newtype!(SymbolId);
index_newtype!(TableId);
index_newtype!(TypeId);
