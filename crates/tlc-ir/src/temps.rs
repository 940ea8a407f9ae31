//! A per-function linear allocator for temporary numbers (spec.md §3.5,
//! grounded on `original_source/src/main/ir/ir.h`'s `TempAllocator`).

#[derive(Default)]
pub struct TempAllocator {
    next: u64,
}

impl TempAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> u64 {
        let n = self.next;
        self.next += 1;
        n
    }
}
