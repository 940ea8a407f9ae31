//! Monotonic label generation (spec.md §5: "labels are allocated from a
//! per-driver monotonic counter with two flavors... distinguished by
//! prefix"). Matches the `L_code_NNN`/`L_data_NNN` naming spec.md §8's
//! worked examples use for presentation.

#[derive(Default)]
pub struct LabelGenerator {
    next_code: u64,
    next_data: u64,
}

impl LabelGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code_label(&mut self) -> String {
        let n = self.next_code;
        self.next_code += 1;
        format!("L_code_{n}")
    }

    pub fn data_label(&mut self) -> String {
        let n = self.next_data;
        self.next_data += 1;
        format!("L_data_{n}")
    }
}
