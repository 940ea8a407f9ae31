//! Fragments: the atomic units of translator output (spec.md §3.5).

use crate::entry::IrEntry;
use serde::{Deserialize, Serialize};

/// A snapshot of a function's frame layout, carried by a [`Fragment::Text`]
/// for whatever later stage would consume it. Instruction selection and
/// register allocation are out of scope for this implementation (see
/// `frame.rs`), so this holds only the sizes a debugger or disassembler
/// would want, not a live `Frame` object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameInfo {
    pub arg_count: usize,
    pub frame_size: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Fragment {
    Bss {
        label: String,
        size: u64,
        alignment: u64,
    },
    Rodata {
        label: String,
        alignment: u64,
        entries: Vec<IrEntry>,
    },
    Data {
        label: String,
        alignment: u64,
        entries: Vec<IrEntry>,
    },
    Text {
        label: String,
        frame: FrameInfo,
        entries: Vec<IrEntry>,
    },
}

impl Fragment {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Fragment::Bss { label, .. }
            | Fragment::Rodata { label, .. }
            | Fragment::Data { label, .. }
            | Fragment::Text { label, .. } => label,
        }
    }
}

impl std::fmt::Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fragment::Bss { label, size, alignment } => {
                writeln!(f, "{label}: bss, aligned to {alignment} bytes, size {size}")
            }
            Fragment::Data { label, alignment, entries } => {
                writeln!(f, "{label}: data, aligned to {alignment} bytes:")?;
                print_entries(f, entries)
            }
            Fragment::Rodata { label, alignment, entries } => {
                writeln!(f, "{label}: read-only data, aligned to {alignment} bytes:")?;
                print_entries(f, entries)
            }
            Fragment::Text { label, entries, .. } => {
                writeln!(f, "{label}: function body:")?;
                print_entries(f, entries)
            }
        }
    }
}

fn print_entries(f: &mut std::fmt::Formatter<'_>, entries: &[IrEntry]) -> std::fmt::Result {
    for entry in entries {
        writeln!(f, "{entry}")?;
    }
    Ok(())
}
