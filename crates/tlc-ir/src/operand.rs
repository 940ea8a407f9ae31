//! IR operands (spec.md §3.5).

use serde::{Deserialize, Serialize};
use tlc_types::TypeKind;

/// The allocation-class hint a temp carries, reused directly from
/// `tlc_types::TypeKind` rather than a parallel `AllocHint` enum: a temp's
/// storage class is exactly the `kindOf` of the value it holds.
pub type AllocHint = TypeKind;

/// One operand of an [`crate::entry::IrEntry`] (spec.md §3.5).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// A uniquely numbered temporary, sized and aligned for its value, with
    /// an allocation hint the (not-yet-implemented) register allocator would
    /// consult.
    Temp { n: u64, size: u64, alignment: u64, hint: AllocHint },
    /// A target-specific physical register index. Never produced by the
    /// translator itself in this implementation (no register allocator
    /// exists); reserved for the calling-convention placeholders the minimal
    /// stack frame uses (see `frame.rs`).
    Reg { n: u64 },
    /// An integer constant, truncated to `size` bytes by the consumer.
    Constant { size: u64, bits: u64 },
    /// A global name, generally a mangled label.
    Name { label: String },
    /// A verbatim inline-assembly payload (the `asm` statement).
    Asm { code: String },
    /// A narrow string literal's bytes, NUL-terminated when lowered into a
    /// rodata fragment.
    Str { bytes: Vec<u8> },
    /// A wide string literal's code points, NUL-terminated when lowered.
    WStr { chars: Vec<u32> },
    /// An offset from the current frame's base.
    StackOffset { offset: i64 },
}

impl Operand {
    #[must_use]
    pub fn name(label: impl Into<String>) -> Self {
        Operand::Name { label: label.into() }
    }

    #[must_use]
    pub fn constant(size: u64, bits: u64) -> Self {
        Operand::Constant { size, bits }
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Temp { n, size, alignment, hint } => {
                write!(f, "TEMP({n}, {size}, {alignment}, {hint:?})")
            }
            Operand::Reg { n } => write!(f, "REG({n})"),
            Operand::Constant { bits, .. } => write!(f, "CONST(0x{bits:X})"),
            Operand::Name { label } => write!(f, "NAME({label})"),
            Operand::Asm { code } => write!(f, "ASM({code})"),
            Operand::Str { bytes } => write!(f, "STRING({})", String::from_utf8_lossy(bytes)),
            Operand::WStr { chars } => {
                write!(f, "WSTRING(")?;
                for &c in chars {
                    write!(f, "{}", char::from_u32(c).unwrap_or('\u{FFFD}'))?;
                }
                write!(f, ")")
            }
            Operand::StackOffset { offset } => write!(f, "OFFSET({offset})"),
        }
    }
}
