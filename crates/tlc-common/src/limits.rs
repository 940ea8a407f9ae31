//! Target size/alignment table and integer limits (spec.md §6.1).
//!
//! These are compile-time constants for the one target this compiler knows
//! about: a conventional little-endian LP64-ish machine. `tlc-types` is the
//! only crate that should need to read these directly; everything else goes
//! through `Type::size_of`/`Type::align_of`.

pub const BYTE_WIDTH: u64 = 1;
pub const SHORT_WIDTH: u64 = 2;
pub const INT_WIDTH: u64 = 4;
pub const LONG_WIDTH: u64 = 8;
pub const FLOAT_WIDTH: u64 = 4;
pub const DOUBLE_WIDTH: u64 = 8;
pub const POINTER_WIDTH: u64 = LONG_WIDTH;
pub const CHAR_WIDTH: u64 = BYTE_WIDTH;
pub const WCHAR_WIDTH: u64 = INT_WIDTH;
pub const BOOL_WIDTH: u64 = BYTE_WIDTH;

pub const UBYTE_MAX: u64 = u8::MAX as u64;
pub const BYTE_MAX: i64 = i8::MAX as i64;
pub const BYTE_MIN: i64 = i8::MIN as i64;
pub const USHORT_MAX: u64 = u16::MAX as u64;
pub const SHORT_MAX: i64 = i16::MAX as i64;
pub const SHORT_MIN: i64 = i16::MIN as i64;
pub const UINT_MAX: u64 = u32::MAX as u64;
pub const INT_MAX: i64 = i32::MAX as i64;
pub const INT_MIN: i64 = i32::MIN as i64;
pub const ULONG_MAX: u64 = u64::MAX;
pub const LONG_MAX: i64 = i64::MAX;
pub const LONG_MIN: i64 = i64::MIN;

/// Compiler version string, surfaced via `tlc --version`.
pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");
