//! Internal-compiler-error helper (spec.md §7).
//!
//! An ICE is a violation of an invariant the type checker is supposed to
//! guarantee before translation runs (e.g. a missing `resultType`). These
//! never occur on a well-typed tree; when they do, they are a bug in this
//! compiler, not in the user's program, so they abort immediately with
//! location context rather than being reported as a diagnostic.

use crate::span::Span;

#[macro_export]
macro_rules! ice {
    ($span:expr, $($arg:tt)*) => {
        panic!(
            "internal compiler error at {}: {}",
            $span,
            format!($($arg)*)
        )
    };
}

/// Panics with a uniform message. Prefer the `ice!` macro at call sites; this
/// function exists for callers that already have a formatted string.
pub fn bug(span: Span, message: impl AsRef<str>) -> ! {
    panic!("internal compiler error at {span}: {}", message.as_ref());
}
