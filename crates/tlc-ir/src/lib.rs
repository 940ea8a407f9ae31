//! Three-address IR and the translator that lowers a checked file into it
//! (spec.md §3.5, §4.4, §4.5).

mod entry;
mod fragment;
mod frame;
mod labels;
mod mangle;
mod op;
mod operand;
mod temps;
mod translate;
#[cfg(test)]
#[path = "tests/translate_tests.rs"]
mod tests;

pub use entry::IrEntry;
pub use fragment::{Fragment, FrameInfo};
pub use frame::{Access, Frame, GlobalAccess, StackAccess, StackMachineFrame, TempAccess};
pub use labels::LabelGenerator;
pub use mangle::{mangle_function, mangle_module, mangle_type, mangle_variable};
pub use op::IrOp;
pub use operand::{AllocHint, Operand};
pub use temps::TempAllocator;
pub use translate::translate_file;
