//! Frame and access collaborators (spec.md §4.5). Per spec.md §9's design
//! note these are kept as trait-style interfaces, not a closed enum, since
//! a real backend would add target-specific variants; the syntax tree and
//! IR itself stay closed sum types by contrast.
//!
//! [`StackMachineFrame`] is the one implementation this crate ships: every
//! escaping local/argument gets a stack slot, everything else lives in a
//! fresh temp. It exists so the pipeline is runnable end to end; it does
//! not perform instruction selection or register allocation (out of scope
//! per SPEC_FULL.md), so `scopeEnd` never emits slot-release code and
//! `generateEntryExit` never emits a real prologue/epilogue — only the
//! single exit label and the `RETURN` opcode every function needs.

use crate::entry::IrEntry;
use crate::fragment::FrameInfo;
use crate::labels::LabelGenerator;
use crate::operand::Operand;
use crate::temps::TempAllocator;
use tlc_types::Type;

/// A polymorphic handle for loading from / storing to a named entity
/// without exposing its storage class (spec.md GLOSSARY, §4.5).
pub trait Access {
    /// Emits whatever IR is needed to produce this access's current value
    /// into `out`, returning the operand holding it.
    fn load(&self, temps: &mut TempAllocator, out: &mut Vec<IrEntry>) -> Operand;

    /// Emits whatever IR is needed to store `value` into this access.
    fn store(&self, out: &mut Vec<IrEntry>, value: Operand);

    /// The access's label, for the global variant only.
    fn label(&self) -> Option<&str> {
        None
    }
}

/// Backed by a mangled label in static storage.
pub struct GlobalAccess {
    pub label: String,
    pub size: u64,
}

impl Access for GlobalAccess {
    fn load(&self, temps: &mut TempAllocator, out: &mut Vec<IrEntry>) -> Operand {
        let dest = fresh_temp(temps, self.size);
        out.push(IrEntry::r#move(self.size, dest.clone(), Operand::name(&self.label)));
        dest
    }

    fn store(&self, out: &mut Vec<IrEntry>, value: Operand) {
        out.push(IrEntry::r#move(self.size, Operand::name(&self.label), value));
    }

    fn label(&self) -> Option<&str> {
        Some(&self.label)
    }
}

/// Backed by a temp number: non-escaping locals and arguments, which never
/// need a stable address.
pub struct TempAccess {
    pub n: u64,
    pub size: u64,
    pub hint: tlc_types::TypeKind,
}

impl TempAccess {
    fn operand(&self) -> Operand {
        Operand::Temp { n: self.n, size: self.size, alignment: self.size, hint: self.hint }
    }
}

impl Access for TempAccess {
    fn load(&self, _temps: &mut TempAllocator, _out: &mut Vec<IrEntry>) -> Operand {
        self.operand()
    }

    fn store(&self, out: &mut Vec<IrEntry>, value: Operand) {
        out.push(IrEntry::r#move(self.size, self.operand(), value));
    }
}

/// Backed by a frame offset: a local or argument whose address has been
/// observed (spec.md §4.5's `allocLocal(type, escapes)`).
pub struct StackAccess {
    pub offset: i64,
    pub size: u64,
}

impl Access for StackAccess {
    fn load(&self, temps: &mut TempAllocator, out: &mut Vec<IrEntry>) -> Operand {
        let dest = fresh_temp(temps, self.size);
        out.push(IrEntry {
            op: crate::op::IrOp::StkLoad,
            op_size: self.size,
            dest: Some(dest.clone()),
            arg1: Some(Operand::StackOffset { offset: self.offset }),
            arg2: None,
        });
        dest
    }

    fn store(&self, out: &mut Vec<IrEntry>, value: Operand) {
        out.push(IrEntry {
            op: crate::op::IrOp::StkStore,
            op_size: self.size,
            dest: Some(Operand::StackOffset { offset: self.offset }),
            arg1: Some(value),
            arg2: None,
        });
    }
}

fn fresh_temp(temps: &mut TempAllocator, size: u64) -> Operand {
    Operand::Temp {
        n: temps.allocate(),
        size,
        alignment: size,
        hint: tlc_types::TypeKind::GeneralPurpose,
    }
}

/// The per-function layout manager that issues accesses and emits
/// entry/exit code (spec.md §4.5, GLOSSARY). `lookup` resolves
/// `Type::Reference` sizes through the binder's symbol arena (spec.md §9's
/// arena-and-indices design).
pub trait Frame {
    fn alloc_arg(&mut self, ty: &Type, escapes: bool, lookup: &dyn tlc_types::ReferenceLookup) -> Box<dyn Access>;
    fn alloc_ret_val(&mut self, ty: &Type, lookup: &dyn tlc_types::ReferenceLookup) -> Option<Box<dyn Access>>;
    fn alloc_local(&mut self, ty: &Type, escapes: bool, lookup: &dyn tlc_types::ReferenceLookup) -> Box<dyn Access>;
    fn scope_start(&mut self);
    fn scope_end(&mut self, body: Vec<IrEntry>) -> Vec<IrEntry>;
    fn generate_entry_exit(&mut self, body: Vec<IrEntry>) -> Vec<IrEntry>;
    /// The label every `return` statement jumps to (spec.md §4.4).
    fn exit_label(&self) -> &str;
    fn info(&self) -> FrameInfo;
}

pub struct StackMachineFrame {
    exit_label: String,
    next_offset: i64,
    arg_count: usize,
    temps: TempAllocator,
    scope_marks: Vec<i64>,
}

impl StackMachineFrame {
    #[must_use]
    pub fn new(labels: &mut LabelGenerator) -> Self {
        StackMachineFrame {
            exit_label: labels.code_label(),
            next_offset: 0,
            arg_count: 0,
            temps: TempAllocator::new(),
            scope_marks: Vec::new(),
        }
    }

    fn alloc_stack_slot(&mut self, size: u64) -> i64 {
        let offset = self.next_offset;
        self.next_offset += size.max(1) as i64;
        offset
    }

    /// Allocates a temp for an intermediate value that has no symbol behind
    /// it (an arithmetic result, a call's argument slot, a branch's joined
    /// value). Distinct from `alloc_local`, which backs a *named* variable.
    #[must_use]
    pub fn fresh_temp(&mut self, size: u64, hint: tlc_types::TypeKind) -> Operand {
        Operand::Temp { n: self.temps.allocate(), size, alignment: size.max(1), hint }
    }

    /// The function's single temp allocator, for callers that need to drive
    /// an [`Access::load`] themselves rather than going through `alloc_*`.
    pub fn temps_mut(&mut self) -> &mut TempAllocator {
        &mut self.temps
    }
}

fn size_of_kind(ty: &Type, lookup: &dyn tlc_types::ReferenceLookup) -> (u64, tlc_types::TypeKind) {
    (ty.size_of(lookup), ty.kind_of(lookup))
}

impl StackMachineFrame {
    fn alloc_slot(&mut self, ty: &Type, escapes: bool, lookup: &dyn tlc_types::ReferenceLookup) -> Box<dyn Access> {
        let (size, hint) = size_of_kind(ty, lookup);
        if escapes {
            let offset = self.alloc_stack_slot(size);
            Box::new(StackAccess { offset, size })
        } else {
            Box::new(TempAccess { n: self.temps.allocate(), size, hint })
        }
    }
}

impl Frame for StackMachineFrame {
    fn alloc_arg(&mut self, ty: &Type, escapes: bool, lookup: &dyn tlc_types::ReferenceLookup) -> Box<dyn Access> {
        self.arg_count += 1;
        self.alloc_slot(ty, escapes, lookup)
    }

    fn alloc_ret_val(&mut self, ty: &Type, lookup: &dyn tlc_types::ReferenceLookup) -> Option<Box<dyn Access>> {
        if matches!(ty.as_keyword(), Some(tlc_common::KeywordType::Void)) {
            return None;
        }
        let (size, hint) = size_of_kind(ty, lookup);
        Some(Box::new(TempAccess { n: self.temps.allocate(), size, hint }))
    }

    fn alloc_local(&mut self, ty: &Type, escapes: bool, lookup: &dyn tlc_types::ReferenceLookup) -> Box<dyn Access> {
        self.alloc_slot(ty, escapes, lookup)
    }

    fn scope_start(&mut self) {
        self.scope_marks.push(self.next_offset);
    }

    fn scope_end(&mut self, body: Vec<IrEntry>) -> Vec<IrEntry> {
        self.scope_marks.pop();
        body
    }

    fn generate_entry_exit(&mut self, mut body: Vec<IrEntry>) -> Vec<IrEntry> {
        body.push(IrEntry::label(Operand::name(self.exit_label.clone())));
        body.push(IrEntry::r#return());
        body
    }

    fn exit_label(&self) -> &str {
        &self.exit_label
    }

    fn info(&self) -> FrameInfo {
        FrameInfo { arg_count: self.arg_count, frame_size: self.next_offset.max(0) as u64 }
    }
}
