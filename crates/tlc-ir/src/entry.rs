//! A three-address code entry (spec.md §3.5).

use crate::op::IrOp;
use crate::operand::Operand;
use serde::{Deserialize, Serialize};

/// One three-address code. Operand positions are prescribed by `op`
/// (spec.md §3.5); this implementation does not attempt to enforce that
/// shape at the type level, matching the original's single flat struct.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IrEntry {
    pub op: IrOp,
    pub op_size: u64,
    pub dest: Option<Operand>,
    pub arg1: Option<Operand>,
    pub arg2: Option<Operand>,
}

impl IrEntry {
    #[must_use]
    pub fn label(label: Operand) -> Self {
        IrEntry { op: IrOp::Label, op_size: 0, dest: None, arg1: Some(label), arg2: None }
    }

    #[must_use]
    pub fn jump(target: Operand) -> Self {
        IrEntry { op: IrOp::Jump, op_size: 0, dest: Some(target), arg1: None, arg2: None }
    }

    #[must_use]
    pub fn cjump(op: IrOp, size: u64, target: Operand, lhs: Operand, rhs: Operand) -> Self {
        IrEntry { op, op_size: size, dest: Some(target), arg1: Some(lhs), arg2: Some(rhs) }
    }

    #[must_use]
    pub fn r#move(size: u64, dest: Operand, source: Operand) -> Self {
        IrEntry { op: IrOp::Move, op_size: size, dest: Some(dest), arg1: Some(source), arg2: None }
    }

    #[must_use]
    pub fn binop(op: IrOp, size: u64, dest: Operand, arg1: Operand, arg2: Operand) -> Self {
        IrEntry { op, op_size: size, dest: Some(dest), arg1: Some(arg1), arg2: Some(arg2) }
    }

    #[must_use]
    pub fn unop(op: IrOp, size: u64, dest: Operand, arg: Operand) -> Self {
        IrEntry { op, op_size: size, dest: Some(dest), arg1: Some(arg), arg2: None }
    }

    #[must_use]
    pub fn call(who: Operand) -> Self {
        IrEntry { op: IrOp::Call, op_size: 0, dest: None, arg1: Some(who), arg2: None }
    }

    #[must_use]
    pub fn r#return() -> Self {
        IrEntry { op: IrOp::Return, op_size: 0, dest: None, arg1: None, arg2: None }
    }

    #[must_use]
    pub fn constant(size: u64, value: Operand) -> Self {
        IrEntry { op: IrOp::Const, op_size: size, dest: None, arg1: Some(value), arg2: None }
    }

    #[must_use]
    pub fn asm(code: Operand) -> Self {
        IrEntry { op: IrOp::Asm, op_size: 0, dest: None, arg1: Some(code), arg2: None }
    }
}

impl std::fmt::Display for IrEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.op.mnemonic())?;
        let mut first = true;
        if !matches!(self.op, IrOp::Asm | IrOp::Label | IrOp::Jump | IrOp::Call | IrOp::Return) {
            write!(f, "{}", self.op_size)?;
            first = false;
        }
        for operand in [&self.dest, &self.arg1, &self.arg2].into_iter().flatten() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{operand}")?;
            first = false;
        }
        write!(f, ")")
    }
}
