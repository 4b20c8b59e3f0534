//! Reference validation for decoded groups.

use vfe_core::{EquIdx, VarIdx, VfeError, VfeResult};

use crate::equation::Equation;
use crate::group::ObjGroup;
use crate::variable::Variable;

fn check_var(
    vars: &ObjGroup<Variable>,
    what: &'static str,
    entry: usize,
    idx: VarIdx,
) -> VfeResult<()> {
    if vars.get(idx.index()).is_none() {
        return Err(VfeError::InvalidOperandIndex {
            what,
            entry,
            index: idx.index(),
            len: vars.slot_count(),
        });
    }
    Ok(())
}

fn check_equ(
    equs: &ObjGroup<Equation>,
    what: &'static str,
    entry: usize,
    idx: EquIdx,
) -> VfeResult<()> {
    if equs.get(idx.index()).is_none() {
        return Err(VfeError::InvalidOperandIndex {
            what,
            entry,
            index: idx.index(),
            len: equs.slot_count(),
        });
    }
    Ok(())
}

/// Every variable and equation reference must land on a populated slot.
pub(crate) fn validate_references(
    vars: &ObjGroup<Variable>,
    equs: &ObjGroup<Equation>,
) -> VfeResult<()> {
    // Derived operands
    for (i, var) in vars.iter() {
        if let Some(ops) = var.kind.operands() {
            check_var(vars, "derived operand", i, ops.lhs)?;
            check_var(vars, "derived operand", i, ops.rhs)?;
        }
    }

    for (i, equ) in equs.iter() {
        for var in equ.variable_refs() {
            check_var(vars, "equation variable", i, var)?;
        }
        if let Some(next) = equ.next {
            check_equ(equs, "next equation", i, next)?;
        }
        for (what, target) in equ.kind.equation_refs() {
            check_equ(equs, what, i, target)?;
        }
    }

    Ok(())
}
