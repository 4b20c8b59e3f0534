//! Dependency mask construction.
//!
//! Pass 1 computes `depends_on` (memoized, cycle-checked), pass 2 inverts it
//! into `depended_on_by`, pass 3 records which equations read each variable.

use tracing::debug;
use vfe_core::{VarMask, VfeError, VfeResult};

use crate::equation::Equation;
use crate::group::ObjGroup;
use crate::variable::Variable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    NotStarted,
    InProgress,
    Done,
}

/// Pass 1: `depends_on` and `is_dynamic` for every variable.
pub(crate) fn build_depends_on(vars: &mut ObjGroup<Variable>) -> VfeResult<()> {
    let mut state = vec![BuildState::NotStarted; vars.slot_count()];
    let indices: Vec<usize> = vars.indices().collect();
    for idx in indices {
        visit(vars, &mut state, idx, idx)?;
    }
    Ok(())
}

fn visit(
    vars: &mut ObjGroup<Variable>,
    state: &mut [BuildState],
    idx: usize,
    referrer: usize,
) -> VfeResult<(VarMask, bool)> {
    let Some(var) = vars.get(idx) else {
        return Err(VfeError::InvalidOperandIndex {
            what: "derived operand",
            entry: referrer,
            index: idx,
            len: vars.slot_count(),
        });
    };

    match state[idx] {
        BuildState::Done => {
            return Ok((var.deps.depends_on, var.deps.is_dynamic.unwrap_or(true)));
        }
        BuildState::InProgress => {
            return Err(VfeError::DependencyCycle {
                what: "variable",
                index: idx,
            });
        }
        BuildState::NotStarted => {}
    }

    let self_mask = VarMask::with_var(var.index);
    let leaf_dynamic = var.kind.leaf_is_dynamic();
    let operands = var.kind.operands();
    state[idx] = BuildState::InProgress;

    let (mask, dynamic) = match operands {
        None => (self_mask, leaf_dynamic.unwrap_or(true)),
        Some(ops) => {
            let (lhs_mask, lhs_dynamic) = visit(vars, state, ops.lhs.index(), idx)?;
            let (rhs_mask, rhs_dynamic) = visit(vars, state, ops.rhs.index(), idx)?;
            (lhs_mask.union(&rhs_mask), lhs_dynamic || rhs_dynamic)
        }
    };

    if let Some(var) = vars.get_mut(idx) {
        var.deps.depends_on = mask;
        var.deps.is_dynamic = Some(dynamic);
    }
    state[idx] = BuildState::Done;
    debug!(var = idx, depends_on = ?mask, dynamic, "built depends-on mask");
    Ok((mask, dynamic))
}

/// Pass 2: B in A.depends_on  =>  A in B.depended_on_by.
pub(crate) fn invert_depends_on(vars: &mut ObjGroup<Variable>) {
    let edges: Vec<(usize, usize)> = vars
        .iter()
        .flat_map(|(a, var)| var.deps.depends_on.iter().map(move |b| (a, b)))
        .collect();

    for (_, var) in vars.iter_mut() {
        var.deps.depended_on_by = VarMask::new();
    }
    for (a, b) in edges {
        if let Some(target) = vars.get_mut(b) {
            target.deps.depended_on_by.set(a);
        }
    }
}

/// Pass 3: equations reading each variable directly.
pub(crate) fn build_dependent_equations(
    vars: &mut ObjGroup<Variable>,
    equs: &ObjGroup<Equation>,
) {
    for (e, equ) in equs.iter() {
        for v in equ.variable_refs() {
            if let Some(var) = vars.get_mut(v.index()) {
                var.deps.dependent_equations.set(e);
            }
        }
    }
}
