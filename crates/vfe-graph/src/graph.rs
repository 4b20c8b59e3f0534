//! The constructed variable/equation graph and its builder.

use tracing::{debug, info};
use vfe_core::{
    EquIdx, EquMask, FuseFieldIdentity, FuseValue, MAX_EQUATIONS, MAX_VARIABLES, VarIdx, VarMask,
    VfeError, VfeResult,
};

use crate::deps;
use crate::equation::Equation;
use crate::group::ObjGroup;
use crate::validate;
use crate::variable::{Override, Variable};

/// Builder for the VFE graph.
///
/// Add decoded variables and equations, then call `build()` to validate
/// references and run the dependency passes.
#[derive(Debug)]
pub struct VfeGraphBuilder {
    vars: ObjGroup<Variable>,
    equs: ObjGroup<Equation>,
    polling_period_ms: u8,
}

impl VfeGraphBuilder {
    /// Allocate groups sized to the table's declared entry counts.
    pub fn new(var_slots: usize, equ_slots: usize) -> VfeResult<Self> {
        Ok(Self {
            vars: ObjGroup::with_slots("variable", var_slots, MAX_VARIABLES)?,
            equs: ObjGroup::with_slots("equation", equ_slots, MAX_EQUATIONS)?,
            polling_period_ms: 0,
        })
    }

    pub fn set_polling_period_ms(&mut self, period: u8) {
        self.polling_period_ms = period;
    }

    pub fn add_variable(&mut self, var: Variable) -> VfeResult<()> {
        self.vars.insert(var.index.index(), var)
    }

    pub fn add_equation(&mut self, equ: Equation) -> VfeResult<()> {
        self.equs.insert(equ.index.index(), equ)
    }

    pub fn variable(&self, idx: VarIdx) -> Option<&Variable> {
        self.vars.get(idx.index())
    }

    /// Replace the override of a single variable.
    pub fn set_override(&mut self, idx: VarIdx, value: Override) -> VfeResult<()> {
        let len = self.vars.slot_count();
        let slot = self
            .vars
            .get_mut(idx.index())
            .and_then(|v| v.kind.value_override_mut())
            .ok_or(VfeError::InvalidOperandIndex {
                what: "override target",
                entry: idx.index(),
                index: idx.index(),
                len,
            })?;
        *slot = value;
        Ok(())
    }

    /// Check every operand, branch and chain reference against the groups.
    pub fn validate(&self) -> VfeResult<()> {
        validate::validate_references(&self.vars, &self.equs)
    }

    /// Validate and freeze into an immutable `VfeGraph`.
    pub fn build(mut self) -> VfeResult<VfeGraph> {
        self.validate()?;

        deps::build_depends_on(&mut self.vars)?;
        deps::invert_depends_on(&mut self.vars);
        deps::build_dependent_equations(&mut self.vars, &self.equs);

        info!(
            variables = self.vars.len(),
            equations = self.equs.len(),
            "VFE dependency graph built"
        );

        Ok(VfeGraph {
            vars: self.vars,
            equs: self.equs,
            polling_period_ms: self.polling_period_ms,
        })
    }
}

/// Validated variables and equations with populated dependency masks.
#[derive(Debug, Clone)]
pub struct VfeGraph {
    vars: ObjGroup<Variable>,
    equs: ObjGroup<Equation>,
    polling_period_ms: u8,
}

impl VfeGraph {
    pub fn variables(&self) -> &ObjGroup<Variable> {
        &self.vars
    }

    pub fn equations(&self) -> &ObjGroup<Equation> {
        &self.equs
    }

    pub fn variable(&self, idx: VarIdx) -> Option<&Variable> {
        self.vars.get(idx.index())
    }

    pub fn equation(&self, idx: EquIdx) -> Option<&Equation> {
        self.equs.get(idx.index())
    }

    pub fn polling_period_ms(&self) -> u8 {
        self.polling_period_ms
    }

    /// Populated variable slots.
    pub fn variable_mask(&self) -> VarMask {
        self.vars.indices().collect()
    }

    /// Populated equation slots.
    pub fn equation_mask(&self) -> EquMask {
        self.equs.indices().collect()
    }

    /// Follow `next` links from `root`.
    pub fn chain(&self, root: EquIdx) -> VfeResult<Vec<EquIdx>> {
        let mut seen = EquMask::new();
        let mut out = Vec::new();
        let mut cursor = Some(root);
        while let Some(idx) = cursor {
            let equ = self
                .equation(idx)
                .ok_or(VfeError::InvalidOperandIndex {
                    what: "equation chain",
                    entry: root.index(),
                    index: idx.index(),
                    len: self.equs.slot_count(),
                })?;
            if seen.contains(idx.index()) {
                return Err(VfeError::DependencyCycle {
                    what: "equation",
                    index: idx.index(),
                });
            }
            seen.set(idx.index());
            out.push(idx);
            cursor = equ.next;
        }
        Ok(out)
    }

    /// Variables and equations to recompute when `changed` changes.
    pub fn invalidation_set(&self, changed: VarIdx) -> (VarMask, EquMask) {
        let Some(var) = self.variable(changed) else {
            return (VarMask::new(), EquMask::new());
        };
        let mut stale_vars = var.deps.depended_on_by;
        stale_vars.set(changed.index());
        let mut stale_equs = EquMask::new();
        for v in stale_vars.iter() {
            if let Some(dependent) = self.vars.get(v) {
                stale_equs.union_with(&dependent.deps.dependent_equations);
            }
        }
        (stale_vars, stale_equs)
    }

    /// The sensed-fuse variable constructed with `identity`.
    pub fn find_sensed_fuse(&self, identity: FuseFieldIdentity) -> Option<&Variable> {
        self.vars
            .iter()
            .map(|(_, v)| v)
            .find(|v| v.kind.fuse_identity() == Some(identity))
    }

    /// Store a fresh reading in a sensed-fuse variable. Returns `false` if
    /// `idx` is not a sensed fuse.
    pub fn refresh_fuse_cache(&mut self, idx: VarIdx, value: FuseValue) -> bool {
        match self
            .vars
            .get_mut(idx.index())
            .and_then(|v| v.kind.fuse_sensing_mut())
        {
            Some(sensing) => {
                sensing.cached = Some(value);
                debug!(var = idx.index(), %value, "refreshed fuse cache");
                true
            }
            None => false,
        }
    }
}
