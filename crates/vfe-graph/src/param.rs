//! Indirect operands used by generalized equations.

use serde::Serialize;
use vfe_core::{EquIdx, VarIdx};

/// A literal, or a reference resolved by the coprocessor at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParameterSlot {
    Literal(u32),
    Variable(VarIdx),
    Equation(EquIdx),
}

impl ParameterSlot {
    pub fn variable(&self) -> Option<VarIdx> {
        match *self {
            ParameterSlot::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn equation(&self) -> Option<EquIdx> {
        match *self {
            ParameterSlot::Equation(e) => Some(e),
            _ => None,
        }
    }
}
