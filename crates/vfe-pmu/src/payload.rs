//! Messages exchanged with the coprocessor.

use serde::Serialize;
use vfe_core::{EquMask, FuseValue, VarIdx, VarMask};
use vfe_graph::{Equation, Variable, VariableType, VfeGraph};

use crate::error::TransportError;

/// The "construct/set" message: every variable and equation plus the group
/// masks telling the coprocessor which slots are populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VfeSetPayload {
    pub polling_period_ms: u8,
    pub variable_mask: VarMask,
    pub equation_mask: EquMask,
    pub variables: Vec<Variable>,
    pub equations: Vec<Equation>,
}

impl VfeSetPayload {
    pub fn from_graph(graph: &VfeGraph) -> Self {
        Self {
            polling_period_ms: graph.polling_period_ms(),
            variable_mask: graph.variable_mask(),
            equation_mask: graph.equation_mask(),
            variables: graph.variables().iter().map(|(_, v)| v.clone()).collect(),
            equations: graph.equations().iter().map(|(_, e)| e.clone()).collect(),
        }
    }

    /// JSON encoding for transports that ship text.
    pub fn to_json(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|e| TransportError::Marshal {
            command: "construct",
            message: e.to_string(),
        })
    }
}

/// One record of a get-status reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VarStatus {
    pub index: VarIdx,
    /// Type the coprocessor holds for this index; must match the host's.
    pub var_type: VariableType,
    /// Raw reading with its signedness.
    pub value: FuseValue,
    /// Live reading of the paired version fuse, when the variable has one.
    pub version: Option<u32>,
}
