//! VFE equations.

use serde::Serialize;
use vfe_core::{EquIdx, OutputRange, OutputUnit, VarIdx};

use crate::param::ParameterSlot;

/// Firmware type tag of an equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EquationType {
    Quadratic,
    MinMax,
    Compare,
    Scalar,
    QuadraticN,
}

impl EquationType {
    pub fn code(self) -> u8 {
        match self {
            EquationType::Quadratic => 0x01,
            EquationType::MinMax => 0x02,
            EquationType::Compare => 0x03,
            EquationType::Scalar => 0x04,
            EquationType::QuadraticN => 0x05,
        }
    }
}

/// Comparison applied by a compare equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompareFunction {
    Equal,
    GreaterOrEqual,
    Greater,
}

impl TryFrom<u8> for CompareFunction {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Equal),
            1 => Ok(Self::GreaterOrEqual),
            2 => Ok(Self::Greater),
            other => Err(other),
        }
    }
}

impl From<CompareFunction> for u8 {
    fn from(f: CompareFunction) -> u8 {
        match f {
            CompareFunction::Equal => 0,
            CompareFunction::GreaterOrEqual => 1,
            CompareFunction::Greater => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Compare {
    pub function: CompareFunction,
    pub criteria: u32,
    pub if_true: EquIdx,
    pub if_false: EquIdx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinMax {
    pub take_max: bool,
    pub a: EquIdx,
    pub b: EquIdx,
}

/// Second-order polynomial over up to three inputs.
///
/// `k` inputs need `(k+1)(k+2)/2` coefficients: 3, 6 or 10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuadraticN {
    pub inputs: Vec<ParameterSlot>,
    pub coeffs: Vec<ParameterSlot>,
}

impl QuadraticN {
    pub const MAX_INPUTS: usize = 3;
    pub const MAX_COEFFS: usize = 10;

    /// Coefficient count for `inputs` inputs.
    pub fn coeff_count(inputs: usize) -> usize {
        (inputs + 1) * (inputs + 2) / 2
    }

    /// All parameters, inputs first.
    pub fn params(&self) -> impl Iterator<Item = &ParameterSlot> + '_ {
        self.inputs.iter().chain(self.coeffs.iter())
    }
}

/// Per-type payload of an equation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EquationKind {
    Compare(Compare),
    MinMax(MinMax),
    Quadratic { coeffs: [u32; 3] },
    QuadraticN(QuadraticN),
    Scalar { scaled: EquIdx },
}

impl EquationKind {
    pub fn equ_type(&self) -> EquationType {
        match self {
            EquationKind::Compare(_) => EquationType::Compare,
            EquationKind::MinMax(_) => EquationType::MinMax,
            EquationKind::Quadratic { .. } => EquationType::Quadratic,
            EquationKind::QuadraticN(_) => EquationType::QuadraticN,
            EquationKind::Scalar { .. } => EquationType::Scalar,
        }
    }

    /// Equations referenced by this payload (chain link excluded).
    pub fn equation_refs(&self) -> Vec<(&'static str, EquIdx)> {
        match self {
            EquationKind::Compare(c) => vec![
                ("compare true branch", c.if_true),
                ("compare false branch", c.if_false),
            ],
            EquationKind::MinMax(m) => vec![("min/max operand", m.a), ("min/max operand", m.b)],
            EquationKind::Quadratic { .. } => Vec::new(),
            EquationKind::QuadraticN(q) => q
                .params()
                .filter_map(ParameterSlot::equation)
                .map(|e| ("equation parameter", e))
                .collect(),
            EquationKind::Scalar { scaled } => vec![("scaled equation", *scaled)],
        }
    }
}

/// A VFE equation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equation {
    pub index: EquIdx,
    /// Variable the equation evaluates over.
    pub operand_var: Option<VarIdx>,
    /// Next link in an equation chain.
    pub next: Option<EquIdx>,
    pub output_range: OutputRange,
    pub output_unit: OutputUnit,
    pub kind: EquationKind,
}

impl Equation {
    pub fn equ_type(&self) -> EquationType {
        self.kind.equ_type()
    }

    /// Variables read directly by this equation.
    pub fn variable_refs(&self) -> Vec<VarIdx> {
        let mut vars: Vec<VarIdx> = self.operand_var.into_iter().collect();
        if let EquationKind::QuadraticN(q) = &self.kind {
            vars.extend(q.params().filter_map(ParameterSlot::variable));
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_n_coefficient_counts() {
        assert_eq!(QuadraticN::coeff_count(1), 3);
        assert_eq!(QuadraticN::coeff_count(2), 6);
        assert_eq!(QuadraticN::coeff_count(3), 10);
    }

    #[test]
    fn compare_function_codes() {
        assert_eq!(CompareFunction::try_from(1), Ok(CompareFunction::GreaterOrEqual));
        assert_eq!(CompareFunction::try_from(3), Err(3));
    }

    #[test]
    fn variable_refs_include_parameters() {
        let eq = Equation {
            index: EquIdx::from(0),
            operand_var: Some(VarIdx::from(2)),
            next: None,
            output_range: OutputRange::default(),
            output_unit: OutputUnit::VoltUv,
            kind: EquationKind::QuadraticN(QuadraticN {
                inputs: vec![ParameterSlot::Variable(VarIdx::from(5))],
                coeffs: vec![
                    ParameterSlot::Literal(1),
                    ParameterSlot::Equation(EquIdx::from(3)),
                    ParameterSlot::Variable(VarIdx::from(7)),
                ],
            }),
        };
        let vars: Vec<usize> = eq.variable_refs().iter().map(|v| v.index()).collect();
        assert_eq!(vars, vec![2, 5, 7]);
        assert_eq!(eq.kind.equation_refs().len(), 1);
    }
}
