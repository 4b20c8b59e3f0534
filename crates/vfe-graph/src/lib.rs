//! vfe-graph: variable/equation model and dependency graph.
//!
//! Provides:
//! - The indexed object-group container (`ObjGroup`)
//! - Variable and equation hierarchies as closed enums
//! - A builder that validates references and computes dependency masks
//! - Read-only traversal (equation chains, invalidation sets, DOT export)
//!
//! # Example
//!
//! ```
//! use vfe_core::{OutputRange, VarIdx};
//! use vfe_graph::{DerivedOperands, SingleVoltage, Variable, VariableKind, VfeGraphBuilder};
//!
//! let mut builder = VfeGraphBuilder::new(3, 0).unwrap();
//! let v = |i: u8| VarIdx::from(i);
//! builder
//!     .add_variable(Variable::new(v(0), OutputRange::default(),
//!         VariableKind::SingleVoltage(SingleVoltage::default())))
//!     .unwrap();
//! builder
//!     .add_variable(Variable::new(v(1), OutputRange::default(),
//!         VariableKind::SingleVoltage(SingleVoltage::default())))
//!     .unwrap();
//! builder
//!     .add_variable(Variable::new(v(2), OutputRange::default(),
//!         VariableKind::DerivedSum(DerivedOperands { lhs: v(0), rhs: v(1) })))
//!     .unwrap();
//! let graph = builder.build().unwrap();
//!
//! let sum = graph.variable(v(2)).unwrap();
//! assert_eq!(sum.depends_on().iter().collect::<Vec<_>>(), vec![0, 1]);
//! ```

pub mod dot;
pub mod equation;
pub mod graph;
pub mod group;
pub mod param;
pub mod variable;

mod deps;
mod validate;

// Re-exports for ergonomics
pub use dot::dependency_dot;
pub use equation::{
    Compare, CompareFunction, Equation, EquationKind, EquationType, MinMax, QuadraticN,
};
pub use graph::{VfeGraph, VfeGraphBuilder};
pub use group::ObjGroup;
pub use param::ParameterSlot;
pub use variable::{
    Dependencies, DerivedOperands, FuseField, FuseSegment, FuseSensing, MAX_FUSE_SEGMENTS,
    Override, SensedFuse, SensedFuse20, SensedTemperature, SingleCallerSpecified,
    SingleFrequency, SingleVoltage, Variable, VariableKind, VariableType,
};
