//! Graphviz export of the dependency graph.

use std::collections::HashMap;

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::VfeGraph;

/// Render operand edges (variable -> derived variable) and read edges
/// (variable -> equation) as DOT.
pub fn dependency_dot(graph: &VfeGraph) -> String {
    let mut g: DiGraph<String, &'static str> = DiGraph::new();
    let mut var_nodes: HashMap<usize, NodeIndex> = HashMap::new();

    for (i, var) in graph.variables().iter() {
        let node = g.add_node(format!("v{i} {:?}", var.var_type()));
        var_nodes.insert(i, node);
    }

    for (i, var) in graph.variables().iter() {
        if let Some(ops) = var.kind.operands() {
            for operand in [ops.lhs, ops.rhs] {
                if let (Some(&from), Some(&to)) =
                    (var_nodes.get(&operand.index()), var_nodes.get(&i))
                {
                    g.add_edge(from, to, "operand");
                }
            }
        }
    }

    for (e, equ) in graph.equations().iter() {
        let node = g.add_node(format!("e{e} {:?} [{}]", equ.equ_type(), equ.output_unit));
        for v in equ.variable_refs() {
            if let Some(&from) = var_nodes.get(&v.index()) {
                g.add_edge(from, node, "reads");
            }
        }
    }

    format!("{}", Dot::with_config(&g, &[Config::EdgeNoLabel]))
}
