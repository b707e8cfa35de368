//! dag.rs
//! A petgraph view over a model's variables, for walking dependencies.

use crate::model::{ParameterKind, Variable};
use petgraph::algo::toposort;
use petgraph::prelude::StableDiGraph;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Variable {0} does not exist")]
    UnknownVariable(usize),
    #[error("Variable {variable} depends on variable {parent}, which does not exist")]
    UnknownSource { variable: usize, parent: usize },
    #[error("Cycle detected involving variable {0}")]
    Cycle(usize),
    #[error("Variable {variable} needs a value for variable {parent}")]
    MissingValue { variable: usize, parent: usize },
}

/// Variables as nodes, with an edge `source -> dependent` for each dependent
/// parameter slot, weighted by the slot it feeds.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: StableDiGraph<usize, ParameterKind>,
    nodes: Vec<NodeIndex>,
}

impl DependencyGraph {
    pub fn from_variables(variables: &[Variable]) -> Result<Self, GraphError> {
        let mut graph = StableDiGraph::with_capacity(variables.len(), variables.len() * 3);
        let nodes: Vec<NodeIndex> = (0..variables.len()).map(|i| graph.add_node(i)).collect();

        for (position, variable) in variables.iter().enumerate() {
            for (kind, expr) in variable.parameters() {
                if let Some(source) = expr.source() {
                    let &from = nodes
                        .get(source)
                        .ok_or(GraphError::UnknownSource { variable: position, parent: source })?;
                    graph.add_edge(from, nodes[position], kind);
                }
            }
        }
        Ok(Self { graph, nodes })
    }

    pub fn variable_count(&self) -> usize { self.nodes.len() }

    pub fn edge_count(&self) -> usize { self.graph.edge_count() }

    /// Variables ordered so that every source precedes its dependents.
    pub fn evaluation_order(&self) -> Result<Vec<usize>, GraphError> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|n| self.graph[n]).collect())
            .map_err(|cycle| GraphError::Cycle(self.graph[cycle.node_id()]))
    }

    /// Variables that `index` reads from, ascending and deduplicated.
    pub fn parents_of(&self, index: usize) -> Result<Vec<usize>, GraphError> {
        self.neighbors(index, Direction::Incoming)
    }

    /// Variables whose parameters read from `index`, ascending and deduplicated.
    pub fn dependents_of(&self, index: usize) -> Result<Vec<usize>, GraphError> {
        self.neighbors(index, Direction::Outgoing)
    }

    /// The slots of `dependent` that are driven by `source`.
    pub fn slots_between(&self, source: usize, dependent: usize) -> Result<Vec<ParameterKind>, GraphError> {
        let from = self.node(source)?;
        let to = self.node(dependent)?;
        let mut kinds: Vec<ParameterKind> = self
            .graph
            .edges_directed(from, Direction::Outgoing)
            .filter(|e| e.target() == to)
            .map(|e| *e.weight())
            .collect();
        kinds.sort();
        Ok(kinds)
    }

    fn neighbors(&self, index: usize, direction: Direction) -> Result<Vec<usize>, GraphError> {
        let node = self.node(index)?;
        let mut found: Vec<usize> = self.graph.neighbors_directed(node, direction).map(|n| self.graph[n]).collect();
        found.sort_unstable();
        found.dedup();
        Ok(found)
    }

    fn node(&self, index: usize) -> Result<NodeIndex, GraphError> {
        self.nodes.get(index).copied().ok_or(GraphError::UnknownVariable(index))
    }
}
