use std::fmt::{Display, Formatter};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use crate::error::GraphError;
use crate::graph::node::{Node, NodeId, Op, OpKind};
use crate::graph::shape::Shape;

/// An immutable, topologically ordered layer graph with one input and one
/// output. Node ids equal their position in `nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelGraph {
    name: String,
    nodes: Vec<Node>,
    names: IndexMap<String, NodeId>,
    input: NodeId,
    output: NodeId,
}

impl ModelGraph {
    pub(crate) fn from_parts(
        name: String,
        nodes: Vec<Node>,
        names: IndexMap<String, NodeId>,
        input: NodeId,
        output: NodeId,
    ) -> Self {
        ModelGraph { name, nodes, names, input, output }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.names.get(name).map(|id| &self.nodes[id.0])
    }

    pub fn input(&self) -> NodeId {
        self.input
    }

    pub fn output(&self) -> NodeId {
        self.output
    }

    pub fn input_shape(&self) -> Shape {
        self.node(self.input).shape
    }

    pub fn output_shape(&self) -> Shape {
        self.node(self.output).shape
    }

    pub fn count_ops(&self, kind: OpKind) -> usize {
        self.nodes.iter().filter(|node| node.op.kind() == kind).count()
    }

    pub fn parameter_count(&self) -> i64 {
        self.nodes
            .iter()
            .map(|node| match &node.op {
                Op::Conv2d(conv) => conv.parameter_count(),
                _ => 0,
            })
            .sum()
    }

    /// Keras-style layer table.
    pub fn summary(&self) -> String {
        self.to_string()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, GraphError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decodes a graph written by [`ModelGraph::to_bytes`], rejecting bytes
    /// that decode into a graph the builder could not have produced.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GraphError> {
        let graph: ModelGraph = bincode::deserialize(bytes)?;
        graph.check_structure()?;
        Ok(graph)
    }

    fn check_structure(&self) -> Result<(), GraphError> {
        let malformed = |msg: String| -> Result<(), GraphError> { Err(GraphError::Malformed(msg)) };

        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.index() != index {
                return malformed(format!("node at position {} has id {}", index, node.id));
            }
            if let Some(parent) = node.inputs.iter().find(|parent| parent.index() >= index) {
                return malformed(format!("node {} reads {}, which does not precede it", node.id, parent));
            }
            let arity = match node.op {
                Op::Input => 0,
                Op::Add | Op::Multiply => 2,
                _ => 1,
            };
            if node.inputs.len() != arity {
                return malformed(format!("node {} has {} inputs, expected {}", node.id, node.inputs.len(), arity));
            }
            if node.op == Op::Input && node.id != self.input {
                return malformed(format!("stray input layer {}", node.id));
            }
        }

        if self.output.index() >= self.nodes.len() {
            return malformed(format!("output {} is out of range", self.output));
        }
        match self.nodes.get(self.input.index()) {
            Some(node) if node.op == Op::Input => {}
            _ => return malformed(format!("input {} is not an input layer", self.input)),
        }
        for (name, id) in &self.names {
            if self.nodes.get(id.index()).map(|node| node.name.as_str()) != Some(name.as_str()) {
                return malformed(format!("name {} does not match node {}", name, id));
            }
        }
        Ok(())
    }
}

impl Display for ModelGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rule = "_".repeat(110);
        writeln!(f, "Model: \"{}\"", self.name)?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "{:<44}{:<28}{:<12}{}", "Layer (type)", "Output Shape", "Param #", "Connected to")?;
        writeln!(f, "{}", "=".repeat(110))?;

        for node in &self.nodes {
            let layer = format!("{} ({})", node.name, node.op.kind().layer_type());
            let params = match &node.op {
                Op::Conv2d(conv) => conv.parameter_count(),
                _ => 0,
            };
            let connected = node
                .inputs
                .iter()
                .filter_map(|id| self.nodes.get(id.index()))
                .map(|parent| parent.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "{:<44}{:<28}{:<12}{}", layer, node.shape.to_string(), params, connected)?;
        }

        writeln!(f, "{}", "=".repeat(110))?;
        writeln!(f, "Total params: {}", self.parameter_count())
    }
}
