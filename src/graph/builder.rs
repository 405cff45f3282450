use indexmap::IndexMap;
use log::debug;
use crate::error::GraphError;
use crate::graph::model_graph::ModelGraph;
use crate::graph::node::{Conv2d, Conv2dSpec, Node, NodeId, Op, OpKind, Padding};
use crate::graph::shape::{Dim, Shape};

/// Functional graph builder. Every layer call takes the handles of its inputs
/// and returns the handle of the new node.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    names: IndexMap<String, NodeId>,
    counters: IndexMap<&'static str, usize>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn count_ops(&self, kind: OpKind) -> usize {
        self.nodes.iter().filter(|node| node.op.kind() == kind).count()
    }

    pub fn shape(&self, id: NodeId) -> Result<Shape, GraphError> {
        self.nodes.get(id.0).map(|node| node.shape).ok_or(GraphError::UnknownNode(id))
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(id.0).ok_or(GraphError::UnknownNode(id))
    }

    /// Channels-last image input; `None` leaves a spatial dimension dynamic.
    pub fn input(&mut self, height: Option<i64>, width: Option<i64>, channels: i64) -> Result<NodeId, GraphError> {
        if channels <= 0 {
            return Err(GraphError::InvalidFilters("input".to_string()));
        }
        if height.into_iter().chain(width).any(|n| n < 1) {
            return Err(GraphError::EmptySpatialExtent("input".to_string()));
        }
        let shape = Shape::new(Dim::from_option(height), Dim::from_option(width), channels);
        self.push(Op::Input, vec![], shape, None)
    }

    pub fn conv2d(&mut self, x: NodeId, spec: Conv2dSpec) -> Result<NodeId, GraphError> {
        let input_shape = self.shape(x)?;
        let label = spec.name.clone().unwrap_or_else(|| OpKind::Conv2d.name_prefix().to_string());

        if spec.filters <= 0 || spec.kernel_size <= 0 {
            return Err(GraphError::InvalidFilters(label));
        }

        let shape = match spec.padding {
            Padding::Same if spec.kernel_size % 2 == 0 => {
                return Err(GraphError::EvenKernelSamePadding(label));
            }
            Padding::Same => input_shape.with_channels(spec.filters),
            Padding::Valid => {
                let height = input_shape.height.shrink(spec.kernel_size);
                let width = input_shape.width.shrink(spec.kernel_size);
                match (height, width) {
                    (Some(height), Some(width)) => Shape::new(height, width, spec.filters),
                    _ => return Err(GraphError::EmptySpatialExtent(label)),
                }
            }
        };

        let conv = Conv2d {
            in_channels: input_shape.channels,
            filters: spec.filters,
            kernel_size: spec.kernel_size,
            padding: spec.padding,
            activation: spec.activation,
        };
        self.push(Op::Conv2d(conv), vec![x], shape, spec.name)
    }

    /// Residual sum; both operands must have identical shapes.
    pub fn add(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        let lhs = self.shape(a)?;
        let rhs = self.shape(b)?;
        if lhs != rhs {
            return Err(GraphError::ShapeMismatch { op: "add", lhs, rhs });
        }
        self.push(Op::Add, vec![a, b], lhs, None)
    }

    pub fn multiply(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        let lhs = self.shape(a)?;
        let rhs = self.shape(b)?;
        let broadcastable = rhs.is_pooled() && rhs.channels == lhs.channels;
        if lhs != rhs && !broadcastable {
            return Err(GraphError::ShapeMismatch { op: "multiply", lhs, rhs });
        }
        self.push(Op::Multiply, vec![a, b], lhs, None)
    }

    pub fn global_avg_pool(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        let shape = self.shape(x)?;
        let pooled = Shape::new(Dim::Fixed(1), Dim::Fixed(1), shape.channels);
        self.push(Op::GlobalAvgPool, vec![x], pooled, None)
    }

    pub fn scale(&mut self, x: NodeId, factor: f64) -> Result<NodeId, GraphError> {
        let shape = self.shape(x)?;
        self.push(Op::Scale(factor), vec![x], shape, None)
    }

    pub fn normalize(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        let shape = self.rgb_shape(x, "normalize")?;
        self.push(Op::Normalize, vec![x], shape, None)
    }

    pub fn denormalize(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        let shape = self.rgb_shape(x, "denormalize")?;
        self.push(Op::Denormalize, vec![x], shape, None)
    }

    /// Depth-to-space: `(h, w, c * f^2) -> (h * f, w * f, c)`.
    pub fn pixel_shuffle(&mut self, x: NodeId, factor: i64) -> Result<NodeId, GraphError> {
        if factor <= 0 {
            return Err(GraphError::InvalidFactor(factor));
        }
        let shape = self.shape(x)?;
        let block = factor * factor;
        if shape.channels % block != 0 {
            return Err(GraphError::ChannelsNotDivisible { channels: shape.channels, factor });
        }
        let shuffled = Shape::new(shape.height.times(factor), shape.width.times(factor), shape.channels / block);
        self.push(Op::PixelShuffle(factor), vec![x], shuffled, None)
    }

    /// Finalizes the graph between `input` and `output`.
    ///
    /// Nodes the output does not depend on are dropped and the remainder is
    /// renumbered, so the result holds exactly the layers a forward pass runs.
    pub fn build(self, name: impl Into<String>, input: NodeId, output: NodeId) -> Result<ModelGraph, GraphError> {
        let input_node = self.node(input)?;
        if input_node.op != Op::Input {
            return Err(GraphError::NotAnInput(input));
        }
        self.node(output)?;

        // Inputs always precede their consumers, so one reverse sweep marks
        // everything the output depends on.
        let mut reachable = vec![false; self.nodes.len()];
        reachable[output.0] = true;
        for node in self.nodes.iter().rev() {
            if reachable[node.id.0] {
                for parent in &node.inputs {
                    reachable[parent.0] = true;
                }
            }
        }

        if !reachable[input.0] {
            return Err(GraphError::Disconnected { input, output });
        }
        if let Some(stray) = self.nodes.iter().find(|node| {
            reachable[node.id.0] && node.op == Op::Input && node.id != input
        }) {
            return Err(GraphError::UnboundInput(stray.id));
        }

        let total = self.nodes.len();
        let mut remap: Vec<Option<NodeId>> = vec![None; total];
        let mut nodes = Vec::with_capacity(total);
        let mut names = IndexMap::with_capacity(total);

        for mut node in self.nodes.into_iter().filter(|node| reachable[node.id.0]) {
            let id = NodeId(nodes.len());
            remap[node.id.0] = Some(id);
            node.id = id;
            node.inputs = node
                .inputs
                .iter()
                .map(|parent| remap[parent.0].ok_or(GraphError::UnknownNode(*parent)))
                .collect::<Result<_, _>>()?;
            names.insert(node.name.clone(), id);
            nodes.push(node);
        }

        let input = remap[input.0].ok_or(GraphError::UnknownNode(input))?;
        let output = remap[output.0].ok_or(GraphError::UnknownNode(output))?;

        if nodes.len() < total {
            debug!("pruned {} unreachable nodes while building graph", total - nodes.len());
        }

        Ok(ModelGraph::from_parts(name.into(), nodes, names, input, output))
    }

    fn rgb_shape(&self, x: NodeId, op: &'static str) -> Result<Shape, GraphError> {
        let shape = self.shape(x)?;
        if shape.channels != 3 {
            return Err(GraphError::ChannelCount { op, expected: 3, actual: shape.channels });
        }
        Ok(shape)
    }

    fn push(&mut self, op: Op, inputs: Vec<NodeId>, shape: Shape, name: Option<String>) -> Result<NodeId, GraphError> {
        let name = match name {
            Some(name) if self.names.contains_key(&name) => return Err(GraphError::DuplicateName(name)),
            Some(name) => name,
            None => self.auto_name(op.kind()),
        };

        let id = NodeId(self.nodes.len());
        self.names.insert(name.clone(), id);
        self.nodes.push(Node { id, name, op, inputs, shape });
        Ok(id)
    }

    /// Keras-style `prefix`, `prefix_1`, `prefix_2`, ... skipping names
    /// already taken explicitly.
    fn auto_name(&mut self, kind: OpKind) -> String {
        let prefix = kind.name_prefix();
        let count = self.counters.entry(prefix).or_insert(0);
        loop {
            let candidate = if *count == 0 {
                prefix.to_string()
            } else {
                format!("{}_{}", prefix, count)
            };
            *count += 1;
            if !self.names.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}
