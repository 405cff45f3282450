use indexmap::IndexMap;
use tch::{nn, Tensor};
use tch::nn::Module;
use crate::error::EngineError;
use crate::graph::{Activation, Conv2d, ModelGraph, Node, NodeId, Op, Padding};
use crate::engine::ops::{denormalize, depth_to_space, normalize};
use crate::engine::utils::{nchw_to_nhwc, nhwc_to_nchw};

/// A `ModelGraph` bound to libtorch weights.
///
/// Takes channels-last images and returns channels-last images; everything in
/// between runs in NCHW.
#[derive(Debug)]
pub struct RcanModel {
    graph: ModelGraph,
    convs: IndexMap<NodeId, nn::Conv2D>,
    // Values that can be dropped once the node at this index has run
    release_after: Vec<Vec<NodeId>>,
}

impl RcanModel {
    pub fn new(vs: &nn::Path, graph: ModelGraph) -> RcanModel {
        let mut convs = IndexMap::new();
        for node in graph.nodes() {
            if let Op::Conv2d(conv) = &node.op {
                let config = nn::ConvConfig {
                    padding: conv_padding(conv),
                    ..Default::default()
                };
                let layer = nn::conv2d(vs / node.name.as_str(), conv.in_channels, conv.filters, conv.kernel_size, config);
                convs.insert(node.id, layer);
            }
        }

        let release_after = release_schedule(&graph);

        RcanModel { graph, convs, release_after }
    }

    pub fn graph(&self) -> &ModelGraph {
        &self.graph
    }

    /// Checks that `xs` is a `(batch, height, width, channels)` tensor the
    /// graph accepts.
    pub fn check_input(&self, xs: &Tensor) -> Result<(), EngineError> {
        let size = xs.size();
        let expected = self.graph.input_shape();
        if size.len() != 4 || size[3] != expected.channels {
            return Err(EngineError::InvalidInput { size, channels: expected.channels });
        }
        for (axis, dim, actual) in [("height", expected.height, size[1]), ("width", expected.width, size[2])] {
            if let Some(expected) = dim.resolve(actual) {
                if expected != actual {
                    return Err(EngineError::FixedDimMismatch { axis, expected, actual });
                }
            }
        }
        Ok(())
    }

    fn eval(&self, node: &Node, values: &[Option<Tensor>], xs: &Tensor) -> Tensor {
        let arg = |i: usize| operand(values, node.inputs[i]);
        match &node.op {
            Op::Input => nhwc_to_nchw(xs),
            Op::Normalize => normalize(arg(0)),
            Op::Denormalize => denormalize(arg(0)),
            Op::Conv2d(conv) => {
                let out = arg(0).apply(&self.convs[&node.id]);
                match conv.activation {
                    Activation::Linear => out,
                    Activation::Relu => out.relu(),
                    Activation::Sigmoid => out.sigmoid(),
                }
            }
            Op::Add => arg(0) + arg(1),
            Op::Multiply => arg(0) * arg(1),
            Op::GlobalAvgPool => arg(0).adaptive_avg_pool2d([1, 1]),
            Op::Scale(factor) => arg(0) * *factor,
            Op::PixelShuffle(factor) => depth_to_space(arg(0), *factor),
        }
    }
}

impl Module for RcanModel {
    fn forward(&self, xs: &Tensor) -> Tensor {
        assert_eq!(xs.size().len(), 4);

        let nodes = self.graph.nodes();
        let mut values: Vec<Option<Tensor>> = Vec::with_capacity(nodes.len());
        for node in nodes {
            let value = self.eval(node, &values, xs);
            values.push(Some(value));
            for id in &self.release_after[node.id.index()] {
                values[id.index()] = None;
            }
        }

        nchw_to_nhwc(operand(&values, self.graph.output()))
    }
}

fn operand(values: &[Option<Tensor>], id: NodeId) -> &Tensor {
    values[id.index()]
        .as_ref()
        .unwrap_or_else(|| panic!("value of node {} released before use", id))
}

fn conv_padding(conv: &Conv2d) -> i64 {
    match conv.padding {
        Padding::Same => conv.kernel_size / 2,
        Padding::Valid => 0,
    }
}

/// For each node, the values whose last consumer it is. The graph output is
/// never released.
fn release_schedule(graph: &ModelGraph) -> Vec<Vec<NodeId>> {
    let nodes = graph.nodes();
    let mut last_use: Vec<Option<usize>> = vec![None; nodes.len()];
    for node in nodes {
        for parent in &node.inputs {
            last_use[parent.index()] = Some(node.id.index());
        }
    }

    let mut release_after = vec![Vec::new(); nodes.len()];
    for (index, last) in last_use.into_iter().enumerate() {
        if let Some(last) = last {
            if index != graph.output().index() {
                release_after[last].push(NodeId(index));
            }
        }
    }
    release_after
}
