use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::graph::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Padding {
    #[default]
    Same,
    Valid,
}

/// Declaration of a 2-D convolution layer. Input channels are taken from the
/// node it is applied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conv2dSpec {
    pub filters: i64,
    pub kernel_size: i64,
    pub padding: Padding,
    pub activation: Activation,
    pub name: Option<String>,
}

impl Conv2dSpec {
    /// SAME-padded, linear convolution.
    pub fn new(filters: i64, kernel_size: i64) -> Self {
        Conv2dSpec {
            filters,
            kernel_size,
            padding: Padding::Same,
            activation: Activation::Linear,
            name: None,
        }
    }

    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A bound convolution as stored in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conv2d {
    pub in_channels: i64,
    pub filters: i64,
    pub kernel_size: i64,
    pub padding: Padding,
    pub activation: Activation,
}

impl Conv2d {
    pub fn parameter_count(&self) -> i64 {
        self.kernel_size * self.kernel_size * self.in_channels * self.filters + self.filters
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    Input,
    Normalize,
    Denormalize,
    Conv2d(Conv2d),
    Add,
    /// Elementwise product; the right operand may be a 1x1 gate broadcast over space.
    Multiply,
    GlobalAvgPool,
    Scale(f64),
    PixelShuffle(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Input,
    Normalize,
    Denormalize,
    Conv2d,
    Add,
    Multiply,
    GlobalAvgPool,
    Scale,
    PixelShuffle,
}

impl Op {
    pub fn kind(&self) -> OpKind {
        match self {
            Op::Input => OpKind::Input,
            Op::Normalize => OpKind::Normalize,
            Op::Denormalize => OpKind::Denormalize,
            Op::Conv2d(_) => OpKind::Conv2d,
            Op::Add => OpKind::Add,
            Op::Multiply => OpKind::Multiply,
            Op::GlobalAvgPool => OpKind::GlobalAvgPool,
            Op::Scale(_) => OpKind::Scale,
            Op::PixelShuffle(_) => OpKind::PixelShuffle,
        }
    }
}

impl OpKind {
    /// Keras layer class name, used in summaries.
    pub fn layer_type(self) -> &'static str {
        match self {
            OpKind::Input => "InputLayer",
            OpKind::Conv2d => "Conv2D",
            OpKind::Add => "Add",
            OpKind::Multiply => "Multiply",
            OpKind::GlobalAvgPool => "AdaptiveAveragePooling2D",
            OpKind::Normalize | OpKind::Denormalize | OpKind::Scale | OpKind::PixelShuffle => "Lambda",
        }
    }

    /// Prefix for auto-generated layer names.
    pub fn name_prefix(self) -> &'static str {
        match self {
            OpKind::Input => "input",
            OpKind::Conv2d => "conv2d",
            OpKind::Add => "add",
            OpKind::Multiply => "multiply",
            OpKind::GlobalAvgPool => "adaptive_average_pooling2d",
            OpKind::Normalize | OpKind::Denormalize | OpKind::Scale | OpKind::PixelShuffle => "lambda",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub op: Op,
    pub inputs: Vec<NodeId>,
    pub shape: Shape,
}
