use thiserror::Error;

use crate::graph::{NodeId, Shape};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported upscale factor: {0} (expected 2, 3 or 4)")]
    UnsupportedScale(u32),
    #[error("Filter count must be positive, got {0}")]
    ZeroFilters(i64),
    #[error("Reduction ratio must be positive, got {0}")]
    ZeroReduction(i64),
    #[error("Attention bottleneck is empty: {num_filters} filters / reduction {reduction} = 0")]
    BottleneckTooNarrow { num_filters: i64, reduction: i64 },
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("Duplicate layer name: {0}")]
    DuplicateName(String),
    #[error("{op}: shape mismatch between {lhs} and {rhs}")]
    ShapeMismatch { op: &'static str, lhs: Shape, rhs: Shape },
    #[error("pixel_shuffle({factor}): {channels} channels not divisible by {}", .factor * .factor)]
    ChannelsNotDivisible { channels: i64, factor: i64 },
    #[error("{0}: convolution needs a positive filter count and kernel size")]
    InvalidFilters(String),
    #[error("{0}: SAME padding needs an odd kernel size")]
    EvenKernelSamePadding(String),
    #[error("{op}: expected {expected} channels, got {actual}")]
    ChannelCount { op: &'static str, expected: i64, actual: i64 },
    #[error("pixel_shuffle: factor must be positive, got {0}")]
    InvalidFactor(i64),
    #[error("{0}: spatial extent collapses to zero")]
    EmptySpatialExtent(String),
    #[error("Node {0} is not an input layer")]
    NotAnInput(NodeId),
    #[error("Output depends on input layer {0}, which is not the graph input")]
    UnboundInput(NodeId),
    #[error("Output node {output} does not depend on input node {input}")]
    Disconnected { input: NodeId, output: NodeId },
    #[error("Malformed graph: {0}")]
    Malformed(String),
    #[error("Graph encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Expected a (batch, height, width, {channels}) tensor, got {size:?}")]
    InvalidInput { size: Vec<i64>, channels: i64 },
    #[error("Input {axis} is {actual} but the graph was built for {expected}")]
    FixedDimMismatch { axis: &'static str, expected: i64, actual: i64 },
}

/// Umbrella error for building and running a network.
#[derive(Debug, Error)]
pub enum RcanError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Tch(#[from] tch::TchError),
}
