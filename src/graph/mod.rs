pub mod builder;
pub mod model_graph;
pub mod node;
pub mod shape;

pub use builder::GraphBuilder;
pub use model_graph::ModelGraph;
pub use node::{Activation, Conv2d, Conv2dSpec, Node, NodeId, Op, OpKind, Padding};
pub use shape::{Dim, Shape};
