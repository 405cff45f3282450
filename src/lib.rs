//! Residual Channel Attention Network (RCAN) for image super-resolution.
//!
//! [`rcan()`] declares the network as an immutable [`ModelGraph`];
//! [`engine`] binds such a graph to libtorch weights and runs it.

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod graph;
pub mod rcan;

pub use config::{BlockChaining, RcanConfig, Scale};
pub use error::{ConfigError, EngineError, GraphError, RcanError};
pub use graph::ModelGraph;
pub use crate::rcan::rcan;
