use log::debug;
use crate::config::RcanConfig;
use crate::constants::{IMAGE_CHANNELS, KERNEL_SIZE, MODEL_NAME};
use crate::error::RcanError;
use crate::graph::{Conv2dSpec, GraphBuilder, ModelGraph};
use crate::rcan::{residual_group, upsample};

/// Builds the full RCAN graph for `config`.
pub fn rcan(config: &RcanConfig) -> Result<ModelGraph, RcanError> {
    config.validate()?;

    let mut b = GraphBuilder::new();
    let x_in = b.input(None, None, IMAGE_CHANNELS)?;
    let x = b.normalize(x_in)?;

    let head = b.conv2d(x, Conv2dSpec::new(config.num_filters, KERNEL_SIZE))?;
    let mut body = head;
    for _ in 0..config.num_res_groups {
        body = residual_group(
            &mut b,
            body,
            config.num_filters,
            config.num_res_blocks,
            config.reduction,
            config.scaling,
            config.block_chaining,
        )?;
    }
    body = b.conv2d(body, Conv2dSpec::new(config.num_filters, KERNEL_SIZE))?;
    let x = b.add(head, body)?;

    let x = upsample(&mut b, x, config.scale, config.num_filters)?;
    let x = b.conv2d(x, Conv2dSpec::new(IMAGE_CHANNELS, KERNEL_SIZE))?;
    let x = b.denormalize(x)?;

    let graph = b.build(MODEL_NAME, x_in, x)?;
    debug!(
        "built {} graph: scale {}, {} nodes, {} parameters",
        graph.name(),
        config.scale,
        graph.nodes().len(),
        graph.parameter_count()
    );
    Ok(graph)
}
