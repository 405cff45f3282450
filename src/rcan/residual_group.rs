use log::warn;
use crate::config::BlockChaining;
use crate::constants::KERNEL_SIZE;
use crate::error::RcanError;
use crate::graph::{Conv2dSpec, GraphBuilder, NodeId};
use crate::rcan::residual_attention_block;

/// Residual group: `num_res_blocks` RCABs and a tail convolution, with a
/// skip connection around the whole group.
pub fn residual_group(
    b: &mut GraphBuilder,
    x: NodeId,
    num_filters: i64,
    num_res_blocks: usize,
    reduction: i64,
    scaling: Option<f64>,
    chaining: BlockChaining,
) -> Result<NodeId, RcanError> {
    let mut body = x;
    match chaining {
        BlockChaining::Sequential => {
            for _ in 0..num_res_blocks {
                body = residual_attention_block(b, body, num_filters, reduction, scaling)?;
            }
        }
        BlockChaining::Detached => {
            if num_res_blocks > 1 {
                warn!(
                    "building residual group with detached blocks: {} of {} blocks are discarded",
                    num_res_blocks - 1,
                    num_res_blocks
                );
            }
            for _ in 0..num_res_blocks {
                body = residual_attention_block(b, x, num_filters, reduction, scaling)?;
            }
        }
    }

    body = b.conv2d(body, Conv2dSpec::new(num_filters, KERNEL_SIZE))?;
    Ok(b.add(x, body)?)
}
