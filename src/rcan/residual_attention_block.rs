use crate::config::effective_scaling;
use crate::constants::KERNEL_SIZE;
use crate::error::RcanError;
use crate::graph::{Activation, Conv2dSpec, GraphBuilder, NodeId};
use crate::rcan::channel_attention;

/// Residual channel attention block (RCAB).
///
/// `conv+relu -> conv -> channel attention`, optionally scaled, then added
/// back onto `x`. The scale op is only emitted when `scaling` is nonzero, so
/// `Some(1.0)` still produces an (identity) scale node while `None` and
/// `Some(0.0)` produce none.
pub fn residual_attention_block(
    b: &mut GraphBuilder,
    x: NodeId,
    num_filters: i64,
    reduction: i64,
    scaling: Option<f64>,
) -> Result<NodeId, RcanError> {
    let mut branch = b.conv2d(x, Conv2dSpec::new(num_filters, KERNEL_SIZE).activation(Activation::Relu))?;
    branch = b.conv2d(branch, Conv2dSpec::new(num_filters, KERNEL_SIZE))?;
    branch = channel_attention(b, branch, num_filters, reduction)?;

    if let Some(factor) = effective_scaling(scaling) {
        branch = b.scale(branch, factor)?;
    }
    Ok(b.add(x, branch)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Dim, Op, OpKind, Shape};

    fn block_graph(num_filters: i64, scaling: Option<f64>) -> (GraphBuilder, NodeId, NodeId) {
        let mut b = GraphBuilder::new();
        let x = b.input(Some(5), Some(7), 3).unwrap();
        let features = b.conv2d(x, Conv2dSpec::new(num_filters, 3)).unwrap();
        let out = residual_attention_block(&mut b, features, num_filters, 4, scaling).unwrap();
        (b, features, out)
    }

    #[test]
    fn test_preserves_shape() {
        for num_filters in [4, 16, 64] {
            let (b, features, out) = block_graph(num_filters, Some(1.0));
            assert_eq!(b.shape(out).unwrap(), b.shape(features).unwrap());
            assert_eq!(b.shape(out).unwrap(), Shape::new(Dim::Fixed(5), Dim::Fixed(7), num_filters));
        }
    }

    #[test]
    fn test_falsy_scaling_emits_no_scale_op() {
        for scaling in [None, Some(0.0)] {
            let (b, _, _) = block_graph(16, scaling);
            assert_eq!(b.count_ops(OpKind::Scale), 0);
        }
    }

    #[test]
    fn test_unit_scaling_is_kept() {
        let (b, _, out) = block_graph(16, Some(1.0));
        assert_eq!(b.count_ops(OpKind::Scale), 1);

        let branch = b.node(out).unwrap().inputs[1];
        assert_eq!(b.node(branch).unwrap().op, Op::Scale(1.0));
    }

    #[test]
    fn test_residual_wiring() {
        let (b, features, out) = block_graph(16, Some(0.1));
        let add = b.node(out).unwrap();
        assert_eq!(add.op, Op::Add);
        assert_eq!(add.inputs[0], features);
        assert_eq!(b.node(add.inputs[1]).unwrap().op, Op::Scale(0.1));
        // two body convs plus the two attention convs
        assert_eq!(b.count_ops(OpKind::Conv2d), 1 + 4);
    }
}
