use crate::config::validate_block_params;
use crate::constants::KERNEL_SIZE;
use crate::error::RcanError;
use crate::graph::{Activation, Conv2dSpec, GraphBuilder, NodeId};

/// Channel attention: pools each channel to a scalar, squeezes the channels
/// through a `num_filters / reduction` bottleneck and rescales `x` by the
/// resulting sigmoid gate.
pub fn channel_attention(
    b: &mut GraphBuilder,
    x: NodeId,
    num_filters: i64,
    reduction: i64,
) -> Result<NodeId, RcanError> {
    validate_block_params(num_filters, reduction)?;

    let pooled = b.global_avg_pool(x)?;
    let squeezed = b.conv2d(
        pooled,
        Conv2dSpec::new(num_filters / reduction, KERNEL_SIZE).activation(Activation::Relu),
    )?;
    let gate = b.conv2d(
        squeezed,
        Conv2dSpec::new(num_filters, KERNEL_SIZE).activation(Activation::Sigmoid),
    )?;
    Ok(b.multiply(x, gate)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::graph::{Dim, Op, Shape};

    #[test]
    fn test_preserves_shape() {
        for (channels, reduction) in [(16, 16), (64, 16), (48, 4), (7, 7)] {
            let mut b = GraphBuilder::new();
            let x = b.input(Some(9), None, 3).unwrap();
            let features = b.conv2d(x, Conv2dSpec::new(channels, 3)).unwrap();
            let out = channel_attention(&mut b, features, channels, reduction).unwrap();
            assert_eq!(b.shape(out).unwrap(), Shape::new(Dim::Fixed(9), Dim::dynamic(), channels));
        }
    }

    #[test]
    fn test_bottleneck_uses_floor_division() {
        let mut b = GraphBuilder::new();
        let x = b.input(None, None, 3).unwrap();
        let features = b.conv2d(x, Conv2dSpec::new(50, 3)).unwrap();
        let out = channel_attention(&mut b, features, 50, 16).unwrap();

        // multiply <- sigmoid conv <- relu conv
        let gate = b.node(out).unwrap().inputs[1];
        let squeeze = b.node(gate).unwrap().inputs[0];
        match &b.node(squeeze).unwrap().op {
            Op::Conv2d(conv) => {
                assert_eq!(conv.filters, 3);
                assert_eq!(conv.activation, Activation::Relu);
            }
            op => panic!("expected bottleneck conv, got {:?}", op),
        }
        match &b.node(gate).unwrap().op {
            Op::Conv2d(conv) => assert_eq!((conv.in_channels, conv.filters, conv.activation), (3, 50, Activation::Sigmoid)),
            op => panic!("expected gate conv, got {:?}", op),
        }
    }

    #[test]
    fn test_empty_bottleneck() {
        let mut b = GraphBuilder::new();
        let x = b.input(None, None, 3).unwrap();
        let features = b.conv2d(x, Conv2dSpec::new(8, 3)).unwrap();
        let err = channel_attention(&mut b, features, 8, 16).unwrap_err();
        assert!(matches!(err, RcanError::Config(ConfigError::BottleneckTooNarrow { .. })));
    }

    #[test]
    fn test_filter_count_must_match_input() {
        let mut b = GraphBuilder::new();
        let x = b.input(None, None, 3).unwrap();
        let features = b.conv2d(x, Conv2dSpec::new(32, 3)).unwrap();
        assert!(matches!(channel_attention(&mut b, features, 16, 4), Err(RcanError::Graph(_))));
    }
}
