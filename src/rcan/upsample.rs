use crate::config::Scale;
use crate::constants::KERNEL_SIZE;
use crate::error::RcanError;
use crate::graph::{Conv2dSpec, GraphBuilder, NodeId};

/// Sub-pixel upsampling. Each stage expands to `num_filters * f^2` channels
/// and folds them back into an `f x f` spatial block.
pub fn upsample(b: &mut GraphBuilder, x: NodeId, scale: Scale, num_filters: i64) -> Result<NodeId, RcanError> {
    let mut x = x;
    for (i, factor) in scale.stages().iter().enumerate() {
        let name = format!("conv2d_{}_scale_{}", i + 1, factor);
        x = b.conv2d(x, Conv2dSpec::new(num_filters * factor * factor, KERNEL_SIZE).named(name))?;
        x = b.pixel_shuffle(x, *factor)?;
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Dim, Op, OpKind, Shape};

    fn upsampled(scale: Scale) -> crate::graph::ModelGraph {
        let mut b = GraphBuilder::new();
        let x = b.input(Some(6), None, 3).unwrap();
        let features = b.conv2d(x, Conv2dSpec::new(16, 3)).unwrap();
        let out = upsample(&mut b, features, scale, 16).unwrap();
        b.build("upsample", x, out).unwrap()
    }

    #[test]
    fn test_output_shapes() {
        for scale in Scale::ALL {
            let f = scale.factor();
            let graph = upsampled(scale);
            assert_eq!(graph.output_shape(), Shape::new(Dim::Fixed(6 * f), Dim::Dynamic { scale: f }, 16));
        }
    }

    #[test]
    fn test_layer_names() {
        assert!(upsampled(Scale::X2).node_by_name("conv2d_1_scale_2").is_some());
        assert!(upsampled(Scale::X3).node_by_name("conv2d_1_scale_3").is_some());

        let x4 = upsampled(Scale::X4);
        assert!(x4.node_by_name("conv2d_1_scale_2").is_some());
        assert!(x4.node_by_name("conv2d_2_scale_2").is_some());
    }

    #[test]
    fn test_x4_is_two_x2_stages() {
        let x4 = upsampled(Scale::X4);
        assert_eq!(x4.count_ops(OpKind::PixelShuffle), 2);

        let shuffles: Vec<_> = x4.nodes().iter().filter(|node| node.op.kind() == OpKind::PixelShuffle).collect();
        for shuffle in &shuffles {
            assert_eq!(shuffle.op, Op::PixelShuffle(2));
            let conv = x4.node(shuffle.inputs[0]);
            assert_eq!(conv.shape.channels, 16 * 4);
        }
        assert_eq!(shuffles[0].shape.height, Dim::Fixed(12));
        assert_eq!(shuffles[1].shape.height, Dim::Fixed(24));
        assert_eq!(x4.node(shuffles[1].inputs[0]).inputs[0], shuffles[0].id);
    }
}
