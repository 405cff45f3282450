use tch::Tensor;
use crate::constants::{DIV2K_RGB_MEAN, HALF_PIXEL_RANGE, PIXEL_MAX};

fn rgb_mean_like(x: &Tensor) -> Tensor {
    Tensor::from_slice(&DIV2K_RGB_MEAN)
        .to_kind(x.kind())
        .to_device(x.device())
        .view([1, 3, 1, 1])
        * PIXEL_MAX
}

/// Maps NCHW pixels in `[0, 255]` to zero-mean values in about `[-1, 1]`.
pub fn normalize(x: &Tensor) -> Tensor {
    (x - rgb_mean_like(x)) / HALF_PIXEL_RANGE
}

pub fn denormalize(x: &Tensor) -> Tensor {
    x * HALF_PIXEL_RANGE + rgb_mean_like(x)
}

/// Depth-to-space on an NCHW tensor, with the channel ordering of
/// TensorFlow's `depth_to_space`:
/// `out[c, h * f + i, w * f + j] = in[(i * f + j) * C + c, h, w]`.
///
/// This differs from `Tensor::pixel_shuffle`, which reads channel
/// `c * f * f + i * f + j`.
pub fn depth_to_space(x: &Tensor, factor: i64) -> Tensor {
    let size = x.size();
    assert_eq!(size.len(), 4);
    let (batch, channels, height, width) = (size[0], size[1], size[2], size[3]);
    let block = factor * factor;
    assert_eq!(channels % block, 0, "{} channels cannot be split into {}x{} blocks", channels, factor, factor);
    let out_channels = channels / block;

    x.reshape([batch, factor, factor, out_channels, height, width])
        .permute([0, 3, 4, 1, 5, 2])
        .reshape([batch, out_channels, height * factor, width * factor])
}
