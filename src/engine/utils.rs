use lazy_static::lazy_static;
use tch::{Device, Tensor};

lazy_static! {
    pub static ref DEVICE: Device = Device::cuda_if_available();
}

/// `(batch, height, width, channels)` -> `(batch, channels, height, width)`
pub fn nhwc_to_nchw(x: &Tensor) -> Tensor {
    x.permute([0, 3, 1, 2])
}

/// `(batch, channels, height, width)` -> `(batch, height, width, channels)`
pub fn nchw_to_nhwc(x: &Tensor) -> Tensor {
    x.permute([0, 2, 3, 1]).contiguous()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Kind;

    #[test]
    fn test_layout_conversion() {
        let x = Tensor::arange(2 * 3 * 4 * 5i64, (Kind::Float, Device::Cpu)).view([2, 3, 4, 5]);
        let nchw = nhwc_to_nchw(&x);
        assert_eq!(nchw.size(), [2, 5, 3, 4]);
        assert_eq!(nchw.double_value(&[1, 4, 2, 3]), x.double_value(&[1, 2, 3, 4]));
        assert!(nchw_to_nhwc(&nchw).equal(&x));
    }
}
