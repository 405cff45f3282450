// Network defaults
pub const DEFAULT_NUM_FILTERS: i64 = 64;
pub const DEFAULT_NUM_RES_GROUPS: usize = 10;
pub const DEFAULT_NUM_RES_BLOCKS: usize = 20;
pub const DEFAULT_REDUCTION: i64 = 16;
pub const DEFAULT_SCALING: Option<f64> = Some(1.0);

pub const KERNEL_SIZE: i64 = 3; // every convolution in the network is 3x3
pub const IMAGE_CHANNELS: i64 = 3; // RGB in, RGB out
pub const MODEL_NAME: &str = "rcan";

// Input normalization
pub const DIV2K_RGB_MEAN: [f64; 3] = [0.4488, 0.4371, 0.4040]; // per-channel mean of the DIV2K training set, in [0, 1]
pub const PIXEL_MAX: f64 = 255.;
pub const HALF_PIXEL_RANGE: f64 = PIXEL_MAX / 2.; // maps [0, 255] to roughly [-1, 1]
