pub mod ops;
pub mod rcan_model;
pub mod upscaler;
pub mod utils;

pub use rcan_model::RcanModel;
pub use upscaler::Upscaler;
