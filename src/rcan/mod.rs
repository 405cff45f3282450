mod channel_attention;
mod residual_attention_block;
mod residual_group;
mod upsample;
mod network;

pub use channel_attention::channel_attention;
pub use residual_attention_block::residual_attention_block;
pub use residual_group::residual_group;
pub use upsample::upsample;
pub use network::rcan;
