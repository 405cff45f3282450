use log::info;
use tch::{nn, Device, Kind, Tensor};
use tch::nn::Module;
use crate::config::RcanConfig;
use crate::engine::rcan_model::RcanModel;
use crate::engine::utils::DEVICE;
use crate::error::RcanError;
use crate::rcan::rcan;

/// An RCAN network with its own variable store, ready for inference.
///
/// Weights start out freshly initialized; filling them from a checkpoint is
/// left to the caller through `vs`.
#[derive(Debug)]
pub struct Upscaler {
    pub vs: nn::VarStore,
    pub model: RcanModel,
}

impl Upscaler {
    pub fn new(config: &RcanConfig) -> Result<Upscaler, RcanError> {
        Self::on_device(config, *DEVICE)
    }

    pub fn on_device(config: &RcanConfig, device: Device) -> Result<Upscaler, RcanError> {
        let graph = rcan(config)?;
        let vs = nn::VarStore::new(device);
        let model = RcanModel::new(&vs.root(), graph);

        info!(
            "instantiated {} ({}) on {:?}: {} layers, {} parameters",
            model.graph().name(),
            config.scale,
            device,
            model.graph().nodes().len(),
            model.graph().parameter_count()
        );

        Ok(Upscaler { vs, model })
    }

    pub fn device(&self) -> Device {
        self.vs.device()
    }

    /// Upscales a `(batch, height, width, 3)` image batch with pixel values in
    /// `[0, 255]`. The result stays on the model's device.
    pub fn upscale(&self, image: &Tensor) -> Result<Tensor, RcanError> {
        self.model.check_input(image)?;
        let image = image.f_to_kind(Kind::Float)?.to_device(self.device());
        Ok(tch::no_grad(|| self.model.forward(&image)))
    }
}
