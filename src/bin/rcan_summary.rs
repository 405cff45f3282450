use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use rcan::engine::utils::DEVICE;
use rcan::engine::Upscaler;
use rcan::{BlockChaining, RcanConfig, Scale};
use tch::{Device, Kind, Tensor};

/// Print the layer table of an RCAN configuration and optionally time one
/// forward pass on a random image.
#[derive(Debug, Parser)]
#[command(name = "rcan_summary")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Upscale factor (2, 3 or 4)
    #[arg(long)]
    scale: Option<u32>,
    #[arg(long)]
    num_filters: Option<i64>,
    #[arg(long)]
    num_res_groups: Option<usize>,
    #[arg(long)]
    num_res_blocks: Option<usize>,
    #[arg(long)]
    reduction: Option<i64>,
    /// Residual scaling constant
    #[arg(long, conflicts_with = "no_scaling")]
    scaling: Option<f64>,
    /// Leave the residual scaling op out entirely
    #[arg(long)]
    no_scaling: bool,
    /// Build every block of a residual group from the group input
    #[arg(long)]
    detached_blocks: bool,
    /// Run a forward pass on a random image
    #[arg(long)]
    run: bool,
    #[arg(long, default_value_t = 48)]
    height: i64,
    #[arg(long, default_value_t = 48)]
    width: i64,
    /// Run on CPU even if CUDA is available
    #[arg(long)]
    cpu: bool,
}

fn load_config(args: &Args) -> Result<RcanConfig> {
    let mut config = match &args.config {
        Some(path) => RcanConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RcanConfig::new(Scale::try_from(args.scale.unwrap_or(4))?),
    };

    if let Some(scale) = args.scale {
        config.scale = Scale::try_from(scale)?;
    }
    if let Some(num_filters) = args.num_filters {
        config.num_filters = num_filters;
    }
    if let Some(num_res_groups) = args.num_res_groups {
        config.num_res_groups = num_res_groups;
    }
    if let Some(num_res_blocks) = args.num_res_blocks {
        config.num_res_blocks = num_res_blocks;
    }
    if let Some(reduction) = args.reduction {
        config.reduction = reduction;
    }
    if args.scaling.is_some() {
        config.scaling = args.scaling;
    }
    if args.no_scaling {
        config.scaling = None;
    }
    if args.detached_blocks {
        config.block_chaining = BlockChaining::Detached;
    }

    config.validate()?;
    Ok(config)
}

fn run_once(config: &RcanConfig, device: Device, height: i64, width: i64) -> Result<()> {
    let upscaler = Upscaler::on_device(config, device)?;
    let image = Tensor::rand([1, height, width, 3], (Kind::Float, device)) * 255.;

    let start = Instant::now();
    let output = upscaler.upscale(&image)?;
    let duration: Duration = start.elapsed();

    println!(
        "Forward pass {:?} -> {:?} in {:?} on `{:?}` device",
        image.size(),
        output.size(),
        duration,
        device
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let graph = rcan::rcan(&config)?;

    print!("{}", graph.summary());
    println!("Input shape: {}", graph.input_shape());
    println!("Output shape: {}", graph.output_shape());

    if args.run {
        let device = if args.cpu { Device::Cpu } else { *DEVICE };
        run_once(&config, device, args.height, args.width)?;
    }
    Ok(())
}
