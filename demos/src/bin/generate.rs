//! Decoder sampling example
//!
//! Decodes standard-normal latents into images and writes them as PNG files.
//!
//! ## Usage
//!
//! ```bash
//! # Four samples from a randomly initialized resnet18-sized decoder
//! cargo run --bin generate -- --model resnet18
//!
//! # Sixteen samples from trained weights, reproducible
//! cargo run --release --bin generate -- --weights decoder.mpk --batch-size 16 --seed 7
//!
//! # Options from a JSON file
//! cargo run --bin generate -- --config generate.json
//! ```

use anyhow::{Context, Result};
use biggan_burn::{load_decoder, Decoder};
use biggan_demos::{
    create_device, get_backend_name, images::tensor_to_images, init_logging, GenerateConfig,
    SelectedBackend, SelectedDevice,
};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};
use clap::Parser;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backbone preset (resnet18, resnet50)
    #[arg(short, long)]
    model: Option<String>,

    /// Decoder channel multiplier
    #[arg(long)]
    width: Option<usize>,

    /// Number of hidden MLP stages
    #[arg(long)]
    mlp_depth: Option<usize>,

    /// Inject the second half of the latent before the last group
    #[arg(long)]
    hierarchical: bool,

    /// Number of images to generate
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Seed of the latent sampler
    #[arg(long)]
    seed: Option<u64>,

    /// Trained decoder weights
    #[arg(short, long)]
    weights: Option<PathBuf>,

    /// Output directory for the images
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        serde_json::from_str::<GenerateConfig>(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?
    } else {
        GenerateConfig::default()
    };

    // Apply command line overrides
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(width) = args.width {
        config.dec_width = width;
    }
    if let Some(mlp_depth) = args.mlp_depth {
        config.dec_mlp_depth = mlp_depth;
    }
    if args.hierarchical {
        config.dec_hierarchical = true;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.weights.is_some() {
        config.weights = args.weights;
    }
    if let Some(output) = args.output {
        config.output_path = output;
    }

    if config.batch_size == 0 {
        anyhow::bail!("Batch size must be greater than 0");
    }

    fs::create_dir_all(&config.output_path).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_path.display()
        )
    })?;

    let device = create_device();
    tracing::info!(backend = get_backend_name(), "using backend");

    if let Some(seed) = config.seed {
        SelectedBackend::seed(seed);
    }

    let decoder = build_decoder(&config, &device)?;

    let start_time = Instant::now();
    let images = decoder
        .generate(config.batch_size, &device)
        .context("Failed to decode latents")?;
    tracing::info!(
        batch_size = config.batch_size,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "decoding completed"
    );

    save_images(images, &config.output_path)?;

    tracing::info!("generation completed");
    Ok(())
}

/// Builds the decoder and loads trained weights if configured.
fn build_decoder(
    config: &GenerateConfig,
    device: &SelectedDevice,
) -> Result<Decoder<SelectedBackend>> {
    let decoder = load_decoder::<SelectedBackend>(&config.loader_options(), device)
        .context("Failed to initialize decoder")?;

    let Some(weights) = &config.weights else {
        tracing::warn!("no weights given, sampling from a randomly initialized decoder");
        return Ok(decoder);
    };

    tracing::info!(path = %weights.display(), "loading weights");
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(weights.to_path_buf(), device)
        .with_context(|| format!("Failed to load weights: {}", weights.display()))?;

    Ok(decoder.load_record(record))
}

/// Writes every image of the batch as `sample_XXXX.png`.
fn save_images(images: Tensor<SelectedBackend, 4>, output_dir: &Path) -> Result<()> {
    for (index, image) in tensor_to_images(images)?.into_iter().enumerate() {
        let path = output_dir.join(format!("sample_{index:04}.png"));
        image
            .save(&path)
            .with_context(|| format!("Failed to save image: {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved image");
    }

    Ok(())
}
