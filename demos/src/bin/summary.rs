//! Decoder summary
//!
//! Builds a decoder from a backbone preset and prints its module tree, schedule and
//! parameter count.
//!
//! ```bash
//! cargo run --bin summary -- --model resnet18 --mlp-depth 1
//! cargo run --bin summary -- --model resnet18 --save decoder_init.mpk
//! ```

use anyhow::{Context, Result};
use biggan_burn::{load_decoder, LoaderOptions};
use biggan_demos::{create_device, init_logging, SelectedBackend};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backbone preset (resnet18, resnet50)
    #[arg(short, long, default_value = "resnet18")]
    model: String,

    /// Decoder channel multiplier
    #[arg(long, default_value = "1")]
    width: usize,

    /// Number of hidden MLP stages
    #[arg(long, default_value = "2")]
    mlp_depth: usize,

    /// Inject the second half of the latent before the last group
    #[arg(long)]
    hierarchical: bool,

    /// Print the full module tree
    #[arg(long)]
    verbose: bool,

    /// Save the initialized weights to this file
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let options = LoaderOptions::new(args.model)
        .with_dec_width(args.width)
        .with_dec_mlp_depth(args.mlp_depth)
        .with_dec_hierarchical(args.hierarchical);
    let config = options.decoder_config()?;

    let device = create_device();
    let decoder = load_decoder::<SelectedBackend>(&options, &device)
        .context("Failed to initialize decoder")?;

    if args.verbose {
        println!("{decoder}");
    }

    let [height, width] = decoder.output_size();
    println!("Decoder for {}", options.model);
    println!("  latent width:     {}", decoder.input_features());
    println!(
        "  initial map:      {}x{}x{}",
        config.in_ch, config.in_h, config.in_w
    );
    println!("  channels:         {:?}", config.channel_schedule()?);
    println!("  blocks per group: {:?}", decoder.blocks_per_group());
    println!(
        "  output:           {}x{}x{}",
        decoder.output_channels(),
        height,
        width
    );
    println!("  parameters:       {}", decoder.num_params());

    if let Some(path) = args.save {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        decoder
            .save_file(path.clone(), &recorder)
            .with_context(|| format!("Failed to save weights: {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved initialized weights");
    }

    Ok(())
}
