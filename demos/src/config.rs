//! Configuration for the demo binaries.
//!
//! A JSON file with these fields can be passed with `--config`; command-line flags
//! override what it sets.

use std::path::PathBuf;

use biggan_burn::LoaderOptions;
use serde::{Deserialize, Serialize};

/// Configuration of the `generate` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Backbone preset, `"resnet18"` or `"resnet50"`.
    pub model: String,
    /// Decoder channel multiplier.
    pub dec_width: usize,
    /// Hidden MLP stages.
    pub dec_mlp_depth: usize,
    /// Hierarchical decoding.
    pub dec_hierarchical: bool,
    /// Number of images to generate.
    pub batch_size: usize,
    /// Seed of the latent sampler.
    pub seed: Option<u64>,
    /// Trained weights (`NamedMpkFileRecorder` record); random weights when absent.
    pub weights: Option<PathBuf>,
    /// Output directory.
    pub output_path: PathBuf,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            model: "resnet18".to_string(),
            dec_width: 1,
            dec_mlp_depth: 2,
            dec_hierarchical: false,
            batch_size: 4,
            seed: None,
            weights: None,
            output_path: PathBuf::from("outputs"),
        }
    }
}

impl GenerateConfig {
    /// Options for [`biggan_burn::load_decoder`].
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions::new(self.model.clone())
            .with_dec_width(self.dec_width)
            .with_dec_mlp_depth(self.dec_mlp_depth)
            .with_dec_hierarchical(self.dec_hierarchical)
    }
}
