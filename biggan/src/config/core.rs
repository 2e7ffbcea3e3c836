//! Core configuration structures for the decoder.
//!
//! `DecoderConfig` holds the flat set of construction hyperparameters, and
//! `LoaderOptions` holds the smaller options bundle that selects a backbone preset.

use std::str::FromStr;

use crate::error::{BigGanError, BigGanResult};
use burn::prelude::*;

use super::enums::Backbone;

/// Upsampling ratios that have a channel schedule.
pub const SUPPORTED_RATIOS: [usize; 3] = [8, 16, 32];

/// Side of the auxiliary feature map decoded from the low half of a hierarchical latent.
pub const HIERARCHICAL_SIZE: usize = 16;

// Base output channels per group, multiplied by `width`.
const RATIO_8_CHANNELS: [usize; 3] = [64, 32, 16];
const RATIO_16_CHANNELS: [usize; 4] = [128, 64, 32, 16];
const RATIO_32_CHANNELS: [usize; 5] = [128, 64, 32, 16, 16];

// Residual blocks per group
const RATIO_8_BLOCKS: [usize; 3] = [1, 1, 1];
const RATIO_16_BLOCKS: [usize; 4] = [1, 1, 1, 1];
const RATIO_32_BLOCKS: [usize; 5] = [1, 1, 2, 2, 1];

/// Hyperparameters of the decoder.
///
/// Every group of the decoder doubles the spatial size, so the output is
/// `in_h * 2^groups` by `in_w * 2^groups` where the number of groups is 3, 4 or 5 for
/// ratios 8, 16 and 32.
#[derive(Config, Debug)]
pub struct DecoderConfig {
    /// Latent vector width (per half when hierarchical).
    pub z_dim: usize,
    /// Channel multiplier applied to the base schedule.
    pub width: usize,
    /// Channels of the initial feature map reshaped from the MLP output.
    pub in_ch: usize,
    /// Total upsampling ratio, one of 8, 16 or 32.
    pub ratio: usize,
    /// Height of the initial feature map.
    pub in_h: usize,
    /// Width of the initial feature map.
    pub in_w: usize,
    /// MLP hidden width, in multiples of `in_ch`.
    pub mlp_width: usize,
    /// Number of hidden MLP stages.
    pub mlp_depth: usize,
    /// Split the latent in two and inject the second half before the last group.
    #[config(default = "false")]
    pub hierarchical: bool,
}

impl DecoderConfig {
    /// Validate the configuration and return appropriate errors for invalid settings.
    ///
    /// # Errors
    ///
    /// Returns `Err(BigGanError::UnsupportedRatio)` if `ratio` has no schedule.
    /// Returns `Err(BigGanError::InvalidConfiguration)` for zero sizes, or when the
    /// hierarchical feature map cannot be concatenated before the last group.
    pub fn validate(&self) -> BigGanResult<()> {
        let sizes = [
            ("z_dim", self.z_dim),
            ("width", self.width),
            ("in_ch", self.in_ch),
            ("in_h", self.in_h),
            ("in_w", self.in_w),
            ("mlp_width", self.mlp_width),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(BigGanError::InvalidConfiguration {
                    reason: format!("{name} must be greater than 0"),
                });
            }
        }

        let groups = self.block_schedule()?.len();

        if self.hierarchical {
            let scale = 1 << (groups - 1);
            let (h, w) = (self.in_h * scale, self.in_w * scale);
            if h != HIERARCHICAL_SIZE || w != HIERARCHICAL_SIZE {
                return Err(BigGanError::InvalidConfiguration {
                    reason: format!(
                        "hierarchical decoding injects a {HIERARCHICAL_SIZE}x{HIERARCHICAL_SIZE} feature map before the last group, but the feature map there is {h}x{w}"
                    ),
                });
            }
        }

        Ok(())
    }

    /// Output channels of every group, in order.
    pub fn channel_schedule(&self) -> BigGanResult<Vec<usize>> {
        let base: &[usize] = match self.ratio {
            8 => &RATIO_8_CHANNELS,
            16 => &RATIO_16_CHANNELS,
            32 => &RATIO_32_CHANNELS,
            ratio => return Err(BigGanError::UnsupportedRatio { ratio }),
        };

        Ok(base.iter().map(|channels| channels * self.width).collect())
    }

    /// Number of residual blocks of every group, in order.
    pub fn block_schedule(&self) -> BigGanResult<&'static [usize]> {
        match self.ratio {
            8 => Ok(&RATIO_8_BLOCKS),
            16 => Ok(&RATIO_16_BLOCKS),
            32 => Ok(&RATIO_32_BLOCKS),
            ratio => Err(BigGanError::UnsupportedRatio { ratio }),
        }
    }

    /// Spatial size `[height, width]` of the generated images.
    pub fn output_size(&self) -> BigGanResult<[usize; 2]> {
        let scale = 1 << self.block_schedule()?.len();
        Ok([self.in_h * scale, self.in_w * scale])
    }

    /// Width of the latent vectors `forward` expects.
    pub const fn input_features(&self) -> usize {
        if self.hierarchical {
            2 * self.z_dim
        } else {
            self.z_dim
        }
    }
}

/// Options selecting a decoder from a backbone preset.
#[derive(Config, Debug)]
pub struct LoaderOptions {
    /// Backbone name, `"resnet18"` or `"resnet50"`.
    pub model: String,
    /// Channel multiplier of the decoder.
    #[config(default = "1")]
    pub dec_width: usize,
    /// Number of hidden MLP stages.
    #[config(default = "2")]
    pub dec_mlp_depth: usize,
    /// Enable hierarchical decoding.
    #[config(default = "false")]
    pub dec_hierarchical: bool,
}

impl LoaderOptions {
    /// The backbone named by `model`.
    ///
    /// # Errors
    ///
    /// Returns `Err(BigGanError::NotImplemented)` for unknown names.
    pub fn backbone(&self) -> BigGanResult<Backbone> {
        Backbone::from_str(&self.model)
    }

    /// Resolves the options into a full decoder configuration.
    ///
    /// The ratio is not checked here; [`DecoderConfig::validate`] rejects it if needed.
    pub fn decoder_config(&self) -> BigGanResult<DecoderConfig> {
        let preset = self.backbone()?.preset();

        Ok(DecoderConfig::new(
            preset.z_dim,
            self.dec_width,
            preset.z_dim,
            preset.ratio(),
            preset.fm_size,
            preset.fm_size,
            preset.fm_size,
            self.dec_mlp_depth,
        )
        .with_hierarchical(self.dec_hierarchical))
    }
}
