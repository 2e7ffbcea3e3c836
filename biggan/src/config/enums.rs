//! Enumeration types used in decoder configuration.

use std::str::FromStr;

use burn::prelude::*;

use crate::error::{BigGanError, BigGanResult};

/// Encoder backbones the decoder can be paired with.
///
/// The backbone determines the latent size and the resolution of the images the
/// autoencoder works on.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum Backbone {
    Resnet18,
    Resnet50,
}

/// Sizes implied by a backbone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderPreset {
    /// Latent vector width.
    pub z_dim: usize,
    /// Side of the square output image.
    pub img_size: usize,
    /// Side of the square feature map the backbone produces for such an image.
    pub fm_size: usize,
}

impl DecoderPreset {
    /// Upsampling ratio between the feature map and the image (integer division).
    pub const fn ratio(&self) -> usize {
        self.img_size / self.fm_size
    }
}

impl Backbone {
    pub const fn preset(&self) -> DecoderPreset {
        match self {
            Self::Resnet18 => DecoderPreset {
                z_dim: 512,
                img_size: 96,
                fm_size: 3,
            },
            Self::Resnet50 => DecoderPreset {
                z_dim: 2048,
                img_size: 224,
                fm_size: 7,
            },
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Resnet18 => "resnet18",
            Self::Resnet50 => "resnet50",
        }
    }
}

impl FromStr for Backbone {
    type Err = BigGanError;

    fn from_str(name: &str) -> BigGanResult<Self> {
        match name {
            "resnet18" => Ok(Self::Resnet18),
            "resnet50" => Ok(Self::Resnet50),
            other => Err(BigGanError::NotImplemented {
                backbone: other.to_string(),
            }),
        }
    }
}
