//! Construction of decoders from backbone presets.

use burn::prelude::*;

use crate::{config::LoaderOptions, error::BigGanResult, models::Decoder};

/// Builds the decoder matching the backbone named in `options`.
///
/// The latent size, image size and feature-map size come from the backbone preset;
/// `in_ch` equals the latent size and the MLP hidden width is `fm_size` times `in_ch`.
///
/// # Errors
///
/// Returns `Err(BigGanError::NotImplemented)` for unknown backbone names, and any error
/// [`DecoderConfig::init`](crate::DecoderConfig::init) reports for the resolved
/// configuration.
pub fn load_decoder<B: Backend>(
    options: &LoaderOptions,
    device: &Device<B>,
) -> BigGanResult<Decoder<B>> {
    let config = options.decoder_config()?;

    tracing::info!(
        model = %options.model,
        z_dim = config.z_dim,
        width = config.width,
        in_ch = config.in_ch,
        ratio = config.ratio,
        in_h = config.in_h,
        in_w = config.in_w,
        mlp_width = config.mlp_width,
        mlp_depth = config.mlp_depth,
        hierarchical = config.hierarchical,
        "loading decoder"
    );

    config.init(device)
}
