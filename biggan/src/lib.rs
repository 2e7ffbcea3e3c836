//! BigGAN-style conditional image decoder built on Burn.
//!
//! A [`Decoder`] maps latent vectors to RGB images through an MLP and a cascade of
//! upsampling residual groups whose batch normalization is conditioned on the latent.
//! Decoders are built either from an explicit [`DecoderConfig`] or from a backbone
//! preset with [`load_decoder`].

mod config;
mod error;
mod factory;
mod models;

#[cfg(test)]
mod tests;

pub use config::{
    Backbone, DecoderConfig, DecoderPreset, LoaderOptions, HIERARCHICAL_SIZE, SUPPORTED_RATIOS,
};
pub use error::{BigGanError, BigGanResult};
pub use factory::load_decoder;
pub use models::{
    ConditionalBatchNorm, ConditionalBatchNormConfig, Decoder, DecoderRecord,
    InterpolateResidualBlock, InterpolateResidualBlockConfig, InterpolateResidualGroup,
    InterpolateResidualGroupConfig, Mlp, MlpConfig,
};
