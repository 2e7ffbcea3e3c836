//! # Model Architectures
//!
//! - `decoder`: the latent-to-image `Decoder`.
//! - `modules`: conditional batch normalization, the interpolating residual blocks and
//!   groups, and the latent MLP.

pub mod decoder;
pub mod modules;

pub use decoder::{Decoder, DecoderRecord};
pub use modules::*;
