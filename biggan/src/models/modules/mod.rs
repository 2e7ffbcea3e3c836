//! Neural network building blocks of the decoder.

mod conditional_batch_norm;
mod mlp;
mod residual_blocks;

pub use conditional_batch_norm::*;
pub use mlp::*;
pub use residual_blocks::*;
