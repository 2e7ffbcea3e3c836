//! Configuration module for the decoder.
//!
//! - `core`: the decoder hyperparameters, their validation and the derived schedules,
//!   plus the options bundle consumed by [`load_decoder`](crate::load_decoder)
//! - `enums`: the backbone presets

pub mod core;
pub mod enums;

pub use self::core::{DecoderConfig, LoaderOptions, HIERARCHICAL_SIZE, SUPPORTED_RATIOS};
pub use enums::{Backbone, DecoderPreset};
