//! BigGAN decoder demos
//!
//! ## Available binaries
//!
//! - `generate`: decode random latents into PNG images
//! - `summary`: print the structure and size of a decoder, optionally saving its
//!   freshly initialized weights
//!
//! ## Usage
//!
//! ```bash
//! # Eight 96x96 samples from an untrained resnet18-sized decoder
//! cargo run --bin generate -- --model resnet18 --batch-size 8
//!
//! # Samples from trained weights
//! cargo run --release --bin generate -- --model resnet18 --weights decoder.mpk
//!
//! # Inspect a decoder
//! cargo run --bin summary -- --model resnet50 --width 2
//! ```

pub mod backend;
pub mod config;
pub mod images;

pub use backend::{create_device, get_backend_name, SelectedBackend, SelectedDevice};
pub use config::GenerateConfig;

use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
