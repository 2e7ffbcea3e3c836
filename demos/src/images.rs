//! Conversion of decoder outputs to images.

use anyhow::{bail, Context, Result};
use burn::prelude::*;
use image::RgbImage;

/// Maps a batch of `[-1, 1]` images of shape `[N, 3, H, W]` to 8-bit RGB images.
pub fn tensor_to_images<B: Backend>(images: Tensor<B, 4>) -> Result<Vec<RgbImage>> {
    let [_, channels, height, width] = images.dims();
    if channels != 3 {
        bail!("Expected RGB images, got {channels} channels");
    }

    let pixels = images
        .add_scalar(1.0)
        .mul_scalar(127.5)
        .clamp(0.0, 255.0)
        .permute([0, 2, 3, 1])
        .into_data()
        .iter::<f32>()
        .map(|value| value.round() as u8)
        .collect::<Vec<_>>();

    pixels
        .chunks_exact(height * width * 3)
        .enumerate()
        .map(|(index, chunk)| {
            RgbImage::from_raw(width as u32, height as u32, chunk.to_vec()).with_context(|| {
                format!("Failed to build image {index} of size {width}x{height}")
            })
        })
        .collect()
}
