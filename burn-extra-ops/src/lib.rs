//! Additional operations for the Burn deep learning framework
//!
//! This crate provides layers and tensor operations that generative models commonly
//! rely on but that are not (yet) part of the core Burn framework.

use burn::{
    prelude::*,
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};

mod spectral_norm;
mod stat_batch_norm;

// Convenient re-exports
pub use spectral_norm::{l2_normalize, SpectralNormConv2d, SpectralNormConv2dConfig};
pub use stat_batch_norm::{StatBatchNorm, StatBatchNormConfig};

/// Additional operations for Burn image tensors
pub trait TensorExtraOps<B: Backend> {
    /// Nearest-neighbor upsampling of the two spatial dimensions by an integer factor.
    ///
    /// # Shapes
    /// - input: `[batch_size, channels, height, width]`
    /// - output: `[batch_size, channels, height * factor, width * factor]`
    fn upsample_nearest(self, factor: usize) -> Self;
}

impl<B: Backend> TensorExtraOps<B> for Tensor<B, 4> {
    fn upsample_nearest(self, factor: usize) -> Self {
        if factor == 1 {
            return self;
        }
        let [_, _, h, w] = self.dims();
        interpolate(
            self,
            [h * factor, w * factor],
            InterpolateOptions::new(InterpolateMode::Nearest),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::ndarray::NdArray, tensor::ElementConversion};

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_upsample_nearest_doubles_spatial_dims() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 4>::random(
            [2, 3, 4, 5],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let output = tensor.upsample_nearest(2);
        assert_eq!(output.dims(), [2, 3, 8, 10]);
    }

    #[test]
    fn test_upsample_nearest_repeats_pixels() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 4>::from_floats([[[[1.0, 2.0], [3.0, 4.0]]]], &device);

        let output = tensor.upsample_nearest(2);
        let expected = Tensor::<TestBackend, 4>::from_floats(
            [[[
                [1.0, 1.0, 2.0, 2.0],
                [1.0, 1.0, 2.0, 2.0],
                [3.0, 3.0, 4.0, 4.0],
                [3.0, 3.0, 4.0, 4.0],
            ]]],
            &device,
        );

        let diff = (output - expected).abs().max().into_scalar().elem::<f32>();
        assert!(diff < 1e-6);
    }

    #[test]
    fn test_upsample_nearest_factor_one_is_noop() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 4>::ones([1, 2, 3, 3], &device);

        assert_eq!(tensor.upsample_nearest(1).dims(), [1, 2, 3, 3]);
    }
}
