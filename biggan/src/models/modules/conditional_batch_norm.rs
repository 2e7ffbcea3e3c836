//! # Conditional Batch Normalization
//!
//! Batch normalization whose per-channel scale and shift are not learned constants but
//! a linear projection of a conditioning vector, so every sample gets its own affine
//! transform.

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
};
use burn_extra_ops::{StatBatchNorm, StatBatchNormConfig};

/// Configuration for the `ConditionalBatchNorm` module.
#[derive(Config, Debug)]
pub struct ConditionalBatchNormConfig {
    /// Number of channels of the normalized feature map.
    pub num_features: usize,
    /// Width of the conditioning vector.
    pub z_dim: usize,
}

impl ConditionalBatchNormConfig {
    /// Initializes a new `ConditionalBatchNorm` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ConditionalBatchNorm<B> {
        ConditionalBatchNorm {
            bn: StatBatchNormConfig::new(self.num_features).init(device),
            condition: LinearConfig::new(self.z_dim, 2 * self.num_features).init(device),
            num_features: self.num_features,
        }
    }
}

/// Batch normalization modulated by a conditioning vector.
#[derive(Module, Debug)]
pub struct ConditionalBatchNorm<B: Backend> {
    bn: StatBatchNorm<B>,
    condition: Linear<B>,
    num_features: usize,
}

impl<B: Backend> ConditionalBatchNorm<B> {
    /// # Shapes
    /// - x: `[batch_size, num_features, height, width]`
    /// - z: `[batch_size, z_dim]`
    /// - output: same as `x`
    pub fn forward(&self, x: Tensor<B, 4>, z: Tensor<B, 2>) -> Tensor<B, 4> {
        let [batch_size, _] = z.dims();
        let channels = self.num_features;

        // First half scales, second half shifts.
        let cond = self
            .condition
            .forward(z)
            .reshape([batch_size, 2 * channels, 1, 1]);
        let scale = cond.clone().narrow(1, 0, channels);
        let shift = cond.narrow(1, channels, channels);

        self.bn.forward(x) * scale + shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::NdArray,
        module::Param,
        tensor::{Distribution, ElementConversion},
    };

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_conditional_batch_norm_shape() {
        let device = Default::default();
        let cbn = ConditionalBatchNormConfig::new(6, 4).init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 4>::random([3, 6, 5, 5], Distribution::Default, &device);
        let z = Tensor::<TestBackend, 2>::random([3, 4], Distribution::Default, &device);

        assert_eq!(cbn.forward(x, z).dims(), [3, 6, 5, 5]);
    }

    #[test]
    fn test_scale_and_shift_come_from_projection() {
        let device = Default::default();
        let mut cbn = ConditionalBatchNormConfig::new(2, 3).init::<TestBackend>(&device);

        // Constant projection: scale 2 for every channel, shift 1.
        cbn.condition.weight = Param::from_tensor(Tensor::zeros([3, 4], &device));
        cbn.condition.bias = Some(Param::from_tensor(Tensor::from_floats(
            [2.0, 2.0, 1.0, 1.0],
            &device,
        )));

        let x = Tensor::<TestBackend, 4>::random(
            [2, 2, 3, 3],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let z = Tensor::<TestBackend, 2>::random([2, 3], Distribution::Default, &device);

        let output = cbn.forward(x.clone(), z);
        let expected = cbn.bn.forward(x) * 2.0 + 1.0;

        let diff = (output - expected).abs().max().into_scalar().elem::<f32>();
        assert!(diff < 1e-6);
    }

    #[test]
    fn test_modulation_is_per_sample() {
        let device = Default::default();
        let cbn = ConditionalBatchNormConfig::new(2, 3).init::<TestBackend>(&device);

        // Same feature map for both samples, different conditioning.
        let x = Tensor::<TestBackend, 4>::ones([2, 2, 2, 2], &device);
        let z = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0, 0.0], [0.0, 0.0, 5.0]], &device);

        let output = cbn.forward(x, z);
        let first = output.clone().narrow(0, 0, 1);
        let second = output.narrow(0, 1, 1);

        let diff = (first - second).abs().max().into_scalar().elem::<f32>();
        assert!(diff > 0.0);
    }
}
