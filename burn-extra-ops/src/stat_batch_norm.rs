//! Batch normalization without a learned affine transform.
//!
//! Burn's `BatchNorm` always carries `gamma`/`beta` parameters. Conditional
//! normalization layers compute their own per-sample scale and shift, so they need the
//! bare statistics-only variant.

use burn::{module::RunningState, prelude::*};

/// Configuration for the `StatBatchNorm` module.
#[derive(Config, Debug)]
pub struct StatBatchNormConfig {
    /// Number of channels (axis 1 of the input).
    pub num_features: usize,
    /// Added to the variance for numerical stability.
    #[config(default = "1e-5")]
    pub epsilon: f64,
    /// Weight of the current batch in the running statistics update.
    #[config(default = "0.1")]
    pub momentum: f64,
}

impl StatBatchNormConfig {
    /// Initializes a new `StatBatchNorm` module with zero running mean and unit running
    /// variance.
    pub fn init<B: Backend>(&self, device: &B::Device) -> StatBatchNorm<B> {
        StatBatchNorm {
            running_mean: RunningState::new(Tensor::zeros([self.num_features], device)),
            running_var: RunningState::new(Tensor::ones([self.num_features], device)),
            momentum: self.momentum,
            epsilon: self.epsilon,
        }
    }
}

/// Non-affine batch normalization.
///
/// Autodiff backends normalize with the statistics of the current batch and update the
/// running statistics; inference backends normalize with the running statistics.
#[derive(Module, Debug)]
pub struct StatBatchNorm<B: Backend> {
    running_mean: RunningState<Tensor<B, 1>>,
    running_var: RunningState<Tensor<B, 1>>,
    momentum: f64,
    epsilon: f64,
}

impl<B: Backend> StatBatchNorm<B> {
    /// # Shapes
    /// - input: `[batch_size, channels, ...]`
    /// - output: same as input
    pub fn forward<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, D> {
        if B::ad_enabled() {
            self.forward_train(input)
        } else {
            self.forward_inference(input)
        }
    }

    /// Running mean and variance.
    pub fn running_stats(&self) -> (Tensor<B, 1>, Tensor<B, 1>) {
        (self.running_mean.value(), self.running_var.value())
    }

    fn forward_inference<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, D> {
        let device = input.device();
        let channels = input.dims()[1];
        let mut shape = [1; D];
        shape[1] = channels;

        let mean = self.running_mean.value().to_device(&device).reshape(shape);
        let var = self.running_var.value().to_device(&device).reshape(shape);

        self.normalize(input, mean, var)
    }

    fn forward_train<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, D> {
        let device = input.device();
        let dims = input.dims();
        let channels = dims[1];
        let count = dims[0] * dims.iter().skip(2).product::<usize>();

        let mut shape = [1; D];
        shape[1] = channels;

        let flat = input.clone().swap_dims(0, 1).reshape([channels, count]);
        let mean = flat.clone().mean_dim(1);
        let var = flat.sub(mean.clone()).powf_scalar(2.0).mean_dim(1);

        let unbiased = if count > 1 {
            var.clone().detach().mul_scalar(count as f64 / (count - 1) as f64)
        } else {
            var.clone().detach()
        };

        let running_mean = self
            .running_mean
            .value_sync()
            .to_device(&device)
            .mul_scalar(1.0 - self.momentum)
            .add(mean.clone().detach().reshape([channels]).mul_scalar(self.momentum));
        let running_var = self
            .running_var
            .value_sync()
            .to_device(&device)
            .mul_scalar(1.0 - self.momentum)
            .add(unbiased.reshape([channels]).mul_scalar(self.momentum));

        self.running_mean.update(running_mean.detach());
        self.running_var.update(running_var.detach());

        self.normalize(input, mean.reshape(shape), var.reshape(shape))
    }

    fn normalize<const D: usize>(
        &self,
        input: Tensor<B, D>,
        mean: Tensor<B, D>,
        var: Tensor<B, D>,
    ) -> Tensor<B, D> {
        input.sub(mean).div(var.add_scalar(self.epsilon).sqrt())
    }
}
