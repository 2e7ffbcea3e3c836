//! # Latent MLP
//!
//! Maps a latent vector to the flattened initial feature map of the decoder.

use burn::{
    nn::{BatchNorm, BatchNormConfig, LeakyRelu, LeakyReluConfig, Linear, LinearConfig},
    prelude::*,
};

/// Configuration for the `Mlp` module.
#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Input width.
    pub d_input: usize,
    /// Output width.
    pub d_output: usize,
    /// Width of the hidden stages. Ignored when `n_layers` is 0.
    pub d_hidden: usize,
    /// Number of hidden (linear, batch norm, leaky ReLU) stages.
    pub n_layers: usize,
    /// Negative slope of the leaky ReLU.
    #[config(default = "0.2")]
    pub negative_slope: f64,
}

impl MlpConfig {
    /// Initializes a new `Mlp` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> Mlp<B> {
        let layers = (0..self.n_layers)
            .map(|i| {
                let d_in = if i == 0 { self.d_input } else { self.d_hidden };
                MlpLayer {
                    linear: LinearConfig::new(d_in, self.d_hidden)
                        .with_bias(false)
                        .init(device),
                    bn: BatchNormConfig::new(self.d_hidden).init(device),
                    activation: LeakyReluConfig::new()
                        .with_negative_slope(self.negative_slope)
                        .init(),
                }
            })
            .collect();

        let d_last = if self.n_layers == 0 {
            self.d_input
        } else {
            self.d_hidden
        };

        Mlp {
            layers,
            linear_out: LinearConfig::new(d_last, self.d_output).init(device),
        }
    }
}

/// One hidden stage: bias-free linear, batch norm, leaky ReLU.
#[derive(Module, Debug)]
pub struct MlpLayer<B: Backend> {
    linear: Linear<B>,
    bn: BatchNorm<B, 0>,
    activation: LeakyRelu,
}

impl<B: Backend> MlpLayer<B> {
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.linear.forward(x);
        let x = self.bn.forward(x);
        self.activation.forward(x)
    }
}

/// Stack of hidden stages followed by a linear projection.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    layers: Vec<MlpLayer<B>>,
    linear_out: Linear<B>,
}

impl<B: Backend> Mlp<B> {
    /// # Shapes
    /// - input: `[batch_size, d_input]`
    /// - output: `[batch_size, d_output]`
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.layers.iter().fold(x, |x, layer| layer.forward(x));
        self.linear_out.forward(x)
    }

    /// Number of hidden stages.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{ndarray::NdArray, Autodiff},
        tensor::{Distribution, ElementConversion},
    };

    type TestBackend = NdArray<f32>;
    type TestAutodiffBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_mlp_shape() {
        let device = Default::default();
        let mlp = MlpConfig::new(8, 12, 16, 3).init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 2>::random([4, 8], Distribution::Default, &device);

        assert_eq!(mlp.depth(), 3);
        assert_eq!(mlp.forward(x).dims(), [4, 12]);
    }

    #[test]
    fn test_zero_layers_is_a_single_linear() {
        let device = Default::default();
        let mlp = MlpConfig::new(8, 5, 100, 0).init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 2>::random([3, 8], Distribution::Default, &device);
        let output = mlp.forward(x.clone());
        let expected = mlp.linear_out.forward(x);

        assert_eq!(mlp.depth(), 0);
        let diff = (output - expected).abs().max().into_scalar().elem::<f32>();
        assert_eq!(diff, 0.0);
    }

    #[test]
    fn test_hidden_layers_are_bias_free() {
        let device = Default::default();
        let mlp = MlpConfig::new(4, 2, 6, 2).init::<TestBackend>(&device);

        assert!(mlp.layers.iter().all(|layer| layer.linear.bias.is_none()));
        assert!(mlp.linear_out.bias.is_some());
    }

    #[test]
    fn test_training_forward_uses_batch_statistics() {
        let device = Default::default();
        let mlp = MlpConfig::new(4, 3, 6, 2).init::<TestAutodiffBackend>(&device);

        let x = Tensor::<TestAutodiffBackend, 2>::random(
            [5, 4],
            Distribution::Normal(0.0, 1.0),
            &device,
        );

        assert_eq!(mlp.forward(x).dims(), [5, 3]);
    }
}
