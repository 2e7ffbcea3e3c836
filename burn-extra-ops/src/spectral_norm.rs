//! # Spectral Normalization
//!
//! A 2D convolution whose kernel is rescaled by an estimate of its largest singular
//! value, bounding the Lipschitz constant of the layer (Miyato et al., 2018).
//!
//! The singular value is estimated with power iteration on the kernel reshaped to a
//! `[out_channels, in_channels * k * k]` matrix. The singular-vector estimates `u` and
//! `v` are persisted as running state so that every training step only needs a
//! single iteration to stay accurate. They are converged against the initial kernel
//! at construction, so the estimate is already meaningful on inference backends.

use burn::{
    module::RunningState,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        PaddingConfig2d,
    },
    prelude::*,
    tensor::{module::conv2d, ops::ConvOptions, Distribution},
};

/// Configuration for the `SpectralNormConv2d` module.
#[derive(Config, Debug)]
pub struct SpectralNormConv2dConfig {
    /// Input and output channels.
    pub channels: [usize; 2],
    /// Size of the square kernel. Padding is `kernel_size / 2` so odd kernels keep the
    /// spatial size.
    pub kernel_size: usize,
    /// Number of power-iteration steps performed per training forward pass.
    #[config(default = "1")]
    pub n_power_iterations: usize,
    /// Number of power-iteration steps run against the initial kernel.
    #[config(default = "15")]
    pub n_init_power_iterations: usize,
    /// Lower bound for vector norms and for the singular value estimate.
    #[config(default = "1e-12")]
    pub epsilon: f64,
    /// Whether the convolution has a bias.
    #[config(default = "false")]
    pub bias: bool,
}

impl SpectralNormConv2dConfig {
    /// Initializes a new `SpectralNormConv2d` module.
    pub fn init<B: Backend>(&self, device: &B::Device) -> SpectralNormConv2d<B> {
        let [in_channels, out_channels] = self.channels;
        let padding = self.kernel_size / 2;

        let conv = Conv2dConfig::new(self.channels, [self.kernel_size, self.kernel_size])
            .with_stride([1, 1])
            .with_padding(PaddingConfig2d::Explicit(padding, padding))
            .with_bias(self.bias)
            .init(device);

        let fan_in = in_channels * self.kernel_size * self.kernel_size;
        let u = l2_normalize(
            Tensor::random([out_channels], Distribution::Normal(0.0, 1.0), device),
            self.epsilon,
        );
        let v = l2_normalize(
            Tensor::random([fan_in], Distribution::Normal(0.0, 1.0), device),
            self.epsilon,
        );

        let weight_mat = conv.weight.val().detach().reshape([out_channels, fan_in]);
        let (u, v) = power_iteration(
            weight_mat,
            u,
            v,
            self.n_init_power_iterations,
            self.epsilon,
        );

        SpectralNormConv2d {
            conv,
            u: RunningState::new(u),
            v: RunningState::new(v),
            padding,
            n_power_iterations: self.n_power_iterations,
            epsilon: self.epsilon,
        }
    }
}

/// Spectrally normalized 2D convolution.
///
/// The unnormalized kernel lives in `conv.weight` and is the trainable parameter.
#[derive(Module, Debug)]
pub struct SpectralNormConv2d<B: Backend> {
    pub conv: Conv2d<B>,
    u: RunningState<Tensor<B, 1>>,
    v: RunningState<Tensor<B, 1>>,
    padding: usize,
    n_power_iterations: usize,
    epsilon: f64,
}

impl<B: Backend> SpectralNormConv2d<B> {
    /// Applies the convolution with the spectrally normalized kernel.
    ///
    /// # Shapes
    /// - input: `[batch_size, in_channels, height, width]`
    /// - output: `[batch_size, out_channels, height, width]`
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let weight = self.normalized_weight();
        let bias = self.conv.bias.as_ref().map(|bias| bias.val());

        conv2d(
            input,
            weight,
            bias,
            ConvOptions::new([1, 1], [self.padding, self.padding], [1, 1], 1),
        )
    }

    /// The kernel divided by its estimated spectral norm.
    ///
    /// Autodiff backends refine the singular vectors before computing the estimate;
    /// other backends reuse the stored vectors as-is.
    pub fn normalized_weight(&self) -> Tensor<B, 4> {
        let weight = self.conv.weight.val();
        let [out_channels, in_channels, kh, kw] = weight.dims();
        let weight_mat = weight.clone().reshape([out_channels, in_channels * kh * kw]);

        let sigma = self.sigma(weight_mat);

        weight / sigma.reshape([1, 1, 1, 1])
    }

    /// Estimated largest singular value of the flattened kernel, shape `[1]`.
    pub fn sigma(&self, weight_mat: Tensor<B, 2>) -> Tensor<B, 1> {
        let device = weight_mat.device();

        let (u, v) = if B::ad_enabled() {
            let (u, v) = power_iteration(
                weight_mat.clone().detach(),
                self.u.value_sync().to_device(&device),
                self.v.value_sync().to_device(&device),
                self.n_power_iterations,
                self.epsilon,
            );

            self.u.update(u.clone());
            self.v.update(v.clone());
            (u, v)
        } else {
            (
                self.u.value().to_device(&device),
                self.v.value().to_device(&device),
            )
        };

        u.unsqueeze_dim::<2>(0)
            .matmul(weight_mat)
            .matmul(v.unsqueeze_dim::<2>(1))
            .reshape([1])
            .clamp_min(self.epsilon)
    }
}

/// Refines the left and right singular-vector estimates of `weight_mat`.
fn power_iteration<B: Backend>(
    weight_mat: Tensor<B, 2>,
    mut u: Tensor<B, 1>,
    mut v: Tensor<B, 1>,
    n_iterations: usize,
    epsilon: f64,
) -> (Tensor<B, 1>, Tensor<B, 1>) {
    let [rows, cols] = weight_mat.dims();

    for _ in 0..n_iterations {
        v = l2_normalize(
            weight_mat
                .clone()
                .transpose()
                .matmul(u.unsqueeze_dim::<2>(1))
                .reshape([cols]),
            epsilon,
        );
        u = l2_normalize(
            weight_mat
                .clone()
                .matmul(v.clone().unsqueeze_dim::<2>(1))
                .reshape([rows]),
            epsilon,
        );
    }

    (u, v)
}

/// Divides a vector by its euclidean norm, with the norm clamped below by `epsilon`.
pub fn l2_normalize<B: Backend>(x: Tensor<B, 1>, epsilon: f64) -> Tensor<B, 1> {
    let norm = x.clone().powf_scalar(2.0).sum().sqrt().clamp_min(epsilon);
    x / norm
}
