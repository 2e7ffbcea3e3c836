//! # Interpolating Residual Blocks
//!
//! The building blocks of the decoder cascade. Each block runs two
//! conditional-normalization + spectrally normalized convolution stages on the main
//! path and adds a shortcut, optionally doubling the resolution of both paths with
//! nearest-neighbor interpolation.

use burn::{nn::Relu, prelude::*};
use burn_extra_ops::{SpectralNormConv2d, SpectralNormConv2dConfig, TensorExtraOps};

use super::{ConditionalBatchNorm, ConditionalBatchNormConfig};

const UPSAMPLE_FACTOR: usize = 2;

/// Configuration for the `InterpolateResidualBlock` module.
#[derive(Config, Debug)]
pub struct InterpolateResidualBlockConfig {
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of output channels.
    pub out_channels: usize,
    /// Width of the conditioning vector.
    pub z_dim: usize,
    /// Double the spatial size.
    #[config(default = "false")]
    pub upsample: bool,
}

impl InterpolateResidualBlockConfig {
    /// Initializes a new `InterpolateResidualBlock` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> InterpolateResidualBlock<B> {
        let [ni, no] = [self.in_channels, self.out_channels];

        let conv_short =
            (ni != no).then(|| SpectralNormConv2dConfig::new([ni, no], 1).init(device));

        InterpolateResidualBlock {
            bn0: ConditionalBatchNormConfig::new(ni, self.z_dim).init(device),
            conv0: SpectralNormConv2dConfig::new([ni, no], 3).init(device),
            bn1: ConditionalBatchNormConfig::new(no, self.z_dim).init(device),
            conv1: SpectralNormConv2dConfig::new([no, no], 3).init(device),
            conv_short,
            relu: Relu::new(),
            upsample: self.upsample,
        }
    }
}

/// A conditional residual block with optional 2x nearest-neighbor upsampling.
#[derive(Module, Debug)]
pub struct InterpolateResidualBlock<B: Backend> {
    bn0: ConditionalBatchNorm<B>,
    conv0: SpectralNormConv2d<B>,
    bn1: ConditionalBatchNorm<B>,
    conv1: SpectralNormConv2d<B>,
    /// 1x1 projection of the shortcut, present when the channel count changes.
    conv_short: Option<SpectralNormConv2d<B>>,
    relu: Relu,
    upsample: bool,
}

impl<B: Backend> InterpolateResidualBlock<B> {
    /// # Shapes
    /// - x: `[batch_size, in_channels, height, width]`
    /// - z: `[batch_size, z_dim]`
    /// - output: `[batch_size, out_channels, 2 * height, 2 * width]` when upsampling,
    ///   `[batch_size, out_channels, height, width]` otherwise
    pub fn forward(&self, x: Tensor<B, 4>, z: Tensor<B, 2>) -> Tensor<B, 4> {
        let shortcut = self.resample(x.clone());

        let x = self.relu.forward(self.bn0.forward(x, z.clone()));
        let x = self.resample(x);
        let x = self.conv0.forward(x);
        let x = self.relu.forward(self.bn1.forward(x, z));
        let x = self.conv1.forward(x);

        match &self.conv_short {
            Some(conv_short) => conv_short.forward(shortcut) + x,
            None => x + shortcut,
        }
    }

    fn resample(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        if self.upsample {
            x.upsample_nearest(UPSAMPLE_FACTOR)
        } else {
            x
        }
    }
}

/// Configuration for the `InterpolateResidualGroup` module.
#[derive(Config, Debug)]
pub struct InterpolateResidualGroupConfig {
    /// Number of residual blocks.
    pub n_blocks: usize,
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of output channels.
    pub out_channels: usize,
    /// Width of the conditioning vector.
    pub z_dim: usize,
    /// Double the spatial size in the first block.
    #[config(default = "false")]
    pub upsample: bool,
}

impl InterpolateResidualGroupConfig {
    /// Initializes a new `InterpolateResidualGroup` module.
    ///
    /// Only the first block changes the channel count and upsamples; the remaining
    /// blocks keep `out_channels` at a fixed resolution.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> InterpolateResidualGroup<B> {
        let blocks = (0..self.n_blocks)
            .map(|n| {
                let config = if n == 0 {
                    InterpolateResidualBlockConfig::new(
                        self.in_channels,
                        self.out_channels,
                        self.z_dim,
                    )
                    .with_upsample(self.upsample)
                } else {
                    InterpolateResidualBlockConfig::new(
                        self.out_channels,
                        self.out_channels,
                        self.z_dim,
                    )
                };
                config.init(device)
            })
            .collect();

        InterpolateResidualGroup { blocks }
    }
}

/// A sequence of residual blocks sharing one conditioning vector.
#[derive(Module, Debug)]
pub struct InterpolateResidualGroup<B: Backend> {
    blocks: Vec<InterpolateResidualBlock<B>>,
}

impl<B: Backend> InterpolateResidualGroup<B> {
    pub fn forward(&self, x: Tensor<B, 4>, z: Tensor<B, 2>) -> Tensor<B, 4> {
        self.blocks
            .iter()
            .fold(x, |x, block| block.forward(x, z.clone()))
    }

    /// Number of residual blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{ndarray::NdArray, Autodiff},
        module::Param,
        tensor::{Distribution, ElementConversion},
    };

    type TestBackend = NdArray<f32>;
    type TestAutodiffBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_upsampling_block_shape() {
        let device = Default::default();
        let block = InterpolateResidualBlockConfig::new(8, 4, 6)
            .with_upsample(true)
            .init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 4>::random([2, 8, 3, 5], Distribution::Default, &device);
        let z = Tensor::<TestBackend, 2>::random([2, 6], Distribution::Default, &device);

        assert_eq!(block.forward(x, z).dims(), [2, 4, 6, 10]);
        assert!(block.conv_short.is_some());
    }

    #[test]
    fn test_plain_block_keeps_shape_without_projection() {
        let device = Default::default();
        let block = InterpolateResidualBlockConfig::new(4, 4, 3).init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 4>::random([1, 4, 5, 5], Distribution::Default, &device);
        let z = Tensor::<TestBackend, 2>::random([1, 3], Distribution::Default, &device);

        assert_eq!(block.forward(x, z).dims(), [1, 4, 5, 5]);
        assert!(block.conv_short.is_none());
    }

    #[test]
    fn test_zeroed_convolutions_reduce_block_to_identity() {
        let device = Default::default();
        let mut block = InterpolateResidualBlockConfig::new(4, 4, 3).init::<TestBackend>(&device);
        block.conv0.conv.weight = Param::from_tensor(Tensor::zeros([4, 4, 3, 3], &device));
        block.conv1.conv.weight = Param::from_tensor(Tensor::zeros([4, 4, 3, 3], &device));

        let x = Tensor::<TestBackend, 4>::random(
            [2, 4, 5, 5],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let z = Tensor::<TestBackend, 2>::random([2, 3], Distribution::Default, &device);

        let output = block.forward(x.clone(), z);

        let diff = (output - x).abs().max().into_scalar().elem::<f32>();
        assert_eq!(diff, 0.0);
    }

    #[test]
    fn test_group_only_first_block_upsamples() {
        let device = Default::default();
        let group = InterpolateResidualGroupConfig::new(3, 8, 4, 2)
            .with_upsample(true)
            .init::<TestBackend>(&device);

        assert_eq!(group.len(), 3);
        assert!(group.blocks[0].upsample);
        assert!(group.blocks[0].conv_short.is_some());
        for block in &group.blocks[1..] {
            assert!(!block.upsample);
            assert!(block.conv_short.is_none());
        }

        let x = Tensor::<TestBackend, 4>::random([2, 8, 4, 4], Distribution::Default, &device);
        let z = Tensor::<TestBackend, 2>::random([2, 2], Distribution::Default, &device);

        assert_eq!(group.forward(x, z).dims(), [2, 4, 8, 8]);
    }

    #[test]
    fn test_group_training_forward_is_finite() {
        let device = Default::default();
        let group = InterpolateResidualGroupConfig::new(2, 4, 4, 3)
            .with_upsample(true)
            .init::<TestAutodiffBackend>(&device);

        let x = Tensor::<TestAutodiffBackend, 4>::random(
            [3, 4, 4, 4],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let z = Tensor::<TestAutodiffBackend, 2>::random(
            [3, 3],
            Distribution::Normal(0.0, 1.0),
            &device,
        );

        let output = group.forward(x, z);
        assert_eq!(output.dims(), [3, 4, 8, 8]);

        let nan_count = output.is_nan().int().sum().into_scalar().elem::<i64>();
        assert_eq!(nan_count, 0);
    }
}
