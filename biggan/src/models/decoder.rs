//! # Decoder
//!
//! Maps latent vectors to RGB images in `[-1, 1]`.
//!
//! The latent is projected by an MLP to a small `[in_ch, in_h, in_w]` feature map, which
//! a cascade of interpolating residual groups upsamples 2x per group while narrowing the
//! channels. Every residual block is conditioned on the latent through conditional batch
//! normalization. A final batch norm, ReLU, 3x3 convolution to RGB and tanh produce the
//! image.
//!
//! In hierarchical mode the latent is twice as wide: its first half conditions the whole
//! network as usual and its second half is decoded by a single linear layer into a
//! 16x16 feature map that is concatenated to the activations entering the last group.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
    tensor::{activation::tanh, Distribution},
};

use super::{InterpolateResidualGroup, InterpolateResidualGroupConfig, Mlp, MlpConfig};
use crate::{
    config::{DecoderConfig, HIERARCHICAL_SIZE},
    error::{BigGanError, BigGanResult},
};

const RGB_CHANNELS: usize = 3;

impl DecoderConfig {
    /// Initializes a `Decoder` with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `device` - The device to create the model on.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate; nothing is allocated in
    /// that case.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> BigGanResult<Decoder<B>> {
        self.validate()?;

        let channels = self.channel_schedule()?;
        let blocks = self.block_schedule()?;
        let n_groups = channels.len();
        let [out_h, out_w] = self.output_size()?;

        tracing::debug!(
            ?channels,
            ?blocks,
            hierarchical = self.hierarchical,
            out_h,
            out_w,
            "building decoder"
        );

        let mlp = MlpConfig::new(
            self.z_dim,
            self.in_ch * self.in_h * self.in_w,
            self.in_ch * self.mlp_width,
            self.mlp_depth,
        )
        .init(device);

        let hierarchical_channels = if self.hierarchical {
            channels[n_groups - 2]
        } else {
            0
        };
        let hierarchical_decoding = self.hierarchical.then(|| {
            LinearConfig::new(
                self.z_dim,
                HIERARCHICAL_SIZE * HIERARCHICAL_SIZE * hierarchical_channels,
            )
            .init(device)
        });

        let mut in_ch = self.in_ch;
        let mut groups = Vec::with_capacity(n_groups);
        for (i, (&out_ch, &n_blocks)) in channels.iter().zip(blocks).enumerate() {
            // Room for the injected feature map.
            if self.hierarchical && i == n_groups - 1 {
                in_ch *= 2;
            }
            groups.push(
                InterpolateResidualGroupConfig::new(n_blocks, in_ch, out_ch, self.z_dim)
                    .with_upsample(true)
                    .init(device),
            );
            in_ch = out_ch;
        }

        let last_ch = channels[n_groups - 1];
        let bn_out = BatchNormConfig::new(last_ch).init(device);
        let conv_out = Conv2dConfig::new([last_ch, RGB_CHANNELS], [3, 3])
            .with_stride([1, 1])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);

        Ok(Decoder {
            mlp,
            hierarchical_decoding,
            groups,
            bn_out,
            relu: Relu::new(),
            conv_out,
            z_dim: self.z_dim,
            in_ch: self.in_ch,
            in_h: self.in_h,
            in_w: self.in_w,
            hierarchical_channels,
            output_size: [out_h, out_w],
        })
    }
}

/// The latent-to-image decoder.
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    /// Latent to flattened initial feature map.
    mlp: Mlp<B>,
    /// Low half of a hierarchical latent to the injected feature map.
    hierarchical_decoding: Option<Linear<B>>,
    /// Upsampling cascade, one group per resolution.
    groups: Vec<InterpolateResidualGroup<B>>,
    bn_out: BatchNorm<B, 2>,
    relu: Relu,
    conv_out: Conv2d<B>,
    z_dim: usize,
    in_ch: usize,
    in_h: usize,
    in_w: usize,
    hierarchical_channels: usize,
    output_size: [usize; 2],
}

impl<B: Backend> Decoder<B> {
    /// Decodes a batch of latent vectors.
    ///
    /// # Arguments
    ///
    /// * `z` - Latents of shape `[B, z_dim]`, or `[B, 2 * z_dim]` in hierarchical mode.
    ///
    /// # Returns
    ///
    /// Images of shape `[B, 3, H, W]` with values in `[-1, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `Err(BigGanError::InvalidTensorShape)` if the latent width does not match
    /// [`Decoder::input_features`].
    pub fn forward(&self, z: Tensor<B, 2>) -> BigGanResult<Tensor<B, 4>> {
        let [batch_size, features] = z.dims();
        let expected = self.input_features();
        if batch_size == 0 || features != expected {
            return Err(BigGanError::InvalidTensorShape {
                expected: format!("[{batch_size}, {expected}]"),
                actual: format!("{:?}", z.dims()),
            });
        }

        let (z, mut z_features) = match &self.hierarchical_decoding {
            Some(hierarchical_decoding) => {
                let z_low = z.clone().narrow(1, self.z_dim, self.z_dim);
                let z_features = hierarchical_decoding.forward(z_low).reshape([
                    batch_size,
                    self.hierarchical_channels,
                    HIERARCHICAL_SIZE,
                    HIERARCHICAL_SIZE,
                ]);
                (z.narrow(1, 0, self.z_dim), Some(z_features))
            }
            None => (z, None),
        };

        let x = self.mlp.forward(z.clone());
        let mut x = x.reshape([batch_size, self.in_ch, self.in_h, self.in_w]);

        let last = self.groups.len() - 1;
        for (i, group) in self.groups.iter().enumerate() {
            if i == last {
                if let Some(z_features) = z_features.take() {
                    x = Tensor::cat(vec![x, z_features], 1);
                }
            }
            x = group.forward(x, z.clone());
        }

        let x = self.relu.forward(self.bn_out.forward(x));
        Ok(tanh(self.conv_out.forward(x)))
    }

    /// Samples standard-normal latents and decodes them.
    ///
    /// # Errors
    ///
    /// Returns `Err(BigGanError::InvalidConfiguration)` for an empty batch.
    pub fn generate(&self, batch_size: usize, device: &Device<B>) -> BigGanResult<Tensor<B, 4>> {
        if batch_size == 0 {
            return Err(BigGanError::InvalidConfiguration {
                reason: "batch size must be positive".to_string(),
            });
        }

        let z = Tensor::random(
            [batch_size, self.input_features()],
            Distribution::Normal(0.0, 1.0),
            device,
        );
        self.forward(z)
    }

    /// Width of the latent vectors `forward` expects.
    pub fn input_features(&self) -> usize {
        if self.is_hierarchical() {
            2 * self.z_dim
        } else {
            self.z_dim
        }
    }

    pub fn is_hierarchical(&self) -> bool {
        self.hierarchical_decoding.is_some()
    }

    /// Number of upsampling groups.
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Residual blocks per group.
    pub fn blocks_per_group(&self) -> Vec<usize> {
        self.groups.iter().map(InterpolateResidualGroup::len).collect()
    }

    /// Spatial size `[height, width]` of the generated images.
    pub const fn output_size(&self) -> [usize; 2] {
        self.output_size
    }

    pub const fn output_channels(&self) -> usize {
        RGB_CHANNELS
    }
}
