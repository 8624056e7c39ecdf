//! Binary classifier seam and the bundled convolutional architecture.
//!
//! The evaluator only needs a load-and-forward interface, expressed by the
//! [`BinaryClassifier`] trait so tests can substitute stub models. The
//! concrete [`PneumoNet`] module is the fixed architecture the shipped
//! checkpoint deserializes into.

use std::path::Path;

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};

use crate::error::{PneumoNetError, PneumoNetResult};

/// Load-and-forward interface of the trained model.
///
/// `forward` maps a `[N, 3, H, W]` image batch to raw logits `[N, 1]`;
/// the caller applies the sigmoid and the decision threshold.
pub trait BinaryClassifier<B: Backend> {
    /// Forward pass over a preprocessed image batch.
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2>;
}

/// Configuration for the [`PneumoNet`] classifier.
#[derive(Config, Debug)]
pub struct PneumoNetConfig {
    /// Number of input channels (3 for RGB chest X-rays).
    #[config(default = "3")]
    pub in_channels: usize,
    /// Channel width of the first convolutional stage; doubled per stage.
    #[config(default = "32")]
    pub base_channels: usize,
    /// Number of downsampling stages.
    #[config(default = "4")]
    pub num_stages: usize,
}

impl PneumoNetConfig {
    /// Initializes a `PneumoNet` model with freshly initialized parameters.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> PneumoNet<B> {
        let mut stages = Vec::with_capacity(self.num_stages);
        let mut channels = self.in_channels;
        let mut width = self.base_channels;
        for _ in 0..self.num_stages {
            stages.push(ConvStageConfig::new(channels, width).init(device));
            channels = width;
            width *= 2;
        }

        PneumoNet {
            stages,
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            head: LinearConfig::new(channels, 1).init(device),
        }
    }
}

/// One downsampling stage: convolution, batch norm, ReLU, 2x2 max pool.
#[derive(Config, Debug)]
struct ConvStageConfig {
    in_channels: usize,
    out_channels: usize,
}

impl ConvStageConfig {
    fn init<B: Backend>(&self, device: &Device<B>) -> ConvStage<B> {
        let conv = Conv2dConfig::new([self.in_channels, self.out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let norm = BatchNormConfig::new(self.out_channels).init(device);
        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

        ConvStage {
            conv,
            norm,
            activation: Relu::new(),
            pool,
        }
    }
}

#[derive(Module, Debug)]
struct ConvStage<B: Backend> {
    conv: Conv2d<B>,
    norm: BatchNorm<B, 2>,
    activation: Relu,
    pool: MaxPool2d,
}

impl<B: Backend> ConvStage<B> {
    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.norm.forward(x);
        let x = self.activation.forward(x);
        self.pool.forward(x)
    }
}

/// Compact convolutional binary classifier for chest X-rays.
///
/// A stack of conv/norm/pool stages followed by global average pooling and
/// a single-output linear head producing the pneumonia logit.
#[derive(Module, Debug)]
pub struct PneumoNet<B: Backend> {
    stages: Vec<ConvStage<B>>,
    pool: AdaptiveAvgPool2d,
    head: Linear<B>,
}

impl<B: Backend> PneumoNet<B> {
    /// Forward pass producing raw logits with shape `[N, 1]`.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = images;
        for stage in &self.stages {
            x = stage.forward(x);
        }
        let x = self.pool.forward(x);
        let x = x.flatten::<2>(1, 3);
        self.head.forward(x)
    }
}

impl<B: Backend> BinaryClassifier<B> for PneumoNet<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        Self::forward(self, images)
    }
}

/// Load trained parameters from a `.mpk` checkpoint into the fixed
/// architecture described by `config`.
pub fn load_checkpoint<B: Backend>(
    config: &PneumoNetConfig,
    path: &Path,
    device: &B::Device,
) -> PneumoNetResult<PneumoNet<B>> {
    if !path.is_file() {
        return Err(PneumoNetError::Config {
            message: format!("model checkpoint not found: {}", path.display()),
            hint: "place the trained .mpk checkpoint at the given path".to_owned(),
        });
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder.load(path.to_path_buf(), device).map_err(|e| {
        PneumoNetError::WeightLoadingFailed {
            reason: e.to_string(),
        }
    })?;

    Ok(config.init(device).load_record(record))
}
