//! Parameterized building blocks for the WaveGAN networks.
//!
//! Kernels use Glorot-uniform initialization and biases start at zero.
//! Every layer reports its parameters under stable dotted names so network
//! snapshots can be saved and restored.

use super::config::UpsampleMode;
use crate::autograd::{
    add, broadcast_last, conv1d, conv1d_transpose, matmul, upsample_nearest, Tensor,
};
use ndarray::{ArrayD, IxDyn};
use rand::Rng;

/// Glorot-uniform kernel: U(-l, l) with l = √(6 / (fan_in + fan_out))
pub fn glorot_uniform<R: Rng>(rng: &mut R, shape: &[usize], fan_in: usize, fan_out: usize) -> Tensor {
    let limit = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
    let n: usize = shape.iter().product();
    let data: Vec<f32> = (0..n).map(|_| rng.random_range(-limit..=limit)).collect();
    Tensor::new(
        ArrayD::from_shape_vec(IxDyn(shape), data).expect("sample count matches shape"),
        true,
    )
}

fn with_prefix(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn add_bias(x: &Tensor, bias: Option<&Tensor>) -> Tensor {
    match bias {
        Some(b) => add(x, &broadcast_last(b, &x.shape())),
        None => x.clone(),
    }
}

/// Fully connected layer: `(B, in) -> (B, out)`
pub struct Dense {
    kernel: Tensor,
    bias: Tensor,
}

impl Dense {
    pub fn new<R: Rng>(rng: &mut R, in_features: usize, out_features: usize) -> Self {
        Self {
            kernel: glorot_uniform(rng, &[in_features, out_features], in_features, out_features),
            bias: Tensor::zeros(&[out_features], true),
        }
    }

    pub fn forward(&self, x: &Tensor) -> Tensor {
        add_bias(&matmul(x, &self.kernel), Some(&self.bias))
    }

    pub fn out_features(&self) -> usize {
        self.kernel.shape()[1]
    }

    pub fn named_parameters(&self, prefix: &str) -> Vec<(String, Tensor)> {
        vec![
            (with_prefix(prefix, "kernel"), self.kernel.clone()),
            (with_prefix(prefix, "bias"), self.bias.clone()),
        ]
    }
}

/// Strided "same" convolution: `(B, L, in) -> (B, ceil(L/s), out)`
pub struct Conv1d {
    kernel: Tensor,
    bias: Option<Tensor>,
    stride: usize,
}

impl Conv1d {
    pub fn new<R: Rng>(
        rng: &mut R,
        in_channels: usize,
        out_channels: usize,
        kernel_len: usize,
        stride: usize,
        use_bias: bool,
    ) -> Self {
        let kernel = glorot_uniform(
            rng,
            &[kernel_len, in_channels, out_channels],
            kernel_len * in_channels,
            kernel_len * out_channels,
        );
        let bias = use_bias.then(|| Tensor::zeros(&[out_channels], true));
        Self { kernel, bias, stride }
    }

    pub fn forward(&self, x: &Tensor) -> Tensor {
        add_bias(&conv1d(x, &self.kernel, self.stride), self.bias.as_ref())
    }

    pub fn named_parameters(&self, prefix: &str) -> Vec<(String, Tensor)> {
        let mut params = vec![(with_prefix(prefix, "kernel"), self.kernel.clone())];
        if let Some(bias) = &self.bias {
            params.push((with_prefix(prefix, "bias"), bias.clone()));
        }
        params
    }
}

/// Transposed "same" convolution: `(B, L, in) -> (B, L*s, out)`
///
/// The kernel is stored as `(K, out, in)`.
pub struct ConvTranspose1d {
    kernel: Tensor,
    bias: Tensor,
    stride: usize,
}

impl ConvTranspose1d {
    pub fn new<R: Rng>(
        rng: &mut R,
        in_channels: usize,
        out_channels: usize,
        kernel_len: usize,
        stride: usize,
    ) -> Self {
        let kernel = glorot_uniform(
            rng,
            &[kernel_len, out_channels, in_channels],
            kernel_len * out_channels,
            kernel_len * in_channels,
        );
        Self { kernel, bias: Tensor::zeros(&[out_channels], true), stride }
    }

    pub fn forward(&self, x: &Tensor) -> Tensor {
        add_bias(&conv1d_transpose(x, &self.kernel, self.stride), Some(&self.bias))
    }

    pub fn named_parameters(&self, prefix: &str) -> Vec<(String, Tensor)> {
        vec![
            (with_prefix(prefix, "kernel"), self.kernel.clone()),
            (with_prefix(prefix, "bias"), self.bias.clone()),
        ]
    }
}

/// Upsampling convolution used by the generator blocks
pub enum UpConv {
    /// Transposed convolution
    Transposed(ConvTranspose1d),
    /// Nearest-neighbour repeat, then a stride-1 convolution
    NearestNeighbor { factor: usize, conv: Conv1d },
}

impl UpConv {
    pub fn new<R: Rng>(
        rng: &mut R,
        mode: UpsampleMode,
        in_channels: usize,
        out_channels: usize,
        kernel_len: usize,
        stride: usize,
    ) -> Self {
        match mode {
            UpsampleMode::Zeros => Self::Transposed(ConvTranspose1d::new(
                rng,
                in_channels,
                out_channels,
                kernel_len,
                stride,
            )),
            UpsampleMode::Nn => Self::NearestNeighbor {
                factor: stride,
                conv: Conv1d::new(rng, in_channels, out_channels, kernel_len, 1, true),
            },
        }
    }

    pub fn forward(&self, x: &Tensor) -> Tensor {
        match self {
            Self::Transposed(layer) => layer.forward(x),
            Self::NearestNeighbor { factor, conv } => conv.forward(&upsample_nearest(x, *factor)),
        }
    }

    pub fn named_parameters(&self, prefix: &str) -> Vec<(String, Tensor)> {
        match self {
            Self::Transposed(layer) => layer.named_parameters(prefix),
            Self::NearestNeighbor { conv, .. } => conv.named_parameters(prefix),
        }
    }
}
