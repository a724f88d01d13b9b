//! Differentiable operations
//!
//! Every backward rule is expressed with these same operations, so gradients
//! stay differentiable when computed under `create_graph`.

mod activations;
mod basic;
mod conv;
mod matmul;
mod reduce;
mod resample;

pub use activations::{leaky_relu, relu, sigmoid, softplus, sqrt, square, tanh};
pub use basic::{add, add_scalar, div, mul, mul_const, neg, reshape, scale, scale_rows, sub};
pub use conv::{conv1d, conv1d_input_grad, conv1d_transpose, conv1d_weight_grad, ConvGeometry};
pub use matmul::{matmul, transpose};
pub use reduce::{
    broadcast_last, broadcast_rows, broadcast_scalar, mean, sum, sum_rows, sum_to_last,
};
pub use resample::{downsample_sum, gather_time, scatter_time, upsample_nearest};
