//! Tape-based autograd engine
//!
//! Provides reverse-mode automatic differentiation over `ndarray` tensors.
//! Gradients are requested explicitly with [`grad`]; passing
//! `create_graph = true` keeps them differentiable, so penalties that depend
//! on a gradient (such as the WGAN-GP slope penalty) can themselves be
//! optimized.
//!
//! ```ignore
//! use fiwgan::autograd::{grad, square, sum, Tensor};
//!
//! let x = Tensor::from_vec(vec![1.0, 2.0], true);
//! let y = sum(&square(&x));
//! let dx = grad(&y, &[x.clone()], false);
//! ```

mod backward;
mod context;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::{grad, is_grad_enabled, no_grad, BackwardOp};
pub use context::Context;
pub use ops::*;
pub use tensor::Tensor;
