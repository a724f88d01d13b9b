//! Strided 1-D convolution with "same" padding
//!
//! Tensors are channels-last: signals are `(batch, length, channels)` and
//! kernels `(kernel_len, in_channels, out_channels)`. The forward convolution,
//! its input gradient and its weight gradient are bilinear, and the
//! vector-Jacobian product of each is expressed with the other two. The
//! family is closed under differentiation, which is what makes double
//! backprop through a discriminator possible.
//!
//! A transposed convolution is the input gradient of the forward convolution
//! that maps the upsampled length back down.

use crate::autograd::{BackwardOp, Tensor};
use ndarray::{ArrayD, IxDyn};
use std::rc::Rc;

/// Length bookkeeping for a strided convolution with "same" padding.
///
/// `long_len` is the input length of the forward convolution and
/// `short_len = ceil(long_len / stride)` its output length. Padding follows
/// the usual split: the total is `max((short - 1) * stride + kernel - long, 0)`
/// and the left side gets the smaller half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvGeometry {
    pub long_len: usize,
    pub short_len: usize,
    pub kernel_len: usize,
    pub stride: usize,
    pub pad_left: usize,
}

impl ConvGeometry {
    /// Geometry of a "same" convolution over a signal of `long_len` samples
    pub fn same(long_len: usize, kernel_len: usize, stride: usize) -> Self {
        assert!(stride > 0 && kernel_len > 0, "stride and kernel length must be positive");
        let short_len = long_len.div_ceil(stride);
        let span = (short_len.saturating_sub(1)) * stride + kernel_len;
        let pad_total = span.saturating_sub(long_len);
        Self { long_len, short_len, kernel_len, stride, pad_left: pad_total / 2 }
    }

    /// Input position read by output `t` at kernel tap `k`, if inside the signal
    #[inline]
    fn source(&self, t: usize, k: usize) -> Option<usize> {
        (t * self.stride + k).checked_sub(self.pad_left).filter(|&j| j < self.long_len)
    }
}

fn dims3(t: &Tensor, what: &str) -> [usize; 3] {
    match t.shape().as_slice() {
        &[a, b, c] => [a, b, c],
        other => panic!("{what} must be 3-D, got {other:?}"),
    }
}

fn forward_kernel(x: &[f32], w: &[f32], geo: &ConvGeometry, batch: usize, ci: usize, co: usize) -> Vec<f32> {
    let mut y = vec![0.0; batch * geo.short_len * co];
    for b in 0..batch {
        for t in 0..geo.short_len {
            let out = (b * geo.short_len + t) * co;
            for k in 0..geo.kernel_len {
                let Some(j) = geo.source(t, k) else { continue };
                let x_row = &x[(b * geo.long_len + j) * ci..][..ci];
                for (i, &xv) in x_row.iter().enumerate() {
                    if xv == 0.0 {
                        continue;
                    }
                    let w_row = &w[(k * ci + i) * co..][..co];
                    for (yv, &wv) in y[out..out + co].iter_mut().zip(w_row) {
                        *yv += xv * wv;
                    }
                }
            }
        }
    }
    y
}

fn input_grad_kernel(y: &[f32], w: &[f32], geo: &ConvGeometry, batch: usize, ci: usize, co: usize) -> Vec<f32> {
    let mut x = vec![0.0; batch * geo.long_len * ci];
    for b in 0..batch {
        for t in 0..geo.short_len {
            let y_row = &y[(b * geo.short_len + t) * co..][..co];
            for k in 0..geo.kernel_len {
                let Some(j) = geo.source(t, k) else { continue };
                let x_row = &mut x[(b * geo.long_len + j) * ci..][..ci];
                for (i, xv) in x_row.iter_mut().enumerate() {
                    let w_row = &w[(k * ci + i) * co..][..co];
                    *xv += y_row.iter().zip(w_row).map(|(a, b)| a * b).sum::<f32>();
                }
            }
        }
    }
    x
}

fn weight_grad_kernel(x: &[f32], y: &[f32], geo: &ConvGeometry, batch: usize, ci: usize, co: usize) -> Vec<f32> {
    let mut w = vec![0.0; geo.kernel_len * ci * co];
    for b in 0..batch {
        for t in 0..geo.short_len {
            let y_row = &y[(b * geo.short_len + t) * co..][..co];
            for k in 0..geo.kernel_len {
                let Some(j) = geo.source(t, k) else { continue };
                let x_row = &x[(b * geo.long_len + j) * ci..][..ci];
                for (i, &xv) in x_row.iter().enumerate() {
                    if xv == 0.0 {
                        continue;
                    }
                    let w_row = &mut w[(k * ci + i) * co..][..co];
                    for (wv, &yv) in w_row.iter_mut().zip(y_row) {
                        *wv += xv * yv;
                    }
                }
            }
        }
    }
    w
}

fn array(shape: &[usize], data: Vec<f32>) -> ArrayD<f32> {
    ArrayD::from_shape_vec(IxDyn(shape), data).expect("kernel output matches its shape")
}

/// Strided "same" convolution: `(B, L, Ci) * (K, Ci, Co) -> (B, ceil(L/s), Co)`
pub fn conv1d(x: &Tensor, w: &Tensor, stride: usize) -> Tensor {
    let [_, long_len, _] = dims3(x, "conv1d input");
    let [kernel_len, _, _] = dims3(w, "conv1d kernel");
    conv_forward(x, w, ConvGeometry::same(long_len, kernel_len, stride))
}

/// Transposed "same" convolution: `(B, L, Cin) * (K, Cout, Cin) -> (B, L*s, Cout)`
pub fn conv1d_transpose(x: &Tensor, w: &Tensor, stride: usize) -> Tensor {
    let [_, len, _] = dims3(x, "conv1d_transpose input");
    let [kernel_len, _, _] = dims3(w, "conv1d_transpose kernel");
    conv1d_input_grad(x, w, ConvGeometry::same(len * stride, kernel_len, stride))
}

fn conv_forward(x: &Tensor, w: &Tensor, geo: ConvGeometry) -> Tensor {
    let [batch, long_len, ci] = dims3(x, "conv input");
    let [kernel_len, w_ci, co] = dims3(w, "conv kernel");
    assert_eq!(long_len, geo.long_len, "conv input length does not match geometry");
    assert_eq!(kernel_len, geo.kernel_len, "conv kernel length does not match geometry");
    assert_eq!(ci, w_ci, "conv input channels do not match kernel");
    let y = {
        let (xd, wd) = (x.data(), w.data());
        let (xs, ws) = (xd.as_slice().expect("standard layout"), wd.as_slice().expect("standard layout"));
        forward_kernel(xs, ws, &geo, batch, ci, co)
    };
    let data = array(&[batch, geo.short_len, co], y);
    Tensor::from_op(data, Rc::new(ConvForwardBackward { x: x.clone(), w: w.clone(), geo }))
}

struct ConvForwardBackward {
    x: Tensor,
    w: Tensor,
    geo: ConvGeometry,
}

impl BackwardOp for ConvForwardBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone(), self.w.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        let gx = self.x.requires_grad().then(|| conv1d_input_grad(grad, &self.w, self.geo));
        let gw = self.w.requires_grad().then(|| conv1d_weight_grad(&self.x, grad, self.geo));
        vec![gx, gw]
    }

    fn name(&self) -> &'static str {
        "conv1d"
    }
}

/// Input gradient of a convolution: `(B, short, Co) * (K, Ci, Co) -> (B, long, Ci)`
pub fn conv1d_input_grad(y: &Tensor, w: &Tensor, geo: ConvGeometry) -> Tensor {
    let [batch, short_len, co] = dims3(y, "conv input-grad signal");
    let [kernel_len, ci, w_co] = dims3(w, "conv input-grad kernel");
    assert_eq!(short_len, geo.short_len, "input-grad signal length does not match geometry");
    assert_eq!(kernel_len, geo.kernel_len, "input-grad kernel length does not match geometry");
    assert_eq!(co, w_co, "input-grad channels do not match kernel");
    let x = {
        let (yd, wd) = (y.data(), w.data());
        let (ys, ws) = (yd.as_slice().expect("standard layout"), wd.as_slice().expect("standard layout"));
        input_grad_kernel(ys, ws, &geo, batch, ci, co)
    };
    let data = array(&[batch, geo.long_len, ci], x);
    Tensor::from_op(data, Rc::new(ConvInputGradBackward { y: y.clone(), w: w.clone(), geo }))
}

struct ConvInputGradBackward {
    y: Tensor,
    w: Tensor,
    geo: ConvGeometry,
}

impl BackwardOp for ConvInputGradBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.y.clone(), self.w.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        let gy = self.y.requires_grad().then(|| conv_forward(grad, &self.w, self.geo));
        let gw = self.w.requires_grad().then(|| conv1d_weight_grad(grad, &self.y, self.geo));
        vec![gy, gw]
    }

    fn name(&self) -> &'static str {
        "conv1d_input_grad"
    }
}

/// Weight gradient of a convolution: `(B, long, Ci) x (B, short, Co) -> (K, Ci, Co)`
pub fn conv1d_weight_grad(x: &Tensor, y: &Tensor, geo: ConvGeometry) -> Tensor {
    let [batch, long_len, ci] = dims3(x, "conv weight-grad input");
    let [y_batch, short_len, co] = dims3(y, "conv weight-grad signal");
    assert_eq!(batch, y_batch, "weight-grad batch sizes differ");
    assert_eq!(long_len, geo.long_len, "weight-grad input length does not match geometry");
    assert_eq!(short_len, geo.short_len, "weight-grad signal length does not match geometry");
    let w = {
        let (xd, yd) = (x.data(), y.data());
        let (xs, ys) = (xd.as_slice().expect("standard layout"), yd.as_slice().expect("standard layout"));
        weight_grad_kernel(xs, ys, &geo, batch, ci, co)
    };
    let data = array(&[geo.kernel_len, ci, co], w);
    Tensor::from_op(data, Rc::new(ConvWeightGradBackward { x: x.clone(), y: y.clone(), geo }))
}

struct ConvWeightGradBackward {
    x: Tensor,
    y: Tensor,
    geo: ConvGeometry,
}

impl BackwardOp for ConvWeightGradBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone(), self.y.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        let gx = self.x.requires_grad().then(|| conv1d_input_grad(&self.y, grad, self.geo));
        let gy = self.y.requires_grad().then(|| conv_forward(&self.x, grad, self.geo));
        vec![gx, gy]
    }

    fn name(&self) -> &'static str {
        "conv1d_weight_grad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_geometry_stride4_kernel25() {
        let geo = ConvGeometry::same(16384, 25, 4);
        assert_eq!(geo.short_len, 4096);
        // (4095 * 4 + 25) - 16384 = 21
        assert_eq!(geo.pad_left, 10);
    }

    #[test]
    fn test_same_geometry_transposed_lengths() {
        // Upsampling 16 -> 64: pad_total = max(K - s, 0)
        let geo = ConvGeometry::same(64, 25, 4);
        assert_eq!(geo.short_len, 16);
        assert_eq!(geo.pad_left, 10);
        let geo = ConvGeometry::same(8, 1, 4);
        assert_eq!(geo.pad_left, 0);
    }

    #[test]
    fn test_conv1d_identity_kernel() {
        let x = Tensor::from_shape_vec(&[1, 4, 1], vec![1.0, 2.0, 3.0, 4.0], false);
        let w = Tensor::from_shape_vec(&[1, 1, 1], vec![1.0], false);
        let y = conv1d(&x, &w, 1);
        assert_eq!(y.shape(), vec![1, 4, 1]);
        assert_eq!(y.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_conv1d_strided_sums_window() {
        // K = 3, s = 2, L = 4: short = 2, pad_total = 1, pad_left = 0
        let x = Tensor::from_shape_vec(&[1, 4, 1], vec![1.0, 2.0, 3.0, 4.0], false);
        let w = Tensor::from_shape_vec(&[3, 1, 1], vec![1.0, 1.0, 1.0], false);
        let y = conv1d(&x, &w, 2);
        assert_eq!(y.to_vec(), vec![6.0, 7.0]);
    }

    #[test]
    fn test_conv1d_transpose_output_length() {
        let x = Tensor::zeros(&[2, 16, 3], false);
        let w = Tensor::zeros(&[25, 5, 3], false);
        let y = conv1d_transpose(&x, &w, 4);
        assert_eq!(y.shape(), vec![2, 64, 5]);
    }

    #[test]
    fn test_transpose_is_adjoint_of_forward() {
        // <conv(x, w), y> == <x, conv_input_grad(y, w)>
        let x = Tensor::from_shape_vec(&[1, 6, 2], (0..12).map(|v| v as f32 * 0.1).collect(), false);
        let w = Tensor::from_shape_vec(&[3, 2, 2], (0..12).map(|v| (v as f32 - 5.0) * 0.2).collect(), false);
        let geo = ConvGeometry::same(6, 3, 2);
        let y = Tensor::from_shape_vec(&[1, 3, 2], vec![0.5, -1.0, 2.0, 0.25, -0.75, 1.5], false);
        let fwd = conv1d(&x, &w, 2);
        let back = conv1d_input_grad(&y, &w, geo);
        let lhs: f32 = fwd.to_vec().iter().zip(y.to_vec()).map(|(a, b)| a * b).sum();
        let rhs: f32 = x.to_vec().iter().zip(back.to_vec()).map(|(a, b)| a * b).sum();
        assert!((lhs - rhs).abs() < 1e-4, "{lhs} vs {rhs}");
    }
}
