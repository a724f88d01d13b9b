//! Time-axis resampling on `(batch, length, channels)` signals

use crate::autograd::{BackwardOp, Tensor};
use ndarray::{s, Array3, Axis, Ix3};
use std::rc::Rc;

fn as_signal(t: &Tensor, op: &str) -> Array3<f32> {
    t.to_array()
        .into_dimensionality::<Ix3>()
        .unwrap_or_else(|_| panic!("{op} expects (batch, length, channels), got {:?}", t.shape()))
}

/// Repeat every sample `factor` times along the time axis
pub fn upsample_nearest(x: &Tensor, factor: usize) -> Tensor {
    let input = as_signal(x, "upsample_nearest");
    let (batch, len, channels) = input.dim();
    let mut out = Array3::zeros((batch, len * factor, channels));
    for r in 0..factor {
        out.slice_mut(s![.., r..;factor, ..]).assign(&input);
    }
    Tensor::from_op(out.into_dyn(), Rc::new(UpsampleNearestBackward { x: x.clone(), factor }))
}

struct UpsampleNearestBackward {
    x: Tensor,
    factor: usize,
}

impl BackwardOp for UpsampleNearestBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(downsample_sum(grad, self.factor))]
    }

    fn name(&self) -> &'static str {
        "upsample_nearest"
    }
}

/// Sum each run of `factor` consecutive samples (adjoint of [`upsample_nearest`])
pub fn downsample_sum(x: &Tensor, factor: usize) -> Tensor {
    let input = as_signal(x, "downsample_sum");
    let (batch, len, channels) = input.dim();
    assert_eq!(len % factor, 0, "downsample_sum: length must be a multiple of the factor");
    let mut out = Array3::zeros((batch, len / factor, channels));
    for r in 0..factor {
        out += &input.slice(s![.., r..;factor, ..]);
    }
    Tensor::from_op(out.into_dyn(), Rc::new(DownsampleSumBackward { x: x.clone(), factor }))
}

struct DownsampleSumBackward {
    x: Tensor,
    factor: usize,
}

impl BackwardOp for DownsampleSumBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(upsample_nearest(grad, self.factor))]
    }

    fn name(&self) -> &'static str {
        "downsample_sum"
    }
}

/// Select time steps: `y[:, t, :] = x[:, index[t], :]`
pub fn gather_time(x: &Tensor, index: Rc<Vec<usize>>) -> Tensor {
    let input = as_signal(x, "gather_time");
    let source_len = input.len_of(Axis(1));
    assert!(index.iter().all(|&i| i < source_len), "gather_time: index out of range");
    let out = input.select(Axis(1), &index);
    Tensor::from_op(out.into_dyn(), Rc::new(GatherTimeBackward { x: x.clone(), index, source_len }))
}

struct GatherTimeBackward {
    x: Tensor,
    index: Rc<Vec<usize>>,
    source_len: usize,
}

impl BackwardOp for GatherTimeBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(scatter_time(grad, Rc::clone(&self.index), self.source_len))]
    }

    fn name(&self) -> &'static str {
        "gather_time"
    }
}

/// Accumulate time steps into a signal of `target_len` samples (adjoint of [`gather_time`])
pub fn scatter_time(y: &Tensor, index: Rc<Vec<usize>>, target_len: usize) -> Tensor {
    let input = as_signal(y, "scatter_time");
    let (batch, len, channels) = input.dim();
    assert_eq!(len, index.len(), "scatter_time: one index per time step");
    let mut out = Array3::zeros((batch, target_len, channels));
    for (t, &target) in index.iter().enumerate() {
        let mut dst = out.index_axis_mut(Axis(1), target);
        dst += &input.index_axis(Axis(1), t);
    }
    Tensor::from_op(out.into_dyn(), Rc::new(ScatterTimeBackward { y: y.clone(), index }))
}

struct ScatterTimeBackward {
    y: Tensor,
    index: Rc<Vec<usize>>,
}

impl BackwardOp for ScatterTimeBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.y.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(gather_time(grad, Rc::clone(&self.index)))]
    }

    fn name(&self) -> &'static str {
        "scatter_time"
    }
}
