//! Reductions and their matching broadcasts
//!
//! Each reduction's backward pass is the paired broadcast and vice versa.

use super::{reshape, scale};
use crate::autograd::{BackwardOp, Tensor};
use ndarray::{ArrayD, Axis, IxDyn};
use std::rc::Rc;

/// Sum all elements into a 0-d tensor
pub fn sum(a: &Tensor) -> Tensor {
    let data = ArrayD::from_elem(IxDyn(&[]), a.data().sum());
    Tensor::from_op(data, Rc::new(SumBackward { a: a.clone(), input_shape: a.shape() }))
}

struct SumBackward {
    a: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for SumBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(broadcast_scalar(grad, &self.input_shape))]
    }

    fn name(&self) -> &'static str {
        "sum"
    }
}

/// Mean of all elements as a 0-d tensor
pub fn mean(a: &Tensor) -> Tensor {
    let n = a.len().max(1) as f32;
    scale(&sum(a), 1.0 / n)
}

/// Repeat a single-element tensor into `shape`
pub fn broadcast_scalar(s: &Tensor, shape: &[usize]) -> Tensor {
    assert_eq!(s.len(), 1, "broadcast_scalar expects a single element");
    let data = ArrayD::from_elem(IxDyn(shape), s.item());
    Tensor::from_op(data, Rc::new(BroadcastScalarBackward { s: s.clone(), input_shape: s.shape() }))
}

struct BroadcastScalarBackward {
    s: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for BroadcastScalarBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.s.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(reshape(&sum(grad), &self.input_shape))]
    }

    fn name(&self) -> &'static str {
        "broadcast_scalar"
    }
}

/// Sum over every axis but the leading (batch) one: `(B, ...) -> (B,)`
pub fn sum_rows(a: &Tensor) -> Tensor {
    let shape = a.shape();
    assert!(!shape.is_empty(), "sum_rows needs a batch axis");
    let rows = shape[0];
    let data = {
        let view = a.data();
        let flat = view
            .view()
            .into_shape_with_order((rows, view.len() / rows.max(1)))
            .expect("standard layout reshapes to 2-D");
        flat.sum_axis(Axis(1)).into_dyn()
    };
    Tensor::from_op(data, Rc::new(SumRowsBackward { a: a.clone(), input_shape: shape }))
}

struct SumRowsBackward {
    a: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for SumRowsBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(broadcast_rows(grad, &self.input_shape))]
    }

    fn name(&self) -> &'static str {
        "sum_rows"
    }
}

/// Repeat a `(B,)` vector across the trailing axes of `shape`
pub fn broadcast_rows(v: &Tensor, shape: &[usize]) -> Tensor {
    assert_eq!(v.ndim(), 1, "broadcast_rows expects a vector");
    assert_eq!(v.len(), shape[0], "broadcast_rows: row count mismatch");
    let mut column_shape = vec![1; shape.len()];
    column_shape[0] = shape[0];
    let data = {
        let vd = v.data();
        let column = vd
            .view()
            .into_shape_with_order(IxDyn(&column_shape))
            .expect("vector reshapes to column");
        column
            .broadcast(IxDyn(shape))
            .expect("column broadcasts over trailing axes")
            .to_owned()
    };
    Tensor::from_op(data, Rc::new(BroadcastRowsBackward { v: v.clone() }))
}

struct BroadcastRowsBackward {
    v: Tensor,
}

impl BackwardOp for BroadcastRowsBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.v.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(sum_rows(grad))]
    }

    fn name(&self) -> &'static str {
        "broadcast_rows"
    }
}

/// Sum over every axis but the last: `(..., C) -> (C,)`
pub fn sum_to_last(a: &Tensor) -> Tensor {
    let shape = a.shape();
    let channels = *shape.last().expect("sum_to_last needs at least one axis");
    let data = {
        let view = a.data();
        let flat = view
            .view()
            .into_shape_with_order((view.len() / channels.max(1), channels))
            .expect("standard layout reshapes to 2-D");
        flat.sum_axis(Axis(0)).into_dyn()
    };
    Tensor::from_op(data, Rc::new(SumToLastBackward { a: a.clone(), input_shape: shape }))
}

struct SumToLastBackward {
    a: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for SumToLastBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(broadcast_last(grad, &self.input_shape))]
    }

    fn name(&self) -> &'static str {
        "sum_to_last"
    }
}

/// Repeat a `(C,)` vector over the leading axes of `shape` (bias add)
pub fn broadcast_last(v: &Tensor, shape: &[usize]) -> Tensor {
    assert_eq!(v.ndim(), 1, "broadcast_last expects a vector");
    assert_eq!(shape.last().copied(), Some(v.len()), "broadcast_last: channel mismatch");
    let data = v
        .data()
        .broadcast(IxDyn(shape))
        .expect("vector broadcasts over leading axes")
        .to_owned();
    Tensor::from_op(data, Rc::new(BroadcastLastBackward { v: v.clone() }))
}

struct BroadcastLastBackward {
    v: Tensor,
}

impl BackwardOp for BroadcastLastBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.v.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(sum_to_last(grad))]
    }

    fn name(&self) -> &'static str {
        "broadcast_last"
    }
}
