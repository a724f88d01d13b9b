//! Element-wise arithmetic and shape operations

use crate::autograd::{BackwardOp, Tensor};
use ndarray::{Array1, ArrayD, IxDyn};
use std::rc::Rc;

fn assert_same_shape(op: &str, a: &Tensor, b: &Tensor) {
    assert_eq!(a.shape(), b.shape(), "{op}: operand shapes differ");
}

/// Add two tensors of the same shape
pub fn add(a: &Tensor, b: &Tensor) -> Tensor {
    assert_same_shape("add", a, b);
    let data = &*a.data() + &*b.data();
    Tensor::from_op(data, Rc::new(AddBackward { a: a.clone(), b: b.clone() }))
}

struct AddBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for AddBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(grad.clone()), Some(grad.clone())]
    }

    fn name(&self) -> &'static str {
        "add"
    }
}

/// Subtract `b` from `a`
pub fn sub(a: &Tensor, b: &Tensor) -> Tensor {
    assert_same_shape("sub", a, b);
    let data = &*a.data() - &*b.data();
    Tensor::from_op(data, Rc::new(SubBackward { a: a.clone(), b: b.clone() }))
}

struct SubBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for SubBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(grad.clone()), Some(neg(grad))]
    }

    fn name(&self) -> &'static str {
        "sub"
    }
}

/// Multiply two tensors element-wise
pub fn mul(a: &Tensor, b: &Tensor) -> Tensor {
    assert_same_shape("mul", a, b);
    let data = &*a.data() * &*b.data();
    Tensor::from_op(data, Rc::new(MulBackward { a: a.clone(), b: b.clone() }))
}

struct MulBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for MulBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        // ∂L/∂a = g * b, ∂L/∂b = g * a
        let ga = self.a.requires_grad().then(|| mul(grad, &self.b));
        let gb = self.b.requires_grad().then(|| mul(grad, &self.a));
        vec![ga, gb]
    }

    fn name(&self) -> &'static str {
        "mul"
    }
}

/// Divide `a` by `b` element-wise
pub fn div(a: &Tensor, b: &Tensor) -> Tensor {
    assert_same_shape("div", a, b);
    let data = &*a.data() / &*b.data();
    Tensor::from_op(data, Rc::new(DivBackward { a: a.clone(), b: b.clone() }))
}

struct DivBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for DivBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }

    fn vjp(&self, output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        // ∂L/∂a = g / b, ∂L/∂b = -g * (a / b) / b
        let ga = self.a.requires_grad().then(|| div(grad, &self.b));
        let gb = self.b.requires_grad().then(|| neg(&div(&mul(grad, output), &self.b)));
        vec![ga, gb]
    }

    fn name(&self) -> &'static str {
        "div"
    }
}

/// Negate a tensor
pub fn neg(a: &Tensor) -> Tensor {
    scale(a, -1.0)
}

/// Multiply a tensor by a constant factor
pub fn scale(a: &Tensor, factor: f32) -> Tensor {
    let data = &*a.data() * factor;
    Tensor::from_op(data, Rc::new(ScaleBackward { a: a.clone(), factor }))
}

struct ScaleBackward {
    a: Tensor,
    factor: f32,
}

impl BackwardOp for ScaleBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(scale(grad, self.factor))]
    }

    fn name(&self) -> &'static str {
        "scale"
    }
}

/// Add a constant to every element
pub fn add_scalar(a: &Tensor, value: f32) -> Tensor {
    let data = &*a.data() + value;
    Tensor::from_op(data, Rc::new(AddScalarBackward { a: a.clone() }))
}

struct AddScalarBackward {
    a: Tensor,
}

impl BackwardOp for AddScalarBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(grad.clone())]
    }

    fn name(&self) -> &'static str {
        "add_scalar"
    }
}

/// Multiply element-wise by a constant array of the same shape
pub fn mul_const(a: &Tensor, factor: Rc<ArrayD<f32>>) -> Tensor {
    assert_eq!(a.shape(), factor.shape(), "mul_const: operand shapes differ");
    let data = &*a.data() * &*factor;
    Tensor::from_op(data, Rc::new(MulConstBackward { a: a.clone(), factor }))
}

struct MulConstBackward {
    a: Tensor,
    factor: Rc<ArrayD<f32>>,
}

impl BackwardOp for MulConstBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(mul_const(grad, Rc::clone(&self.factor)))]
    }

    fn name(&self) -> &'static str {
        "mul_const"
    }
}

/// Multiply every row (leading-axis slice) by its own constant factor
pub fn scale_rows(a: &Tensor, factors: Rc<Array1<f32>>) -> Tensor {
    let shape = a.shape();
    assert!(!shape.is_empty() && shape[0] == factors.len(), "scale_rows: one factor per row");
    let mut column_shape = vec![1; shape.len()];
    column_shape[0] = factors.len();
    let column = factors
        .view()
        .into_shape_with_order(IxDyn(&column_shape))
        .expect("factor count matches leading axis");
    let data = &*a.data() * &column;
    Tensor::from_op(data, Rc::new(ScaleRowsBackward { a: a.clone(), factors }))
}

struct ScaleRowsBackward {
    a: Tensor,
    factors: Rc<Array1<f32>>,
}

impl BackwardOp for ScaleRowsBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(scale_rows(grad, Rc::clone(&self.factors)))]
    }

    fn name(&self) -> &'static str {
        "scale_rows"
    }
}

/// Reinterpret the data with a new shape (row-major)
///
/// # Panics
///
/// Panics if the element count changes.
pub fn reshape(a: &Tensor, shape: &[usize]) -> Tensor {
    let data = a
        .to_array()
        .into_shape_with_order(IxDyn(shape))
        .unwrap_or_else(|e| panic!("reshape {:?} -> {shape:?}: {e}", a.shape()));
    Tensor::from_op(data, Rc::new(ReshapeBackward { a: a.clone(), input_shape: a.shape() }))
}

struct ReshapeBackward {
    a: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for ReshapeBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(reshape(grad, &self.input_shape))]
    }

    fn name(&self) -> &'static str {
        "reshape"
    }
}
