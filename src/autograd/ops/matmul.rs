//! Matrix multiplication autograd operations

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Ix2;
use std::rc::Rc;

fn as_matrix(t: &Tensor, op: &str) -> ndarray::Array2<f32> {
    t.to_array()
        .into_dimensionality::<Ix2>()
        .unwrap_or_else(|_| panic!("{op} expects a 2-D tensor, got {:?}", t.shape()))
}

/// Matrix product of `(m, k)` and `(k, n)` tensors
pub fn matmul(a: &Tensor, b: &Tensor) -> Tensor {
    let lhs = as_matrix(a, "matmul");
    let rhs = as_matrix(b, "matmul");
    assert_eq!(lhs.ncols(), rhs.nrows(), "matmul: inner dimensions differ");
    let data = lhs.dot(&rhs).into_dyn();
    Tensor::from_op(data, Rc::new(MatmulBackward { a: a.clone(), b: b.clone() }))
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for MatmulBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        // ∂L/∂A = G Bᵀ, ∂L/∂B = Aᵀ G
        let ga = self.a.requires_grad().then(|| matmul(grad, &transpose(&self.b)));
        let gb = self.b.requires_grad().then(|| matmul(&transpose(&self.a), grad));
        vec![ga, gb]
    }

    fn name(&self) -> &'static str {
        "matmul"
    }
}

/// Transpose a 2-D tensor
pub fn transpose(a: &Tensor) -> Tensor {
    let data = as_matrix(a, "transpose")
        .reversed_axes()
        .as_standard_layout()
        .into_owned()
        .into_dyn();
    Tensor::from_op(data, Rc::new(TransposeBackward { a: a.clone() }))
}

struct TransposeBackward {
    a: Tensor,
}

impl BackwardOp for TransposeBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(transpose(grad))]
    }

    fn name(&self) -> &'static str {
        "transpose"
    }
}
