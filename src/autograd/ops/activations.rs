//! Activation functions and element-wise nonlinearities

use super::{add_scalar, div, mul, mul_const, scale, sub};
use crate::autograd::{BackwardOp, Tensor};
use ndarray::ArrayD;
use std::rc::Rc;

/// Multiply by a fixed per-element slope (shared by the piecewise-linear activations)
fn piecewise_linear(a: &Tensor, slope: ArrayD<f32>, name: &'static str) -> Tensor {
    let slope = Rc::new(slope);
    let data = &*a.data() * &*slope;
    Tensor::from_op(data, Rc::new(PiecewiseLinearBackward { a: a.clone(), slope, name }))
}

struct PiecewiseLinearBackward {
    a: Tensor,
    slope: Rc<ArrayD<f32>>,
    name: &'static str,
}

impl BackwardOp for PiecewiseLinearBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(mul_const(grad, Rc::clone(&self.slope)))]
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// ReLU activation
pub fn relu(a: &Tensor) -> Tensor {
    let slope = a.data().mapv(|x| if x > 0.0 { 1.0 } else { 0.0 });
    piecewise_linear(a, slope, "relu")
}

/// Leaky ReLU: `max(alpha * x, x)`
pub fn leaky_relu(a: &Tensor, alpha: f32) -> Tensor {
    let slope = a.data().mapv(|x| if x > 0.0 { 1.0 } else { alpha });
    piecewise_linear(a, slope, "leaky_relu")
}

/// Hyperbolic tangent
pub fn tanh(a: &Tensor) -> Tensor {
    let data = a.data().mapv(f32::tanh);
    Tensor::from_op(data, Rc::new(TanhBackward { a: a.clone() }))
}

struct TanhBackward {
    a: Tensor,
}

impl BackwardOp for TanhBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        // d tanh = 1 - tanh²
        let one_minus_sq = add_scalar(&scale(&square(output), -1.0), 1.0);
        vec![Some(mul(grad, &one_minus_sq))]
    }

    fn name(&self) -> &'static str {
        "tanh"
    }
}

fn stable_sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Logistic sigmoid
pub fn sigmoid(a: &Tensor) -> Tensor {
    let data = a.data().mapv(stable_sigmoid);
    Tensor::from_op(data, Rc::new(SigmoidBackward { a: a.clone() }))
}

struct SigmoidBackward {
    a: Tensor,
}

impl BackwardOp for SigmoidBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        // σ' = σ(1 - σ)
        let derivative = sub(output, &square(output));
        vec![Some(mul(grad, &derivative))]
    }

    fn name(&self) -> &'static str {
        "sigmoid"
    }
}

/// Softplus `ln(1 + e^x)`, evaluated without overflow
pub fn softplus(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| x.max(0.0) + (-x.abs()).exp().ln_1p());
    Tensor::from_op(data, Rc::new(SoftplusBackward { a: a.clone() }))
}

struct SoftplusBackward {
    a: Tensor,
}

impl BackwardOp for SoftplusBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(mul(grad, &sigmoid(&self.a)))]
    }

    fn name(&self) -> &'static str {
        "softplus"
    }
}

/// Element-wise square
pub fn square(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| x * x);
    Tensor::from_op(data, Rc::new(SquareBackward { a: a.clone() }))
}

struct SquareBackward {
    a: Tensor,
}

impl BackwardOp for SquareBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, _output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(scale(&mul(grad, &self.a), 2.0))]
    }

    fn name(&self) -> &'static str {
        "square"
    }
}

/// Element-wise square root
pub fn sqrt(a: &Tensor) -> Tensor {
    let data = a.data().mapv(f32::sqrt);
    Tensor::from_op(data, Rc::new(SqrtBackward { a: a.clone() }))
}

struct SqrtBackward {
    a: Tensor,
}

impl BackwardOp for SqrtBackward {
    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }

    fn vjp(&self, output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>> {
        vec![Some(div(grad, &scale(output, 2.0)))]
    }

    fn name(&self) -> &'static str {
        "sqrt"
    }
}
