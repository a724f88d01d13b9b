//! Adam optimizer

use super::optimizer::check_pairing;
use super::Optimizer;
use crate::Tensor;
use ndarray::{ArrayD, Zip};

/// Adam optimizer
///
/// Bias correction is folded into the step size:
/// lr_t = lr * √(1 - β₂ᵗ) / (1 - β₁ᵗ), θ -= lr_t * m / (√v + ε)
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: u64,
    m: Vec<Option<ArrayD<f32>>>, // First moment
    v: Vec<Option<ArrayD<f32>>>, // Second moment
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self { lr, beta1, beta2, epsilon, t: 0, m: Vec::new(), v: Vec::new() }
    }

    /// Create Adam with default parameters (β₁ 0.9, β₂ 0.999, ε 1e-7)
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-7)
    }

    /// Get beta1 hyperparameter.
    #[must_use]
    pub fn beta1(&self) -> f32 {
        self.beta1
    }

    /// Get beta2 hyperparameter.
    #[must_use]
    pub fn beta2(&self) -> f32 {
        self.beta2
    }

    fn ensure_moments(&mut self, count: usize) {
        if self.m.len() < count {
            self.m.resize(count, None);
            self.v.resize(count, None);
        }
    }
}

impl Optimizer for Adam {
    fn apply_gradients(&mut self, params: &[Tensor], grads: &[Tensor]) {
        check_pairing(params, grads);
        self.ensure_moments(params.len());
        self.t += 1;

        let t = self.t as i32;
        let lr_t = self.lr * (1.0 - self.beta2.powi(t)).sqrt() / (1.0 - self.beta1.powi(t));
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);

        for (i, (param, grad)) in params.iter().zip(grads).enumerate() {
            let grad = grad.data();
            let m = self.m[i].get_or_insert_with(|| ArrayD::zeros(grad.raw_dim()));
            let v = self.v[i].get_or_insert_with(|| ArrayD::zeros(grad.raw_dim()));

            Zip::from(&mut *m).and(&mut *v).and(&*grad).for_each(|m, v, &g| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
            });
            param.update_data(|theta| {
                Zip::from(theta).and(&*m).and(&*v).for_each(|p, &m, &v| {
                    *p -= lr_t * m / (v.sqrt() + epsilon);
                });
            });
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn iterations(&self) -> u64 {
        self.t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_step_moves_by_lr() {
        // With bias correction the first step is lr * g / (|g| + ε)
        let p = Tensor::from_vec(vec![1.0, -1.0], true);
        let g = Tensor::from_vec(vec![0.5, -2.0], false);
        let mut opt = Adam::new(0.1, 0.5, 0.9, 1e-7);
        opt.apply_gradients(&[p.clone()], &[g]);
        let data = p.to_vec();
        assert_relative_eq!(data[0], 0.9, epsilon = 1e-5);
        assert_relative_eq!(data[1], -0.9, epsilon = 1e-5);
        assert_eq!(opt.iterations(), 1);
    }

    #[test]
    fn test_second_step_matches_closed_form() {
        let p = Tensor::from_vec(vec![0.0], true);
        let mut opt = Adam::new(0.01, 0.5, 0.9, 1e-7);
        opt.apply_gradients(&[p.clone()], &[Tensor::from_vec(vec![1.0], false)]);
        opt.apply_gradients(&[p.clone()], &[Tensor::from_vec(vec![3.0], false)]);

        // m2 = 0.5*0.5 + 0.5*3 = 1.75; v2 = 0.9*0.1 + 0.1*9 = 0.99
        let lr_t = 0.01 * (1.0f32 - 0.81).sqrt() / (1.0 - 0.25);
        let expected = -0.01 - lr_t * 1.75 / (0.99f32.sqrt() + 1e-7);
        assert_relative_eq!(p.item(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_minimizes_quadratic() {
        let p = Tensor::from_vec(vec![5.0, -3.0], true);
        let mut opt = Adam::default_params(0.1);
        for _ in 0..500 {
            let g = Tensor::new(p.to_array() * 2.0, false);
            opt.apply_gradients(&[p.clone()], &[g]);
        }
        assert!(p.to_vec().iter().all(|v| v.abs() < 0.1));
    }

    #[test]
    fn test_set_lr() {
        let mut opt = Adam::default_params(0.1);
        opt.set_lr(0.5);
        assert_eq!(opt.lr(), 0.5);
    }
}
