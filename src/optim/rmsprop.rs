//! RMSprop optimizer

use super::optimizer::check_pairing;
use super::Optimizer;
use crate::Tensor;
use ndarray::{ArrayD, Zip};

/// RMSprop without momentum, non-centered
///
/// ms = ρ·ms + (1 - ρ)·g², θ -= lr · g / (√ms + ε), accumulators start at zero.
pub struct RMSprop {
    lr: f32,
    rho: f32,
    epsilon: f32,
    t: u64,
    ms: Vec<Option<ArrayD<f32>>>,
}

impl RMSprop {
    /// Create a new RMSprop optimizer
    pub fn new(lr: f32, rho: f32, epsilon: f32) -> Self {
        Self { lr, rho, epsilon, t: 0, ms: Vec::new() }
    }

    /// Create RMSprop with default parameters (ρ 0.9, ε 1e-7)
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 1e-7)
    }

    /// Get rho hyperparameter.
    #[must_use]
    pub fn rho(&self) -> f32 {
        self.rho
    }
}

impl Optimizer for RMSprop {
    fn apply_gradients(&mut self, params: &[Tensor], grads: &[Tensor]) {
        check_pairing(params, grads);
        if self.ms.len() < params.len() {
            self.ms.resize(params.len(), None);
        }
        self.t += 1;
        let (lr, rho, epsilon) = (self.lr, self.rho, self.epsilon);

        for (i, (param, grad)) in params.iter().zip(grads).enumerate() {
            let grad = grad.data();
            let ms = self.ms[i].get_or_insert_with(|| ArrayD::zeros(grad.raw_dim()));
            Zip::from(&mut *ms).and(&*grad).for_each(|ms, &g| {
                *ms = rho * *ms + (1.0 - rho) * g * g;
            });
            param.update_data(|theta| {
                Zip::from(theta).and(&*ms).and(&*grad).for_each(|p, &ms, &g| {
                    *p -= lr * g / (ms.sqrt() + epsilon);
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
